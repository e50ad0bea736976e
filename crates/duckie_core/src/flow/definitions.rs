use super::FlowDefinition;
use crate::capability::Capability;
use crate::model::{OutputField, OutputShape};

const STUDY_RECOMMENDATIONS_TEMPLATE: &str = "\
You are an AI assistant designed to provide personalized study method recommendations to students.

Based on the student's course, learning style, and study goals, provide tailored study method recommendations.

Course: {{ course }}
Learning Style: {{ learningStyle }}
Study Goals: {{ studyGoals }}

Recommendations:";

const STRESS_FEEDBACK_TEMPLATE: &str = "\
You are a friendly and supportive AI assistant in a student mental wellness app called DuckieMind. Your role is to be a gentle guide, like a caring friend.

A user is sharing a stressful situation with you. Your task is to provide supportive and constructive feedback to help them cope. Your tone should be gentle, encouraging, and calm.

IMPORTANT: You are NOT a medical professional. Do not provide medical advice, diagnoses, or therapy. Instead, offer simple, practical, and actionable coping strategies.

Situation:
\"{{ situation }}\"

Please provide feedback that includes:
- Validation of their feelings.
- Gentle reframing of the situation, if appropriate.
- A few simple, actionable steps they can take right now (e.g., deep breathing, taking a short walk, writing down their thoughts).
- A positive and hopeful closing statement.

Present your feedback in a clear, easy-to-read format.";

const STUDY_SCHEDULE_TEMPLATE: &str = "\
You are an expert academic advisor and study planner AI for the DuckieMind app. Your goal is to help students create a manageable and effective study schedule to prepare for their upcoming exams.

You will be given a list of exams with their titles and dates. Create a detailed, day-by-day study schedule that helps the user prepare for these exams without getting overwhelmed.

Your schedule should:
- Be encouraging and use a positive tone.
- Start from today (or the next day) and go up to the last exam date.
- Prioritize subjects with earlier exam dates, but also allocate time for later exams.
- Break down study sessions into manageable chunks (e.g., \"Review Chapter 3 of Psychology,\" \"Practice 10 math problems\").
- Include suggestions for breaks and relaxation.
- Be formatted in clear, easy-to-read Markdown. Use headings for dates and bullet points for tasks.

Here are the user's exams:
{% for exam in exams %}
- {{ exam.title }} on {{ exam.date }}
{% endfor %}

Generate the study schedule now.";

const RECOMMENDATIONS_FIELDS: &[OutputField] = &[OutputField::string(
    "recommendations",
    "Personalized study method recommendations based on the provided information.",
)];

const FEEDBACK_FIELDS: &[OutputField] = &[OutputField::string(
    "feedback",
    "Supportive and constructive feedback for the user to cope with their situation. \
     Provide actionable, simple steps in a gentle and encouraging tone. \
     Do not act as a medical professional. \
     Format the feedback as a paragraph or bullet points.",
)];

const SCHEDULE_FIELDS: &[OutputField] = &[OutputField::string(
    "schedule",
    "A detailed study schedule in Markdown format. \
     The schedule should be broken down by dates leading up to the exams, \
     suggesting what to study and when. It should be encouraging and easy to follow.",
)];

pub const STUDY_RECOMMENDATIONS: FlowDefinition = FlowDefinition {
    name: "personalized_study_recommendations_flow",
    prompt_name: "personalized_study_recommendations_prompt",
    capability: Capability::StudyRecommendations,
    template: STUDY_RECOMMENDATIONS_TEMPLATE,
    output: OutputShape::new(RECOMMENDATIONS_FIELDS),
};

pub const STRESS_FEEDBACK: FlowDefinition = FlowDefinition {
    name: "stress_coping_feedback_flow",
    prompt_name: "stress_coping_feedback_prompt",
    capability: Capability::StressFeedback,
    template: STRESS_FEEDBACK_TEMPLATE,
    output: OutputShape::new(FEEDBACK_FIELDS),
};

pub const STUDY_SCHEDULE: FlowDefinition = FlowDefinition {
    name: "study_schedule_recommendations_flow",
    prompt_name: "study_schedule_recommendations_prompt",
    capability: Capability::StudySchedule,
    template: STUDY_SCHEDULE_TEMPLATE,
    output: OutputShape::new(SCHEDULE_FIELDS),
};
