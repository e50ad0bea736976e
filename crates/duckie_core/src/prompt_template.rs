use std::fmt;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;

use crate::error::{CoreError, Result};

/// A prompt template using Jinja2 syntax
///
/// Rendering is strict: a placeholder the context does not supply is an
/// error rather than an empty string, and nothing is HTML-escaped.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    pub name: String,
    pub template: String,
    pub description: Option<String>,
}

impl PromptTemplate {
    pub fn new(name: impl Into<String>, template: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let template = template.into();

        // Fail at construction if the source doesn't compile
        let mut env = environment();
        env.add_template(&name, &template)
            .map_err(|e| CoreError::template_error(&name, e))?;

        Ok(Self {
            name,
            template,
            description: None,
        })
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn render<S: Serialize>(&self, context: &S) -> Result<RenderedPrompt> {
        let mut env = environment();
        env.add_template(&self.name, &self.template)
            .map_err(|e| CoreError::template_error(&self.name, e))?;

        let tmpl = env
            .get_template(&self.name)
            .map_err(|e| CoreError::template_error(&self.name, e))?;

        let text = tmpl
            .render(minijinja::Value::from_serialize(context))
            .map_err(|e| CoreError::template_error(&self.name, e))?;

        Ok(RenderedPrompt::new(&self.name, text))
    }
}

fn environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env
}

/// Final prompt text, ready to send to a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    template: String,
    text: String,
}

impl RenderedPrompt {
    pub(crate) fn new(template: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            text: text.into(),
        }
    }

    /// Name of the template this prompt came from.
    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl fmt::Display for RenderedPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
