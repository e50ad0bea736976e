//! Google Gemini `generateContent` client with structured JSON output.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{GenerationRequest, ModelProvider, OutputRecord};
use crate::config::{API_KEY_ENV_VARS, DEFAULT_BASE_URL, DEFAULT_MODEL, ModelConfig};
use crate::error::{CoreError, ModelError, Result};

const PROVIDER_NAME: &str = "gemini";

/// Finish reasons that mean the model declined to produce content
const REFUSAL_REASONS: &[&str] = &[
    "SAFETY",
    "RECITATION",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
];

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: Some(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: None,
            max_output_tokens: None,
        }
    }

    /// Build a client from configuration, resolving the API key from the
    /// environment when the file doesn't carry one.
    ///
    /// A missing key is not an error here; every call fails until one is set.
    pub fn from_config(config: &ModelConfig) -> Result<Self> {
        let api_key = config.resolve_api_key();
        if api_key.is_none() {
            tracing::warn!(
                "No Gemini API key found (checked {}); model calls will fail",
                API_KEY_ENV_VARS.join(", ")
            );
        }

        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            CoreError::model_error(PROVIDER_NAME, &config.model, ModelError::Transport(e))
        })?;

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_output_tokens: config.max_output_tokens,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Set a custom base URL (e.g., for proxies or a local test server).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn error(&self, cause: ModelError) -> CoreError {
        CoreError::model_error(PROVIDER_NAME, &self.model, cause)
    }

    fn build_body(&self, request: &GenerationRequest) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: Some(request.prompt.as_str().to_string()),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: request.output.response_schema(),
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        }
    }
}

// The key stays out of logs
impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ModelProvider for GeminiClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<OutputRecord> {
        let Some(api_key) = &self.api_key else {
            return Err(CoreError::MissingApiKey {
                provider: PROVIDER_NAME.to_string(),
                env_vars: API_KEY_ENV_VARS.join(", "),
            });
        };

        let body = self.build_body(request);
        tracing::debug!(prompt = request.name, model = %self.model, "Sending generateContent request");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.error(ModelError::Transport(e)))?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.error(ModelError::Transport(e)))?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            return Err(self.error(ModelError::from_status(status.as_u16(), text)));
        }

        let reply: GenerateContentResponse = serde_json::from_slice(&bytes).map_err(|e| {
            self.error(ModelError::malformed(format!(
                "response body is not a generateContent reply: {e}"
            )))
        })?;

        let text = reply.output_text().map_err(|e| self.error(e))?;
        let value: Value = serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
            self.error(ModelError::malformed(format!(
                "model output is not valid JSON: {e}"
            )))
        })?;

        request.output.conform(value).map_err(|e| self.error(e))
    }
}

/// Some models wrap JSON output in a Markdown fence despite the mime type
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
    else {
        return trimmed;
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn output_text(self) -> std::result::Result<String, ModelError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ModelError::Rejected {
                reason: format!("prompt blocked ({reason})"),
            });
        }

        let Some(candidate) = self.candidates.into_iter().next() else {
            return Err(ModelError::Rejected {
                reason: "no candidates returned".to_string(),
            });
        };

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        if text.trim().is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "empty candidate".to_string());
            return Err(if REFUSAL_REASONS.contains(&reason.as_str()) {
                ModelError::Rejected {
                    reason: format!("finish reason {reason}"),
                }
            } else {
                ModelError::malformed(format!("candidate has no text ({reason})"))
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OutputField, OutputShape};
    use crate::prompt_template::RenderedPrompt;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const FIELDS: &[OutputField] = &[OutputField::string(
        "feedback",
        "Supportive feedback for the student",
    )];
    const SHAPE: OutputShape = OutputShape::new(FIELDS);

    fn request() -> GenerationRequest {
        GenerationRequest {
            name: "stress_coping_feedback_prompt",
            prompt: RenderedPrompt::new("stress_coping_feedback_prompt", "I am stressed."),
            output: SHAPE,
        }
    }

    fn reply_with_text(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }

    fn client_for(server: &MockServer) -> GeminiClient {
        GeminiClient::new("test-key")
            .with_base_url(server.uri())
            .with_model("gemini-test")
    }

    #[test]
    fn test_new_client_defaults() {
        let client = GeminiClient::new("test_key");
        assert_eq!(client.base_url, DEFAULT_BASE_URL);
        assert_eq!(client.model, DEFAULT_MODEL);
        assert_eq!(
            client.endpoint(),
            format!("{DEFAULT_BASE_URL}/models/{DEFAULT_MODEL}:generateContent")
        );
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = GeminiClient::new("super-secret");
        assert!(!format!("{:?}", client).contains("super-secret"));
    }

    #[test]
    fn test_request_body() {
        let client = GeminiClient::new("k").with_temperature(0.5);
        let body = serde_json::to_value(client.build_body(&request())).unwrap();

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "I am stressed.");
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(body["generationConfig"]["temperature"], 0.5);
        assert!(body["generationConfig"].get("maxOutputTokens").is_none());
    }

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n{}\n```"), "{}");
    }

    #[tokio::test]
    async fn test_generate_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-test:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .and(body_partial_json(json!({
                "generationConfig": { "responseMimeType": "application/json" }
            })))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_with_text(r#"{"feedback":"Breathe slowly."}"#)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let record = client_for(&server).generate(&request()).await.unwrap();
        assert_eq!(record["feedback"], "Breathe slowly.");
    }

    #[tokio::test]
    async fn test_missing_field_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply_with_text("{}")))
            .mount(&server)
            .await;

        let record = client_for(&server).generate(&request()).await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_field_kind_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reply_with_text(r#"{"feedback":7}"#)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ModelProviderError {
                cause: ModelError::MalformedReply { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_non_json_output_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply_with_text("Here is some feedback for you!")),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ModelProviderError {
                cause: ModelError::MalformedReply { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("quota"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ModelProviderError {
                cause: ModelError::RateLimited { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ModelProviderError {
                cause: ModelError::Unauthorized { status: 403 },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_blocked_prompt() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": { "blockReason": "SAFETY" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .generate(&request())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::ModelProviderError {
                cause: ModelError::Rejected { .. },
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_missing_key_fails_every_call() {
        let config = ModelConfig {
            api_key: None,
            base_url: "http://127.0.0.1:1".into(),
            ..Default::default()
        };
        let mut client = GeminiClient::from_config(&config).unwrap();
        client.api_key = None;

        assert!(!client.has_api_key());
        let err = client.generate(&request()).await.unwrap_err();
        assert!(matches!(err, CoreError::MissingApiKey { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let client = GeminiClient::new("k").with_base_url("http://127.0.0.1:1");
        let err = client.generate(&request()).await.unwrap_err();

        assert!(matches!(
            err,
            CoreError::ModelProviderError {
                cause: ModelError::Transport(_),
                ..
            }
        ));
    }
}
