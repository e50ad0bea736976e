use std::fmt::Debug;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::config::{ModelConfig, ProviderKind};
use crate::error::{CoreError, ModelError, Result};
use crate::prompt_template::RenderedPrompt;

pub mod gemini;

pub use gemini::GeminiClient;

/// A structured-output record returned by a model, already checked
/// against the requested [`OutputShape`].
pub type OutputRecord = Map<String, Value>;

/// A model provider that turns a rendered prompt into a structured record
#[async_trait]
pub trait ModelProvider: Send + Sync + Debug {
    /// Get the name of this provider
    fn name(&self) -> &str;

    /// Model identifier requests are sent to
    fn model(&self) -> &str;

    /// Send one prompt and return the record the model produced.
    ///
    /// Fields missing from the reply (or null) are left out of the record.
    /// A field present with the wrong kind is a [`ModelError::MalformedReply`].
    async fn generate(&self, request: &GenerationRequest) -> Result<OutputRecord>;
}

/// Everything a provider needs for one invocation
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Name of the prompt, used for logging and tracing
    pub name: &'static str,
    pub prompt: RenderedPrompt,
    pub output: OutputShape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    String,
    Number,
    Boolean,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }

    /// Type name in the OpenAPI subset Gemini accepts for response schemas
    fn schema_type(&self) -> &'static str {
        match self {
            FieldKind::String => "STRING",
            FieldKind::Number => "NUMBER",
            FieldKind::Boolean => "BOOLEAN",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputField {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Guidance for the model on what belongs in this field
    pub description: &'static str,
}

impl OutputField {
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::String,
            description,
        }
    }
}

/// Declared shape of the record a model is asked to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputShape {
    pub fields: &'static [OutputField],
}

impl OutputShape {
    pub const fn new(fields: &'static [OutputField]) -> Self {
        Self { fields }
    }

    pub fn response_schema(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|field| {
                (
                    field.name.to_string(),
                    json!({
                        "type": field.kind.schema_type(),
                        "description": field.description,
                    }),
                )
            })
            .collect();
        let required: Vec<&str> = self.fields.iter().map(|f| f.name).collect();

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": required,
        })
    }

    /// Check a decoded reply against this shape.
    ///
    /// Undeclared fields are dropped; null counts as absent.
    pub fn conform(&self, reply: Value) -> std::result::Result<OutputRecord, ModelError> {
        let Value::Object(mut object) = reply else {
            return Err(ModelError::malformed(format!(
                "expected a JSON object, got {}",
                kind_name(&reply)
            )));
        };

        let mut record = Map::new();
        for field in self.fields {
            match object.remove(field.name) {
                None | Some(Value::Null) => {}
                Some(value) if field.kind.matches(&value) => {
                    record.insert(field.name.to_string(), value);
                }
                Some(value) => {
                    return Err(ModelError::malformed(format!(
                        "field '{}' should be a {:?} but was {}",
                        field.name,
                        field.kind,
                        kind_name(&value)
                    )));
                }
            }
        }

        if !object.is_empty() {
            tracing::debug!(
                "dropping undeclared fields from model reply: {:?}",
                object.keys().collect::<Vec<_>>()
            );
        }

        Ok(record)
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Build the provider named by the configuration
pub fn create_provider(config: &ModelConfig) -> Result<Arc<dyn ModelProvider>> {
    match config.provider {
        ProviderKind::Gemini => Ok(Arc::new(GeminiClient::from_config(config)?)),
    }
}

/// Scripted reply for [`MockModelProvider`]
#[derive(Debug, Clone)]
pub enum MockReply {
    Record(Value),
    Fail(String),
}

/// Mock model provider for tests
///
/// Replies are run through the requested shape, so a scripted reply with a
/// wrongly typed field fails the same way a real one would.
#[derive(Debug)]
pub struct MockModelProvider {
    reply: MockReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<GenerationRequest>>,
}

impl MockModelProvider {
    pub fn replying(reply: Value) -> Self {
        Self::new(MockReply::Record(reply))
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(MockReply::Fail(reason.into()))
    }

    fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Number of times `generate` has been called
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<GenerationRequest> {
        self.last_request.lock().clone()
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<OutputRecord> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock() = Some(request.clone());

        let outcome = match &self.reply {
            MockReply::Record(value) => request.output.conform(value.clone()),
            MockReply::Fail(reason) => Err(ModelError::Unavailable {
                reason: reason.clone(),
            }),
        };
        outcome.map_err(|e| CoreError::model_error(self.name(), self.model(), e))
    }
}
