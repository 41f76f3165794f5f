//! 生成后端抽象 — 通过 trait 对接外部大模型服务
//!
//! Generation backend abstraction. A backend receives a rendered prompt plus
//! the JSON schema the reply should follow, and returns whatever structured
//! output it could obtain. Flows never talk HTTP directly; they only see
//! [`GenerationBackend`].

pub mod gemini;
pub mod stub;

pub use gemini::GeminiBackend;
pub use stub::StubBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::structured::extract_json;

/// Sampling knobs forwarded to the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// One call to a generation backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    /// Fully rendered prompt text.
    pub prompt: String,
    /// Schema the structured reply must satisfy, if any.
    pub output_schema: Option<Value>,
    pub options: GenerationOptions,
}

impl ModelRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            output_schema: None,
            options: GenerationOptions::default(),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageInfo {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// What a backend produced.
///
/// `output` is `None` when the backend answered but nothing in the reply
/// parsed as JSON. Flows treat that as fatal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    pub output: Option<Value>,
    pub text: Option<String>,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl ModelResponse {
    /// Reply carrying an already-structured output.
    pub fn from_output(output: Value) -> Self {
        Self {
            text: Some(output.to_string()),
            output: Some(output),
            ..Self::default()
        }
    }

    /// Reply carrying model text; the structured output is parsed from it.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            output: extract_json(&text),
            text: Some(text),
            ..Self::default()
        }
    }

    /// Reply with nothing usable in it.
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs (e.g. "gemini/gemini-2.0-flash").
    fn name(&self) -> &str;

    async fn generate(&self, request: ModelRequest) -> crate::Result<ModelResponse>;
}
