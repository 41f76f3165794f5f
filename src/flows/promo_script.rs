//! 促销脚本生成流程 — 根据关键词生成简短的广告脚本。
//!
//! Promotional script flow: turns a comma-separated keyword list into a short
//! promo script for a jingle or radio drop.
//!
//! ```rust,no_run
//! use jinglemaker::backend::GeminiBackend;
//! use jinglemaker::config::FlowConfig;
//! use jinglemaker::flows::promo_script::{generate, GenerationRequest};
//!
//! # async fn demo() -> jinglemaker::Result<()> {
//! let backend = GeminiBackend::from_config(&FlowConfig::from_env()?)?;
//! let result = generate(&backend, GenerationRequest::new("radio, upbeat, morning show")).await?;
//! println!("{}", result.script);
//! # Ok(())
//! # }
//! ```

use once_cell::sync::OnceCell;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::backend::GenerationBackend;
use crate::flow::Flow;
use crate::prompt::PromptDefinition;

pub const PROMPT_NAME: &str = "generatePromoScriptPrompt";
pub const FLOW_NAME: &str = "generatePromoScriptFlow";

pub const PROMPT_TEMPLATE: &str = "You are an AI assistant specialized in generating promotional scripts.

Based on the following keywords, generate a short and engaging promotional script:

Keywords: {{{keywords}}}
";

/// Input of the promo script flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationRequest {
    /// Keywords to base the promotional script on, separated by commas.
    pub keywords: String,
}

impl GenerationRequest {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
        }
    }
}

/// Output of the promo script flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GenerationResult {
    /// The generated promotional script.
    pub script: String,
}

pub type PromoScriptFlow = Flow<GenerationRequest, GenerationResult>;

static FLOW: OnceCell<PromoScriptFlow> = OnceCell::new();

/// The shared flow instance, built on first use.
pub fn flow() -> crate::Result<&'static PromoScriptFlow> {
    FLOW.get_or_try_init(|| {
        let prompt = PromptDefinition::new(PROMPT_NAME, PROMPT_TEMPLATE)?;
        Ok(Flow::new(FLOW_NAME, prompt))
    })
}

/// Render the prompt text for `request` without calling a backend.
pub fn render_prompt(request: &GenerationRequest) -> crate::Result<String> {
    flow()?.prompt().render(request)
}

/// Generate a promotional script for `request`.
pub async fn generate(
    backend: &dyn GenerationBackend,
    request: GenerationRequest,
) -> crate::Result<GenerationResult> {
    warn_if_blank(&request.keywords);
    flow()?.run(backend, &request).await
}

/// Same as [`generate`], for input that arrives as raw JSON.
pub async fn generate_json(
    backend: &dyn GenerationBackend,
    input: Value,
) -> crate::Result<GenerationResult> {
    if let Some(keywords) = input.get("keywords").and_then(Value::as_str) {
        warn_if_blank(keywords);
    }
    flow()?.run_json(backend, input).await
}

/// Blank keywords are accepted, only worth a warning.
fn warn_if_blank(keywords: &str) -> bool {
    let blank = keywords.trim().is_empty();
    if blank {
        tracing::warn!(flow = FLOW_NAME, "empty keyword list; the model gets no guidance");
    }
    blank
}
