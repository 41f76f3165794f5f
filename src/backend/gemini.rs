//! Google Gemini generateContent backend.
//!
//! - Request: one user turn in `contents`; structured output is requested via
//!   `generationConfig.responseMimeType = application/json` plus a
//!   `responseSchema`.
//! - Response: `candidates[0].content.parts[*].text`, `finishReason`,
//!   `usageMetadata`.
//! - API key is sent in the `x-goog-api-key` header, never in the URL.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::config::FlowConfig;
use crate::transport::HttpTransport;

use super::{GenerationBackend, GenerationOptions, ModelRequest, ModelResponse, UsageInfo};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Keywords `responseSchema` does not accept.
const UNSUPPORTED_SCHEMA_KEYS: &[&str] = &[
    "$schema",
    "$id",
    "title",
    "additionalProperties",
    "definitions",
    "$defs",
    "default",
    "examples",
];

#[derive(Debug)]
pub struct GeminiBackend {
    transport: HttpTransport,
    model: String,
    name: String,
    /// Applied where a request leaves an option unset.
    defaults: GenerationOptions,
}

impl GeminiBackend {
    pub fn from_config(config: &FlowConfig) -> crate::Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config, API_KEY_HEADER)?;
        Ok(Self {
            transport,
            model: config.model.clone(),
            name: format!("{}/{}", config.provider, config.model),
            defaults: GenerationOptions {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("/models/{}:generateContent", self.model)
    }

    /// Build the generateContent body for `request`.
    pub fn build_body(request: &ModelRequest) -> Value {
        let mut body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.prompt }],
            }],
        });

        let mut gen_config = Map::new();
        if let Some(t) = request.options.temperature {
            gen_config.insert("temperature".into(), json!(t));
        }
        if let Some(mt) = request.options.max_output_tokens {
            gen_config.insert("maxOutputTokens".into(), json!(mt));
        }
        if let Some(schema) = &request.output_schema {
            gen_config.insert("responseMimeType".into(), json!("application/json"));
            gen_config.insert("responseSchema".into(), sanitize_schema(schema));
        }
        if !gen_config.is_empty() {
            body["generationConfig"] = Value::Object(gen_config);
        }

        body
    }

    /// Parse a generateContent reply.
    pub fn parse_response(body: &Value) -> ModelResponse {
        let text = body
            .pointer("/candidates/0/content/parts")
            .and_then(|p| p.as_array())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                    .collect::<String>()
            })
            .filter(|t| !t.is_empty());

        if text.is_none() {
            if let Some(reason) = body
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
            {
                tracing::warn!(block_reason = %reason, "Gemini blocked the prompt");
            }
        }

        let finish_reason = body
            .pointer("/candidates/0/finishReason")
            .and_then(|v| v.as_str())
            .map(|r| match r {
                "STOP" => "stop".to_string(),
                "MAX_TOKENS" => "length".to_string(),
                "SAFETY" | "RECITATION" => "content_filter".to_string(),
                other => other.to_lowercase(),
            });

        let usage = body.get("usageMetadata").map(|u| UsageInfo {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
            total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
        });

        let mut response = match text {
            Some(text) => ModelResponse::from_text(text),
            None => ModelResponse::empty(),
        };
        response.finish_reason = finish_reason;
        response.usage = usage;
        response
    }
}

/// Reduce a draft-07 schema to the OpenAPI subset Gemini accepts.
///
/// `"type": [T, "null"]` becomes `"type": T, "nullable": true`.
pub fn sanitize_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => {
            let mut out = Map::new();
            for (key, value) in map {
                if UNSUPPORTED_SCHEMA_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if key == "type" {
                    if let Value::Array(types) = value {
                        let non_null: Vec<&Value> =
                            types.iter().filter(|t| t.as_str() != Some("null")).collect();
                        if non_null.len() < types.len() {
                            out.insert("nullable".into(), json!(true));
                        }
                        if let Some(first) = non_null.first() {
                            out.insert("type".into(), (*first).clone());
                        }
                        continue;
                    }
                }
                let cleaned = match key.as_str() {
                    // Property names are data, not keywords.
                    "properties" => match value {
                        Value::Object(props) => Value::Object(
                            props
                                .iter()
                                .map(|(name, s)| (name.clone(), sanitize_schema(s)))
                                .collect(),
                        ),
                        other => other.clone(),
                    },
                    _ => sanitize_schema(value),
                };
                out.insert(key.clone(), cleaned);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(sanitize_schema).collect()),
        other => other.clone(),
    }
}

#[async_trait]
impl GenerationBackend for GeminiBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn generate(&self, mut request: ModelRequest) -> crate::Result<ModelResponse> {
        let options = &mut request.options;
        options.temperature = options.temperature.or(self.defaults.temperature);
        options.max_output_tokens = options.max_output_tokens.or(self.defaults.max_output_tokens);

        let body = Self::build_body(&request);
        tracing::debug!(backend = %self.name, "calling generateContent");
        let reply = self.transport.post_json(&self.endpoint(), &body).await?;
        let response = Self::parse_response(&reply);
        tracing::debug!(
            backend = %self.name,
            finish_reason = ?response.finish_reason,
            has_output = response.output.is_some(),
            "generateContent replied"
        );
        Ok(response)
    }
}
