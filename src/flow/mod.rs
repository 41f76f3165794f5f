//! Typed prompt flows.
//!
//! A [`Flow`] runs one prompt end to end:
//!
//! 1. validate the input against the prompt's input schema
//! 2. render the template
//! 3. call the [`GenerationBackend`]
//! 4. require a structured output (missing output is a service error)
//! 5. validate it against the output schema; when the reply text held
//!    several JSON objects, the first one that validates is used
//! 6. deserialize into `O`
//!
//! Nothing is retried and nothing partial is returned.

use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::time::Instant;
use tracing::Instrument;

use crate::backend::GenerationBackend;
use crate::error::{Error, ServiceErrorKind};
use crate::prompt::PromptDefinition;
use crate::structured::extract_json_candidates;

#[derive(Debug)]
pub struct Flow<I, O> {
    name: String,
    prompt: PromptDefinition<I, O>,
}

impl<I, O> Flow<I, O>
where
    I: Serialize + JsonSchema,
    O: DeserializeOwned + JsonSchema,
{
    pub fn new(name: impl Into<String>, prompt: PromptDefinition<I, O>) -> Self {
        Self {
            name: name.into(),
            prompt,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt(&self) -> &PromptDefinition<I, O> {
        &self.prompt
    }

    /// Run with a typed input.
    pub async fn run(&self, backend: &dyn GenerationBackend, input: &I) -> crate::Result<O> {
        let value = serde_json::to_value(input)?;
        self.run_json(backend, value).await
    }

    /// Run with an input that arrived as raw JSON (e.g. from a request body).
    pub async fn run_json(&self, backend: &dyn GenerationBackend, input: Value) -> crate::Result<O> {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!(
            "flow",
            flow = %self.name,
            backend = %backend.name(),
            %request_id
        );
        self.execute(backend, input).instrument(span).await
    }

    async fn execute(&self, backend: &dyn GenerationBackend, input: Value) -> crate::Result<O> {
        let started = Instant::now();
        let request = self.prompt.to_request(&input)?;

        let response = backend.generate(request).await.map_err(|e| {
            tracing::warn!(error = %e, "generation backend failed");
            e
        })?;

        let output = response.output.ok_or_else(|| {
            tracing::warn!(
                finish_reason = ?response.finish_reason,
                has_text = response.text.is_some(),
                "backend returned no structured output"
            );
            Error::service(
                ServiceErrorKind::EmptyOutput,
                format!("flow '{}' received no parseable output", self.name),
            )
        })?;

        let output = match self.prompt.validate_output(&output) {
            Ok(()) => output,
            Err(err) => response
                .text
                .as_deref()
                .and_then(|text| {
                    extract_json_candidates(text)
                        .into_iter()
                        .find(|candidate| self.prompt.validate_output(candidate).is_ok())
                })
                .ok_or(err)?,
        };
        let typed: O = serde_json::from_value(output)?;

        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            finish_reason = ?response.finish_reason,
            "flow completed"
        );
        Ok(typed)
    }
}
