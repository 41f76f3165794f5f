//! 提示词定义：模板 + 输入/输出 schema。
//!
//! Prompt definitions: a named template bound to typed input and output
//! schemas. The schemas are derived from the Rust types with `schemars` and
//! enforced with `jsonschema`, so values arriving as raw JSON get the same
//! checks as values built in Rust.

pub mod template;

pub use template::PromptTemplate;

use crate::backend::{GenerationOptions, ModelRequest};
use crate::error::{Error, ErrorContext};
use crate::structured::OutputValidator;
use schemars::JsonSchema;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

/// A prompt with declared input type `I` and output type `O`.
pub struct PromptDefinition<I, O> {
    name: String,
    template: PromptTemplate,
    input: OutputValidator,
    output: OutputValidator,
    options: GenerationOptions,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> PromptDefinition<I, O>
where
    I: Serialize + JsonSchema,
    O: DeserializeOwned + JsonSchema,
{
    pub fn new(name: impl Into<String>, template: &str) -> crate::Result<Self> {
        Ok(Self {
            name: name.into(),
            template: PromptTemplate::parse(template)?,
            input: OutputValidator::for_type::<I>()?,
            output: OutputValidator::for_type::<O>()?,
            options: GenerationOptions::default(),
            _types: PhantomData,
        })
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    pub fn input_schema(&self) -> &Value {
        self.input.schema()
    }

    pub fn output_schema(&self) -> &Value {
        self.output.schema()
    }

    /// Check a raw input document against the input schema.
    pub fn validate_input(&self, input: &Value) -> crate::Result<()> {
        self.input.validate(input).into_result().map_err(|errors| {
            Error::validation(
                format!("input does not match schema for prompt '{}'", self.name),
                errors,
                ErrorContext::new()
                    .with_field_path("input")
                    .with_source(format!("prompt:{}", self.name)),
            )
        })
    }

    /// Check a model output document against the output schema.
    pub fn validate_output(&self, output: &Value) -> crate::Result<()> {
        self.output.validate(output).into_result().map_err(|errors| {
            Error::validation(
                format!("output does not match schema for prompt '{}'", self.name),
                errors,
                ErrorContext::new()
                    .with_field_path("output")
                    .with_source(format!("prompt:{}", self.name)),
            )
        })
    }

    /// Validate `input` and render the prompt text.
    pub fn render_value(&self, input: &Value) -> crate::Result<String> {
        self.validate_input(input)?;
        Ok(self.template.render(input))
    }

    pub fn render(&self, input: &I) -> crate::Result<String> {
        self.render_value(&serde_json::to_value(input)?)
    }

    /// Build the backend request for an already-validated input document.
    pub fn to_request(&self, input: &Value) -> crate::Result<ModelRequest> {
        let prompt = self.render_value(input)?;
        tracing::debug!(prompt_name = %self.name, chars = prompt.len(), "rendered prompt");
        Ok(ModelRequest {
            prompt,
            output_schema: Some(self.output.schema().clone()),
            options: self.options.clone(),
        })
    }
}

impl<I, O> std::fmt::Debug for PromptDefinition<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptDefinition")
            .field("name", &self.name)
            .field("template", &self.template.source())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
