//! Mustache-style prompt templates.
//!
//! Only variable substitution is supported: `{{name}}` and `{{{name}}}`.
//! Prompts are plain text, so neither form escapes its value.

use crate::error::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::fmt;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\{([^{}]*)\}\}\}|\{\{([^{}]*)\}\}").expect("placeholder pattern is valid")
});
static IDENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A parsed template, ready to render many times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse `source`, rejecting unterminated or empty placeholders.
    pub fn parse(source: impl Into<String>) -> crate::Result<Self> {
        let source = source.into();
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(&source) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            let literal = &source[last..whole.start()];
            check_literal(literal, last)?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }

            let raw = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str().trim())
                .unwrap_or_default();
            if raw.is_empty() {
                return Err(Error::Template(format!(
                    "empty placeholder at byte {}",
                    whole.start()
                )));
            }
            if !IDENT.is_match(raw) {
                return Err(Error::Template(format!(
                    "invalid variable name '{}' at byte {}",
                    raw,
                    whole.start()
                )));
            }
            segments.push(Segment::Variable(raw.to_string()));
            last = whole.end();
        }

        let tail = &source[last..];
        check_literal(tail, last)?;
        if !tail.is_empty() {
            segments.push(Segment::Literal(tail.to_string()));
        }

        Ok(Self { source, segments })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Variable names in order of first appearance.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Variable(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Render with values taken from a JSON object.
    ///
    /// Missing or null variables render as empty text.
    pub fn render(&self, vars: &Value) -> String {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => match vars.get(name) {
                    Some(Value::String(s)) => out.push_str(s),
                    Some(Value::Null) | None => {
                        tracing::warn!(variable = %name, "prompt variable missing; rendering empty");
                    }
                    Some(other) => out.push_str(&other.to_string()),
                },
            }
        }
        out
    }
}

fn check_literal(literal: &str, offset: usize) -> crate::Result<()> {
    match literal.find("{{") {
        Some(pos) => Err(Error::Template(format!(
            "unterminated placeholder at byte {}",
            offset + pos
        ))),
        None => Ok(()),
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
