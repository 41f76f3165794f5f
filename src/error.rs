use crate::structured::ValidationError;
use std::fmt;
use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "input.keywords", "config.base_url")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected type, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "flow:generatePromoScriptFlow", "config")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Which stage of a backend call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceErrorKind {
    /// Connection, TLS or body decoding failure.
    Transport,
    /// The request did not complete within the configured timeout.
    Timeout,
    /// The backend answered with a non-success status.
    Remote,
    /// The backend answered but produced no parseable output.
    EmptyOutput,
}

impl ServiceErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Timeout => "timeout",
            Self::Remote => "remote",
            Self::EmptyOutput => "empty_output",
        }
    }
}

impl fmt::Display for ServiceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for jinglemaker.
///
/// Schema failures and backend failures are kept apart so callers can tell a
/// bad request from an unavailable model.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        errors: Vec<ValidationError>,
        context: ErrorContext,
    },

    #[error("Service error ({kind}): {message}{}", format_status(.status))]
    Service {
        kind: ServiceErrorKind,
        message: String,
        status: Option<u16>,
    },

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Template error: {0}")]
    Template(String),

    #[error("Player error: {0}")]
    Player(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {})", code),
        None => String::new(),
    }
}

impl Error {
    /// Create a validation error carrying the individual schema violations.
    pub fn validation(
        msg: impl Into<String>,
        errors: Vec<ValidationError>,
        context: ErrorContext,
    ) -> Self {
        Error::Validation {
            message: msg.into(),
            errors,
            context,
        }
    }

    /// Create a service error without an HTTP status.
    pub fn service(kind: ServiceErrorKind, msg: impl Into<String>) -> Self {
        Error::Service {
            kind,
            message: msg.into(),
            status: None,
        }
    }

    /// Create a service error for a non-success HTTP reply.
    pub fn remote(status: u16, msg: impl Into<String>) -> Self {
        Error::Service {
            kind: ServiceErrorKind::Remote,
            message: msg.into(),
            status: Some(status),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. })
    }

    pub fn is_service(&self) -> bool {
        matches!(self, Error::Service { .. })
    }

    /// The service failure kind, if this is a service error.
    pub fn service_kind(&self) -> Option<ServiceErrorKind> {
        match self {
            Error::Service { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}

// The request URL is stripped: it can carry credentials in its query.
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            ServiceErrorKind::Timeout
        } else {
            ServiceErrorKind::Transport
        };
        let status = e.status().map(|s| s.as_u16());
        Error::Service {
            kind,
            message: e.without_url().to_string(),
            status,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_display_includes_context() {
        let err = Error::validation(
            "input does not match schema",
            vec![ValidationError::with_path("Expected string", "keywords".to_string())],
            ErrorContext::new()
                .with_field_path("input")
                .with_source("flow:demo"),
        );
        let text = err.to_string();
        assert!(text.starts_with("Validation error: input does not match schema"));
        assert!(text.contains("field: input"));
        assert!(text.contains("source: flow:demo"));
        assert!(err.is_validation());
        assert!(!err.is_service());
    }

    #[test]
    fn test_remote_error_display() {
        let err = Error::remote(503, "model overloaded");
        assert_eq!(
            err.to_string(),
            "Service error (remote): model overloaded (HTTP 503)"
        );
        assert_eq!(err.service_kind(), Some(ServiceErrorKind::Remote));
        assert!(err.context().is_none());
    }

    #[test]
    fn test_empty_output_kind() {
        let err = Error::service(ServiceErrorKind::EmptyOutput, "no output");
        assert_eq!(err.to_string(), "Service error (empty_output): no output");
    }
}
