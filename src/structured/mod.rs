//! Structured input/output support.
//!
//! - [`OutputValidator`]: compiled JSON schema checks
//! - [`ValidationResult`] / [`ValidationError`]: what failed and where
//! - [`extract_json`]: recover a JSON document from model text
//!
//! # Examples
//!
//! ```
//! use jinglemaker::structured::OutputValidator;
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": { "script": { "type": "string" } },
//!     "required": ["script"]
//! });
//!
//! let validator = OutputValidator::new(schema).unwrap();
//! assert!(validator.validate(&json!({"script": "On air!"})).is_valid());
//! ```

pub mod error;
pub mod extract;
pub mod schema;
pub mod validator;

pub use error::{ValidationError, ValidationResult};
pub use extract::{extract_json, extract_json_candidates};
pub use schema::json_schema_from_type;
pub use validator::OutputValidator;
