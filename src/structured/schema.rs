//! Schema generation from Rust types.

use serde_json::{json, Value};

/// JSON schema (draft-07) for a type deriving `schemars::JsonSchema`.
pub fn json_schema_from_type<T: schemars::JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(&schema).unwrap_or_else(|_| json!({}))
}
