//! Error types for instancify operations.
//!
//! Rejected writes never surface here: they are routed to the lineage's error
//! function and reported through [`Outcome`](crate::Outcome). These errors
//! cover the Result-returning parts of the API.

use thiserror::Error;

/// Result type alias for instancify operations.
pub type InstancifyResult<T> = Result<T, InstancifyError>;

/// Errors that can occur during instancify operations.
#[derive(Debug, Error)]
pub enum InstancifyError {
    /// The document has been frozen and can no longer be mutated.
    #[error("cannot mutate a frozen document")]
    Frozen,

    /// No custom setter with this name exists on the instance.
    #[error("unknown custom setter: {name}")]
    UnknownSetter {
        /// The requested setter name.
        name: String,
    },

    /// No custom getter with this name exists on the instance.
    #[error("unknown custom getter: {name}")]
    UnknownGetter {
        /// The requested getter name.
        name: String,
    },

    /// JSON serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InstancifyError {
    /// Create an unknown setter error.
    #[inline]
    pub fn unknown_setter(name: impl Into<String>) -> Self {
        InstancifyError::UnknownSetter { name: name.into() }
    }

    /// Create an unknown getter error.
    #[inline]
    pub fn unknown_getter(name: impl Into<String>) -> Self {
        InstancifyError::UnknownGetter { name: name.into() }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
