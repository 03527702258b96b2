//! Error type shared by every state-tree operation.

use serde_json::Value;
use thiserror::Error;

/// Failure of a state-tree operation.
///
/// All errors are raised synchronously at the offending call. Batch
/// operations stop at the first failure and keep what was already committed.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TreeError {
    /// A snapshot or value does not structurally match its declared type.
    #[error("[state-tree] Snapshot {snapshot} is not assignable to type {type_name}. Expected {expected} instead.")]
    Validation {
        snapshot: Value,
        type_name: String,
        expected: String,
    },

    /// A patch or action path does not address an existing node.
    #[error("[state-tree] Could not resolve path '{path}': {reason}")]
    Resolution { path: String, reason: String },

    /// An action record names an action the resolved node does not declare.
    #[error("[state-tree] Type {type_name} has no action named '{name}'")]
    UnknownAction { name: String, type_name: String },

    #[error("[state-tree] Type {type_name} has no property named '{field}'")]
    UnknownField { field: String, type_name: String },

    #[error("[state-tree] Property '{field}' of {type_name} is computed and cannot be assigned")]
    ReadOnly { field: String, type_name: String },

    #[error("[state-tree] Field '{field}' of {type_name} is required and cannot be removed")]
    Required { field: String, type_name: String },

    #[error("[state-tree] Invalid move: {0}")]
    InvalidMove(String),

    #[error("[state-tree] Invalid model definition: {0}")]
    Definition(String),

    #[error("[state-tree] Could not decode {kind}: {reason}")]
    Decode { kind: &'static str, reason: String },

    /// Raised by a listener; aborts the remaining listeners of the event.
    #[error("[state-tree] Listener failed: {0}")]
    Listener(String),
}

impl TreeError {
    /// Convenience constructor for listener failures.
    pub fn listener(reason: impl Into<String>) -> Self {
        TreeError::Listener(reason.into())
    }

    pub(crate) fn resolution(path: &str, reason: impl Into<String>) -> Self {
        TreeError::Resolution {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
