//! Patch records and their JSON wire shape.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::TreeError;

/// Kind of a patch, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchOp {
    Replace,
    Add,
    Remove,
}

impl PatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatchOp::Replace => "replace",
            PatchOp::Add => "add",
            PatchOp::Remove => "remove",
        }
    }
}

/// One field mutation, addressed by path.
///
/// Serializes as `{"op": "replace", "path": "/to", "value": "universe"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum Patch {
    Replace { path: String, value: Value },
    Add { path: String, value: Value },
    Remove { path: String },
}

impl Patch {
    pub fn replace(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Patch::Replace {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn add(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Patch::Add {
            path: path.into(),
            value: value.into(),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Patch::Remove { path: path.into() }
    }

    pub(crate) fn build(op: PatchOp, path: String, value: Option<&Value>) -> Self {
        let value = value.cloned().unwrap_or(Value::Null);
        match op {
            PatchOp::Replace => Patch::Replace { path, value },
            PatchOp::Add => Patch::Add { path, value },
            PatchOp::Remove => Patch::Remove { path },
        }
    }

    pub fn op(&self) -> PatchOp {
        match self {
            Patch::Replace { .. } => PatchOp::Replace,
            Patch::Add { .. } => PatchOp::Add,
            Patch::Remove { .. } => PatchOp::Remove,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Patch::Replace { path, .. } | Patch::Add { path, .. } | Patch::Remove { path } => path,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Patch::Replace { value, .. } | Patch::Add { value, .. } => Some(value),
            Patch::Remove { .. } => None,
        }
    }

    pub fn to_json(&self) -> Value {
        // Serializing a derived enum of strings and JSON values cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Decodes one patch from its wire shape.
    ///
    /// # Errors
    ///
    /// [`TreeError::Decode`] for an unknown `op`, a missing `path`, or a
    /// missing `value` on `replace`/`add`.
    pub fn from_json(value: &Value) -> Result<Self, TreeError> {
        Patch::deserialize(value).map_err(|e| TreeError::Decode {
            kind: "patch",
            reason: e.to_string(),
        })
    }
}

/// Decodes a JSON array of patches.
pub fn from_json_patches(value: &Value) -> Result<Vec<Patch>, TreeError> {
    let items = value.as_array().ok_or_else(|| TreeError::Decode {
        kind: "patch list",
        reason: "expected an array".into(),
    })?;
    items.iter().map(Patch::from_json).collect()
}

/// Encodes patches as a JSON array.
pub fn to_json_patches(patches: &[Patch]) -> Value {
    Value::Array(patches.iter().map(Patch::to_json).collect())
}
