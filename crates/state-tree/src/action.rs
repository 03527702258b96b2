//! Action engine: serializable records of named action calls.

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::TreeError;
use crate::node::{Disposer, Node};
use crate::resolve::resolve;

/// One invocation of a declared action.
///
/// `path` locates the node the action was called on, relative to the node
/// whose listener received the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

impl ActionRecord {
    pub fn new(name: impl Into<String>, path: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            args,
        }
    }

    /// `{"name": .., "path": .., "args": [..]}`.
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "path": self.path,
            "args": self.args,
        })
    }

    /// Parses a record. `args` may be omitted and defaults to `[]`.
    pub fn from_json(value: &Value) -> Result<Self, TreeError> {
        Self::deserialize(value).map_err(|e| TreeError::Decode {
            kind: "action",
            reason: e.to_string(),
        })
    }
}

/// Replays one action on the node at `record.path`, relative to `node`.
///
/// # Errors
///
/// [`TreeError::Resolution`] if the path does not resolve,
/// [`TreeError::UnknownAction`] if the target does not declare the action,
/// and whatever the action body returns.
pub fn apply_action(node: &Node, record: &ActionRecord) -> Result<(), TreeError> {
    let target = resolve(node, &record.path)?;
    if !target.factory().has_action(&record.name) {
        return Err(TreeError::UnknownAction {
            name: record.name.clone(),
            type_name: target.type_name(),
        });
    }
    target.call(&record.name, &record.args)
}

/// Replays actions in order, stopping at the first failure.
pub fn apply_actions(node: &Node, records: &[ActionRecord]) -> Result<(), TreeError> {
    debug!(count = records.len(), path = %node.path(), "applying actions");
    for (index, record) in records.iter().enumerate() {
        apply_action(node, record).inspect_err(|err| {
            debug!(index, action = %record.name, error = %err, "action sequence aborted");
        })?;
    }
    Ok(())
}

/// Subscribes to outermost action calls made on `node` or its descendants.
///
/// The record is delivered before the action body runs.
pub fn on_action<F>(node: &Node, listener: F) -> Disposer
where
    F: Fn(&ActionRecord) -> Result<(), TreeError> + 'static,
{
    node.subscribe_actions(Rc::new(listener))
}
