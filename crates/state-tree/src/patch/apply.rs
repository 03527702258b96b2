//! Applying patches to a live node.

use serde_json::Value;
use tracing::debug;

use super::types::{Patch, PatchOp};
use crate::error::TreeError;
use crate::node::{Assign, Node};
use crate::resolve::resolve_field;
use crate::snapshot::apply_snapshot;

// ── Single patch ────────────────────────────────────────────────────────────

/// Applies one patch relative to `node`.
///
/// `replace` and `add` assign the addressed field through the normal write
/// path, so the application itself emits patches and snapshots. `remove`
/// clears the field to `null`. A `replace`/`add` at the empty path applies the
/// value as a snapshot of `node`.
///
/// # Errors
///
/// [`TreeError::Resolution`] if the path does not reach a field of an
/// existing node; validation and removal errors from the write.
pub fn apply_patch(node: &Node, patch: &Patch) -> Result<(), TreeError> {
    if patch.path().is_empty() {
        return apply_to_self(node, patch);
    }
    let (owner, field) = resolve_field(node, patch.path())?;
    match patch {
        Patch::Replace { value, .. } => write(&owner, &field, value, PatchOp::Replace),
        Patch::Add { value, .. } => write(&owner, &field, value, PatchOp::Add),
        Patch::Remove { .. } => owner.remove(&field),
    }
}

fn write(owner: &Node, field: &str, value: &Value, op: PatchOp) -> Result<(), TreeError> {
    owner.write(field, Assign::Value(value.clone()), op)
}

fn apply_to_self(node: &Node, patch: &Patch) -> Result<(), TreeError> {
    match patch.value() {
        Some(value) => apply_snapshot(node, value),
        None => Err(TreeError::resolution(
            patch.path(),
            "the node a patch is applied to cannot be removed",
        )),
    }
}

// ── Sequences ───────────────────────────────────────────────────────────────

/// Applies patches in order, each fully committed before the next.
///
/// Stops at the first failing patch; earlier patches stay applied.
pub fn apply_patches(node: &Node, patches: &[Patch]) -> Result<(), TreeError> {
    debug!(count = patches.len(), path = %node.path(), "applying patches");
    for (index, patch) in patches.iter().enumerate() {
        apply_patch(node, patch).inspect_err(|err| {
            debug!(index, error = %err, "patch sequence aborted");
        })?;
    }
    Ok(())
}

// ── Tests ───────────────────────────────────────────────────────────────────
