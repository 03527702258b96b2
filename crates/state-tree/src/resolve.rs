//! Path resolution: from a node and a path string to a descendant node.

use state_tree_pointer::{parse_path, split_last, validate_path, validate_pointer};

use crate::error::TreeError;
use crate::node::Node;

/// Resolves `path` relative to `node` and returns the addressed node.
///
/// A leading `/` is optional. `""` addresses `node` itself.
///
/// # Errors
///
/// [`TreeError::Resolution`] if a segment names no field or a field that
/// does not hold a node.
pub fn resolve(node: &Node, path: &str) -> Result<Node, TreeError> {
    let segments = checked_segments(path)?;
    resolve_segments(node, &segments, path)
}

/// Resolves the node owning the field addressed by `path`, returning it with
/// the field name.
///
/// # Errors
///
/// [`TreeError::Resolution`] for the empty path, for an unresolvable owner,
/// or when the last segment is not a declared field of the owner.
pub fn resolve_field(node: &Node, path: &str) -> Result<(Node, String), TreeError> {
    let segments = checked_segments(path)?;
    let (owner_path, field) =
        split_last(&segments).map_err(|_| TreeError::resolution(path, "path names no field"))?;
    let owner = resolve_segments(node, owner_path, path)?;
    if owner.factory().field(field).is_none() {
        return Err(TreeError::resolution(
            path,
            format!("'{field}' is not a field of {}", owner.type_name()),
        ));
    }
    Ok((owner, field.to_string()))
}

fn checked_segments(path: &str) -> Result<Vec<String>, TreeError> {
    validate_pointer(path).map_err(|e| TreeError::resolution(path, e.to_string()))?;
    let segments = parse_path(path);
    validate_path(&segments).map_err(|e| TreeError::resolution(path, e.to_string()))?;
    Ok(segments)
}

fn resolve_segments(
    node: &Node,
    segments: &[String],
    path: &str,
) -> Result<Node, TreeError> {
    let mut current = node.clone();
    for segment in segments {
        current = current.child(segment).map_err(|err| match err {
            TreeError::UnknownField { field, type_name } => TreeError::resolution(
                path,
                format!("'{field}' is not a field of {type_name}"),
            ),
            TreeError::Resolution { .. } => {
                TreeError::resolution(path, format!("'{segment}' does not hold a node"))
            }
            other => other,
        })?;
    }
    Ok(current)
}
