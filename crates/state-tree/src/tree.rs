//! Tree navigation helpers.

use crate::error::TreeError;
use crate::node::Node;
use crate::snapshot::get_snapshot;

pub fn get_parent(node: &Node) -> Option<Node> {
    node.parent()
}

pub fn get_root(node: &Node) -> Node {
    node.root()
}

pub fn has_parent(node: &Node) -> bool {
    node.parent().is_some()
}

pub fn is_root(node: &Node) -> bool {
    !has_parent(node)
}

/// Creates a detached copy of `node` from its current snapshot. Listeners
/// are not copied.
pub fn clone_node(node: &Node) -> Result<Node, TreeError> {
    node.factory().create(Some(&get_snapshot(node)))
}
