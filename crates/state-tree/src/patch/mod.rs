//! Patch engine: path-addressed, RFC 6902-like field mutations.
//!
//! Every field write emits exactly one [`Patch`] to the patch listeners of the
//! written node and of each of its ancestors, with the path taken relative to
//! the listening node. Replaying the emitted patches in order onto a node
//! created from the pre-mutation snapshot reproduces the post-mutation state.

pub mod apply;
pub mod types;

pub use apply::{apply_patch, apply_patches};
pub use types::{from_json_patches, to_json_patches, Patch, PatchOp};

use std::rc::Rc;

use crate::error::TreeError;
use crate::node::{Disposer, Node};

/// Escaped path of `node` from the root of its tree; `""` for the root.
pub fn get_path(node: &Node) -> String {
    node.path()
}

/// Subscribes to the patches emitted by writes inside `node`'s subtree.
///
/// Listeners run synchronously in registration order. An error returned by a
/// listener skips the remaining listeners and is returned by the write.
pub fn on_patch<F>(node: &Node, listener: F) -> Disposer
where
    F: Fn(&Patch) -> Result<(), TreeError> + 'static,
{
    node.subscribe_patches(Rc::new(listener))
}
