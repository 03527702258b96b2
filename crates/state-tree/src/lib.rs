//! Mutable model trees that describe their own changes.
//!
//! A [`Factory`] is built from a [`ModelDefinition`] and creates live
//! [`Node`]s. Every write to a node's fields is observable three ways:
//!
//! - as a full JSON snapshot ([`on_snapshot`], [`apply_snapshot`]),
//! - as a path-addressed patch ([`on_patch`], [`apply_patch`]),
//! - as a record of the action that caused it ([`on_action`], [`apply_action`]).
//!
//! Each stream can be replayed onto another tree of the same type to
//! reproduce the state.
//!
//! ```
//! use serde_json::json;
//! use state_tree::{apply_patches, create_factory, record_patches, ModelDefinition};
//!
//! let factory = create_factory(ModelDefinition::new().field("count", 0)).unwrap();
//! let source = factory.create(None).unwrap();
//! let recorder = record_patches(&source);
//! source.set("count", 3).unwrap();
//!
//! let copy = factory.create(None).unwrap();
//! apply_patches(&copy, &recorder.patches()).unwrap();
//! assert_eq!(copy.to_json(), json!({"count": 3}));
//! ```
//!
//! Trees are single-threaded: nodes are `Rc`-shared and listeners run
//! synchronously inside the write that triggered them.

pub mod action;
pub mod definition;
pub mod error;
pub mod factory;
pub mod node;
pub mod patch;
pub mod recorder;
pub mod resolve;
pub mod snapshot;
pub mod tree;
pub mod types;

pub use action::{apply_action, apply_actions, on_action, ActionRecord};
pub use definition::{ActionFn, ComputedFn, ModelDefinition, ANONYMOUS_MODEL};
pub use error::TreeError;
pub use factory::{compose_factory, create_factory, Factory};
pub use node::{Assign, Disposer, Node};
pub use patch::{
    apply_patch, apply_patches, from_json_patches, get_path, on_patch, to_json_patches, Patch,
    PatchOp,
};
pub use recorder::{record_actions, record_patches, ActionRecorder, PatchRecorder};
pub use resolve::{resolve, resolve_field};
pub use snapshot::{apply_snapshot, get_snapshot, on_snapshot};
pub use tree::{clone_node, get_parent, get_root, has_parent, is_root};
pub use types::{FieldDecl, FieldType, ModelType};
