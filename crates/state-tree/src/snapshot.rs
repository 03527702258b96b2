//! Snapshot engine.

use std::rc::Rc;

use serde_json::Value;
use tracing::debug;

use crate::error::TreeError;
use crate::node::{Disposer, Node};

/// Deep, independent JSON copy of `node`'s declared fields.
pub fn get_snapshot(node: &Node) -> Value {
    node.snapshot()
}

/// Writes every key of `snapshot` into `node` through the normal write path.
///
/// Keys absent from `snapshot` keep their current value, so a snapshot that
/// lists every field replaces the state and a partial one merges into it.
///
/// # Errors
///
/// [`TreeError::Validation`] before any write if `snapshot` is not a
/// structural subset of `node`'s type.
pub fn apply_snapshot(node: &Node, snapshot: &Value) -> Result<(), TreeError> {
    let factory = node.factory();
    let Some(entries) = snapshot.as_object().filter(|_| factory.is(snapshot)) else {
        return Err(factory.validation_error(snapshot));
    };
    debug!(type_name = %factory.name(), keys = entries.len(), "applying snapshot");
    for (field, value) in entries {
        node.set(field, value)?;
    }
    Ok(())
}

/// Subscribes to the snapshots of `node`, delivered after every committed
/// write inside its subtree.
pub fn on_snapshot<F>(node: &Node, listener: F) -> Disposer
where
    F: Fn(&Value) -> Result<(), TreeError> + 'static,
{
    node.subscribe_snapshots(Rc::new(listener))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::ModelDefinition;
    use crate::factory::create_factory;
    use serde_json::json;
    use std::cell::RefCell;

    #[test]
    fn partial_snapshot_keeps_other_fields() {
        let f = create_factory(ModelDefinition::new().field("a", 1).field("b", 2)).unwrap();
        let node = f.create(None).unwrap();
        apply_snapshot(&node, &json!({"b": 5})).unwrap();
        assert_eq!(node.to_json(), json!({"a": 1, "b": 5}));
    }

    #[test]
    fn unknown_key_fails_before_writing() {
        let f = create_factory(ModelDefinition::new().field("a", 1)).unwrap();
        let node = f.create(None).unwrap();
        let writes = Rc::new(RefCell::new(0));
        let counter = writes.clone();
        on_snapshot(&node, move |_| {
            *counter.borrow_mut() += 1;
            Ok(())
        });
        let err = apply_snapshot(&node, &json!({"a": 2, "z": 1})).unwrap_err();
        assert!(matches!(err, TreeError::Validation { .. }));
        assert_eq!(node.to_json(), json!({"a": 1}));
        assert_eq!(*writes.borrow(), 0);
        assert!(apply_snapshot(&node, &json!([1])).is_err());
    }

    #[test]
    fn snapshot_is_detached_from_live_state() {
        let f = create_factory(ModelDefinition::new().field("list", json!([1, 2]))).unwrap();
        let node = f.create(None).unwrap();
        let mut snap = get_snapshot(&node);
        snap["list"] = json!([]);
        assert_eq!(node.get("list").unwrap(), json!([1, 2]));
    }

    #[test]
    fn disposed_listener_stops_receiving() {
        let f = create_factory(ModelDefinition::new().field("a", 1)).unwrap();
        let node = f.create(None).unwrap();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let disposer = on_snapshot(&node, move |s| {
            sink.borrow_mut().push(s.clone());
            Ok(())
        });
        node.set("a", 2).unwrap();
        assert!(disposer.dispose());
        node.set("a", 3).unwrap();
        assert_eq!(*seen.borrow(), vec![json!({"a": 2})]);
    }
}
