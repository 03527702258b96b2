mod common;

use common::{board_factory, box_factory, collect_actions, collect_patches, collect_snapshots};
use serde_json::json;
use state_tree::{
    apply_action, apply_patch, create_factory, get_path, on_patch, resolve, ActionRecord,
    ModelDefinition, Patch, TreeError,
};

#[test]
fn defaults_nest_through_child_factories() {
    let doc = board_factory().create(None).unwrap();
    assert_eq!(
        doc.to_json(),
        json!({"title": "untitled", "size": {"width": 0, "height": 0}, "selection": null})
    );
    assert_eq!(
        doc.to_string(),
        "Board{\"title\":\"untitled\",\"size\":{\"width\":0,\"height\":0},\"selection\":null}"
    );
    assert_eq!(get_path(&doc.child("size").unwrap()), "/size");
}

#[test]
fn child_write_reaches_every_ancestor_with_relative_paths() {
    let doc = board_factory().create(None).unwrap();
    let size = doc.child("size").unwrap();
    let at_root = collect_patches(&doc);
    let at_child = collect_patches(&size);
    let root_snapshots = collect_snapshots(&doc);

    size.set("width", 7).unwrap();

    assert_eq!(at_child.take(), vec![Patch::replace("/width", 7)]);
    assert_eq!(at_root.take(), vec![Patch::replace("/size/width", 7)]);
    assert_eq!(
        root_snapshots.take(),
        vec![json!({"title": "untitled", "size": {"width": 7, "height": 0}, "selection": null})]
    );
}

#[test]
fn one_action_many_patches() {
    let doc = board_factory()
        .create(Some(&json!({"title": "plan", "selection": {"width": 1}})))
        .unwrap();
    let patches = collect_patches(&doc);
    let actions = collect_actions(&doc);

    doc.call("reset", &[]).unwrap();

    assert_eq!(
        actions.take(),
        vec![ActionRecord::new("reset", "", vec![])],
        "nested rename/resize calls are not recorded"
    );
    assert_eq!(
        patches.take(),
        vec![
            Patch::replace("/title", "untitled"),
            Patch::replace("/size/width", 0),
            Patch::replace("/size/height", 0),
            Patch::remove("/selection"),
        ]
    );
    assert_eq!(doc.get("selection").unwrap(), json!(null));
}

#[test]
fn action_path_locates_the_called_node() {
    let counter = create_factory(
        ModelDefinition::new()
            .named("Counter")
            .field("count", 0)
            .action("inc", |node, _| {
                let count = node.get("count")?.as_i64().unwrap_or(0);
                node.set("count", count + 1)
            }),
    )
    .unwrap();
    let app = create_factory(ModelDefinition::new().named("App").model("counter", &counter)).unwrap();
    let doc = app.create(None).unwrap();
    let actions = collect_actions(&doc);

    doc.child("counter").unwrap().call("inc", &[]).unwrap();
    let recorded = actions.take();
    assert_eq!(recorded, vec![ActionRecord::new("inc", "/counter", vec![])]);

    let replica = app.create(None).unwrap();
    apply_action(&replica, &recorded[0]).unwrap();
    assert_eq!(replica.to_json(), json!({"counter": {"count": 1}}));
}

#[test]
fn assigning_a_snapshot_to_a_model_field_builds_a_node() {
    let doc = board_factory().create(None).unwrap();
    doc.set("selection", json!({"height": 4})).unwrap();
    let selection = resolve(&doc, "/selection").unwrap();
    assert_eq!(selection.type_name(), "Size");
    assert_eq!(selection.to_json(), json!({"width": 0, "height": 4}));

    let err = doc.set("size", json!({"depth": 1})).unwrap_err();
    assert!(matches!(err, TreeError::Validation { .. }));
    assert_eq!(doc.get("size").unwrap(), json!({"width": 0, "height": 0}));
}

#[test]
fn adopting_a_foreign_node_moves_it() {
    let doc = board_factory().create(None).unwrap();
    let other = board_factory()
        .create(Some(&json!({"selection": {"width": 2, "height": 2}})))
        .unwrap();
    let from_other = collect_patches(&other);
    let to_doc = collect_patches(&doc);

    let moving = other.child("selection").unwrap();
    doc.set("selection", &moving).unwrap();

    assert_eq!(from_other.take(), vec![Patch::remove("/selection")]);
    assert_eq!(
        to_doc.take(),
        vec![Patch::replace("/selection", json!({"width": 2, "height": 2}))]
    );
    assert!(moving.root().ptr_eq(&doc));
    assert_eq!(other.get("selection").unwrap(), json!(null));
}

#[test]
fn patch_into_required_child_cannot_remove_it() {
    let doc = board_factory().create(None).unwrap();
    let err = apply_patch(&doc, &Patch::remove("/size")).unwrap_err();
    assert!(matches!(err, TreeError::Required { .. }));
    apply_patch(&doc, &Patch::remove("/size/width")).unwrap();
    assert_eq!(doc.get("size").unwrap(), json!({"width": null, "height": 0}));
}

#[test]
fn union_field_picks_first_accepting_member() {
    let boxes = box_factory().named("Box");
    let circle = create_factory(ModelDefinition::new().named("Circle").field("radius", 1)).unwrap();
    let shape_holder = create_factory(ModelDefinition::new().union("shape", &[&boxes, &circle])).unwrap();

    let doc = shape_holder.create(None).unwrap();
    assert_eq!(doc.child("shape").unwrap().type_name(), "Box");

    doc.set("shape", json!({"radius": 3})).unwrap();
    assert_eq!(doc.child("shape").unwrap().type_name(), "Circle");

    let err = doc.set("shape", json!({"side": 3})).unwrap_err();
    match err {
        TreeError::Validation { type_name, .. } => assert_eq!(type_name, "Box | Circle"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn patch_listener_on_detached_node_stops_hearing_the_tree() {
    let doc = board_factory().create(None).unwrap();
    let old_size = doc.child("size").unwrap();
    let heard = collect_patches(&old_size);
    let _root = on_patch(&doc, |_| Ok(()));

    doc.set("size", json!({"width": 5})).unwrap();
    doc.child("size").unwrap().set("height", 5).unwrap();
    assert!(heard.take().is_empty());

    old_size.set("width", 1).unwrap();
    assert_eq!(heard.take(), vec![Patch::replace("/width", 1)]);
    assert_eq!(doc.get("size").unwrap(), json!({"width": 5, "height": 5}));
}
