mod common;

use common::{
    area_factory, box_factory, collect_actions, collect_patches, collect_snapshots,
    color_factory, greeting_factory,
};
use serde_json::json;
use state_tree::{
    apply_action, apply_actions, apply_patch, apply_patches, apply_snapshot, compose_factory,
    get_path, get_snapshot, ActionRecord, Patch, TreeError,
};

#[test]
fn creates_from_defaults_and_renders() {
    let factory = greeting_factory();
    let doc = factory.create(None).unwrap();
    assert_eq!(get_snapshot(&doc), json!({"to": "world"}));
    assert_eq!(doc.to_string(), "AnonymousModel{\"to\":\"world\"}");
    assert_eq!(get_path(&doc), "");
}

#[test]
fn restores_state_from_snapshot() {
    let doc = greeting_factory()
        .create(Some(&json!({"to": "universe"})))
        .unwrap();
    assert_eq!(doc.to_json(), json!({"to": "universe"}));
}

#[test]
fn emits_one_snapshot_per_write() {
    let doc = greeting_factory().create(None).unwrap();
    let snapshots = collect_snapshots(&doc);
    doc.set("to", "universe").unwrap();
    assert_eq!(snapshots.take(), vec![json!({"to": "universe"})]);
}

#[test]
fn applies_snapshot() {
    let doc = greeting_factory().create(None).unwrap();
    apply_snapshot(&doc, &json!({"to": "universe"})).unwrap();
    assert_eq!(doc.to_json(), json!({"to": "universe"}));
}

#[test]
fn emits_replace_patch() {
    let doc = greeting_factory().create(None).unwrap();
    let patches = collect_patches(&doc);
    doc.set("to", "universe").unwrap();
    let seen = patches.take();
    assert_eq!(seen, vec![Patch::replace("/to", "universe")]);
    assert_eq!(
        seen[0].to_json(),
        json!({"op": "replace", "path": "/to", "value": "universe"})
    );
}

#[test]
fn applies_patch_and_patch_sequence() {
    let doc = greeting_factory().create(None).unwrap();
    apply_patch(&doc, &Patch::replace("/to", "universe")).unwrap();
    assert_eq!(doc.to_json(), json!({"to": "universe"}));

    let doc = greeting_factory().create(None).unwrap();
    apply_patches(
        &doc,
        &[Patch::replace("/to", "mars"), Patch::replace("/to", "universe")],
    )
    .unwrap();
    assert_eq!(doc.to_json(), json!({"to": "universe"}));
}

#[test]
fn action_call_emits_patch_snapshot_and_record() {
    let doc = greeting_factory().create(None).unwrap();
    let patches = collect_patches(&doc);
    let snapshots = collect_snapshots(&doc);
    let actions = collect_actions(&doc);

    doc.call("setTo", &[json!("universe")]).unwrap();

    assert_eq!(doc.to_json(), json!({"to": "universe"}));
    assert_eq!(patches.take(), vec![Patch::replace("/to", "universe")]);
    assert_eq!(snapshots.take(), vec![json!({"to": "universe"})]);
    let actions = actions.take();
    assert_eq!(
        actions,
        vec![ActionRecord::new("setTo", "", vec![json!("universe")])]
    );
    assert_eq!(
        actions[0].to_json(),
        json!({"name": "setTo", "path": "", "args": ["universe"]})
    );
}

#[test]
fn applies_action_records() {
    let doc = greeting_factory().create(None).unwrap();
    apply_action(&doc, &ActionRecord::new("setTo", "", vec![json!("universe")])).unwrap();
    assert_eq!(doc.to_json(), json!({"to": "universe"}));

    let doc = greeting_factory().create(None).unwrap();
    apply_actions(
        &doc,
        &[
            ActionRecord::new("setTo", "", vec![json!("mars")]),
            ActionRecord::new("setTo", "", vec![json!("universe")]),
        ],
    )
    .unwrap();
    assert_eq!(doc.to_json(), json!({"to": "universe"}));
}

#[test]
fn computed_property_follows_fields() {
    let doc = area_factory().create(None).unwrap();
    doc.set("width", 3).unwrap();
    doc.set("height", 2).unwrap();
    assert_eq!(doc.get("area").unwrap(), json!(6.0));
    assert_eq!(doc.to_json(), json!({"width": 3, "height": 2}));
}

#[test]
fn snapshot_naming_computed_property_is_rejected() {
    let err = area_factory()
        .create(Some(&json!({"area": 3})))
        .unwrap_err();
    assert!(matches!(err, TreeError::Validation { .. }));
    assert_eq!(
        err.to_string(),
        "[state-tree] Snapshot {\"area\":3} is not assignable to type AnonymousModel. \
         Expected { width: primitive; height: primitive } instead."
    );
}

#[test]
fn composes_factories_in_order() {
    let composed = compose_factory(&[&box_factory(), &color_factory()]).unwrap();
    assert_eq!(
        composed.create(None).unwrap().to_json(),
        json!({"width": 0, "height": 0, "color": "#FFFFFF"})
    );
    assert_eq!(composed.name(), "AnonymousModel");
}

#[test]
fn later_factory_wins_on_collision() {
    let wide = box_factory();
    let tall = state_tree::create_factory(
        state_tree::ModelDefinition::new()
            .field("height", 10)
            .action("width", |_, _| Ok(())),
    )
    .unwrap();
    let composed = compose_factory(&[&wide, &tall]).unwrap();
    assert_eq!(composed.create(None).unwrap().to_json(), json!({"height": 10}));
    assert!(composed.has_action("width"));
}

#[test]
fn structural_type_checks() {
    let factory = greeting_factory();
    let doc = factory.create(None).unwrap();
    assert!(factory.is_instance(&doc));
    assert!(factory.is(&doc.to_json()));
    assert!(!factory.is(&json!([])));
    assert!(factory.is(&json!({})));
    assert!(factory.is(&json!({"to": "mars"})));
    assert!(!factory.is(&json!({"wrongKey": true})));
    assert!(!box_factory().is_instance(&doc));
}

#[test]
fn unknown_action_is_rejected() {
    let doc = greeting_factory().create(None).unwrap();
    let err = apply_action(&doc, &ActionRecord::new("setFrom", "", vec![])).unwrap_err();
    assert_eq!(
        err,
        TreeError::UnknownAction {
            name: "setFrom".into(),
            type_name: "AnonymousModel".into(),
        }
    );
    assert!(matches!(
        doc.call("setFrom", &[]),
        Err(TreeError::UnknownAction { .. })
    ));
}
