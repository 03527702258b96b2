#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::{json, Value};
use state_tree::{
    create_factory, on_action, on_patch, on_snapshot, ActionRecord, Disposer, Factory,
    ModelDefinition, Node, Patch,
};

/// `{to: "world"}` with a `setTo(to)` action.
pub fn greeting_factory() -> Factory {
    create_factory(
        ModelDefinition::new()
            .field("to", "world")
            .action("setTo", |node, args| {
                node.set("to", args.first().cloned().unwrap_or(Value::Null))
            }),
    )
    .expect("greeting factory")
}

/// `{width: 100, height: 200}` with a computed `area`.
pub fn area_factory() -> Factory {
    create_factory(
        ModelDefinition::new()
            .field("width", 100)
            .field("height", 200)
            .computed("area", |node| {
                let width = node.get("width")?.as_f64().unwrap_or(0.0);
                let height = node.get("height")?.as_f64().unwrap_or(0.0);
                Ok(json!(width * height))
            }),
    )
    .expect("area factory")
}

pub fn box_factory() -> Factory {
    create_factory(ModelDefinition::new().field("width", 0).field("height", 0))
        .expect("box factory")
}

pub fn color_factory() -> Factory {
    create_factory(ModelDefinition::new().field("color", "#FFFFFF")).expect("color factory")
}

/// A small two-level document: a titled board holding a required `size` box
/// and an optional `selection` box, with actions that touch both.
pub fn board_factory() -> Factory {
    let size = box_factory().named("Size");
    create_factory(
        ModelDefinition::new()
            .named("Board")
            .field("title", "untitled")
            .model("size", &size)
            .maybe("selection", &size)
            .action("rename", |node, args| {
                node.set("title", args.first().cloned().unwrap_or(Value::Null))
            })
            .action("resize", |node, args| {
                let size = node.child("size")?;
                size.set("width", args.first().cloned().unwrap_or(json!(0)))?;
                size.set("height", args.get(1).cloned().unwrap_or(json!(0)))
            })
            .action("select", |node, args| {
                node.set("selection", args.first().cloned().unwrap_or(Value::Null))
            })
            .action("reset", |node, _| {
                node.call("rename", &[json!("untitled")])?;
                node.call("resize", &[json!(0), json!(0)])?;
                node.remove("selection")
            }),
    )
    .expect("board factory")
}

/// Everything a listener saw, in delivery order.
pub struct Collected<T> {
    pub items: Rc<RefCell<Vec<T>>>,
    pub disposer: Disposer,
}

impl<T: Clone> Collected<T> {
    pub fn take(&self) -> Vec<T> {
        self.items.borrow_mut().drain(..).collect()
    }
}

pub fn collect_patches(node: &Node) -> Collected<Patch> {
    let items = Rc::new(RefCell::new(Vec::new()));
    let sink = items.clone();
    let disposer = on_patch(node, move |p| {
        sink.borrow_mut().push(p.clone());
        Ok(())
    });
    Collected { items, disposer }
}

pub fn collect_snapshots(node: &Node) -> Collected<Value> {
    let items = Rc::new(RefCell::new(Vec::new()));
    let sink = items.clone();
    let disposer = on_snapshot(node, move |s| {
        sink.borrow_mut().push(s.clone());
        Ok(())
    });
    Collected { items, disposer }
}

pub fn collect_actions(node: &Node) -> Collected<ActionRecord> {
    let items = Rc::new(RefCell::new(Vec::new()));
    let sink = items.clone();
    let disposer = on_action(node, move |a| {
        sink.borrow_mut().push(a.clone());
        Ok(())
    });
    Collected { items, disposer }
}
