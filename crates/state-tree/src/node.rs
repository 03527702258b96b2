//! Live nodes and the mutation interceptor.
//!
//! Every write to a declared field goes through [`Node::write`], the single
//! commit routine. It validates the value, commits it, then notifies patch
//! listeners and snapshot listeners of the node and of each ancestor, in that
//! order, before returning. Action calls go through [`Node::call`], which
//! records the call for action listeners only when it is the outermost action
//! running in the tree.
//!
//! Children are owned through `Rc`; the link back to the parent is a `Weak`
//! used only to compute paths and find the root.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use state_tree_pointer::{format_path, join_segment};
use tracing::trace;

use crate::action::ActionRecord;
use crate::error::TreeError;
use crate::factory::Factory;
use crate::patch::{Patch, PatchOp};
use crate::types::FieldType;

pub(crate) type Listener<T> = Rc<dyn Fn(&T) -> Result<(), TreeError>>;

// ── Slots ───────────────────────────────────────────────────────────────────

/// Value held by a field.
pub(crate) enum Slot {
    Value(Value),
    Child(Node),
}

impl Slot {
    fn to_value(&self) -> Value {
        match self {
            Slot::Value(v) => v.clone(),
            Slot::Child(node) => node.snapshot(),
        }
    }
}

/// Builds the slot for `value` under field type `ty`, creating a child node
/// when the type holds models.
pub(crate) fn build_slot(ty: &FieldType, value: &Value) -> Result<Slot, TreeError> {
    if let Some(factory) = ty.select(value) {
        return Ok(Slot::Child(factory.create(Some(value))?));
    }
    if ty.is(value) {
        return Ok(Slot::Value(value.clone()));
    }
    Err(TreeError::Validation {
        snapshot: value.clone(),
        type_name: ty.name(),
        expected: ty.describe(),
    })
}

/// Value accepted by [`Node::set`].
#[derive(Debug, Clone)]
pub enum Assign {
    /// A JSON value; snapshots of model fields become new child nodes.
    Value(Value),
    /// An existing node, adopted as the child (moving it if attached).
    Node(Node),
}

impl From<Value> for Assign {
    fn from(v: Value) -> Self {
        Assign::Value(v)
    }
}

impl From<&Value> for Assign {
    fn from(v: &Value) -> Self {
        Assign::Value(v.clone())
    }
}

impl From<&str> for Assign {
    fn from(v: &str) -> Self {
        Assign::Value(Value::from(v))
    }
}

impl From<String> for Assign {
    fn from(v: String) -> Self {
        Assign::Value(Value::from(v))
    }
}

impl From<bool> for Assign {
    fn from(v: bool) -> Self {
        Assign::Value(Value::from(v))
    }
}

impl From<i64> for Assign {
    fn from(v: i64) -> Self {
        Assign::Value(Value::from(v))
    }
}

impl From<i32> for Assign {
    fn from(v: i32) -> Self {
        Assign::Value(Value::from(v))
    }
}

impl From<f64> for Assign {
    fn from(v: f64) -> Self {
        Assign::Value(Value::from(v))
    }
}

impl From<Node> for Assign {
    fn from(node: Node) -> Self {
        Assign::Node(node)
    }
}

impl From<&Node> for Assign {
    fn from(node: &Node) -> Self {
        Assign::Node(node.clone())
    }
}

// ── Subscribers ─────────────────────────────────────────────────────────────

struct Subscribers<T> {
    entries: Vec<(u64, Listener<T>)>,
}

impl<T> Default for Subscribers<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T> Subscribers<T> {
    fn snapshot(&self) -> Vec<Listener<T>> {
        self.entries.iter().map(|(_, l)| l.clone()).collect()
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Snapshot,
    Patch,
    Action,
}

struct ParentLink {
    node: Weak<RefCell<NodeData>>,
    field: String,
}

pub(crate) struct NodeData {
    factory: Factory,
    parent: Option<ParentLink>,
    slots: IndexMap<String, Slot>,
    next_listener: u64,
    snapshot_listeners: Subscribers<Value>,
    patch_listeners: Subscribers<Patch>,
    action_listeners: Subscribers<ActionRecord>,
    action_depth: usize,
}

/// Handle returned by the `on_*` subscriptions.
///
/// Dropping it keeps the listener registered; call [`Disposer::dispose`] to
/// unsubscribe.
#[derive(Debug)]
pub struct Disposer {
    node: Weak<RefCell<NodeData>>,
    channel: Channel,
    id: u64,
}

impl Disposer {
    /// Unsubscribes. Returns `false` if the listener or its node is gone.
    pub fn dispose(self) -> bool {
        let Some(data) = self.node.upgrade() else {
            return false;
        };
        let mut data = data.borrow_mut();
        match self.channel {
            Channel::Snapshot => data.snapshot_listeners.remove(self.id),
            Channel::Patch => data.patch_listeners.remove(self.id),
            Channel::Action => data.action_listeners.remove(self.id),
        }
    }
}

impl fmt::Debug for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeData")
            .field("type", &self.factory.name())
            .finish_non_exhaustive()
    }
}

// ── Node handle ─────────────────────────────────────────────────────────────

/// A live model instance.
///
/// `Node` is a shared handle: clones refer to the same instance and
/// [`Node::ptr_eq`] compares identity. Field state is only reachable through
/// [`Node::get`], [`Node::set`], [`Node::remove`] and [`Node::call`].
#[derive(Clone)]
pub struct Node(Rc<RefCell<NodeData>>);

/// One entry per node from the written node up to the root, with the path
/// from that node down to the written node.
type Lineage = Vec<(Node, Vec<String>)>;

impl Node {
    pub(crate) fn new(factory: Factory, slots: IndexMap<String, Slot>) -> Node {
        let node = Node(Rc::new(RefCell::new(NodeData {
            factory,
            parent: None,
            slots,
            next_listener: 0,
            snapshot_listeners: Subscribers::default(),
            patch_listeners: Subscribers::default(),
            action_listeners: Subscribers::default(),
            action_depth: 0,
        })));
        for (field, slot) in node.0.borrow().slots.iter() {
            if let Slot::Child(child) = slot {
                child.set_parent(Some(node.link(field)));
            }
        }
        node
    }

    fn link(&self, field: &str) -> ParentLink {
        ParentLink {
            node: Rc::downgrade(&self.0),
            field: field.to_string(),
        }
    }

    fn set_parent(&self, link: Option<ParentLink>) {
        self.0.borrow_mut().parent = link;
    }

    pub fn factory(&self) -> Factory {
        self.0.borrow().factory.clone()
    }

    pub fn type_name(&self) -> String {
        self.0.borrow().factory.name().to_string()
    }

    /// Identity comparison.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<Node> {
        self.parent_link().map(|(parent, _)| parent)
    }

    pub(crate) fn parent_link(&self) -> Option<(Node, String)> {
        let data = self.0.borrow();
        let link = data.parent.as_ref()?;
        link.node
            .upgrade()
            .map(|parent| (Node(parent), link.field.clone()))
    }

    pub fn root(&self) -> Node {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Field names from the root down to this node.
    pub fn path_segments(&self) -> Vec<String> {
        let mut segments = Vec::new();
        let mut current = self.clone();
        while let Some((parent, field)) = current.parent_link() {
            segments.push(field);
            current = parent;
        }
        segments.reverse();
        segments
    }

    /// Escaped path from the root; `""` for the root itself.
    pub fn path(&self) -> String {
        format_path(&self.path_segments())
    }

    fn lineage(&self) -> Lineage {
        let mut out = vec![(self.clone(), Vec::new())];
        let mut upward: Vec<String> = Vec::new();
        let mut current = self.clone();
        while let Some((parent, field)) = current.parent_link() {
            upward.push(field);
            out.push((parent.clone(), upward.iter().rev().cloned().collect()));
            current = parent;
        }
        out
    }

    /// Deep serialization of the declared fields.
    pub fn snapshot(&self) -> Value {
        let data = self.0.borrow();
        let mut map = Map::with_capacity(data.slots.len());
        for (field, slot) in &data.slots {
            map.insert(field.clone(), slot.to_value());
        }
        Value::Object(map)
    }

    /// Alias of [`Node::snapshot`].
    pub fn to_json(&self) -> Value {
        self.snapshot()
    }

    /// Reads a field or computed property. Child nodes are returned as
    /// snapshots.
    pub fn get(&self, field: &str) -> Result<Value, TreeError> {
        let getter = {
            let data = self.0.borrow();
            if let Some(slot) = data.slots.get(field) {
                return Ok(slot.to_value());
            }
            data.factory
                .computed(field)
                .ok_or_else(|| TreeError::UnknownField {
                    field: field.to_string(),
                    type_name: data.factory.name().to_string(),
                })?
        };
        getter(self)
    }

    /// Returns the child node held by `field`.
    pub fn child(&self, field: &str) -> Result<Node, TreeError> {
        let found = {
            let data = self.0.borrow();
            match data.slots.get(field) {
                Some(Slot::Child(child)) => Some(child.clone()),
                Some(Slot::Value(_)) => None,
                None => {
                    return Err(TreeError::UnknownField {
                        field: field.to_string(),
                        type_name: data.factory.name().to_string(),
                    })
                }
            }
        };
        found.ok_or_else(|| {
            TreeError::resolution(&join_segment(&self.path(), field), "field does not hold a node")
        })
    }

    /// Assigns a field through the interceptor.
    pub fn set(&self, field: &str, value: impl Into<Assign>) -> Result<(), TreeError> {
        self.write(field, value.into(), PatchOp::Replace)
    }

    /// Clears a primitive or maybe field to `null`.
    ///
    /// # Errors
    ///
    /// [`TreeError::Required`] for model and union fields.
    pub fn remove(&self, field: &str) -> Result<(), TreeError> {
        let ty = self.field_type(field)?;
        if !ty.is_optional() {
            return Err(TreeError::Required {
                field: field.to_string(),
                type_name: self.type_name(),
            });
        }
        self.write(field, Assign::Value(Value::Null), PatchOp::Remove)
    }

    /// Invokes a declared action with `args`.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnknownAction`] if the action is not declared; otherwise
    /// whatever the action body or a listener returns.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<(), TreeError> {
        let factory = self.factory();
        let body = factory
            .action(name)
            .ok_or_else(|| TreeError::UnknownAction {
                name: name.to_string(),
                type_name: factory.name().to_string(),
            })?;

        let scope = ActionScope::enter(self.root());
        if scope.outermost {
            trace!(type_name = %factory.name(), action = name, "recording action");
            for (ancestor, relative) in self.lineage() {
                let listeners = ancestor.0.borrow().action_listeners.snapshot();
                if listeners.is_empty() {
                    continue;
                }
                let record = ActionRecord {
                    name: name.to_string(),
                    path: format_path(&relative),
                    args: args.to_vec(),
                };
                for listener in listeners {
                    listener(&record)?;
                }
            }
        }
        body(self, args)
    }

    pub(crate) fn field_type(&self, field: &str) -> Result<FieldType, TreeError> {
        let data = self.0.borrow();
        if let Some(decl) = data.factory.field(field) {
            return Ok(decl.ty.clone());
        }
        let type_name = data.factory.name().to_string();
        if data.factory.is_computed(field) {
            Err(TreeError::ReadOnly {
                field: field.to_string(),
                type_name,
            })
        } else {
            Err(TreeError::UnknownField {
                field: field.to_string(),
                type_name,
            })
        }
    }

    /// The commit routine behind every field write.
    pub(crate) fn write(&self, field: &str, value: Assign, op: PatchOp) -> Result<(), TreeError> {
        let ty = self.field_type(field)?;
        let lineage = self.lineage();

        let (slot, moved_from) = match value {
            Assign::Value(value) => (build_slot(&ty, &value)?, None),
            Assign::Node(child) => {
                let moved_from = self.check_adoption(&ty, field, &child)?;
                (Slot::Child(child), moved_from)
            }
        };
        let value = slot.to_value();

        // Detach from the old location and attach here in one step, before
        // anybody is notified.
        let old_lineage = match &moved_from {
            Some((old_parent, old_field)) => {
                let old_lineage = old_parent.lineage();
                old_parent
                    .0
                    .borrow_mut()
                    .slots
                    .insert(old_field.clone(), Slot::Value(Value::Null));
                Some((old_lineage, old_field.clone()))
            }
            None => None,
        };
        if let Slot::Child(child) = &slot {
            child.set_parent(Some(self.link(field)));
        }
        let previous = self.0.borrow_mut().slots.insert(field.to_string(), slot);
        if let Some(Slot::Child(previous)) = previous {
            if !self.holds_child(&previous) {
                previous.set_parent(None);
            }
        }
        trace!(
            type_name = %self.type_name(),
            field,
            op = op.as_str(),
            "committed field"
        );

        if let Some((old_lineage, old_field)) = &old_lineage {
            emit_patches(old_lineage, old_field, PatchOp::Remove, None)?;
        }
        let payload = (op != PatchOp::Remove).then_some(&value);
        emit_patches(&lineage, field, op, payload)?;
        emit_snapshots(&lineage)?;
        if let Some((old_lineage, _)) = &old_lineage {
            let unseen: Lineage = old_lineage
                .iter()
                .filter(|(n, _)| !lineage.iter().any(|(m, _)| m.ptr_eq(n)))
                .cloned()
                .collect();
            emit_snapshots(&unseen)?;
        }
        Ok(())
    }

    fn holds_child(&self, node: &Node) -> bool {
        self.0
            .borrow()
            .slots
            .values()
            .any(|slot| matches!(slot, Slot::Child(c) if c.ptr_eq(node)))
    }

    /// Checks that `child` may become the value of `field`, returning its
    /// current location when it has to be moved.
    fn check_adoption(
        &self,
        ty: &FieldType,
        field: &str,
        child: &Node,
    ) -> Result<Option<(Node, String)>, TreeError> {
        let snapshot = child.snapshot();
        let mismatch = || TreeError::Validation {
            snapshot: snapshot.clone(),
            type_name: ty.name(),
            expected: ty.describe(),
        };
        let Some(factory) = ty.select(&snapshot).filter(|_| ty.is(&snapshot)) else {
            return Err(mismatch());
        };
        // The emitted patch rebuilds the child with `factory`, so a node of
        // any other factory must already be in that factory's normalized form.
        if !factory.same(&child.factory())
            && factory.create(Some(&snapshot))?.snapshot() != snapshot
        {
            return Err(mismatch());
        }

        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.ptr_eq(child) {
                return Err(TreeError::InvalidMove(
                    "a node cannot be moved into its own subtree".into(),
                ));
            }
            current = node.parent();
        }

        let Some((old_parent, old_field)) = child.parent_link() else {
            return Ok(None);
        };
        if old_parent.ptr_eq(self) && old_field == field {
            return Ok(None);
        }
        let old_ty = old_parent.field_type(&old_field)?;
        if !matches!(old_ty, FieldType::Maybe(_)) {
            return Err(TreeError::InvalidMove(format!(
                "'{}' is a required field and cannot give up its node",
                join_segment(&old_parent.path(), &old_field)
            )));
        }
        Ok(Some((old_parent, old_field)))
    }

    fn subscribe<T>(
        &self,
        channel: Channel,
        listener: Listener<T>,
        pick: fn(&mut NodeData) -> &mut Subscribers<T>,
    ) -> Disposer {
        let mut data = self.0.borrow_mut();
        let id = data.next_listener;
        data.next_listener += 1;
        pick(&mut *data).entries.push((id, listener));
        Disposer {
            node: Rc::downgrade(&self.0),
            channel,
            id,
        }
    }

    pub(crate) fn subscribe_snapshots(&self, listener: Listener<Value>) -> Disposer {
        self.subscribe(Channel::Snapshot, listener, |d| &mut d.snapshot_listeners)
    }

    pub(crate) fn subscribe_patches(&self, listener: Listener<Patch>) -> Disposer {
        self.subscribe(Channel::Patch, listener, |d| &mut d.patch_listeners)
    }

    pub(crate) fn subscribe_actions(&self, listener: Listener<ActionRecord>) -> Disposer {
        self.subscribe(Channel::Action, listener, |d| &mut d.action_listeners)
    }
}

// ── Emission ────────────────────────────────────────────────────────────────

fn emit_patches(
    lineage: &Lineage,
    field: &str,
    op: PatchOp,
    value: Option<&Value>,
) -> Result<(), TreeError> {
    for (ancestor, relative) in lineage {
        let listeners = ancestor.0.borrow().patch_listeners.snapshot();
        if listeners.is_empty() {
            continue;
        }
        let path = join_segment(&format_path(relative), field);
        let patch = Patch::build(op, path, value);
        trace!(path = patch.path(), op = op.as_str(), "emitting patch");
        for listener in listeners {
            listener(&patch)?;
        }
    }
    Ok(())
}

fn emit_snapshots(lineage: &Lineage) -> Result<(), TreeError> {
    for (ancestor, _) in lineage {
        let listeners = ancestor.0.borrow().snapshot_listeners.snapshot();
        if listeners.is_empty() {
            continue;
        }
        let snapshot = ancestor.snapshot();
        for listener in listeners {
            listener(&snapshot)?;
        }
    }
    Ok(())
}

// ── Action nesting ──────────────────────────────────────────────────────────

/// Tracks action nesting on the root of the tree for the duration of a call.
struct ActionScope {
    root: Node,
    outermost: bool,
}

impl ActionScope {
    fn enter(root: Node) -> Self {
        let outermost = {
            let mut data = root.0.borrow_mut();
            data.action_depth += 1;
            data.action_depth == 1
        };
        Self { root, outermost }
    }
}

impl Drop for ActionScope {
    fn drop(&mut self) {
        let mut data = self.root.0.borrow_mut();
        data.action_depth = data.action_depth.saturating_sub(1);
    }
}

// ── Formatting ──────────────────────────────────────────────────────────────

impl fmt::Display for Node {
    /// `<TypeName><compact snapshot>`, e.g. `AnonymousModel{"to":"world"}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_name(), self.snapshot())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("type", &self.type_name())
            .field("path", &self.path())
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
