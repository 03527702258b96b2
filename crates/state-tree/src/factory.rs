//! Factories: immutable constructors bound to a model type descriptor.

use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::debug;

use crate::definition::{ActionFn, ComputedFn, Member, ModelDefinition, ANONYMOUS_MODEL};
use crate::error::TreeError;
use crate::node::{build_slot, Node};
use crate::types::{FieldDecl, FieldType, ModelType};

struct FactoryInner {
    ty: ModelType,
    computed: IndexMap<String, ComputedFn>,
    actions: IndexMap<String, ActionFn>,
}

/// Constructor of [`Node`]s sharing one declared shape.
///
/// Cloning a factory is cheap; clones share the same definition.
#[derive(Clone)]
pub struct Factory(Rc<FactoryInner>);

/// Builds a factory from a definition.
///
/// # Errors
///
/// [`TreeError::Definition`] when the definition declares no fields, declares
/// a name twice, gives a primitive field an object default, or declares a
/// union without members.
pub fn create_factory(definition: ModelDefinition) -> Result<Factory, TreeError> {
    let name = definition
        .name
        .unwrap_or_else(|| ANONYMOUS_MODEL.to_string());
    let mut seen = HashSet::new();
    let mut fields = IndexMap::new();
    let mut computed = IndexMap::new();
    let mut actions = IndexMap::new();

    for (member_name, member) in definition.members {
        if !seen.insert(member_name.clone()) {
            return Err(TreeError::Definition(format!(
                "'{member_name}' is declared more than once in {name}"
            )));
        }
        match member {
            Member::Field { ty, default } => {
                let default = match default {
                    Some(value) if ty.is(&value) => value,
                    Some(value) => {
                        return Err(TreeError::Definition(format!(
                            "default {value} of field '{member_name}' is not a valid {}",
                            ty.describe()
                        )))
                    }
                    None => natural_default(&member_name, &ty)?,
                };
                fields.insert(member_name, FieldDecl { ty, default });
            }
            Member::Computed(getter) => {
                computed.insert(member_name, getter);
            }
            Member::Action(body) => {
                actions.insert(member_name, body);
            }
        }
    }

    if fields.is_empty() {
        return Err(TreeError::Definition(format!("{name} declares no fields")));
    }

    debug!(
        type_name = %name,
        fields = fields.len(),
        computed = computed.len(),
        actions = actions.len(),
        "created factory"
    );
    Ok(Factory(Rc::new(FactoryInner {
        ty: ModelType { name, fields },
        computed,
        actions,
    })))
}

fn natural_default(field: &str, ty: &FieldType) -> Result<Value, TreeError> {
    match ty {
        FieldType::Primitive | FieldType::Maybe(_) => Ok(Value::Null),
        FieldType::Model(factory) => Ok(factory.default_snapshot()),
        FieldType::Union(members) => members
            .first()
            .map(Factory::default_snapshot)
            .ok_or_else(|| TreeError::Definition(format!("union field '{field}' has no members"))),
    }
}

/// Merges several factories into one.
///
/// Fields, computed properties and actions are merged in argument order; a
/// later factory overrides an earlier one on a name collision, whatever the
/// member kind. The result is anonymous.
///
/// # Errors
///
/// [`TreeError::Definition`] when `factories` is empty.
pub fn compose_factory(factories: &[&Factory]) -> Result<Factory, TreeError> {
    if factories.is_empty() {
        return Err(TreeError::Definition("nothing to compose".into()));
    }
    let mut fields: IndexMap<String, FieldDecl> = IndexMap::new();
    let mut computed: IndexMap<String, ComputedFn> = IndexMap::new();
    let mut actions: IndexMap<String, ActionFn> = IndexMap::new();

    for factory in factories {
        let inner = &factory.0;
        for (name, decl) in &inner.ty.fields {
            computed.shift_remove(name);
            actions.shift_remove(name);
            fields.insert(name.clone(), decl.clone());
        }
        for (name, getter) in &inner.computed {
            fields.shift_remove(name);
            actions.shift_remove(name);
            computed.insert(name.clone(), getter.clone());
        }
        for (name, body) in &inner.actions {
            fields.shift_remove(name);
            computed.shift_remove(name);
            actions.insert(name.clone(), body.clone());
        }
    }

    if fields.is_empty() {
        return Err(TreeError::Definition(
            "composition leaves no fields".into(),
        ));
    }

    debug!(
        composed = factories.len(),
        fields = fields.len(),
        "composed factory"
    );
    Ok(Factory(Rc::new(FactoryInner {
        ty: ModelType {
            name: ANONYMOUS_MODEL.to_string(),
            fields,
        },
        computed,
        actions,
    })))
}

impl Factory {
    /// Creates a node from an optional snapshot. Omitted fields take their
    /// defaults.
    ///
    /// # Errors
    ///
    /// [`TreeError::Validation`] if the snapshot is not a structural subset of
    /// this factory's type, including snapshots naming computed properties.
    pub fn create(&self, snapshot: Option<&Value>) -> Result<Node, TreeError> {
        let empty = Value::Object(Map::new());
        let snapshot = snapshot.unwrap_or(&empty);
        if !self.is(snapshot) {
            return Err(self.validation_error(snapshot));
        }
        let mut slots = IndexMap::with_capacity(self.0.ty.fields.len());
        for (name, decl) in &self.0.ty.fields {
            let value = snapshot.get(name).unwrap_or(&decl.default);
            slots.insert(name.clone(), build_slot(&decl.ty, value)?);
        }
        debug!(type_name = %self.name(), "created node");
        Ok(Node::new(self.clone(), slots))
    }

    /// Structural membership test; see [`ModelType::is`].
    pub fn is(&self, value: &Value) -> bool {
        self.0.ty.is(value)
    }

    /// Whether a live node has this factory's shape.
    pub fn is_instance(&self, node: &Node) -> bool {
        self.same(&node.factory()) || self.is(&node.snapshot())
    }

    /// Identity comparison: `true` only for clones of one factory.
    pub fn same(&self, other: &Factory) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn name(&self) -> &str {
        &self.0.ty.name
    }

    /// Returns a copy of this factory under another type name.
    pub fn named(&self, name: impl Into<String>) -> Factory {
        let inner = &self.0;
        Factory(Rc::new(FactoryInner {
            ty: ModelType {
                name: name.into(),
                fields: inner.ty.fields.clone(),
            },
            computed: inner.computed.clone(),
            actions: inner.actions.clone(),
        }))
    }

    pub fn model_type(&self) -> &ModelType {
        &self.0.ty
    }

    pub fn describe(&self) -> String {
        self.0.ty.describe()
    }

    pub fn default_snapshot(&self) -> Value {
        self.0.ty.default_snapshot()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.0.ty.fields.get(name)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.0.ty.fields.keys().map(String::as_str)
    }

    pub fn computed_names(&self) -> impl Iterator<Item = &str> {
        self.0.computed.keys().map(String::as_str)
    }

    pub fn action_names(&self) -> impl Iterator<Item = &str> {
        self.0.actions.keys().map(String::as_str)
    }

    pub fn has_action(&self, name: &str) -> bool {
        self.0.actions.contains_key(name)
    }

    pub fn is_computed(&self, name: &str) -> bool {
        self.0.computed.contains_key(name)
    }

    pub(crate) fn action(&self, name: &str) -> Option<ActionFn> {
        self.0.actions.get(name).cloned()
    }

    pub(crate) fn computed(&self, name: &str) -> Option<ComputedFn> {
        self.0.computed.get(name).cloned()
    }

    pub(crate) fn validation_error(&self, snapshot: &Value) -> TreeError {
        TreeError::Validation {
            snapshot: snapshot.clone(),
            type_name: self.name().to_string(),
            expected: self.describe(),
        }
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Factory")
            .field("name", &self.name())
            .field("shape", &self.describe())
            .field("computed", &self.0.computed.keys().collect::<Vec<_>>())
            .field("actions", &self.0.actions.keys().collect::<Vec<_>>())
            .finish()
    }
}
