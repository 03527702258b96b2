//! Type descriptors: the declared shape of model fields.
//!
//! A model's shape is a table of [`FieldType`]s. Checking a snapshot against
//! it is purely structural: an object matches when every key it carries is a
//! declared field and every carried value matches that field's type. Missing
//! keys are fine, they fall back to the field default.

use indexmap::IndexMap;
use serde_json::Value;

use crate::factory::Factory;

/// Declared type of a single model field.
#[derive(Debug, Clone)]
pub enum FieldType {
    /// Any non-object JSON value, stored and replaced as a whole.
    Primitive,
    /// A required child node built by the given factory.
    Model(Factory),
    /// A child node built by the given factory, or `null`.
    Maybe(Factory),
    /// A child node built by the first member factory accepting the snapshot.
    Union(Vec<Factory>),
}

impl FieldType {
    pub fn kind(&self) -> &'static str {
        match self {
            FieldType::Primitive => "primitive",
            FieldType::Model(_) => "model",
            FieldType::Maybe(_) => "maybe",
            FieldType::Union(_) => "union",
        }
    }

    /// Structural membership test for a field value.
    pub fn is(&self, value: &Value) -> bool {
        match self {
            FieldType::Primitive => !value.is_object(),
            FieldType::Model(factory) => factory.is(value),
            FieldType::Maybe(factory) => value.is_null() || factory.is(value),
            FieldType::Union(members) => members.iter().any(|m| m.is(value)),
        }
    }

    /// Human readable shape, used in validation errors.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Primitive => "primitive".to_string(),
            FieldType::Model(factory) => factory.describe(),
            FieldType::Maybe(factory) => format!("{} | null", factory.describe()),
            FieldType::Union(members) => members
                .iter()
                .map(Factory::describe)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// Short name of the type, used as `type_name` in validation errors.
    pub fn name(&self) -> String {
        match self {
            FieldType::Primitive => "primitive".to_string(),
            FieldType::Model(factory) => factory.name().to_string(),
            FieldType::Maybe(factory) => format!("{} | null", factory.name()),
            FieldType::Union(members) => members
                .iter()
                .map(|m| m.name().to_string())
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }

    /// Factory that should instantiate `value`, if this field holds nodes.
    ///
    /// Returns `None` for primitives and for the `null` of a maybe field.
    pub(crate) fn select(&self, value: &Value) -> Option<&Factory> {
        match self {
            FieldType::Primitive => None,
            FieldType::Model(factory) => Some(factory),
            FieldType::Maybe(factory) => (!value.is_null()).then_some(factory),
            FieldType::Union(members) => members.iter().find(|m| m.is(value)),
        }
    }

    /// Whether a `remove` may clear this field.
    pub fn is_optional(&self) -> bool {
        matches!(self, FieldType::Primitive | FieldType::Maybe(_))
    }
}

/// A declared field: its type plus the value used when a snapshot omits it.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub ty: FieldType,
    pub default: Value,
}

/// Type descriptor of a model: its name and its declared fields in order.
///
/// Computed properties and actions are not part of the descriptor.
#[derive(Debug, Clone)]
pub struct ModelType {
    pub name: String,
    pub fields: IndexMap<String, FieldDecl>,
}

impl ModelType {
    /// Structural subset check. Arrays and scalars never match.
    pub fn is(&self, value: &Value) -> bool {
        let Some(map) = value.as_object() else {
            return false;
        };
        map.iter().all(|(key, val)| match self.fields.get(key) {
            Some(decl) => decl.ty.is(val),
            None => false,
        })
    }

    /// Renders the shape as `{ a: primitive; b: { c: primitive } }`.
    pub fn describe(&self) -> String {
        let body = self
            .fields
            .iter()
            .map(|(name, decl)| format!("{name}: {}", decl.ty.describe()))
            .collect::<Vec<_>>()
            .join("; ");
        format!("{{ {body} }}")
    }

    /// The snapshot of a freshly created node: every field at its default.
    pub fn default_snapshot(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, decl)| (name.clone(), decl.default.clone()))
                .collect(),
        )
    }
}
