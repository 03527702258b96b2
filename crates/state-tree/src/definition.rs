//! Model definitions: the builder a [`Factory`](crate::Factory) is made from.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::error::TreeError;
use crate::factory::Factory;
use crate::node::Node;
use crate::types::FieldType;

/// Name given to factories that were never named.
pub const ANONYMOUS_MODEL: &str = "AnonymousModel";

/// Body of an action. Receives the node it was invoked on and the call
/// arguments.
pub type ActionFn = Rc<dyn Fn(&Node, &[Value]) -> Result<(), TreeError>>;

/// Getter of a computed property, evaluated on every read.
pub type ComputedFn = Rc<dyn Fn(&Node) -> Result<Value, TreeError>>;

#[derive(Clone)]
pub(crate) enum Member {
    Field { ty: FieldType, default: Option<Value> },
    Computed(ComputedFn),
    Action(ActionFn),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Field { ty, default } => f
                .debug_struct("Field")
                .field("ty", &ty.kind())
                .field("default", default)
                .finish(),
            Member::Computed(_) => f.write_str("Computed"),
            Member::Action(_) => f.write_str("Action"),
        }
    }
}

/// Declarative description of a model.
///
/// Members are kept in declaration order; snapshots list fields in the same
/// order.
///
/// ```
/// use serde_json::json;
/// use state_tree::{create_factory, ModelDefinition};
///
/// let factory = create_factory(
///     ModelDefinition::new()
///         .field("to", "world")
///         .action("setTo", |node, args| {
///             node.set("to", args.first().cloned().unwrap_or_default())
///         }),
/// )
/// .unwrap();
///
/// let doc = factory.create(None).unwrap();
/// doc.call("setTo", &[json!("universe")]).unwrap();
/// assert_eq!(doc.to_json(), json!({"to": "universe"}));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ModelDefinition {
    pub(crate) name: Option<String>,
    pub(crate) members: Vec<(String, Member)>,
}

impl ModelDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the type name shown in errors and in `Display`.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Declares a primitive field with its default value.
    pub fn field(mut self, name: impl Into<String>, default: impl Into<Value>) -> Self {
        self.members.push((
            name.into(),
            Member::Field {
                ty: FieldType::Primitive,
                default: Some(default.into()),
            },
        ));
        self
    }

    /// Declares a required child model. Defaults to the factory's default
    /// snapshot.
    pub fn model(self, name: impl Into<String>, factory: &Factory) -> Self {
        self.typed(name, FieldType::Model(factory.clone()))
    }

    /// Declares an optional child model. Defaults to `null`.
    pub fn maybe(self, name: impl Into<String>, factory: &Factory) -> Self {
        self.typed(name, FieldType::Maybe(factory.clone()))
    }

    /// Declares a child that may be built by any of `members`, tried in
    /// order. Defaults to the first member's default snapshot.
    pub fn union(self, name: impl Into<String>, members: &[&Factory]) -> Self {
        let members = members.iter().map(|f| (*f).clone()).collect();
        self.typed(name, FieldType::Union(members))
    }

    /// Declares a field of an explicit type, with the type's natural default.
    pub fn typed(mut self, name: impl Into<String>, ty: FieldType) -> Self {
        self.members
            .push((name.into(), Member::Field { ty, default: None }));
        self
    }

    pub fn computed<F>(mut self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn(&Node) -> Result<Value, TreeError> + 'static,
    {
        self.members
            .push((name.into(), Member::Computed(Rc::new(getter))));
        self
    }

    pub fn action<F>(mut self, name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Node, &[Value]) -> Result<(), TreeError> + 'static,
    {
        self.members
            .push((name.into(), Member::Action(Rc::new(body))));
        self
    }
}
