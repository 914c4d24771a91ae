//! Tree items: child nodes and type-erased values
//!
//! A node's children are heterogeneous, so values are stored behind the
//! object-safe [`AnyValue`] trait. Serializers and binders use it to read
//! names, comments and type tags, and to move data in and out as JSON without
//! knowing `T`. [`Item::downcast`] recovers the typed [`Value<T>`].

use crate::error::{Error, Result};
use crate::tree::{Node, Value};
use crate::types::{TypeTag, ValueType};
use std::any::Any;
use std::sync::{Arc, Weak};

pub(crate) mod sealed {
    use crate::tree::Node;
    use std::sync::Weak;

    /// Parent wiring, callable only from inside the crate
    pub trait Attach {
        /// Record the parent; `false` if one was already recorded
        fn set_parent(&self, parent: Weak<Node>) -> bool;
    }
}

/// Object-safe view of a [`Value<T>`]
pub trait AnyValue: sealed::Attach + Send + Sync {
    /// Name used for lookup within the parent node
    fn name(&self) -> &str;

    /// Free-form description for serializers
    fn comment(&self) -> Option<&str>;

    /// Runtime tag of `T`
    fn type_tag(&self) -> TypeTag;

    /// Element tag for aggregate values, `None` for scalars
    fn element_type(&self) -> Option<TypeTag>;

    /// Rust type name of `T`, used in mismatch errors
    fn type_name(&self) -> &'static str;

    /// Whether the value rejects every assignment
    fn is_final(&self) -> bool;

    /// Node this value is attached to, if any
    fn parent(&self) -> Option<Arc<Node>>;

    /// Dotted path from the root
    fn path(&self) -> String;

    /// Current value as JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`](crate::Error::Serialize) if `T` fails to
    /// serialize.
    fn current_json(&self) -> Result<serde_json::Value>;

    /// Default value as JSON
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialize`](crate::Error::Serialize) if `T` fails to
    /// serialize.
    fn default_json(&self) -> Result<serde_json::Value>;

    /// Decode `json` as `T` and run it through `set_value`
    ///
    /// `Ok(false)` means the value is final or the constraint rejected it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Deserialize`](crate::Error::Deserialize) if `json` is
    /// not a valid `T`.
    fn apply_json(&self, json: serde_json::Value) -> Result<bool>;

    /// Upcast for [`Item::downcast`]
    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: ValueType> sealed::Attach for Value<T> {
    fn set_parent(&self, parent: Weak<Node>) -> bool {
        self.parent.set(parent).is_ok()
    }
}

impl<T: ValueType> AnyValue for Value<T> {
    fn name(&self) -> &str {
        Value::name(self)
    }

    fn comment(&self) -> Option<&str> {
        Value::comment(self)
    }

    fn type_tag(&self) -> TypeTag {
        T::TYPE
    }

    fn element_type(&self) -> Option<TypeTag> {
        Value::element_type(self)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn is_final(&self) -> bool {
        Value::is_final(self)
    }

    fn parent(&self) -> Option<Arc<Node>> {
        Value::parent(self)
    }

    fn path(&self) -> String {
        Value::path(self)
    }

    fn current_json(&self) -> Result<serde_json::Value> {
        self.with_current(|current| serde_json::to_value(current))
            .map_err(Error::Serialize)
    }

    fn default_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(self.default_value()).map_err(Error::Serialize)
    }

    fn apply_json(&self, json: serde_json::Value) -> Result<bool> {
        let candidate: T = serde_json::from_value(json)?;
        Ok(self.set_value(candidate))
    }

    fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

// =============================================================================
// Item
// =============================================================================

/// Child of a [`Node`]: either a nested node or a value
#[derive(Clone)]
pub enum Item {
    Node(Arc<Node>),
    Value(Arc<dyn AnyValue>),
}

impl Item {
    /// Name used for sibling lookup; unnamed nodes return `None`
    pub fn name(&self) -> Option<&str> {
        match self {
            Item::Node(node) => node.name(),
            Item::Value(value) => Some(value.name()),
        }
    }

    /// Comment of the node or value
    pub fn comment(&self) -> Option<&str> {
        match self {
            Item::Node(node) => node.comment(),
            Item::Value(value) => value.comment(),
        }
    }

    /// Node this item is attached to, if any
    pub fn parent(&self) -> Option<Arc<Node>> {
        match self {
            Item::Node(node) => node.parent(),
            Item::Value(value) => value.parent(),
        }
    }

    /// Dotted path from the root
    pub fn path(&self) -> String {
        match self {
            Item::Node(node) => node.path(),
            Item::Value(value) => value.path(),
        }
    }

    /// Whether this item is a nested node
    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    /// The nested node, if this item is one
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Item::Node(node) => Some(node),
            Item::Value(_) => None,
        }
    }

    /// The type-erased value, if this item is one
    pub fn as_value(&self) -> Option<&Arc<dyn AnyValue>> {
        match self {
            Item::Node(_) => None,
            Item::Value(value) => Some(value),
        }
    }

    /// Typed handle to the value, if this item is a `Value<T>`
    pub fn downcast<T: ValueType>(&self) -> Option<Arc<Value<T>>> {
        match self {
            Item::Value(value) => Arc::clone(value).into_any().downcast::<Value<T>>().ok(),
            Item::Node(_) => None,
        }
    }

    pub(crate) fn set_parent(&self, parent: Weak<Node>) -> bool {
        use sealed::Attach;
        match self {
            Item::Node(node) => node.set_parent(parent),
            Item::Value(value) => value.set_parent(parent),
        }
    }
}

impl From<Arc<Node>> for Item {
    fn from(node: Arc<Node>) -> Self {
        Item::Node(node)
    }
}

impl<T: ValueType> From<Arc<Value<T>>> for Item {
    fn from(value: Arc<Value<T>>) -> Self {
        Item::Value(value)
    }
}

impl std::fmt::Debug for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Item::Node(node) => f.debug_tuple("Node").field(&node.name()).finish(),
            Item::Value(value) => f
                .debug_tuple("Value")
                .field(&value.name())
                .field(&value.type_tag())
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_downcast() {
        let item = Item::from(Value::new("n", None, 3_i64, None, false).unwrap());

        assert!(item.downcast::<i64>().is_some());
        assert!(item.downcast::<i32>().is_none());
        assert!(!item.is_node());
        assert_eq!(item.name(), Some("n"));
    }

    #[test]
    fn test_json_bridge() {
        let value = Value::new(
            "hosts",
            Some("Known hosts".into()),
            vec!["a".to_string()],
            Some(crate::Constraint::max_size(2)),
            false,
        )
        .unwrap();
        let erased: Arc<dyn AnyValue> = value.clone();

        assert_eq!(erased.default_json().unwrap(), json!(["a"]));
        assert_eq!(erased.apply_json(json!(["a", "b"])).unwrap(), true);
        assert_eq!(erased.current_json().unwrap(), json!(["a", "b"]));

        // Decodes but fails the size constraint
        assert_eq!(erased.apply_json(json!(["a", "b", "c"])).unwrap(), false);
        assert_eq!(value.get(), vec!["a".to_string(), "b".to_string()]);

        // Does not decode as Vec<String>
        assert!(matches!(
            erased.apply_json(json!(5)),
            Err(crate::Error::Deserialize(_))
        ));
        assert_eq!(erased.element_type(), Some(TypeTag::Text));
        assert_eq!(erased.type_name(), std::any::type_name::<Vec<String>>());
    }

    #[derive(Clone, serde::Deserialize)]
    struct Opaque;

    impl serde::Serialize for Opaque {
        fn serialize<S: serde::Serializer>(&self, _: S) -> std::result::Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("opaque handle"))
        }
    }

    impl ValueType for Opaque {
        const TYPE: TypeTag = TypeTag::Other;
    }

    #[test]
    fn test_encode_failure_is_a_serialize_error() {
        let erased: Arc<dyn AnyValue> = Value::new("handle", None, Opaque, None, false).unwrap();

        let err = erased.current_json().unwrap_err();
        assert!(matches!(err, crate::Error::Serialize(_)));
        assert!(err.to_string().starts_with("Failed to serialize value"));
        assert!(matches!(
            erased.default_json(),
            Err(crate::Error::Serialize(_))
        ));
    }
}
