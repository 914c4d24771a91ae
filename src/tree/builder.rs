//! Builders for nodes and values
//!
//! These mirror a chained-config style: every setter consumes and returns the
//! builder, and `build()` runs all fail-fast checks (constraint capability and
//! arity, sibling name collisions) before anything is handed out.
//!
//! ```rust
//! use cfgtree::{ConstraintsBuilder, NodeBuilder, ValueBuilder};
//!
//! let root = NodeBuilder::new()
//!     .name("Foo")
//!     .comment("Bar")
//!     .value(
//!         ValueBuilder::<i32>::scalar("Baz").constrained(
//!             ConstraintsBuilder::new()
//!                 .or()
//!                 .at_least(5)
//!                 .at_most(0)
//!                 .finish_composite(),
//!         ),
//!     )
//!     .build()?;
//!
//! let baz = root.value::<i32>("Baz")?;
//! assert!(!baz.set_value(2));
//! assert!(baz.set_value(10));
//! # Ok::<(), cfgtree::Error>(())
//! ```

use crate::constraint::{Constraint, ConstraintsBuilder};
use crate::error::Result;
use crate::events::ChangeCallback;
use crate::tree::{Item, Node, Value};
use crate::types::{Aggregate, ValueType};
use std::sync::Arc;

// =============================================================================
// Value Builder
// =============================================================================

/// Builder for a [`Value<T>`]
pub struct ValueBuilder<T: ValueType> {
    name: String,
    comment: Option<String>,
    default: T,
    finalized: bool,
    constraints: ConstraintsBuilder<T>,
    listeners: Vec<ChangeCallback<T>>,
}

impl<T: ValueType> ValueBuilder<T> {
    /// Start a value with an explicit default
    pub fn new(name: impl Into<String>, default: T) -> Self {
        Self {
            name: name.into(),
            comment: None,
            default,
            finalized: false,
            constraints: ConstraintsBuilder::new(),
            listeners: Vec::new(),
        }
    }

    /// Set the value comment
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Replace the default (which is also the initial current value)
    #[must_use]
    pub fn default_value(mut self, default: T) -> Self {
        self.default = default;
        self
    }

    /// Build the value already final
    #[must_use]
    pub fn finality(mut self, finalized: bool) -> Self {
        self.finalized = finalized;
        self
    }

    /// Add one constraint; several are conjoined
    #[must_use]
    pub fn constraint(mut self, constraint: Constraint<T>) -> Self {
        self.constraints = self.constraints.constraint(constraint);
        self
    }

    /// Add everything collected by a constraints chain
    #[must_use]
    pub fn constrained(mut self, constraints: ConstraintsBuilder<T>) -> Self {
        self.constraints = self.constraints.merge(constraints);
        self
    }

    /// Register a `(old, new)` listener
    #[must_use]
    pub fn listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.listeners.push(Arc::new(listener));
        self
    }

    /// Register a listener that only receives the new value
    #[must_use]
    pub fn value_listener<F>(self, listener: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.listener(move |_old, new| listener(new))
    }

    /// Build the value
    ///
    /// The default is not validated against the constraint.
    ///
    /// # Errors
    ///
    /// Returns the first constraint construction error, if any.
    pub fn build(self) -> Result<Arc<Value<T>>> {
        let constraint = self.constraints.build()?;
        let value = Value::new(
            self.name,
            self.comment,
            self.default,
            constraint,
            self.finalized,
        )?;
        for listener in self.listeners {
            value.push_listener(listener);
        }
        Ok(value)
    }
}

impl<T: ValueType + Default> ValueBuilder<T> {
    /// Start a scalar value defaulting to `T::default()`
    pub fn scalar(name: impl Into<String>) -> Self {
        Self::new(name, T::default())
    }
}

impl<T: Aggregate> ValueBuilder<T> {
    /// Start a collection or array value
    ///
    /// The element type tag is derived from `T::Element`.
    pub fn aggregate(name: impl Into<String>, default: T) -> Self {
        Self::new(name, default)
    }
}

// =============================================================================
// Node Builder
// =============================================================================

/// Builder for a [`Node`] and its children
#[derive(Default)]
pub struct NodeBuilder {
    name: Option<String>,
    comment: Option<String>,
    serialize_separately: bool,
    items: Vec<Result<Item>>,
}

impl NodeBuilder {
    /// Start an unnamed, empty node
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the node name, unique among its siblings
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the node comment
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Ask serializers to write this subtree on its own
    #[must_use]
    pub fn serialize_separately(mut self, separately: bool) -> Self {
        self.serialize_separately = separately;
        self
    }

    /// Add a value built from `builder`
    #[must_use]
    pub fn value<T: ValueType>(mut self, builder: ValueBuilder<T>) -> Self {
        self.items.push(builder.build().map(Item::from));
        self
    }

    /// Add a nested node built from `builder`
    #[must_use]
    pub fn child(mut self, builder: NodeBuilder) -> Self {
        self.items.push(builder.build().map(Item::from));
        self
    }

    /// Add an already built item
    #[must_use]
    pub fn item(mut self, item: impl Into<Item>) -> Self {
        self.items.push(Ok(item.into()));
        self
    }

    /// Build the node and attach its children in order
    ///
    /// # Errors
    ///
    /// Returns the first error from a child's construction or attachment.
    pub fn build(self) -> Result<Arc<Node>> {
        let node = Node::new(self.name, self.comment, self.serialize_separately);
        for item in self.items {
            node.attach(item?)?;
        }
        Ok(node)
    }
}
