//! # cfgtree - typed configuration trees
//!
//! A strongly-typed, hierarchical configuration model: a tree of named nodes
//! holding typed leaf values, each optionally guarded by composable validation
//! constraints, change listeners and an irreversible "final" lock.
//!
//! ## Features
//!
//! - **Typed Values**: `Value<T>` for integers, floats, strings, booleans and collections
//! - **Composable Constraints**: numeric bounds, text length, full-string regex and
//!   collection size, combined with `AND` / `OR` / `INVERT`
//! - **Validated Assignment**: `set_value` is test-and-set; rejected candidates never land
//! - **Finality**: a one-way lock that rejects every later assignment
//! - **Listeners**: `(old, new)` callbacks run in registration order after each change
//! - **Serializer Bridge**: type-erased items with JSON in/out for external formats
//!
//! ## Quick Start
//!
//! ```rust
//! use cfgtree::{ConstraintsBuilder, NodeBuilder, ValueBuilder};
//!
//! let root = NodeBuilder::new()
//!     .child(
//!         NodeBuilder::new()
//!             .name("network")
//!             .comment("Listener settings")
//!             .value(
//!                 ValueBuilder::new("port", 8080_u16)
//!                     .constrained(ConstraintsBuilder::new().at_least(1024).at_most(49151)),
//!             )
//!             .value(
//!                 ValueBuilder::new("host", "localhost".to_string())
//!                     .constrained(ConstraintsBuilder::new().min_length(1)),
//!             ),
//!     )
//!     .build()?;
//!
//! let port = root.value::<u16>("network.port")?;
//! port.add_listener(|old, new| println!("port {old} -> {new}"));
//!
//! assert!(port.set_value(9000));
//! assert!(!port.set_value(80)); // below the bound, unchanged
//! assert_eq!(port.get(), 9000);
//! # Ok::<(), cfgtree::Error>(())
//! ```
//!
//! ## Validation Failures vs Errors
//!
//! A rejected candidate is an expected outcome, reported as `false` from
//! [`Value::set_value`]. [`Error`] is reserved for mistakes made while
//! assembling the tree: an `INVERT` without exactly one child, a leaf
//! constraint on a type that cannot support it, a bad regex, or two siblings
//! with the same name.
//!
//! ## Finality
//!
//! ```rust
//! use cfgtree::ValueBuilder;
//!
//! let version = ValueBuilder::new("schema_version", 3_u32).build()?;
//! version.set_final(true);
//!
//! assert!(!version.set_value(4));
//! version.set_final(false); // no-op: finality cannot be undone
//! assert!(version.is_final());
//! # Ok::<(), cfgtree::Error>(())
//! ```
//!
//! ## Walking the Tree
//!
//! Serializers see children through [`Item`]; values expose their contents as
//! JSON through [`AnyValue`] and accept external data back through
//! [`AnyValue::apply_json`], whose `bool` reports validation.
//!
//! ```rust
//! use cfgtree::{Item, NodeBuilder, ValueBuilder};
//!
//! let root = NodeBuilder::new()
//!     .value(ValueBuilder::new("retries", 3_u8))
//!     .value(ValueBuilder::aggregate("tags", vec!["a".to_string()]))
//!     .build()?;
//!
//! root.walk(|item, _depth| {
//!     if let Item::Value(value) = item {
//!         println!("{} = {}", value.path(), value.current_json().unwrap());
//!     }
//! });
//! # Ok::<(), cfgtree::Error>(())
//! ```

// Core modules
mod error;
mod events;
mod sync;

pub mod constraint;
pub mod tree;
pub mod types;

// Re-exports from core
pub use error::{Error, Result};
pub use events::ChangeCallback;

pub use constraint::{
    Composite, CompositeBuilder, CompositeType, Constraint, ConstraintsBuilder, Leaf, Pattern,
    evaluate,
};
pub use tree::{AnyValue, Item, Node, NodeBuilder, Value, ValueBuilder};
pub use types::{Aggregate, Numeric, Textual, TypeTag, ValueType};
