//! Configuration tree
//!
//! - [`Node`] - named container of child items, insertion ordered
//! - [`Value`] - typed leaf with constraint, listeners and finality
//! - [`Item`] / [`AnyValue`] - type-erased children for serializers and binders
//! - [`NodeBuilder`] / [`ValueBuilder`] - chained construction with fail-fast checks

mod builder;
mod item;
mod node;
mod value;

pub use builder::{NodeBuilder, ValueBuilder};
pub use item::{AnyValue, Item};
pub use node::Node;
pub use value::Value;
