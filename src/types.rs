//! Value types and their runtime tags
//!
//! Every type that can live in a [`Value`](crate::Value) implements
//! [`ValueType`]. The trait carries a small runtime [`TypeTag`] for
//! serializers and for build-time constraint checks, and exposes the three
//! capabilities the constraint engine needs: ordering, text and element count.
//!
//! The marker traits [`Numeric`], [`Textual`] and [`Aggregate`] gate the typed
//! constraint constructors at compile time, so `Constraint::<String>::at_least`
//! does not exist.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;
use std::hash::Hash;

// =============================================================================
// Type Tags
// =============================================================================

/// Runtime shape of a value, used where a serializer needs to know it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    Bool,
    Integer,
    Float,
    Text,
    /// Ordered, growable sequence (`Vec`, `VecDeque`)
    List,
    /// Unordered or sorted set
    Set,
    /// Fixed-length boxed slice
    Array,
    Other,
}

impl TypeTag {
    /// Supports `at_least` / `at_most`
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, TypeTag::Integer | TypeTag::Float)
    }

    /// Supports `min_length` / `max_length` / `matches_regex`
    #[must_use]
    pub fn is_textual(self) -> bool {
        matches!(self, TypeTag::Text)
    }

    /// Supports `min_size` / `max_size`
    #[must_use]
    pub fn is_sized(self) -> bool {
        matches!(self, TypeTag::List | TypeTag::Set | TypeTag::Array)
    }

    /// Lowercase name, as serialized
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Integer => "integer",
            TypeTag::Float => "float",
            TypeTag::Text => "text",
            TypeTag::List => "list",
            TypeTag::Set => "set",
            TypeTag::Array => "array",
            TypeTag::Other => "other",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Value Type Traits
// =============================================================================

/// A type that can be held by a [`Value`](crate::Value)
///
/// The capability accessors default to `None`; the constraint engine treats a
/// missing capability as a rejected candidate.
pub trait ValueType: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// Runtime tag of the container (or scalar) type
    const TYPE: TypeTag;

    /// Tag of the element type, for aggregates only
    fn element_type() -> Option<TypeTag> {
        None
    }

    /// Ordering used by numeric bounds
    fn compare(&self, _other: &Self) -> Option<Ordering> {
        None
    }

    /// Text view used by length and pattern constraints
    fn text(&self) -> Option<&str> {
        None
    }

    /// Element count used by size constraints
    fn element_count(&self) -> Option<usize> {
        None
    }
}

/// Value types that support numeric bounds
pub trait Numeric: ValueType + PartialOrd {}

/// Value types that support length and pattern constraints
pub trait Textual: ValueType {}

/// Collection or array value types that support size constraints
pub trait Aggregate: ValueType {
    type Element: ValueType;

    fn size(&self) -> usize;
}

// =============================================================================
// Scalar Implementations
// =============================================================================

macro_rules! impl_numeric {
    ($tag:ident => $($ty:ty),* $(,)?) => {$(
        impl ValueType for $ty {
            const TYPE: TypeTag = TypeTag::$tag;

            fn compare(&self, other: &Self) -> Option<Ordering> {
                self.partial_cmp(other)
            }
        }

        impl Numeric for $ty {}
    )*};
}

impl_numeric!(Integer => i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
impl_numeric!(Float => f32, f64);

impl ValueType for bool {
    const TYPE: TypeTag = TypeTag::Bool;
}

impl ValueType for char {
    const TYPE: TypeTag = TypeTag::Other;
}

impl ValueType for String {
    const TYPE: TypeTag = TypeTag::Text;

    fn text(&self) -> Option<&str> {
        Some(self)
    }
}

impl Textual for String {}

// =============================================================================
// Aggregate Implementations
// =============================================================================

macro_rules! impl_aggregate {
    ($tag:ident => $container:ident $(, $bounds:tt)*) => {
        impl<E: ValueType $(+ $bounds)*> ValueType for $container<E> {
            const TYPE: TypeTag = TypeTag::$tag;

            fn element_type() -> Option<TypeTag> {
                Some(E::TYPE)
            }

            fn element_count(&self) -> Option<usize> {
                Some(self.len())
            }
        }

        impl<E: ValueType $(+ $bounds)*> Aggregate for $container<E> {
            type Element = E;

            fn size(&self) -> usize {
                self.len()
            }
        }
    };
}

impl_aggregate!(List => Vec);
impl_aggregate!(List => VecDeque);
impl_aggregate!(Set => BTreeSet, Ord);
impl_aggregate!(Set => HashSet, Eq, Hash);

impl<E: ValueType> ValueType for Box<[E]> {
    const TYPE: TypeTag = TypeTag::Array;

    fn element_type() -> Option<TypeTag> {
        Some(E::TYPE)
    }

    fn element_count(&self) -> Option<usize> {
        Some(self.len())
    }
}

impl<E: ValueType> Aggregate for Box<[E]> {
    type Element = E;

    fn size(&self) -> usize {
        self.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_tags() {
        assert_eq!(i32::TYPE, TypeTag::Integer);
        assert_eq!(u64::TYPE, TypeTag::Integer);
        assert_eq!(f64::TYPE, TypeTag::Float);
        assert_eq!(String::TYPE, TypeTag::Text);
        assert_eq!(bool::TYPE, TypeTag::Bool);
        assert_eq!(i32::element_type(), None);
    }

    #[test]
    fn test_aggregate_tags_carry_element_type() {
        assert_eq!(Vec::<String>::TYPE, TypeTag::List);
        assert_eq!(Vec::<String>::element_type(), Some(TypeTag::Text));
        assert_eq!(BTreeSet::<i64>::TYPE, TypeTag::Set);
        assert_eq!(HashSet::<u8>::element_type(), Some(TypeTag::Integer));
        assert_eq!(<Box<[f32]>>::TYPE, TypeTag::Array);
        assert_eq!(<Box<[f32]>>::element_type(), Some(TypeTag::Float));
        assert_eq!(Vec::<Vec<bool>>::element_type(), Some(TypeTag::List));
    }

    #[test]
    fn test_capabilities() {
        assert!(TypeTag::Integer.is_numeric());
        assert!(TypeTag::Float.is_numeric());
        assert!(!TypeTag::Text.is_numeric());
        assert!(TypeTag::Text.is_textual());
        assert!(TypeTag::Array.is_sized());
        assert!(!TypeTag::Bool.is_sized());
        assert!(!TypeTag::Other.is_numeric());
    }

    #[test]
    fn test_capability_accessors() {
        assert_eq!(3_i32.compare(&5), Some(Ordering::Less));
        assert_eq!(f64::NAN.compare(&1.0), None);
        assert_eq!(true.compare(&false), None);
        assert_eq!("héllo".to_string().text(), Some("héllo"));
        assert_eq!(vec![1, 2, 3].element_count(), Some(3));
        assert_eq!(vec![1, 2, 3].size(), 3);
        assert_eq!(7_u8.element_count(), None);
    }

    #[test]
    fn test_type_tag_serialization() {
        assert_eq!(serde_json::to_string(&TypeTag::List).unwrap(), "\"list\"");
        assert_eq!(TypeTag::Integer.to_string(), "integer");
    }
}
