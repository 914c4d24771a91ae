//! Chained builders for constraints
//!
//! [`ConstraintsBuilder`] collects top-level constraints for one value. Calling
//! [`and`](ConstraintsBuilder::and), [`or`](ConstraintsBuilder::or) or
//! [`invert`](ConstraintsBuilder::invert) hands out a [`CompositeBuilder`]
//! which only accepts leaves; [`finish_composite`](CompositeBuilder::finish_composite)
//! returns to the parent. Composites therefore nest one level deep here, even
//! though the engine evaluates any depth.
//!
//! Construction errors (bad regex, `INVERT` arity) are remembered and reported
//! by [`ConstraintsBuilder::build`], so a chain never panics halfway.
//!
//! ```rust
//! use cfgtree::ConstraintsBuilder;
//!
//! let constraint = ConstraintsBuilder::<i32>::new()
//!     .or()
//!     .at_least(5)
//!     .at_most(0)
//!     .finish_composite()
//!     .build()?
//!     .expect("one constraint was added");
//!
//! assert!(!constraint.test(&2));
//! # Ok::<(), cfgtree::Error>(())
//! ```

use super::{Composite, CompositeType, Constraint};
use crate::error::{Error, Result};
use crate::types::{Aggregate, Numeric, Textual, ValueType};

/// Leaf constructors shared by both builders; each forwards to `self.push`
macro_rules! leaf_methods {
    () => {
        /// Require `candidate >= bound`
        #[must_use]
        pub fn at_least(self, bound: T) -> Self
        where
            T: Numeric,
        {
            self.push(Ok(Constraint::at_least(bound)))
        }

        /// Require `candidate <= bound`
        #[must_use]
        pub fn at_most(self, bound: T) -> Self
        where
            T: Numeric,
        {
            self.push(Ok(Constraint::at_most(bound)))
        }

        /// Require at least `n` characters
        #[must_use]
        pub fn min_length(self, n: usize) -> Self
        where
            T: Textual,
        {
            self.push(Ok(Constraint::min_length(n)))
        }

        /// Require at most `n` characters
        #[must_use]
        pub fn max_length(self, n: usize) -> Self
        where
            T: Textual,
        {
            self.push(Ok(Constraint::max_length(n)))
        }

        /// Require a full-string regex match
        ///
        /// An invalid pattern is reported when the chain is built.
        #[must_use]
        pub fn matches_regex(self, pattern: &str) -> Self
        where
            T: Textual,
        {
            self.push(Constraint::matches_regex(pattern))
        }

        /// Require at least `n` elements
        #[must_use]
        pub fn min_size(self, n: usize) -> Self
        where
            T: Aggregate,
        {
            self.push(Ok(Constraint::min_size(n)))
        }

        /// Require at most `n` elements
        #[must_use]
        pub fn max_size(self, n: usize) -> Self
        where
            T: Aggregate,
        {
            self.push(Ok(Constraint::max_size(n)))
        }
    };
}

// =============================================================================
// Top-level Builder
// =============================================================================

/// Collects the constraints of one value
///
/// Several top-level constraints are combined with `AND` on build.
pub struct ConstraintsBuilder<T> {
    constraints: Vec<Constraint<T>>,
    error: Option<Error>,
}

impl<T: ValueType> Default for ConstraintsBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ValueType> ConstraintsBuilder<T> {
    /// Start an empty chain
    #[must_use]
    pub fn new() -> Self {
        Self {
            constraints: Vec::new(),
            error: None,
        }
    }

    fn push(mut self, constraint: Result<Constraint<T>>) -> Self {
        match constraint {
            Ok(constraint) => self.constraints.push(constraint),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    leaf_methods!();

    /// Add a prebuilt constraint of any shape
    ///
    /// It is checked against the value type when the chain is built.
    #[must_use]
    pub fn constraint(self, constraint: Constraint<T>) -> Self {
        self.push(Ok(constraint))
    }

    /// Begin a composite of the given kind
    #[must_use]
    pub fn composite(self, kind: CompositeType) -> CompositeBuilder<T> {
        CompositeBuilder {
            parent: self,
            kind,
            children: Vec::new(),
            error: None,
        }
    }

    /// Begin an `AND` composite
    #[must_use]
    pub fn and(self) -> CompositeBuilder<T> {
        self.composite(CompositeType::And)
    }

    /// Begin an `OR` composite
    #[must_use]
    pub fn or(self) -> CompositeBuilder<T> {
        self.composite(CompositeType::Or)
    }

    /// Begin an `INVERT` composite; exactly one leaf must be added
    #[must_use]
    pub fn invert(self) -> CompositeBuilder<T> {
        self.composite(CompositeType::Invert)
    }

    /// Append everything collected by `other`
    #[must_use]
    pub fn merge(mut self, other: ConstraintsBuilder<T>) -> Self {
        if let Some(e) = other.error {
            self.error.get_or_insert(e);
        }
        self.constraints.extend(other.constraints);
        self
    }

    /// Whether nothing (not even a failed leaf) was added
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty() && self.error.is_none()
    }

    /// Produce the value's constraint, or `None` when nothing was added
    ///
    /// # Errors
    ///
    /// Returns the first error recorded by the chain, or the error from
    /// [`Constraint::check`] against `T`'s type tag.
    pub fn build(mut self) -> Result<Option<Constraint<T>>> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let constraint = match self.constraints.len() {
            0 => None,
            1 => self.constraints.pop(),
            _ => Some(Constraint::all(self.constraints)),
        };

        if let Some(ref constraint) = constraint {
            constraint.check(T::TYPE)?;
        }
        Ok(constraint)
    }
}

// =============================================================================
// Composite Builder
// =============================================================================

/// Handle for filling one composite with leaves
pub struct CompositeBuilder<T> {
    parent: ConstraintsBuilder<T>,
    kind: CompositeType,
    children: Vec<Constraint<T>>,
    error: Option<Error>,
}

impl<T: ValueType> CompositeBuilder<T> {
    fn push(mut self, constraint: Result<Constraint<T>>) -> Self {
        match constraint {
            Ok(constraint) => self.children.push(constraint),
            Err(e) => {
                self.error.get_or_insert(e);
            }
        }
        self
    }

    leaf_methods!();

    /// Close the composite and return to the top-level builder
    #[must_use]
    pub fn finish_composite(self) -> ConstraintsBuilder<T> {
        let composite = match self.error {
            Some(e) => Err(e),
            None => Composite::new(self.kind, self.children).map(Constraint::from),
        };
        self.parent.push(composite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_builder_yields_no_constraint() {
        let built = ConstraintsBuilder::<i32>::new().build().unwrap();
        assert!(built.is_none());
    }

    #[test]
    fn test_single_constraint_is_not_wrapped() {
        let built = ConstraintsBuilder::<i32>::new()
            .at_least(3)
            .build()
            .unwrap()
            .unwrap();
        assert_eq!(built, Constraint::at_least(3));
    }

    #[test]
    fn test_multiple_constraints_are_conjoined() {
        let built = ConstraintsBuilder::<String>::new()
            .min_length(2)
            .max_length(4)
            .build()
            .unwrap()
            .unwrap();

        assert!(built.test(&"abc".to_string()));
        assert!(!built.test(&"a".to_string()));
        assert!(!built.test(&"abcde".to_string()));
    }

    #[test]
    fn test_or_composite() {
        let built = ConstraintsBuilder::<i64>::new()
            .or()
            .at_least(5)
            .at_most(0)
            .finish_composite()
            .build()
            .unwrap()
            .unwrap();

        assert!(!built.test(&2));
        assert!(built.test(&10));
        assert!(built.test(&-5));
    }

    #[test]
    fn test_invert_composite() {
        let built = ConstraintsBuilder::<u32>::new()
            .invert()
            .at_least(5)
            .finish_composite()
            .build()
            .unwrap()
            .unwrap();

        assert!(built.test(&4));
        assert!(!built.test(&5));
    }

    #[test]
    fn test_invert_with_two_leaves_fails_on_build() {
        let result = ConstraintsBuilder::<u32>::new()
            .invert()
            .at_least(5)
            .at_most(9)
            .finish_composite()
            .build();

        assert!(matches!(
            result,
            Err(Error::InvalidArity {
                kind: CompositeType::Invert,
                found: 2
            })
        ));
    }

    #[test]
    fn test_bad_regex_inside_composite_fails_on_build() {
        let result = ConstraintsBuilder::<String>::new()
            .or()
            .matches_regex("[unclosed")
            .min_length(3)
            .finish_composite()
            .build();

        assert!(matches!(result, Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_hand_built_constraint_checked_against_type() {
        let result = ConstraintsBuilder::<bool>::new()
            .constraint(crate::constraint::Leaf::MaxSize(2).into())
            .build();

        assert!(matches!(result, Err(Error::IncompatibleConstraint { .. })));
    }

    #[test]
    fn test_merge() {
        let extra = ConstraintsBuilder::<Vec<u8>>::new().max_size(3);
        let built = ConstraintsBuilder::<Vec<u8>>::new()
            .min_size(1)
            .merge(extra)
            .build()
            .unwrap()
            .unwrap();

        assert!(built.test(&vec![1, 2]));
        assert!(!built.test(&vec![]));
        assert!(!built.test(&vec![1, 2, 3, 4]));
    }
}
