//! Constraint model and evaluation engine
//!
//! # Overview
//!
//! A [`Constraint<T>`] is a predicate over a candidate `T`. It is either a
//! [`Leaf`] (numeric bound, text length or pattern, collection size) or a
//! [`Composite`] combining sub-constraints of the same value type:
//!
//! | Composite | Result                               | Empty children |
//! |-----------|--------------------------------------|----------------|
//! | `AND`     | every child accepts                  | accepts        |
//! | `OR`      | at least one child accepts           | rejects        |
//! | `INVERT`  | negation of its single child         | not buildable  |
//!
//! Leaf kinds are gated by what `T` can do, not by subtyping: `at_least` needs
//! a [`Numeric`] type, `min_length` a [`Textual`] one, `min_size` an
//! [`Aggregate`]. The typed constructors enforce this at compile time and
//! [`Constraint::check`] enforces it at build time for constraints assembled
//! by hand from a [`TypeTag`].
//!
//! ```rust
//! use cfgtree::Constraint;
//!
//! let outside = Constraint::any([Constraint::at_least(5), Constraint::at_most(0)]);
//!
//! assert!(!outside.test(&2));
//! assert!(outside.test(&10));
//! assert!(outside.test(&-5));
//! ```
//!
//! The engine itself supports arbitrary nesting. The chained builders in
//! [`builder`] only allow one level of composites.

pub mod builder;

use crate::error::{Error, Result};
use crate::types::{Aggregate, Numeric, Textual, TypeTag, ValueType};
use regex::Regex;
use serde::{Deserialize, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;

pub use builder::{CompositeBuilder, ConstraintsBuilder};

// =============================================================================
// Composite Kinds
// =============================================================================

/// Logical combinator of a [`Composite`] constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompositeType {
    And,
    Or,
    Invert,
}

impl CompositeType {
    /// Whether a composite of this kind may hold `count` children
    #[must_use]
    pub fn accepts_arity(self, count: usize) -> bool {
        match self {
            CompositeType::And | CompositeType::Or => true,
            CompositeType::Invert => count == 1,
        }
    }
}

impl fmt::Display for CompositeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CompositeType::And => "AND",
            CompositeType::Or => "OR",
            CompositeType::Invert => "INVERT",
        })
    }
}

// =============================================================================
// Regex Pattern
// =============================================================================

/// Compiled full-string pattern
///
/// The source is wrapped as `^(?:...)$` before compiling, so a candidate only
/// matches when the whole string matches. Serializes as the source text.
#[derive(Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    /// Compile a pattern
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the source is not a valid regex.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let invalid = |e| Error::InvalidPattern {
            pattern: source.clone(),
            source: e,
        };
        // The bare source must compile on its own, or unbalanced groups could
        // pair up with the anchoring wrapper
        Regex::new(&source).map_err(invalid)?;
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(invalid)?;
        Ok(Self { source, regex })
    }

    /// Pattern source as written, without anchors
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether the whole of `text` matches
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

// =============================================================================
// Constraint Tree
// =============================================================================

/// Predicate gating whether a candidate may overwrite a value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Constraint<T> {
    Leaf(Leaf<T>),
    Composite(Composite<T>),
}

/// Single-check constraint
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaf<T> {
    /// `candidate >= bound`
    AtLeast(T),
    /// `candidate <= bound`
    AtMost(T),
    /// At least `n` characters
    MinLength(usize),
    /// At most `n` characters
    MaxLength(usize),
    /// Whole string matches the pattern
    MatchesRegex(Pattern),
    /// At least `n` elements
    MinSize(usize),
    /// At most `n` elements
    MaxSize(usize),
}

/// Logical combination of sub-constraints
///
/// Children are private so an `INVERT` with the wrong arity cannot exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Composite<T> {
    kind: CompositeType,
    children: Vec<Constraint<T>>,
}

impl<T> Leaf<T> {
    /// Builder-facing name of this leaf kind
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Leaf::AtLeast(_) => "at_least",
            Leaf::AtMost(_) => "at_most",
            Leaf::MinLength(_) => "min_length",
            Leaf::MaxLength(_) => "max_length",
            Leaf::MatchesRegex(_) => "matches_regex",
            Leaf::MinSize(_) => "min_size",
            Leaf::MaxSize(_) => "max_size",
        }
    }

    /// Whether a value with the given tag has the capability this leaf needs
    #[must_use]
    pub fn supports(&self, tag: TypeTag) -> bool {
        match self {
            Leaf::AtLeast(_) | Leaf::AtMost(_) => tag.is_numeric(),
            Leaf::MinLength(_) | Leaf::MaxLength(_) | Leaf::MatchesRegex(_) => tag.is_textual(),
            Leaf::MinSize(_) | Leaf::MaxSize(_) => tag.is_sized(),
        }
    }
}

impl<T: ValueType> Leaf<T> {
    /// Evaluate this leaf; a candidate lacking the needed capability is rejected
    #[must_use]
    pub fn test(&self, candidate: &T) -> bool {
        match self {
            Leaf::AtLeast(bound) => matches!(
                candidate.compare(bound),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Leaf::AtMost(bound) => matches!(
                candidate.compare(bound),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Leaf::MinLength(n) => candidate.text().is_some_and(|s| s.chars().count() >= *n),
            Leaf::MaxLength(n) => candidate.text().is_some_and(|s| s.chars().count() <= *n),
            Leaf::MatchesRegex(pattern) => candidate.text().is_some_and(|s| pattern.is_match(s)),
            Leaf::MinSize(n) => candidate.element_count().is_some_and(|c| c >= *n),
            Leaf::MaxSize(n) => candidate.element_count().is_some_and(|c| c <= *n),
        }
    }
}

impl<T> Composite<T> {
    /// Create a composite, rejecting an arity its kind cannot hold
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArity`] for an `INVERT` without exactly one child.
    pub fn new(kind: CompositeType, children: Vec<Constraint<T>>) -> Result<Self> {
        if !kind.accepts_arity(children.len()) {
            return Err(Error::InvalidArity {
                kind,
                found: children.len(),
            });
        }
        Ok(Self { kind, children })
    }

    /// Logical combinator of this composite
    #[must_use]
    pub fn kind(&self) -> CompositeType {
        self.kind
    }

    /// Sub-constraints in evaluation order
    #[must_use]
    pub fn children(&self) -> &[Constraint<T>] {
        &self.children
    }
}

impl<T: ValueType> Composite<T> {
    /// Evaluate this composite, short-circuiting left to right
    #[must_use]
    pub fn test(&self, candidate: &T) -> bool {
        match self.kind {
            CompositeType::And => self.children.iter().all(|c| c.test(candidate)),
            CompositeType::Or => self.children.iter().any(|c| c.test(candidate)),
            CompositeType::Invert => match self.children.as_slice() {
                [child] => !child.test(candidate),
                _ => false,
            },
        }
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl<T: Numeric> Constraint<T> {
    /// Accept candidates `>= bound`
    #[must_use]
    pub fn at_least(bound: T) -> Self {
        Constraint::Leaf(Leaf::AtLeast(bound))
    }

    /// Accept candidates `<= bound`
    #[must_use]
    pub fn at_most(bound: T) -> Self {
        Constraint::Leaf(Leaf::AtMost(bound))
    }
}

impl<T: Textual> Constraint<T> {
    /// Accept strings of at least `n` characters
    #[must_use]
    pub fn min_length(n: usize) -> Self {
        Constraint::Leaf(Leaf::MinLength(n))
    }

    /// Accept strings of at most `n` characters
    #[must_use]
    pub fn max_length(n: usize) -> Self {
        Constraint::Leaf(Leaf::MaxLength(n))
    }

    /// Accept strings the pattern matches in full
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the pattern does not compile.
    pub fn matches_regex(pattern: &str) -> Result<Self> {
        Ok(Constraint::Leaf(Leaf::MatchesRegex(Pattern::new(pattern)?)))
    }
}

impl<T: Aggregate> Constraint<T> {
    /// Accept collections with at least `n` elements
    #[must_use]
    pub fn min_size(n: usize) -> Self {
        Constraint::Leaf(Leaf::MinSize(n))
    }

    /// Accept collections with at most `n` elements
    #[must_use]
    pub fn max_size(n: usize) -> Self {
        Constraint::Leaf(Leaf::MaxSize(n))
    }
}

impl<T> Constraint<T> {
    /// `AND` over the given constraints; empty accepts everything
    #[must_use]
    pub fn all(children: impl IntoIterator<Item = Constraint<T>>) -> Self {
        Constraint::Composite(Composite {
            kind: CompositeType::And,
            children: children.into_iter().collect(),
        })
    }

    /// `OR` over the given constraints; empty rejects everything
    #[must_use]
    pub fn any(children: impl IntoIterator<Item = Constraint<T>>) -> Self {
        Constraint::Composite(Composite {
            kind: CompositeType::Or,
            children: children.into_iter().collect(),
        })
    }

    /// `INVERT` of a single constraint
    #[must_use]
    pub fn invert(child: Constraint<T>) -> Self {
        Constraint::Composite(Composite {
            kind: CompositeType::Invert,
            children: vec![child],
        })
    }

    /// Composite of any kind from a child list
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArity`] for an `INVERT` without exactly one child.
    pub fn composite(kind: CompositeType, children: Vec<Constraint<T>>) -> Result<Self> {
        Composite::new(kind, children).map(Constraint::Composite)
    }

    /// Conjoin `other` onto this constraint
    ///
    /// An existing `AND` absorbs `other` as a new child; anything else is
    /// wrapped into a fresh two-child `AND`.
    #[must_use]
    pub fn and(self, other: Constraint<T>) -> Self {
        match self {
            Constraint::Composite(Composite {
                kind: CompositeType::And,
                mut children,
            }) => {
                children.push(other);
                Constraint::Composite(Composite {
                    kind: CompositeType::And,
                    children,
                })
            }
            first => Constraint::all([first, other]),
        }
    }

    /// Verify arity and capability against the value type tag
    ///
    /// # Errors
    ///
    /// Returns [`Error::IncompatibleConstraint`] for the first leaf whose kind
    /// the tag cannot support, or [`Error::InvalidArity`] for a malformed
    /// composite.
    pub fn check(&self, value_type: TypeTag) -> Result<()> {
        match self {
            Constraint::Leaf(leaf) if !leaf.supports(value_type) => {
                Err(Error::IncompatibleConstraint {
                    constraint: leaf.name(),
                    value_type,
                })
            }
            Constraint::Leaf(_) => Ok(()),
            Constraint::Composite(composite) => {
                if !composite.kind.accepts_arity(composite.children.len()) {
                    return Err(Error::InvalidArity {
                        kind: composite.kind,
                        found: composite.children.len(),
                    });
                }
                composite
                    .children
                    .iter()
                    .try_for_each(|child| child.check(value_type))
            }
        }
    }
}

impl<T: ValueType> Constraint<T> {
    /// Evaluate against a candidate
    #[must_use]
    pub fn test(&self, candidate: &T) -> bool {
        match self {
            Constraint::Leaf(leaf) => leaf.test(candidate),
            Constraint::Composite(composite) => composite.test(candidate),
        }
    }
}

impl<T> From<Leaf<T>> for Constraint<T> {
    fn from(leaf: Leaf<T>) -> Self {
        Constraint::Leaf(leaf)
    }
}

impl<T> From<Composite<T>> for Constraint<T> {
    fn from(composite: Composite<T>) -> Self {
        Constraint::Composite(composite)
    }
}

/// Evaluate `constraint` against `candidate`
///
/// Pure; equivalent to [`Constraint::test`].
#[must_use]
pub fn evaluate<T: ValueType>(constraint: &Constraint<T>, candidate: &T) -> bool {
    constraint.test(candidate)
}

// =============================================================================
// Tests
// =============================================================================
