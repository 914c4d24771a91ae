//! Typed leaf values
//!
//! A [`Value<T>`] holds a default, a current value, an optional constraint,
//! an ordered listener list and a finality flag. Its only externally visible
//! state change is [`set_value`](Value::set_value):
//!
//! 1. a final value rejects every candidate;
//! 2. the constraint (if any) must accept the candidate;
//! 3. `current` is replaced;
//! 4. listeners run in registration order with `(old, new)`.
//!
//! Rejection is reported through the returned `bool`, never as an error.
//!
//! # Defaults are not validated
//!
//! The default is stored as-is and is not checked against the constraint,
//! neither at construction nor when a constraint is added later. A schema may
//! seed an out-of-range placeholder that callers must replace before use.
//!
//! # Concurrency
//!
//! One assignment lock per value is held across check, write and notify, so
//! concurrent `set_value` calls are serialized and listeners observe changes
//! in order. `current` is released before listeners run, which lets a
//! listener call [`get`](Value::get) or [`set_final`](Value::set_final).
//! Calling `set_value` on the same value from inside one of its own listeners
//! deadlocks.

use crate::constraint::Constraint;
use crate::error::Result;
use crate::events::Listeners;
use crate::sync::{MutexExt, RwLockExt};
use crate::tree::Node;
use crate::types::{Aggregate, TypeTag, ValueType};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock, RwLock, Weak};

/// Typed leaf of a configuration tree
pub struct Value<T: ValueType> {
    name: String,
    comment: Option<String>,
    default: T,
    element_type: Option<TypeTag>,
    current: RwLock<T>,
    constraint: RwLock<Option<Constraint<T>>>,
    finalized: AtomicBool,
    listeners: Listeners<T>,
    assignment: Mutex<()>,
    pub(crate) parent: OnceLock<Weak<Node>>,
}

impl<T: ValueType> Value<T> {
    /// Create a detached value with `current = default`
    ///
    /// # Errors
    ///
    /// Returns an error if `constraint` does not fit `T` (see [`Constraint::check`]).
    pub fn new(
        name: impl Into<String>,
        comment: Option<String>,
        default: T,
        constraint: Option<Constraint<T>>,
        finalized: bool,
    ) -> Result<Arc<Self>> {
        if let Some(ref constraint) = constraint {
            constraint.check(T::TYPE)?;
        }

        Ok(Arc::new(Self {
            name: name.into(),
            comment,
            current: RwLock::new(default.clone()),
            default,
            element_type: T::element_type(),
            constraint: RwLock::new(constraint),
            finalized: AtomicBool::new(finalized),
            listeners: Listeners::new(),
            assignment: Mutex::new(()),
            parent: OnceLock::new(),
        }))
    }

    // =========================================================================
    // Read accessors
    // =========================================================================

    /// Name used for lookup within the parent node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description for serializers
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Current value (cloned)
    pub fn get(&self) -> T {
        self.current.read_recovered().clone()
    }

    /// Run `f` against the current value without cloning it
    pub fn with_current<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.current.read_recovered())
    }

    /// Default the value was created with; never validated
    pub fn default_value(&self) -> &T {
        &self.default
    }

    /// Runtime tag of `T`
    pub fn type_tag(&self) -> TypeTag {
        T::TYPE
    }

    /// Element tag for aggregate values, `None` for scalars
    pub fn element_type(&self) -> Option<TypeTag> {
        self.element_type
    }

    /// Whether [`set_final(true)`](Value::set_final) has been called
    pub fn is_final(&self) -> bool {
        self.finalized.load(Ordering::Acquire)
    }

    /// Copy of the attached constraint, if any
    pub fn constraint(&self) -> Option<Constraint<T>> {
        self.constraint.read_recovered().clone()
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Node this value is attached to, if any and still alive
    pub fn parent(&self) -> Option<Arc<Node>> {
        self.parent.get().and_then(Weak::upgrade)
    }

    /// Dotted path from the root (unnamed nodes are skipped)
    pub fn path(&self) -> String {
        match self.parent().map(|p| p.path()) {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}.{}", self.name),
            _ => self.name.clone(),
        }
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Validated assignment
    ///
    /// Returns `false` without any effect when the value is final or the
    /// constraint rejects `candidate`. On success `current` is replaced before
    /// listeners run; a panicking listener propagates to the caller, the write
    /// stays in place and later listeners are skipped.
    pub fn set_value(&self, candidate: T) -> bool {
        let _assignment = self.assignment.lock_recovered();

        if self.is_final() {
            log::debug!("Rejected assignment to final value '{}'", self.name);
            return false;
        }

        let accepted = self
            .constraint
            .read_recovered()
            .as_ref()
            .is_none_or(|constraint| constraint.test(&candidate));
        if !accepted {
            log::debug!("Constraint rejected candidate for '{}'", self.name);
            return false;
        }

        let old = {
            let mut current = self.current.write_recovered();
            // set_final may have raced in since the first check
            if self.is_final() {
                log::debug!("Rejected assignment to final value '{}'", self.name);
                return false;
            }
            std::mem::replace(&mut *current, candidate.clone())
        };

        log::trace!("Assigned new value to '{}'", self.name);
        self.listeners.notify(&old, &candidate);
        true
    }

    /// Validated assignment of the default value
    pub fn reset_to_default(&self) -> bool {
        self.set_value(self.default.clone())
    }

    /// Lock the value against further assignment
    ///
    /// `set_final(true)` is irreversible. `set_final(false)` is a no-op in
    /// every state: it neither unlocks a final value nor changes a mutable one.
    pub fn set_final(&self, finalized: bool) {
        if !finalized {
            if self.is_final() {
                log::debug!("Ignoring attempt to unfinalize '{}'", self.name);
            }
            return;
        }

        let _current = self.current.write_recovered();
        if !self.finalized.swap(true, Ordering::AcqRel) {
            log::debug!("Value '{}' is now final", self.name);
        }
    }

    /// Replace the constraint
    ///
    /// `current` is not re-validated.
    ///
    /// # Errors
    ///
    /// Returns an error if `constraint` does not fit `T`.
    pub fn set_constraint(&self, constraint: Constraint<T>) -> Result<()> {
        constraint.check(T::TYPE)?;
        *self.constraint.write_recovered() = Some(constraint);
        Ok(())
    }

    /// Conjoin a constraint onto the existing one
    ///
    /// `current` is not re-validated.
    ///
    /// # Errors
    ///
    /// Returns an error if `constraint` does not fit `T`.
    pub fn add_constraint(&self, constraint: Constraint<T>) -> Result<()> {
        constraint.check(T::TYPE)?;
        let mut slot = self.constraint.write_recovered();
        *slot = Some(match slot.take() {
            Some(existing) => existing.and(constraint),
            None => constraint,
        });
        Ok(())
    }

    /// Register a listener receiving `(old, new)` on every accepted assignment
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.listeners.on_change(listener);
    }

    /// Register a listener receiving only the new value
    pub fn add_value_listener<F>(&self, listener: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.listeners.on_value(listener);
    }

    pub(crate) fn push_listener(&self, listener: crate::events::ChangeCallback<T>) {
        self.listeners.push(listener);
    }
}

impl<T: Aggregate> Value<T> {
    /// Number of elements currently held
    pub fn size(&self) -> usize {
        self.current.read_recovered().size()
    }
}

impl<T: ValueType + fmt::Debug> fmt::Debug for Value<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("name", &self.name)
            .field("comment", &self.comment)
            .field("type", &T::TYPE)
            .field("element_type", &self.element_type)
            .field("current", &*self.current.read_recovered())
            .field("default", &self.default)
            .field("final", &self.is_final())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
