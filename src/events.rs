//! Change listeners for a single value
//!
//! Every listener has the canonical `(old, new)` shape. The new-value-only form
//! is an adapter that drops `old`.

use crate::sync::RwLockExt;
use std::sync::{Arc, RwLock};

/// Type alias for a change callback receiving `(old, new)`
pub type ChangeCallback<T> = Arc<dyn Fn(&T, &T) + Send + Sync>;

/// Ordered list of change callbacks
pub(crate) struct Listeners<T> {
    callbacks: RwLock<Vec<ChangeCallback<T>>>,
}

impl<T> Listeners<T> {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: RwLock::new(Vec::new()),
        }
    }

    /// Register a listener receiving (`old_value`, `new_value`)
    pub(crate) fn on_change<F>(&self, callback: F)
    where
        F: Fn(&T, &T) + Send + Sync + 'static,
    {
        self.push(Arc::new(callback));
    }

    /// Register a listener receiving only the new value
    pub(crate) fn on_value<F>(&self, callback: F)
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_change(move |_old, new| callback(new));
    }

    pub(crate) fn push(&self, callback: ChangeCallback<T>) {
        self.callbacks.write_recovered().push(callback);
    }

    /// Call every listener in registration order
    ///
    /// Works on a snapshot, so a listener may register further listeners;
    /// those only see later changes.
    pub(crate) fn notify(&self, old_value: &T, new_value: &T) {
        let snapshot: Vec<ChangeCallback<T>> = self.callbacks.read_recovered().clone();
        for callback in &snapshot {
            callback(old_value, new_value);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.callbacks.read_recovered().len()
    }
}

// =============================================================================
// Tests
// =============================================================================
