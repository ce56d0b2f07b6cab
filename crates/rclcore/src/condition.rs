// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Readiness plumbing shared by every waitable entity.
//!
//! A waitable exposes a readiness predicate plus a [`WaiterList`]. While a
//! wait set is blocked it registers its notifier with each attached entity;
//! entities signal the list whenever they transition to ready (sample queued,
//! request queued, guard triggered).

use crate::wake::WakeNotifier;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Predicate evaluated by the wait set for each attached entity.
pub(crate) trait Waitable: Send + Sync {
    /// Whether the entity currently has work (non-consuming).
    fn is_ready(&self) -> bool;

    /// Evaluate readiness for a completed wait.
    ///
    /// Defaults to [`Waitable::is_ready`]; guard conditions override it to
    /// reset their trigger once it has been reported.
    fn consume_ready(&self) -> bool {
        self.is_ready()
    }

    /// Wait sets currently blocked on this entity.
    fn waiters(&self) -> &WaiterList;
}

struct WaiterHook {
    id: u64,
    notifier: Weak<WakeNotifier>,
}

/// Notifiers of the wait sets blocked on one entity.
#[derive(Default)]
pub(crate) struct WaiterList {
    hooks: Mutex<Vec<WaiterHook>>,
}

impl WaiterList {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Register a wait set notifier under the wait set id.
    pub(crate) fn register(&self, id: u64, notifier: &Arc<WakeNotifier>) {
        let mut hooks = self.hooks.lock();
        hooks.retain(|hook| hook.id != id && hook.notifier.strong_count() > 0);
        hooks.push(WaiterHook {
            id,
            notifier: Arc::downgrade(notifier),
        });
    }

    /// Remove the notifier registered under `id`.
    pub(crate) fn unregister(&self, id: u64) {
        self.hooks.lock().retain(|hook| hook.id != id);
    }

    /// Wake every registered wait set, pruning dropped ones.
    pub(crate) fn notify_all(&self) {
        let mut hooks = self.hooks.lock();
        hooks.retain(|hook| {
            if let Some(notifier) = hook.notifier.upgrade() {
                notifier.notify();
                true
            } else {
                false
            }
        });
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.hooks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_reaches_registered_waiters() {
        let list = WaiterList::new();
        let a = Arc::new(WakeNotifier::new());
        let b = Arc::new(WakeNotifier::new());

        list.register(1, &a);
        list.register(2, &b);
        list.notify_all();

        assert!(a.check_and_clear());
        assert!(b.check_and_clear());
    }

    #[test]
    fn unregister_and_reregister_are_idempotent() {
        let list = WaiterList::new();
        let a = Arc::new(WakeNotifier::new());

        list.register(7, &a);
        list.register(7, &a);
        assert_eq!(list.len(), 1);

        list.unregister(7);
        list.notify_all();
        assert!(!a.check_and_clear());
    }

    #[test]
    fn dropped_notifiers_are_pruned() {
        let list = WaiterList::new();
        {
            let gone = Arc::new(WakeNotifier::new());
            list.register(3, &gone);
        }
        list.notify_all();
        assert_eq!(list.len(), 0);
    }
}
