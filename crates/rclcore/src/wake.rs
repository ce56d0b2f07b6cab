// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wake notification used to unblock a waiting wait set.
//!
//! An atomic flag carries the notification; a condvar parks the waiting
//! thread when nothing is pending.
//!
//! Producers (publishers, services, guard triggers, context shutdown) call
//! [`WakeNotifier::notify`]; the single consumer is the wait set blocked in
//! `wait()`.

use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Wake notification with an atomic fast path for the waiter.
#[derive(Debug)]
pub(crate) struct WakeNotifier {
    /// Set by producers, cleared by the waiter
    pending: AtomicBool,
    /// True while the waiter sleeps on the condvar
    sleeping: Mutex<bool>,
    condvar: Condvar,
}

impl WakeNotifier {
    pub(crate) fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            sleeping: Mutex::new(false),
            condvar: Condvar::new(),
        }
    }

    /// Signal the waiter.
    #[inline]
    pub(crate) fn notify(&self) {
        self.pending.store(true, Ordering::Release);

        // The waiter re-checks `pending` under this lock before sleeping
        if *self.sleeping.lock() {
            self.condvar.notify_one();
        }
    }

    /// Consume a pending notification without blocking.
    #[inline]
    pub(crate) fn check_and_clear(&self) -> bool {
        self.pending.swap(false, Ordering::Acquire)
    }

    /// Block until notified or until `timeout` elapses (`None` = forever).
    ///
    /// Returns `true` if a notification was consumed.
    pub(crate) fn wait(&self, timeout: Option<Duration>) -> bool {
        if self.check_and_clear() {
            return true;
        }

        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));
        let mut sleeping = self.sleeping.lock();

        loop {
            if self.check_and_clear() {
                *sleeping = false;
                return true;
            }

            *sleeping = true;
            match (timeout, deadline) {
                (Some(_), Some(deadline)) => {
                    if self.condvar.wait_until(&mut sleeping, deadline).timed_out() {
                        *sleeping = false;
                        return self.check_and_clear();
                    }
                }
                // No timeout, or one too large to represent as an Instant
                _ => self.condvar.wait(&mut sleeping),
            }
        }
    }
}

impl Default for WakeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn pending_notification_is_consumed_once() {
        let notifier = WakeNotifier::new();

        assert!(!notifier.check_and_clear());
        notifier.notify();
        assert!(notifier.check_and_clear());
        assert!(!notifier.check_and_clear());
    }

    #[test]
    fn notify_wakes_blocked_waiter() {
        let notifier = Arc::new(WakeNotifier::new());
        let n = Arc::clone(&notifier);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            n.notify();
        });

        let start = Instant::now();
        let woken = notifier.wait(Some(Duration::from_secs(5)));
        let elapsed = start.elapsed();

        assert!(woken, "should be woken by notify");
        assert!(elapsed < Duration::from_secs(2), "should wake promptly");

        handle.join().expect("notifier thread");
    }

    #[test]
    fn infinite_wait_returns_after_notify() {
        let notifier = Arc::new(WakeNotifier::new());
        let n = Arc::clone(&notifier);

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            n.notify();
        });

        assert!(notifier.wait(None));
        handle.join().expect("notifier thread");
    }

    #[test]
    fn timeout_without_notify() {
        let notifier = WakeNotifier::new();

        let start = Instant::now();
        let woken = notifier.wait(Some(Duration::from_millis(10)));
        let elapsed = start.elapsed();

        assert!(!woken, "should time out without notify");
        assert!(elapsed >= Duration::from_millis(9));
    }

    #[test]
    fn zero_timeout_polls() {
        let notifier = WakeNotifier::new();
        assert!(!notifier.wait(Some(Duration::ZERO)));

        notifier.notify();
        assert!(notifier.wait(Some(Duration::ZERO)));
    }
}
