// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Manually triggered condition used to interrupt a blocked wait.

use crate::condition::{Waitable, WaiterList};
use crate::context::Context;
use crate::error::Result;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct GuardShared {
    triggered: AtomicBool,
    waiters: WaiterList,
}

impl Waitable for GuardShared {
    fn is_ready(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Reported once per trigger.
    fn consume_ready(&self) -> bool {
        self.triggered.swap(false, Ordering::AcqRel)
    }

    fn waiters(&self) -> &WaiterList {
        &self.waiters
    }
}

/// Guard condition handle. Clones share the same trigger.
#[derive(Clone)]
pub struct GuardCondition {
    shared: Arc<GuardShared>,
    context: Context,
}

impl GuardCondition {
    /// Create an untriggered guard condition.
    pub fn new(context: &Context) -> Result<Self> {
        context.ensure_valid()?;
        Ok(Self {
            shared: Arc::new(GuardShared {
                triggered: AtomicBool::new(false),
                waiters: WaiterList::new(),
            }),
            context: context.clone(),
        })
    }

    /// Trigger the condition, waking any wait set blocked on it.
    ///
    /// Safe to call from any thread.
    pub fn trigger(&self) -> Result<()> {
        self.context.ensure_valid()?;
        self.shared.triggered.store(true, Ordering::Release);
        log::trace!("[guard] triggered");
        self.shared.waiters.notify_all();
        Ok(())
    }

    /// Whether the condition is triggered and not yet reported by a wait.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.shared.is_ready()
    }

    pub(crate) fn waitable(&self) -> Arc<dyn Waitable> {
        Arc::clone(&self.shared) as Arc<dyn Waitable>
    }
}

impl fmt::Debug for GuardCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardCondition")
            .field("triggered", &self.is_triggered())
            .finish()
    }
}
