// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! WaitSet - capacity-bounded aggregation of waitable entities.
//!
//! A wait set is sized once, then reused across cycles:
//!
//! 1. `clear()` empties every slot (capacities unchanged)
//! 2. `add_*` appends the entity to the next free slot of its kind and
//!    returns the slot index, or `CapacityExceeded` when the kind is full
//! 3. `wait(timeout)` blocks until an attached entity has work, the timeout
//!    elapses or the context shuts down
//! 4. `is_*_ready(index)` reports the outcome per slot; indices past the
//!    number of attached entities (or past the capacity) are simply not ready
//!
//! The index API mirrors the array-of-slots shape of the C boundary. Rust
//! callers can use [`WaitSet::begin_cycle`] instead, whose [`Slot`] tokens
//! borrow the wait set so that using a token after the next clear does not
//! compile.
//!
//! Timers and events are accepted as capacities but cannot be attached.

mod cycle;

pub use cycle::{slot_kind, Slot, SlotKind, WaitCycle};

use crate::client::Client;
use crate::condition::Waitable;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::guard_condition::GuardCondition;
use crate::service::Service;
use crate::subscription::Subscription;
use crate::wake::WakeNotifier;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

static NEXT_WAIT_SET_ID: AtomicU64 = AtomicU64::new(1);

/// Kinds of entity a wait set reserves slots for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaitableKind {
    Subscription,
    GuardCondition,
    Timer,
    Client,
    Service,
    Event,
}

impl WaitableKind {
    /// Every kind, in slot-table order.
    pub const ALL: [WaitableKind; 6] = [
        WaitableKind::Subscription,
        WaitableKind::GuardCondition,
        WaitableKind::Timer,
        WaitableKind::Client,
        WaitableKind::Service,
        WaitableKind::Event,
    ];

    const fn table_index(self) -> usize {
        match self {
            WaitableKind::Subscription => 0,
            WaitableKind::GuardCondition => 1,
            WaitableKind::Timer => 2,
            WaitableKind::Client => 3,
            WaitableKind::Service => 4,
            WaitableKind::Event => 5,
        }
    }
}

impl fmt::Display for WaitableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WaitableKind::Subscription => "subscription",
            WaitableKind::GuardCondition => "guard condition",
            WaitableKind::Timer => "timer",
            WaitableKind::Client => "client",
            WaitableKind::Service => "service",
            WaitableKind::Event => "event",
        };
        f.write_str(name)
    }
}

/// Maximum number of entities of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WaitSetCapacity {
    pub subscriptions: usize,
    pub guard_conditions: usize,
    pub timers: usize,
    pub clients: usize,
    pub services: usize,
    pub events: usize,
}

impl WaitSetCapacity {
    #[must_use]
    pub const fn new(
        subscriptions: usize,
        guard_conditions: usize,
        timers: usize,
        clients: usize,
        services: usize,
        events: usize,
    ) -> Self {
        Self {
            subscriptions,
            guard_conditions,
            timers,
            clients,
            services,
            events,
        }
    }

    /// Capacity reserved for `kind`.
    #[must_use]
    pub const fn of(&self, kind: WaitableKind) -> usize {
        match kind {
            WaitableKind::Subscription => self.subscriptions,
            WaitableKind::GuardCondition => self.guard_conditions,
            WaitableKind::Timer => self.timers,
            WaitableKind::Client => self.clients,
            WaitableKind::Service => self.services,
            WaitableKind::Event => self.events,
        }
    }

    /// Whether no slot of any kind is reserved.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.subscriptions == 0
            && self.guard_conditions == 0
            && self.timers == 0
            && self.clients == 0
            && self.services == 0
            && self.events == 0
    }
}

/// Outcome of a successful wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitStatus {
    /// At least one attached entity has work
    Ready,
    /// The timeout elapsed with nothing ready
    Timeout,
}

/// Convert a C-style nanosecond timeout: negative blocks forever.
#[must_use]
pub fn duration_from_nanos(timeout_ns: i64) -> Option<Duration> {
    u64::try_from(timeout_ns).ok().map(Duration::from_nanos)
}

#[derive(Default)]
struct SlotTable {
    entities: Vec<Arc<dyn Waitable>>,
    ready: Vec<bool>,
}

/// Wait set holding references to the entities of one wait cycle.
pub struct WaitSet {
    id: u64,
    context: Context,
    capacity: WaitSetCapacity,
    /// Incremented by every clear
    cycle: u64,
    tables: [SlotTable; 6],
    notifier: Arc<WakeNotifier>,
}

impl WaitSet {
    /// Create a wait set with fixed capacities.
    ///
    /// All-zero capacities are accepted; waiting on such a set fails with
    /// [`Error::WaitSetEmpty`].
    pub fn new(context: &Context, capacity: WaitSetCapacity) -> Result<Self> {
        context.ensure_valid()?;
        let id = NEXT_WAIT_SET_ID.fetch_add(1, Ordering::Relaxed);
        log::debug!("[waitset] #{} created with {:?}", id, capacity);
        Ok(Self {
            id,
            context: context.clone(),
            capacity,
            cycle: 0,
            tables: Default::default(),
            notifier: Arc::new(WakeNotifier::new()),
        })
    }

    #[must_use]
    pub fn capacity(&self) -> WaitSetCapacity {
        self.capacity
    }

    /// Number of entities of `kind` attached in the current cycle.
    #[must_use]
    pub fn len(&self, kind: WaitableKind) -> usize {
        self.tables[kind.table_index()].entities.len()
    }

    /// Whether no entity of any kind is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|table| table.entities.is_empty())
    }

    /// Detach every entity and forget the readiness of the last wait.
    pub fn clear(&mut self) {
        for table in &mut self.tables {
            table.entities.clear();
            table.ready.clear();
        }
        self.cycle = self.cycle.wrapping_add(1);
    }

    fn attach(&mut self, kind: WaitableKind, entity: Arc<dyn Waitable>) -> Result<usize> {
        let capacity = self.capacity.of(kind);
        let table = &mut self.tables[kind.table_index()];
        if table.entities.len() >= capacity {
            return Err(Error::CapacityExceeded { kind, capacity });
        }
        table.entities.push(entity);
        table.ready.push(false);
        Ok(table.entities.len() - 1)
    }

    /// Attach a subscription; returns its slot index for this cycle.
    pub fn add_subscription(&mut self, subscription: &Subscription) -> Result<usize> {
        self.attach(WaitableKind::Subscription, subscription.waitable())
    }

    /// Attach a guard condition; returns its slot index for this cycle.
    pub fn add_guard_condition(&mut self, guard: &GuardCondition) -> Result<usize> {
        self.attach(WaitableKind::GuardCondition, guard.waitable())
    }

    /// Attach a client; returns its slot index for this cycle.
    pub fn add_client(&mut self, client: &Client) -> Result<usize> {
        self.attach(WaitableKind::Client, client.waitable())
    }

    /// Attach a service; returns its slot index for this cycle.
    pub fn add_service(&mut self, service: &Service) -> Result<usize> {
        self.attach(WaitableKind::Service, service.waitable())
    }

    /// Evaluate every attached entity; returns whether any is ready.
    fn collect_ready(&mut self) -> bool {
        let mut any = false;
        for table in &mut self.tables {
            for (entity, ready) in table.entities.iter().zip(table.ready.iter_mut()) {
                *ready = entity.consume_ready();
                any |= *ready;
            }
        }
        any
    }

    fn register_waiters(&self) {
        self.context
            .shared()
            .shutdown_waiters
            .register(self.id, &self.notifier);
        for table in &self.tables {
            for entity in &table.entities {
                entity.waiters().register(self.id, &self.notifier);
            }
        }
    }

    fn unregister_waiters(&self) {
        self.context.shared().shutdown_waiters.unregister(self.id);
        for table in &self.tables {
            for entity in &table.entities {
                entity.waiters().unregister(self.id);
            }
        }
    }

    /// Block until an attached entity is ready or `timeout` elapses.
    ///
    /// `None` blocks indefinitely, `Some(Duration::ZERO)` polls.
    pub fn wait(&mut self, timeout: Option<Duration>) -> Result<WaitStatus> {
        if self.capacity.is_zero() {
            return Err(Error::WaitSetEmpty);
        }
        self.context.ensure_valid()?;

        // Hooks go in before the first evaluation so a wake between the
        // check and the sleep is not lost.
        self.notifier.check_and_clear();
        self.register_waiters();
        let result = self.wait_registered(timeout);
        self.unregister_waiters();

        if let Ok(status) = &result {
            log::trace!("[waitset] #{} wait -> {:?}", self.id, status);
        }
        result
    }

    fn wait_registered(&mut self, timeout: Option<Duration>) -> Result<WaitStatus> {
        let deadline = timeout.and_then(|t| Instant::now().checked_add(t));

        loop {
            if self.collect_ready() {
                return Ok(WaitStatus::Ready);
            }
            if !self.context.is_valid() {
                return Err(Error::NotInit);
            }

            let remaining = match (timeout, deadline) {
                (Some(_), Some(deadline)) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Ok(WaitStatus::Timeout);
                    }
                    Some(deadline - now)
                }
                (Some(t), None) if t.is_zero() => return Ok(WaitStatus::Timeout),
                _ => None,
            };

            self.notifier.wait(remaining);
        }
    }

    fn slot_ready(&self, kind: WaitableKind, index: usize) -> bool {
        self.tables[kind.table_index()]
            .ready
            .get(index)
            .copied()
            .unwrap_or(false)
    }

    /// Whether the subscription at `index` was ready after the last wait.
    #[must_use]
    pub fn is_subscription_ready(&self, index: usize) -> bool {
        self.slot_ready(WaitableKind::Subscription, index)
    }

    /// Whether the guard condition at `index` was triggered in the last wait.
    #[must_use]
    pub fn is_guard_condition_ready(&self, index: usize) -> bool {
        self.slot_ready(WaitableKind::GuardCondition, index)
    }

    /// Whether the client at `index` had a response after the last wait.
    #[must_use]
    pub fn is_client_ready(&self, index: usize) -> bool {
        self.slot_ready(WaitableKind::Client, index)
    }

    /// Whether the service at `index` had a request after the last wait.
    #[must_use]
    pub fn is_service_ready(&self, index: usize) -> bool {
        self.slot_ready(WaitableKind::Service, index)
    }

    /// Start a typed wait cycle; clears the set first.
    pub fn begin_cycle(&mut self) -> WaitCycle<'_> {
        self.clear();
        WaitCycle::new(self)
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn cycle(&self) -> u64 {
        self.cycle
    }
}

impl Drop for WaitSet {
    fn drop(&mut self) {
        log::debug!("[waitset] #{} destroyed", self.id);
    }
}

impl fmt::Debug for WaitSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WaitSet")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("cycle", &self.cycle)
            .finish()
    }
}
