// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed wait cycle.
//!
//! [`WaitCycle`] mutably borrows its [`WaitSet`] for lifetime `'ws` and every
//! [`Slot`] it hands out carries that lifetime. Clearing the wait set needs a
//! fresh `&mut` borrow, so a slot cannot be used past the next clear:
//!
//! ```compile_fail
//! use rclcore::{Context, ContextOptions, GuardCondition, WaitSet, WaitSetCapacity};
//!
//! let context = Context::new(ContextOptions::default()).unwrap();
//! let guard = GuardCondition::new(&context).unwrap();
//! let mut wait_set = WaitSet::new(&context, WaitSetCapacity::new(0, 1, 0, 0, 0, 0)).unwrap();
//!
//! let mut cycle = wait_set.begin_cycle();
//! let slot = cycle.add_guard_condition(&guard).unwrap();
//! wait_set.clear();
//! let _ = cycle.is_ready(slot);
//! ```
//!
//! Within one cycle the same code works:
//!
//! ```
//! use rclcore::{Context, ContextOptions, GuardCondition, WaitSet, WaitSetCapacity, WaitStatus};
//! use std::time::Duration;
//!
//! let context = Context::new(ContextOptions::default()).unwrap();
//! let guard = GuardCondition::new(&context).unwrap();
//! let mut wait_set = WaitSet::new(&context, WaitSetCapacity::new(0, 1, 0, 0, 0, 0)).unwrap();
//!
//! let mut cycle = wait_set.begin_cycle();
//! let slot = cycle.add_guard_condition(&guard).unwrap();
//! guard.trigger().unwrap();
//! assert_eq!(cycle.wait(Some(Duration::from_secs(1))).unwrap(), WaitStatus::Ready);
//! assert!(cycle.is_ready(slot).unwrap());
//! ```

use super::{WaitSet, WaitStatus, WaitableKind};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::guard_condition::GuardCondition;
use crate::service::Service;
use crate::subscription::Subscription;
use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

mod private {
    pub trait Sealed {}
}

/// Marker types naming the entity kind held by a [`Slot`].
pub mod slot_kind {
    /// Subscription slot
    #[derive(Debug)]
    pub enum Subscription {}
    /// Guard condition slot
    #[derive(Debug)]
    pub enum GuardCondition {}
    /// Client slot
    #[derive(Debug)]
    pub enum Client {}
    /// Service slot
    #[derive(Debug)]
    pub enum Service {}
}

/// Entity kind carried by a slot token.
pub trait SlotKind: private::Sealed {
    const KIND: WaitableKind;
}

macro_rules! slot_kinds {
    ($($marker:ident => $kind:ident),+ $(,)?) => {
        $(
            impl private::Sealed for slot_kind::$marker {}
            impl SlotKind for slot_kind::$marker {
                const KIND: WaitableKind = WaitableKind::$kind;
            }
        )+
    };
}

slot_kinds! {
    Subscription => Subscription,
    GuardCondition => GuardCondition,
    Client => Client,
    Service => Service,
}

/// Slot token valid for one wait cycle.
pub struct Slot<'ws, K: SlotKind> {
    index: usize,
    wait_set: u64,
    cycle: u64,
    _marker: PhantomData<(&'ws (), fn() -> K)>,
}

impl<K: SlotKind> Slot<'_, K> {
    /// Index the slot occupies in the index-based API.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl<K: SlotKind> Clone for Slot<'_, K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K: SlotKind> Copy for Slot<'_, K> {}

impl<K: SlotKind> fmt::Debug for Slot<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Slot({} #{})", K::KIND, self.index)
    }
}

/// One clear-add-wait-query pass over a [`WaitSet`].
pub struct WaitCycle<'ws> {
    wait_set: &'ws mut WaitSet,
}

impl<'ws> WaitCycle<'ws> {
    pub(super) fn new(wait_set: &'ws mut WaitSet) -> Self {
        Self { wait_set }
    }

    fn slot<K: SlotKind>(&self, index: usize) -> Slot<'ws, K> {
        Slot {
            index,
            wait_set: self.wait_set.id(),
            cycle: self.wait_set.cycle(),
            _marker: PhantomData,
        }
    }

    pub fn add_subscription(
        &mut self,
        subscription: &Subscription,
    ) -> Result<Slot<'ws, slot_kind::Subscription>> {
        let index = self.wait_set.add_subscription(subscription)?;
        Ok(self.slot(index))
    }

    pub fn add_guard_condition(
        &mut self,
        guard: &GuardCondition,
    ) -> Result<Slot<'ws, slot_kind::GuardCondition>> {
        let index = self.wait_set.add_guard_condition(guard)?;
        Ok(self.slot(index))
    }

    pub fn add_client(&mut self, client: &Client) -> Result<Slot<'ws, slot_kind::Client>> {
        let index = self.wait_set.add_client(client)?;
        Ok(self.slot(index))
    }

    pub fn add_service(&mut self, service: &Service) -> Result<Slot<'ws, slot_kind::Service>> {
        let index = self.wait_set.add_service(service)?;
        Ok(self.slot(index))
    }

    /// See [`WaitSet::wait`].
    pub fn wait(&mut self, timeout: Option<Duration>) -> Result<WaitStatus> {
        self.wait_set.wait(timeout)
    }

    /// Readiness of `slot` after the last wait.
    ///
    /// Fails with [`Error::StaleSlot`] for a slot issued by another wait set.
    pub fn is_ready<K: SlotKind>(&self, slot: Slot<'ws, K>) -> Result<bool> {
        if slot.wait_set != self.wait_set.id() || slot.cycle != self.wait_set.cycle() {
            return Err(Error::StaleSlot);
        }
        Ok(self.wait_set.slot_ready(K::KIND, slot.index))
    }
}
