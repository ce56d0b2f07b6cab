// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Wait set handles.
//!
//! Each add call reports the slot index through `out_index`; after
//! `rclcore_wait` returns `Ok` the `*_ready` queries take that index. A
//! `rclcore_wait_set_clear` invalidates every index handed out before it.

use crate::error::{fail, status_of};
use crate::guard::GUARDS;
use crate::handles::{RclHandle, Registry};
use crate::out_ok;
use crate::pubsub::SUBSCRIPTIONS;
use crate::rpc::{CLIENTS, SERVICES};
use parking_lot::Mutex;
use rclcore::{
    duration_from_nanos, global, EntityKind, Error, StatusCode, WaitSet, WaitSetCapacity,
    WaitStatus,
};
use std::sync::Arc;

static WAIT_SETS: Registry<Arc<Mutex<WaitSet>>> = Registry::new(EntityKind::WaitSet);

/// Create a wait set in the process-wide context with per-kind capacities.
///
/// # Safety
/// `out` must be a valid pointer to an `RclHandle`.
#[no_mangle]
pub unsafe extern "C" fn rclcore_wait_set_create(
    out: *mut RclHandle,
    subscriptions: usize,
    guard_conditions: usize,
    timers: usize,
    clients: usize,
    services: usize,
    events: usize,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    let capacity = WaitSetCapacity::new(
        subscriptions,
        guard_conditions,
        timers,
        clients,
        services,
        events,
    );
    let created = global::context()
        .and_then(|context| WaitSet::new(&context, capacity))
        .and_then(|wait_set| WAIT_SETS.insert(Arc::new(Mutex::new(wait_set))));
    match created {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

#[no_mangle]
pub extern "C" fn rclcore_wait_set_destroy(wait_set: RclHandle) -> StatusCode {
    status_of(WAIT_SETS.remove(wait_set).map(drop))
}

/// Empty every slot, keeping the capacities.
#[no_mangle]
pub extern "C" fn rclcore_wait_set_clear(wait_set: RclHandle) -> StatusCode {
    status_of(WAIT_SETS.get(wait_set).map(|wait_set| wait_set.lock().clear()))
}

fn add_to(
    wait_set: RclHandle,
    out_index: *mut usize,
    add: impl FnOnce(&mut WaitSet) -> Result<usize, Error>,
) -> StatusCode {
    let added = WAIT_SETS
        .get(wait_set)
        .and_then(|wait_set| add(&mut wait_set.lock()));
    match added {
        Ok(index) if !out_index.is_null() => out_ok(out_index, index),
        Ok(_) => StatusCode::Ok,
        Err(err) => fail(err),
    }
}

/// Add a subscription; `out_index` (nullable) receives its slot.
///
/// # Safety
/// `out_index` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclcore_wait_set_add_subscription(
    wait_set: RclHandle,
    subscription: RclHandle,
    out_index: *mut usize,
) -> StatusCode {
    add_to(wait_set, out_index, |ws| {
        ws.add_subscription(&*SUBSCRIPTIONS.get(subscription)?)
    })
}

/// Add a guard condition; `out_index` (nullable) receives its slot.
///
/// # Safety
/// `out_index` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclcore_wait_set_add_guard_condition(
    wait_set: RclHandle,
    guard_condition: RclHandle,
    out_index: *mut usize,
) -> StatusCode {
    add_to(wait_set, out_index, |ws| {
        ws.add_guard_condition(&GUARDS.get(guard_condition)?)
    })
}

/// Add a client; `out_index` (nullable) receives its slot.
///
/// # Safety
/// `out_index` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclcore_wait_set_add_client(
    wait_set: RclHandle,
    client: RclHandle,
    out_index: *mut usize,
) -> StatusCode {
    add_to(wait_set, out_index, |ws| ws.add_client(&*CLIENTS.get(client)?))
}

/// Add a service; `out_index` (nullable) receives its slot.
///
/// # Safety
/// `out_index` must be a valid pointer or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclcore_wait_set_add_service(
    wait_set: RclHandle,
    service: RclHandle,
    out_index: *mut usize,
) -> StatusCode {
    add_to(wait_set, out_index, |ws| ws.add_service(&*SERVICES.get(service)?))
}

/// Block until an added entity is ready or the timeout elapses.
///
/// A negative `timeout_ns` waits forever, zero polls. Returns `Ok` when at
/// least one entity is ready and `Timeout` otherwise.
#[no_mangle]
pub extern "C" fn rclcore_wait(wait_set: RclHandle, timeout_ns: i64) -> StatusCode {
    let waited = WAIT_SETS
        .get(wait_set)
        .and_then(|wait_set| wait_set.lock().wait(duration_from_nanos(timeout_ns)));
    match waited {
        Ok(WaitStatus::Ready) => StatusCode::Ok,
        Ok(WaitStatus::Timeout) => StatusCode::Timeout,
        Err(err) => fail(err),
    }
}

fn is_ready(wait_set: RclHandle, index: i32, query: impl FnOnce(&WaitSet, usize) -> bool) -> bool {
    let Ok(index) = usize::try_from(index) else {
        return false;
    };
    WAIT_SETS
        .get(wait_set)
        .map(|wait_set| query(&wait_set.lock(), index))
        .unwrap_or(false)
}

/// Readiness of the subscription slot `index` after the last wait.
///
/// False for negative or unassigned indices and invalid handles.
#[no_mangle]
pub extern "C" fn rclcore_wait_set_subscription_ready(wait_set: RclHandle, index: i32) -> bool {
    is_ready(wait_set, index, WaitSet::is_subscription_ready)
}

#[no_mangle]
pub extern "C" fn rclcore_wait_set_guard_condition_ready(wait_set: RclHandle, index: i32) -> bool {
    is_ready(wait_set, index, WaitSet::is_guard_condition_ready)
}

#[no_mangle]
pub extern "C" fn rclcore_wait_set_client_ready(wait_set: RclHandle, index: i32) -> bool {
    is_ready(wait_set, index, WaitSet::is_client_ready)
}

#[no_mangle]
pub extern "C" fn rclcore_wait_set_service_ready(wait_set: RclHandle, index: i32) -> bool {
    is_ready(wait_set, index, WaitSet::is_service_ready)
}
