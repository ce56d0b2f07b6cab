// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Guard condition handles.

use crate::error::{fail, status_of};
use crate::handles::{RclHandle, Registry};
use crate::out_ok;
use rclcore::{global, EntityKind, GuardCondition, StatusCode};

pub(crate) static GUARDS: Registry<GuardCondition> = Registry::new(EntityKind::GuardCondition);

/// Create a guard condition in the process-wide context.
///
/// # Safety
/// `out` must be a valid pointer to an `RclHandle`.
#[no_mangle]
pub unsafe extern "C" fn rclcore_guard_condition_create(out: *mut RclHandle) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    let created = global::context()
        .and_then(|context| GuardCondition::new(&context))
        .and_then(|guard| GUARDS.insert(guard));
    match created {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

/// Destroy a guard condition. A second destroy reports `GuardConditionInvalid`.
#[no_mangle]
pub extern "C" fn rclcore_guard_condition_destroy(guard: RclHandle) -> StatusCode {
    status_of(GUARDS.remove(guard).map(drop))
}

/// Trigger a guard condition, waking any wait set it is attached to.
#[no_mangle]
pub extern "C" fn rclcore_guard_condition_trigger(guard: RclHandle) -> StatusCode {
    status_of(GUARDS.get(guard).and_then(|guard| guard.trigger()))
}
