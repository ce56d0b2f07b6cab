// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Handle validation: stale and foreign handles, null pointers, bad names.

use rclcore_c::*;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;

fn init() {
    assert_eq!(rclcore_init(), StatusCode::Ok);
}

#[test]
fn test_destroyed_handles_are_rejected() {
    init();
    let mut guard = RclHandle::NULL;
    assert_eq!(unsafe { rclcore_guard_condition_create(&mut guard) }, StatusCode::Ok);
    assert_eq!(rclcore_guard_condition_destroy(guard), StatusCode::Ok);

    assert_eq!(
        rclcore_guard_condition_destroy(guard),
        StatusCode::GuardConditionInvalid
    );
    assert_eq!(
        rclcore_guard_condition_trigger(guard),
        StatusCode::GuardConditionInvalid
    );

    // Null handles behave like stale ones
    assert_eq!(rclcore_node_destroy(RclHandle::NULL), StatusCode::NodeInvalid);
    assert_eq!(rclcore_publisher_destroy(RclHandle::NULL), StatusCode::PublisherInvalid);
    assert_eq!(rclcore_wait(RclHandle::NULL, 0), StatusCode::WaitSetInvalid);
    assert!(!rclcore_wait_set_guard_condition_ready(RclHandle::NULL, 0));
}

#[test]
fn test_wrong_kind_handle_is_rejected() {
    init();
    let mut guard = RclHandle::NULL;
    assert_eq!(unsafe { rclcore_guard_condition_create(&mut guard) }, StatusCode::Ok);
    let mut wait_set = RclHandle::NULL;
    assert_eq!(
        unsafe { rclcore_wait_set_create(&mut wait_set, 1, 1, 0, 0, 0, 0) },
        StatusCode::Ok
    );

    // A guard handle means nothing to the subscription arena
    assert_eq!(
        unsafe { rclcore_wait_set_add_subscription(wait_set, guard, std::ptr::null_mut()) },
        StatusCode::SubscriptionInvalid
    );
    assert_eq!(
        unsafe { rclcore_wait_set_add_subscription(wait_set, RclHandle(u64::MAX), std::ptr::null_mut()) },
        StatusCode::SubscriptionInvalid
    );

    let mut index = usize::MAX;
    assert_eq!(
        unsafe { rclcore_wait_set_add_guard_condition(wait_set, guard, &mut index) },
        StatusCode::Ok
    );
    assert_eq!(
        unsafe { rclcore_wait_set_add_guard_condition(wait_set, guard, &mut index) },
        StatusCode::WaitSetFull
    );

    assert_eq!(rclcore_guard_condition_trigger(guard), StatusCode::Ok);
    assert_eq!(rclcore_wait(wait_set, 0), StatusCode::Ok);
    assert!(rclcore_wait_set_guard_condition_ready(wait_set, 0));
    assert!(!rclcore_wait_set_guard_condition_ready(wait_set, -3));

    assert_eq!(rclcore_wait_set_destroy(wait_set), StatusCode::Ok);
    assert_eq!(rclcore_guard_condition_destroy(guard), StatusCode::Ok);
}

#[test]
fn test_zero_capacity_wait_set() {
    init();
    let mut wait_set = RclHandle::NULL;
    assert_eq!(
        unsafe { rclcore_wait_set_create(&mut wait_set, 0, 0, 0, 0, 0, 0) },
        StatusCode::Ok
    );
    assert_eq!(rclcore_wait(wait_set, 0), StatusCode::WaitSetEmpty);
    assert_eq!(rclcore_wait_set_destroy(wait_set), StatusCode::Ok);
}

#[test]
fn test_invalid_names_and_arguments() {
    init();
    let bad = CString::new("1starts_with_digit").unwrap();
    let mut node = RclHandle::NULL;
    assert_eq!(
        unsafe { rclcore_node_create(&mut node, bad.as_ptr(), std::ptr::null()) },
        StatusCode::NodeInvalidName
    );
    assert!(node.is_null());

    let mut buffer = [0 as c_char; 128];
    assert_eq!(
        unsafe { rclcore_get_error_string(buffer.as_mut_ptr(), buffer.len() as i32) },
        StatusCode::Ok
    );
    let message = unsafe { CStr::from_ptr(buffer.as_ptr()) }.to_string_lossy();
    assert!(message.contains("1starts_with_digit"), "{message}");

    // Truncated copy stays NUL-terminated
    let mut tiny = [0x55 as c_char; 6];
    assert_eq!(
        unsafe { rclcore_get_error_string(tiny.as_mut_ptr(), tiny.len() as i32) },
        StatusCode::Ok
    );
    assert_eq!(tiny[5], 0);
    assert_eq!(unsafe { CStr::from_ptr(tiny.as_ptr()) }.to_bytes().len(), 5);

    rclcore_reset_error();
    assert!(!rclcore_error_is_set());

    assert_eq!(
        unsafe { rclcore_node_create(std::ptr::null_mut(), bad.as_ptr(), std::ptr::null()) },
        StatusCode::InvalidArgument
    );
    assert_eq!(
        unsafe { rclcore_node_create(&mut node, std::ptr::null(), std::ptr::null()) },
        StatusCode::InvalidArgument
    );
}
