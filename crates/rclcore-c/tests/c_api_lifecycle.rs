// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Process-wide context lifecycle through the C surface.
// Kept as a single test: shutdown is global to the test binary.

use rclcore_c::*;
use std::ffi::CString;
use std::os::raw::c_char;

fn last_error() -> String {
    let mut buffer = [0 as c_char; 256];
    let status = unsafe { rclcore_get_error_string(buffer.as_mut_ptr(), buffer.len() as i32) };
    assert_eq!(status, StatusCode::Ok);
    unsafe { std::ffi::CStr::from_ptr(buffer.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_init_use_shutdown() {
    let name = CString::new("lifecycle").unwrap();
    let mut node = RclHandle::NULL;

    // 1. Nothing works before init
    assert!(!rclcore_ok());
    let status = unsafe { rclcore_node_create(&mut node, name.as_ptr(), std::ptr::null()) };
    assert_eq!(status, StatusCode::NotInit);
    assert!(node.is_null());
    assert!(rclcore_error_is_set());
    rclcore_reset_error();

    // 2. Init is idempotent while live
    assert_eq!(rclcore_init(), StatusCode::Ok);
    assert_eq!(rclcore_init(), StatusCode::Ok);
    assert!(rclcore_ok());

    // 3. Build a small graph
    let status = unsafe { rclcore_node_create(&mut node, name.as_ptr(), std::ptr::null()) };
    assert_eq!(status, StatusCode::Ok);
    assert!(!node.is_null());

    let mut guard = RclHandle::NULL;
    assert_eq!(unsafe { rclcore_guard_condition_create(&mut guard) }, StatusCode::Ok);
    let mut wait_set = RclHandle::NULL;
    assert_eq!(
        unsafe { rclcore_wait_set_create(&mut wait_set, 0, 1, 0, 0, 0, 0) },
        StatusCode::Ok
    );
    let mut index = usize::MAX;
    assert_eq!(
        unsafe { rclcore_wait_set_add_guard_condition(wait_set, guard, &mut index) },
        StatusCode::Ok
    );
    assert_eq!(index, 0);

    // 4. A thread shuts the context down while the main thread blocks forever
    let shutter = std::thread::spawn(|| {
        std::thread::sleep(std::time::Duration::from_millis(20));
        rclcore_shutdown()
    });
    assert_eq!(rclcore_wait(wait_set, -1), StatusCode::NotInit);
    assert_eq!(shutter.join().unwrap(), StatusCode::Ok);
    assert!(!rclcore_ok());

    // 5. Second shutdown fails, creation fails, destruction still works
    assert_eq!(rclcore_shutdown(), StatusCode::NotInit);
    let mut other = RclHandle::NULL;
    assert_eq!(unsafe { rclcore_guard_condition_create(&mut other) }, StatusCode::NotInit);
    assert!(!last_error().is_empty());

    assert_eq!(rclcore_wait_set_destroy(wait_set), StatusCode::Ok);
    assert_eq!(rclcore_guard_condition_destroy(guard), StatusCode::Ok);
    assert_eq!(rclcore_node_destroy(node), StatusCode::Ok);

    // 6. A fresh context can be initialized afterwards
    assert_eq!(rclcore_init(), StatusCode::Ok);
    assert!(rclcore_ok());
    assert_eq!(rclcore_shutdown(), StatusCode::Ok);
}
