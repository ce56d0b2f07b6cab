// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

// Publish/take and request/response through handles and wait sets,
// the way a C client library drives the API.

use rclcore_c::*;
use std::ffi::CString;

const SECOND_NS: i64 = 1_000_000_000;

fn node(name: &str) -> RclHandle {
    assert_eq!(rclcore_init(), StatusCode::Ok);
    let name = CString::new(name).unwrap();
    let ns = CString::new("/c_api").unwrap();
    let mut node = RclHandle::NULL;
    let status = unsafe { rclcore_node_create(&mut node, name.as_ptr(), ns.as_ptr()) };
    assert_eq!(status, StatusCode::Ok);
    node
}

#[test]
fn test_publish_wait_take() {
    let node = node("talker");
    let topic = CString::new("chatter").unwrap();
    let type_name = CString::new("std_msgs/msg/String").unwrap();

    let mut publisher = RclHandle::NULL;
    let mut subscription = RclHandle::NULL;
    unsafe {
        assert_eq!(
            rclcore_publisher_create(&mut publisher, node, topic.as_ptr(), type_name.as_ptr(), RclHandle::NULL),
            StatusCode::Ok
        );
        assert_eq!(
            rclcore_subscription_create(&mut subscription, node, topic.as_ptr(), type_name.as_ptr(), RclHandle::NULL),
            StatusCode::Ok
        );
    }

    let mut count = 0usize;
    assert_eq!(
        unsafe { rclcore_publisher_get_subscription_count(publisher, &mut count) },
        StatusCode::Ok
    );
    assert_eq!(count, 1);

    // Node with children cannot go away
    assert_eq!(rclcore_node_destroy(node), StatusCode::NodeInUse);

    let mut wait_set = RclHandle::NULL;
    assert_eq!(
        unsafe { rclcore_wait_set_create(&mut wait_set, 1, 0, 0, 0, 0, 0) },
        StatusCode::Ok
    );
    let mut index = usize::MAX;
    assert_eq!(
        unsafe { rclcore_wait_set_add_subscription(wait_set, subscription, &mut index) },
        StatusCode::Ok
    );
    assert_eq!(index, 0);

    // Nothing published yet
    assert_eq!(rclcore_wait(wait_set, 0), StatusCode::Timeout);
    assert!(!rclcore_wait_set_subscription_ready(wait_set, 0));

    let payload = b"hello from C";
    assert_eq!(
        unsafe { rclcore_publish(publisher, payload.as_ptr(), payload.len()) },
        StatusCode::Ok
    );
    assert_eq!(rclcore_wait(wait_set, SECOND_NS), StatusCode::Ok);
    assert!(rclcore_wait_set_subscription_ready(wait_set, 0));
    assert!(!rclcore_wait_set_subscription_ready(wait_set, 1));
    assert!(!rclcore_wait_set_subscription_ready(wait_set, -1));

    // Too small a buffer reports the size and keeps the message
    let mut small = [0u8; 4];
    let mut len = 0usize;
    let status = unsafe { rclcore_take(subscription, small.as_mut_ptr(), small.len(), &mut len) };
    assert_eq!(status, StatusCode::BufferTooSmall);
    assert_eq!(len, payload.len());

    let mut buffer = [0u8; 64];
    let status = unsafe { rclcore_take(subscription, buffer.as_mut_ptr(), buffer.len(), &mut len) };
    assert_eq!(status, StatusCode::Ok);
    assert_eq!(&buffer[..len], payload);

    let status = unsafe { rclcore_take(subscription, buffer.as_mut_ptr(), buffer.len(), &mut len) };
    assert_eq!(status, StatusCode::SubscriptionTakeFailed);
    assert_eq!(len, 0);

    assert_eq!(rclcore_wait_set_destroy(wait_set), StatusCode::Ok);
    assert_eq!(rclcore_subscription_destroy(subscription), StatusCode::Ok);
    assert_eq!(rclcore_publisher_destroy(publisher), StatusCode::Ok);
    assert_eq!(rclcore_node_destroy(node), StatusCode::Ok);
}

#[test]
fn test_request_response_correlation() {
    let node = node("adder");
    let service_name = CString::new("add_two_ints").unwrap();
    let type_name = CString::new("example_interfaces/srv/AddTwoInts").unwrap();

    let mut service = RclHandle::NULL;
    let mut client = RclHandle::NULL;
    unsafe {
        assert_eq!(
            rclcore_service_create(&mut service, node, service_name.as_ptr(), type_name.as_ptr(), RclHandle::NULL),
            StatusCode::Ok
        );
        assert_eq!(
            rclcore_client_create(&mut client, node, service_name.as_ptr(), type_name.as_ptr(), RclHandle::NULL),
            StatusCode::Ok
        );
    }

    let mut available = false;
    assert_eq!(
        unsafe { rclcore_service_server_is_available(client, &mut available) },
        StatusCode::Ok
    );
    assert!(available);

    let mut wait_set = RclHandle::NULL;
    assert_eq!(
        unsafe { rclcore_wait_set_create(&mut wait_set, 0, 0, 0, 1, 1, 0) },
        StatusCode::Ok
    );

    let mut sequences = Vec::new();
    for value in [3u8, 4u8] {
        let mut sequence = 0i64;
        let request = [value];
        let status = unsafe { rclcore_send_request(client, request.as_ptr(), 1, &mut sequence) };
        assert_eq!(status, StatusCode::Ok);
        sequences.push(sequence);
    }
    assert_eq!(sequences, vec![1, 2]);

    // Server side: answer each request with its value doubled
    let mut request_id = RclHandle::NULL;
    assert_eq!(unsafe { rclcore_request_id_create(&mut request_id) }, StatusCode::Ok);
    for expected in &sequences {
        assert_eq!(rclcore_wait_set_clear(wait_set), StatusCode::Ok);
        assert_eq!(
            unsafe { rclcore_wait_set_add_service(wait_set, service, std::ptr::null_mut()) },
            StatusCode::Ok
        );
        assert_eq!(rclcore_wait(wait_set, SECOND_NS), StatusCode::Ok);
        assert!(rclcore_wait_set_service_ready(wait_set, 0));

        let mut buffer = [0u8; 8];
        let mut len = 0usize;
        let status = unsafe {
            rclcore_take_request(service, request_id, buffer.as_mut_ptr(), buffer.len(), &mut len)
        };
        assert_eq!(status, StatusCode::Ok);
        assert_eq!(len, 1);

        let mut sequence = 0i64;
        assert_eq!(
            unsafe { rclcore_request_id_get_sequence_number(request_id, &mut sequence) },
            StatusCode::Ok
        );
        assert_eq!(sequence, *expected);

        let response = [buffer[0] * 2];
        assert_eq!(
            unsafe { rclcore_send_response(service, request_id, response.as_ptr(), 1) },
            StatusCode::Ok
        );
    }

    // Client side: responses carry the sequence numbers of their requests
    let mut answers = Vec::new();
    assert_eq!(rclcore_wait_set_clear(wait_set), StatusCode::Ok);
    assert_eq!(
        unsafe { rclcore_wait_set_add_client(wait_set, client, std::ptr::null_mut()) },
        StatusCode::Ok
    );
    assert_eq!(rclcore_wait(wait_set, SECOND_NS), StatusCode::Ok);
    assert!(rclcore_wait_set_client_ready(wait_set, 0));
    loop {
        let mut buffer = [0u8; 8];
        let mut len = 0usize;
        let status = unsafe {
            rclcore_take_response(client, request_id, buffer.as_mut_ptr(), buffer.len(), &mut len)
        };
        if status == StatusCode::ClientTakeFailed {
            break;
        }
        assert_eq!(status, StatusCode::Ok);
        let mut sequence = 0i64;
        unsafe { rclcore_request_id_get_sequence_number(request_id, &mut sequence) };
        answers.push((sequence, buffer[0]));
    }
    assert_eq!(answers, vec![(1, 6), (2, 8)]);

    assert_eq!(rclcore_request_id_destroy(request_id), StatusCode::Ok);
    assert_eq!(rclcore_wait_set_destroy(wait_set), StatusCode::Ok);
    assert_eq!(rclcore_client_destroy(client), StatusCode::Ok);
    assert_eq!(rclcore_service_destroy(service), StatusCode::Ok);
    assert_eq!(rclcore_node_destroy(node), StatusCode::Ok);
}

#[test]
fn test_qos_profile_controls_matching() {
    let node = node("qos_user");
    let topic = CString::new("latched").unwrap();
    let type_name = CString::new("std_msgs/msg/Int32").unwrap();

    // Best-effort publisher cannot serve a reliable subscription
    let mut best_effort = RclHandle::NULL;
    let mut reliable = RclHandle::NULL;
    unsafe {
        assert_eq!(
            rclcore_qos_profile_create(&mut best_effort, RclQosPreset::RclQosSensorData),
            StatusCode::Ok
        );
        assert_eq!(
            rclcore_qos_profile_create(&mut reliable, RclQosPreset::RclQosDefault),
            StatusCode::Ok
        );
    }

    let mut verdict = RclQosCompatibility::RclQosCompatible;
    assert_eq!(
        unsafe { rclcore_qos_check_compatible(best_effort, reliable, &mut verdict) },
        StatusCode::Ok
    );
    assert_eq!(verdict, RclQosCompatibility::RclQosIncompatible);

    let mut publisher = RclHandle::NULL;
    let mut subscription = RclHandle::NULL;
    unsafe {
        assert_eq!(
            rclcore_publisher_create(&mut publisher, node, topic.as_ptr(), type_name.as_ptr(), best_effort),
            StatusCode::Ok
        );
        assert_eq!(
            rclcore_subscription_create(&mut subscription, node, topic.as_ptr(), type_name.as_ptr(), reliable),
            StatusCode::Ok
        );
    }

    let mut count = usize::MAX;
    assert_eq!(
        unsafe { rclcore_subscription_get_publisher_count(subscription, &mut count) },
        StatusCode::Ok
    );
    assert_eq!(count, 0);

    assert_eq!(rclcore_subscription_destroy(subscription), StatusCode::Ok);
    assert_eq!(rclcore_publisher_destroy(publisher), StatusCode::Ok);
    assert_eq!(rclcore_qos_profile_destroy(best_effort), StatusCode::Ok);
    assert_eq!(rclcore_qos_profile_destroy(reliable), StatusCode::Ok);
    assert_eq!(rclcore_node_destroy(node), StatusCode::Ok);
}
