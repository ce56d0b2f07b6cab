// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publisher and subscription handles.

use crate::error::{fail, status_of};
use crate::handles::{RclHandle, Registry};
use crate::node::NODES;
use crate::qos::resolve;
use crate::{byte_slice, c_str, out_ok};
use rclcore::{
    EntityKind, Error, Publisher, QosProfile, SerializedMessage, StatusCode, Subscription,
    TypeSupport,
};
use std::os::raw::c_char;
use std::sync::Arc;

pub(crate) static PUBLISHERS: Registry<Arc<Publisher>> = Registry::new(EntityKind::Publisher);
pub(crate) static SUBSCRIPTIONS: Registry<Arc<Subscription>> =
    Registry::new(EntityKind::Subscription);

/// Create a publisher on `topic`.
///
/// `qos` may be the null handle for the default profile.
///
/// # Safety
/// - `out` must be a valid pointer to an `RclHandle`.
/// - `topic` and `type_name` must be valid NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn rclcore_publisher_create(
    out: *mut RclHandle,
    node: RclHandle,
    topic: *const c_char,
    type_name: *const c_char,
    qos: RclHandle,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    let created = (|| -> Result<_, Error> {
        let topic = c_str(topic, "topic name")?;
        let type_support = TypeSupport::named(c_str(type_name, "type name")?);
        let qos = resolve(qos, QosProfile::default())?;
        let node = NODES.get(node)?;
        let publisher = node.create_publisher_with_qos(topic, &type_support, &qos)?;
        PUBLISHERS.insert(Arc::new(publisher))
    })();

    match created {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

#[no_mangle]
pub extern "C" fn rclcore_publisher_destroy(publisher: RclHandle) -> StatusCode {
    status_of(PUBLISHERS.remove(publisher).map(drop))
}

/// Publish `len` serialized bytes.
///
/// # Safety
/// `data` must be valid for reads of `len` bytes (may be NULL when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn rclcore_publish(
    publisher: RclHandle,
    data: *const u8,
    len: usize,
) -> StatusCode {
    let result = (|| -> Result<_, Error> {
        let bytes = byte_slice(data, len)?;
        let publisher = PUBLISHERS.get(publisher)?;
        let delivered = publisher.publish(&SerializedMessage::from_bytes(bytes))?;
        log::trace!(
            "[ffi] {} bytes on '{}' reached {} subscriptions",
            len,
            publisher.topic_name(),
            delivered
        );
        Ok(())
    })();
    status_of(result)
}

/// Number of subscriptions matched with this publisher.
///
/// # Safety
/// `out_count` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_publisher_get_subscription_count(
    publisher: RclHandle,
    out_count: *mut usize,
) -> StatusCode {
    if out_count.is_null() {
        return StatusCode::InvalidArgument;
    }
    match PUBLISHERS.get(publisher) {
        Ok(publisher) => out_ok(out_count, publisher.subscription_count()),
        Err(err) => fail(err),
    }
}

/// Create a subscription on `topic`.
///
/// `qos` may be the null handle for the default profile.
///
/// # Safety
/// - `out` must be a valid pointer to an `RclHandle`.
/// - `topic` and `type_name` must be valid NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn rclcore_subscription_create(
    out: *mut RclHandle,
    node: RclHandle,
    topic: *const c_char,
    type_name: *const c_char,
    qos: RclHandle,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    let created = (|| -> Result<_, Error> {
        let topic = c_str(topic, "topic name")?;
        let type_support = TypeSupport::named(c_str(type_name, "type name")?);
        let qos = resolve(qos, QosProfile::default())?;
        let node = NODES.get(node)?;
        let subscription = node.create_subscription_with_qos(topic, &type_support, &qos)?;
        SUBSCRIPTIONS.insert(Arc::new(subscription))
    })();

    match created {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

#[no_mangle]
pub extern "C" fn rclcore_subscription_destroy(subscription: RclHandle) -> StatusCode {
    status_of(SUBSCRIPTIONS.remove(subscription).map(drop))
}

/// Take the oldest message into `buffer`.
///
/// Returns `SubscriptionTakeFailed` when nothing is queued. If the message
/// does not fit, `BufferTooSmall` is returned, `*out_len` holds the required
/// size and the message stays queued.
///
/// # Safety
/// - `buffer` must be valid for writes of `capacity` bytes.
/// - `out_len` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_take(
    subscription: RclHandle,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> StatusCode {
    if out_len.is_null() || (buffer.is_null() && capacity > 0) {
        return StatusCode::InvalidArgument;
    }
    *out_len = 0;

    let subscription = match SUBSCRIPTIONS.get(subscription) {
        Ok(subscription) => subscription,
        Err(err) => return fail(err),
    };
    let Some(required) = subscription.next_payload_len() else {
        return StatusCode::SubscriptionTakeFailed;
    };
    if required > capacity {
        *out_len = required;
        return fail(Error::BufferTooSmall {
            required,
            available: capacity,
        });
    }

    let mut message = SerializedMessage::with_capacity(required);
    match subscription.take(&mut message) {
        Ok(Some(_info)) => copy_out(&message, buffer, capacity, out_len),
        Ok(None) => StatusCode::SubscriptionTakeFailed,
        Err(err) => fail(err),
    }
}

/// Copy a taken payload into the caller's buffer.
pub(crate) unsafe fn copy_out(
    message: &SerializedMessage,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> StatusCode {
    let bytes = message.as_bytes();
    // A concurrent take may have swapped in a larger message
    if bytes.len() > capacity {
        *out_len = bytes.len();
        return fail(Error::BufferTooSmall {
            required: bytes.len(),
            available: capacity,
        });
    }
    if !bytes.is_empty() {
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), buffer, bytes.len());
    }
    *out_len = bytes.len();
    StatusCode::Ok
}

/// Number of publishers matched with this subscription.
///
/// # Safety
/// `out_count` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_subscription_get_publisher_count(
    subscription: RclHandle,
    out_count: *mut usize,
) -> StatusCode {
    if out_count.is_null() {
        return StatusCode::InvalidArgument;
    }
    match SUBSCRIPTIONS.get(subscription) {
        Ok(subscription) => out_ok(out_count, subscription.publisher_count()),
        Err(err) => fail(err),
    }
}
