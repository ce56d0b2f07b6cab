// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service, client and request id handles.
//!
//! A request id handle is a caller-owned slot: `rclcore_take_request` fills
//! it and `rclcore_send_response` reads it back, so the correlation key never
//! crosses the boundary as raw bytes.

use crate::error::{fail, status_of};
use crate::handles::{RclHandle, Registry};
use crate::node::NODES;
use crate::pubsub::copy_out;
use crate::qos::resolve;
use crate::{byte_slice, c_str, out_ok};
use rclcore::{
    Client, EntityKind, Error, QosProfile, RequestId, SerializedMessage, Service, StatusCode,
    TypeSupport,
};
use std::os::raw::c_char;
use std::sync::Arc;

pub(crate) static SERVICES: Registry<Arc<Service>> = Registry::new(EntityKind::Service);
pub(crate) static CLIENTS: Registry<Arc<Client>> = Registry::new(EntityKind::Client);
static REQUEST_IDS: Registry<RequestId> = Registry::new(EntityKind::RequestId);

/// Create a service server. A null `qos` selects the services default.
///
/// # Safety
/// - `out` must be a valid pointer to an `RclHandle`.
/// - `service_name` and `type_name` must be valid NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn rclcore_service_create(
    out: *mut RclHandle,
    node: RclHandle,
    service_name: *const c_char,
    type_name: *const c_char,
    qos: RclHandle,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    let created = (|| -> Result<_, Error> {
        let name = c_str(service_name, "service name")?;
        let type_support = TypeSupport::named(c_str(type_name, "type name")?);
        let qos = resolve(qos, QosProfile::services_default())?;
        let node = NODES.get(node)?;
        let service = node.create_service_with_qos(name, &type_support, &qos)?;
        SERVICES.insert(Arc::new(service))
    })();

    match created {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

#[no_mangle]
pub extern "C" fn rclcore_service_destroy(service: RclHandle) -> StatusCode {
    status_of(SERVICES.remove(service).map(drop))
}

/// Create a service client. A null `qos` selects the services default.
///
/// # Safety
/// - `out` must be a valid pointer to an `RclHandle`.
/// - `service_name` and `type_name` must be valid NUL-terminated C strings.
#[no_mangle]
pub unsafe extern "C" fn rclcore_client_create(
    out: *mut RclHandle,
    node: RclHandle,
    service_name: *const c_char,
    type_name: *const c_char,
    qos: RclHandle,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    let created = (|| -> Result<_, Error> {
        let name = c_str(service_name, "service name")?;
        let type_support = TypeSupport::named(c_str(type_name, "type name")?);
        let qos = resolve(qos, QosProfile::services_default())?;
        let node = NODES.get(node)?;
        let client = node.create_client_with_qos(name, &type_support, &qos)?;
        CLIENTS.insert(Arc::new(client))
    })();

    match created {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

#[no_mangle]
pub extern "C" fn rclcore_client_destroy(client: RclHandle) -> StatusCode {
    status_of(CLIENTS.remove(client).map(drop))
}

/// Whether a matching service server exists.
///
/// # Safety
/// `out_available` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_service_server_is_available(
    client: RclHandle,
    out_available: *mut bool,
) -> StatusCode {
    if out_available.is_null() {
        return StatusCode::InvalidArgument;
    }
    match CLIENTS.get(client) {
        Ok(client) => out_ok(out_available, client.service_is_available()),
        Err(err) => fail(err),
    }
}

/// Allocate an empty request id slot.
///
/// # Safety
/// `out` must be a valid pointer to an `RclHandle`.
#[no_mangle]
pub unsafe extern "C" fn rclcore_request_id_create(out: *mut RclHandle) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;
    match REQUEST_IDS.insert(RequestId::zero()) {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

#[no_mangle]
pub extern "C" fn rclcore_request_id_destroy(request_id: RclHandle) -> StatusCode {
    status_of(REQUEST_IDS.remove(request_id).map(drop))
}

/// Sequence number held by a request id slot (0 while empty).
///
/// # Safety
/// `out_sequence` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_request_id_get_sequence_number(
    request_id: RclHandle,
    out_sequence: *mut i64,
) -> StatusCode {
    if out_sequence.is_null() {
        return StatusCode::InvalidArgument;
    }
    match REQUEST_IDS.get(request_id) {
        Ok(id) => out_ok(out_sequence, id.sequence_number()),
        Err(err) => fail(err),
    }
}

/// Send a request; `*out_sequence` receives its sequence number (from 1).
///
/// # Safety
/// - `data` must be valid for reads of `len` bytes (may be NULL when `len` is 0).
/// - `out_sequence` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_send_request(
    client: RclHandle,
    data: *const u8,
    len: usize,
    out_sequence: *mut i64,
) -> StatusCode {
    if out_sequence.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out_sequence = 0;

    let sent = (|| -> Result<_, Error> {
        let bytes = byte_slice(data, len)?;
        CLIENTS
            .get(client)?
            .send_request(&SerializedMessage::from_bytes(bytes))
    })();
    match sent {
        Ok(sequence) => out_ok(out_sequence, sequence),
        Err(err) => fail(err),
    }
}

/// Take the oldest request into `buffer`, storing its id in `request_id`.
///
/// Returns `ServiceTakeFailed` when nothing is queued.
///
/// # Safety
/// - `buffer` must be valid for writes of `capacity` bytes.
/// - `out_len` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_take_request(
    service: RclHandle,
    request_id: RclHandle,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> StatusCode {
    if out_len.is_null() || (buffer.is_null() && capacity > 0) {
        return StatusCode::InvalidArgument;
    }
    *out_len = 0;

    let ready = (|| -> Result<_, Error> {
        let service = SERVICES.get(service)?;
        REQUEST_IDS.get(request_id)?;
        Ok(service)
    })();
    let service = match ready {
        Ok(service) => service,
        Err(err) => return fail(err),
    };

    let Some(required) = service.next_payload_len() else {
        return StatusCode::ServiceTakeFailed;
    };
    if required > capacity {
        *out_len = required;
        return fail(Error::BufferTooSmall {
            required,
            available: capacity,
        });
    }

    let mut id = RequestId::zero();
    let mut message = SerializedMessage::with_capacity(required);
    match service.take_request(&mut id, &mut message) {
        Ok(Some(_info)) => {
            if let Err(err) = REQUEST_IDS.update(request_id, |slot| *slot = id) {
                return fail(err);
            }
            copy_out(&message, buffer, capacity, out_len)
        }
        Ok(None) => StatusCode::ServiceTakeFailed,
        Err(err) => fail(err),
    }
}

/// Send a response to the request identified by `request_id`.
///
/// # Safety
/// `data` must be valid for reads of `len` bytes (may be NULL when `len` is 0).
#[no_mangle]
pub unsafe extern "C" fn rclcore_send_response(
    service: RclHandle,
    request_id: RclHandle,
    data: *const u8,
    len: usize,
) -> StatusCode {
    let result = (|| -> Result<_, Error> {
        let bytes = byte_slice(data, len)?;
        let service = SERVICES.get(service)?;
        let id = REQUEST_IDS.get(request_id)?;
        if id.is_zero() {
            return Err(Error::InvalidArgument(
                "request id was never filled by a take".to_string(),
            ));
        }
        service.send_response(&id, &SerializedMessage::from_bytes(bytes))
    })();
    status_of(result)
}

/// Take the oldest response into `buffer`, storing the id of the request it
/// answers in `request_id`.
///
/// Returns `ClientTakeFailed` when nothing is queued.
///
/// # Safety
/// - `buffer` must be valid for writes of `capacity` bytes.
/// - `out_len` must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn rclcore_take_response(
    client: RclHandle,
    request_id: RclHandle,
    buffer: *mut u8,
    capacity: usize,
    out_len: *mut usize,
) -> StatusCode {
    if out_len.is_null() || (buffer.is_null() && capacity > 0) {
        return StatusCode::InvalidArgument;
    }
    *out_len = 0;

    let ready = (|| -> Result<_, Error> {
        let client = CLIENTS.get(client)?;
        REQUEST_IDS.get(request_id)?;
        Ok(client)
    })();
    let client = match ready {
        Ok(client) => client,
        Err(err) => return fail(err),
    };

    let Some(required) = client.next_payload_len() else {
        return StatusCode::ClientTakeFailed;
    };
    if required > capacity {
        *out_len = required;
        return fail(Error::BufferTooSmall {
            required,
            available: capacity,
        });
    }

    let mut id = RequestId::zero();
    let mut message = SerializedMessage::with_capacity(required);
    match client.take_response(&mut id, &mut message) {
        Ok(Some(_info)) => {
            if let Err(err) = REQUEST_IDS.update(request_id, |slot| *slot = id) {
                return fail(err);
            }
            copy_out(&message, buffer, capacity, out_len)
        }
        Ok(None) => StatusCode::ClientTakeFailed,
        Err(err) => fail(err),
    }
}
