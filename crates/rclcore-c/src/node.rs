// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node handles.

use crate::error::{fail, status_of};
use crate::handles::{RclHandle, Registry};
use crate::{c_str, out_ok};
use rclcore::{global, EntityKind, Error, Node, StatusCode};
use std::os::raw::c_char;
use std::sync::Arc;

pub(crate) static NODES: Registry<Arc<Node>> = Registry::new(EntityKind::Node);

/// Create a node in the process-wide context.
///
/// `namespace` may be NULL or empty for the root namespace.
///
/// # Safety
/// - `out` must be a valid pointer to an `RclHandle`.
/// - `name` must be a valid NUL-terminated C string.
/// - `namespace` must be a valid NUL-terminated C string or NULL.
#[no_mangle]
pub unsafe extern "C" fn rclcore_node_create(
    out: *mut RclHandle,
    name: *const c_char,
    namespace: *const c_char,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    let created = (|| -> Result<_, Error> {
        let name = c_str(name, "node name")?;
        let namespace = if namespace.is_null() {
            ""
        } else {
            c_str(namespace, "namespace")?
        };
        let node = global::context()?.create_node(name, namespace)?;
        NODES.insert(Arc::new(node))
    })();

    match created {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

/// Destroy a node.
///
/// Fails with `NodeInUse` while publishers, subscriptions, services or
/// clients created under it are alive; the handle then stays valid.
#[no_mangle]
pub extern "C" fn rclcore_node_destroy(node: RclHandle) -> StatusCode {
    let result = NODES.get(node).and_then(|live| {
        let children = live.child_count();
        if children > 0 {
            return Err(Error::NodeInUse {
                node: live.fully_qualified_name().to_string(),
                children,
            });
        }
        NODES.remove(node).map(drop)
    });
    status_of(result)
}

/// Copy the node's fully-qualified name into `buffer` (NUL-terminated).
///
/// # Safety
/// `buffer` must be valid for writes of `buffer_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn rclcore_node_get_fully_qualified_name(
    node: RclHandle,
    buffer: *mut c_char,
    buffer_size: usize,
) -> StatusCode {
    if buffer.is_null() || buffer_size == 0 {
        return StatusCode::InvalidArgument;
    }
    let node = match NODES.get(node) {
        Ok(node) => node,
        Err(err) => return fail(err),
    };

    let name = node.fully_qualified_name().as_bytes();
    if name.len() >= buffer_size {
        return fail(Error::BufferTooSmall {
            required: name.len() + 1,
            available: buffer_size,
        });
    }
    std::ptr::copy_nonoverlapping(name.as_ptr(), buffer.cast::<u8>(), name.len());
    *buffer.add(name.len()) = 0;
    StatusCode::Ok
}
