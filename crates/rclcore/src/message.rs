// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message storage, per-sample metadata and the opaque type-support token.

use crate::gid::Gid;
use std::ffi::c_void;
use std::fmt;
use std::sync::Arc;
use std::time::SystemTime;

/// Caller-owned storage for one serialized message.
///
/// The core never interprets the bytes; layout belongs to the type support
/// the entity was created with.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SerializedMessage {
    buffer: Vec<u8>,
}

impl SerializedMessage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            buffer: bytes.to_vec(),
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Replace the contents, reusing the allocation.
    pub(crate) fn fill_from(&mut self, bytes: &[u8]) {
        self.buffer.clear();
        self.buffer.extend_from_slice(bytes);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

impl From<Vec<u8>> for SerializedMessage {
    fn from(buffer: Vec<u8>) -> Self {
        Self { buffer }
    }
}

/// Metadata delivered alongside a taken sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageInfo {
    /// GID of the publishing endpoint (publisher, client or service)
    pub publisher_gid: Gid,
    /// Sequence number assigned by the publishing endpoint
    pub sequence_number: i64,
    /// Wall-clock time at which the sample was published
    pub source_timestamp: SystemTime,
}

/// Opaque token identifying the wire layout of a message or service type.
///
/// Endpoints only match when their tokens name the same type; the core never
/// looks inside the token otherwise.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct TypeSupport {
    type_name: Arc<str>,
}

impl TypeSupport {
    /// Token identified by a type name (e.g. `std_msgs/msg/String`).
    #[must_use]
    pub fn named(type_name: &str) -> Self {
        Self {
            type_name: Arc::from(type_name),
        }
    }

    /// Token wrapping a foreign type-support pointer, identified by address.
    #[must_use]
    pub fn from_raw(ptr: *const c_void) -> Self {
        Self::named(&format!("opaque@{:#x}", ptr as usize))
    }

    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }
}

impl fmt::Debug for TypeSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypeSupport").field(&self.type_name).finish()
    }
}

impl fmt::Display for TypeSupport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fill_from_replaces_contents() {
        let mut msg = SerializedMessage::from_bytes(b"previous payload");
        msg.fill_from(b"new");
        assert_eq!(msg.as_bytes(), b"new");
        assert_eq!(msg.len(), 3);
        assert!(msg.capacity() >= 16);

        msg.clear();
        assert!(msg.is_empty());
    }

    #[test]
    fn raw_type_support_is_identified_by_address() {
        let a = 0x1000usize as *const c_void;
        let b = 0x2000usize as *const c_void;
        assert_eq!(TypeSupport::from_raw(a), TypeSupport::from_raw(a));
        assert_ne!(TypeSupport::from_raw(a), TypeSupport::from_raw(b));
        assert_eq!(TypeSupport::from_raw(a).type_name(), "opaque@0x1000");
    }
}
