// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Request/response correlation.
//!
//! A [`RequestId`] pairs the GID of the requesting client with the sequence
//! number the client assigned to the request. The service side captures it in
//! `take_request` and hands it back unchanged to `send_response`, which routes
//! the reply to the originating client.

use crate::gid::Gid;
use std::fmt;

/// Correlation key matching a response to its request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RequestId {
    /// GID of the client that issued the request
    pub writer_gid: Gid,
    /// Sequence number assigned by that client
    pub sequence_number: i64,
}

impl RequestId {
    #[must_use]
    pub const fn new(writer_gid: Gid, sequence_number: i64) -> Self {
        Self {
            writer_gid,
            sequence_number,
        }
    }

    /// Null id, as written by a fresh allocation.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            writer_gid: Gid::ZERO,
            sequence_number: 0,
        }
    }

    #[must_use]
    pub const fn sequence_number(&self) -> i64 {
        self.sequence_number
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.sequence_number == 0 && self.writer_gid.is_zero()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.writer_gid, self.sequence_number)
    }
}

/// Request or response queued on a service or client.
#[derive(Debug, Clone)]
pub(crate) struct Envelope {
    pub(crate) id: RequestId,
    pub(crate) payload: Vec<u8>,
    pub(crate) sender: Gid,
    pub(crate) source_timestamp: std::time::SystemTime,
}
