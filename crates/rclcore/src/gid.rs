// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Global entity identifiers.

use std::fmt;

/// Size of a GID in bytes.
pub const GID_SIZE: usize = 16;

/// Globally unique identifier of a publisher, subscription, service or client.
///
/// Layout (big-endian): process id, context instance, domain id, entity counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Gid {
    bytes: [u8; GID_SIZE],
}

impl Gid {
    /// Null identity, never assigned to an entity.
    pub const ZERO: Gid = Gid {
        bytes: [0; GID_SIZE],
    };

    pub(crate) fn new(context_instance: u32, domain_id: u32, entity: u32) -> Self {
        let mut bytes = [0u8; GID_SIZE];
        bytes[0..4].copy_from_slice(&std::process::id().to_be_bytes());
        bytes[4..8].copy_from_slice(&context_instance.to_be_bytes());
        bytes[8..12].copy_from_slice(&domain_id.to_be_bytes());
        bytes[12..16].copy_from_slice(&entity.to_be_bytes());
        Self { bytes }
    }

    /// Build from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; GID_SIZE]) -> Self {
        Self { bytes }
    }

    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; GID_SIZE] {
        &self.bytes
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.bytes.iter().all(|b| *b == 0)
    }
}

impl fmt::Display for Gid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chunk) in self.bytes.chunks(4).enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            for b in chunk {
                write!(f, "{:02x}", b)?;
            }
        }
        Ok(())
    }
}
