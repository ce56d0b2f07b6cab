// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rclcore C FFI Bindings
//!
//! C-compatible surface over the `rclcore` entity and wait-set layer.
//!
//! Objects are referred to by [`RclHandle`] values rather than pointers. A
//! destroyed handle is detected on its next use and reported with the
//! `*Invalid` status of its kind. Every call returns a [`StatusCode`]; on
//! failure a message is stored in the calling thread's last-error slot
//! (see [`rclcore_get_error_string`]).
//!
//! # Safety
//!
//! Pointer-taking functions are `unsafe` and require the caller to uphold the
//! invariants documented in each function's safety comment.

mod error;
mod guard;
mod handles;
mod logging;
mod node;
mod pubsub;
mod qos;
mod rpc;
mod waitset;

pub use error::*;
pub use guard::*;
pub use handles::RclHandle;
pub use logging::*;
pub use node::*;
pub use pubsub::*;
pub use qos::*;
pub use rpc::*;
pub use waitset::*;

pub use rclcore::StatusCode;

use rclcore::Error;
use std::ffi::CStr;
use std::os::raw::c_char;

static MIDDLEWARE_IDENTIFIER: &[u8] = b"rclcore_intra\0";

/// Borrow a NUL-terminated UTF-8 string.
pub(crate) unsafe fn c_str<'a>(ptr: *const c_char, what: &str) -> Result<&'a str, Error> {
    if ptr.is_null() {
        return Err(Error::InvalidArgument(format!("{what} is NULL")));
    }
    CStr::from_ptr(ptr)
        .to_str()
        .map_err(|_| Error::InvalidArgument(format!("{what} is not valid UTF-8")))
}

/// Borrow `len` bytes at `data`; NULL is accepted only with a zero length.
pub(crate) unsafe fn byte_slice<'a>(data: *const u8, len: usize) -> Result<&'a [u8], Error> {
    if len == 0 {
        return Ok(&[]);
    }
    if data.is_null() {
        return Err(Error::InvalidArgument("data is NULL".to_string()));
    }
    Ok(std::slice::from_raw_parts(data, len))
}

/// Write `value` through an out pointer that was already checked non-NULL.
pub(crate) fn out_ok<T>(out: *mut T, value: T) -> StatusCode {
    // SAFETY: callers check `out` before doing any work
    unsafe { *out = value };
    StatusCode::Ok
}

/// Initialize the process-wide context from the environment.
///
/// Calling it again while the context is live is a no-op returning `Ok`.
#[no_mangle]
pub extern "C" fn rclcore_init() -> StatusCode {
    match rclcore::global::init() {
        Ok(context) => {
            log::debug!(
                "[ffi] context {} ready on domain {}",
                context.instance_id(),
                context.domain_id()
            );
            StatusCode::Ok
        }
        Err(err) => error::fail(err),
    }
}

/// Whether the process-wide context is initialized and not shut down.
#[no_mangle]
pub extern "C" fn rclcore_ok() -> bool {
    rclcore::global::is_ok()
}

/// Shut down the process-wide context and wake every blocked wait.
///
/// Handles created under it stay allocated; they must still be destroyed.
#[no_mangle]
pub extern "C" fn rclcore_shutdown() -> StatusCode {
    error::status_of(rclcore::global::shutdown())
}

/// Static NUL-terminated middleware identifier. Never freed.
#[no_mangle]
pub extern "C" fn rclcore_get_middleware_identifier() -> *const c_char {
    MIDDLEWARE_IDENTIFIER.as_ptr().cast()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middleware_identifier_matches_core() {
        let ptr = rclcore_get_middleware_identifier();
        let id = unsafe { CStr::from_ptr(ptr) }.to_str().expect("utf8");
        assert_eq!(id, rclcore::MIDDLEWARE_IDENTIFIER);
    }

    #[test]
    fn byte_slice_rejects_null_with_length() {
        assert!(unsafe { byte_slice(std::ptr::null(), 0) }.is_ok());
        assert!(matches!(
            unsafe { byte_slice(std::ptr::null(), 4) },
            Err(Error::InvalidArgument(_))
        ));
    }
}
