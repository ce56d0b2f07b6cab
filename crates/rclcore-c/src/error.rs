// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Last-error slot.
//!
//! Every failing call stores a human-readable message in a slot private to
//! the calling thread, alongside returning its numeric status. Successful
//! calls leave the slot untouched; `rclcore_reset_error` clears it.

use rclcore::{Error, StatusCode};
use std::cell::RefCell;
use std::os::raw::c_char;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

pub(crate) fn set_last_error(message: String) {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Record `err` and return its status.
pub(crate) fn fail(err: Error) -> StatusCode {
    let status = err.status();
    log::debug!("[ffi] {} -> {}", err, status);
    set_last_error(err.to_string());
    status
}

/// Collapse a unit result into a status.
pub(crate) fn status_of(result: Result<(), Error>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::Ok,
        Err(err) => fail(err),
    }
}

/// Copy the last error message into `buffer`.
///
/// At most `buffer_size - 1` bytes are copied, followed by a NUL; a longer
/// message is truncated. With no error recorded an empty string is written.
///
/// # Safety
/// `buffer` must be valid for writes of `buffer_size` bytes.
#[no_mangle]
pub unsafe extern "C" fn rclcore_get_error_string(buffer: *mut c_char, buffer_size: i32) -> StatusCode {
    if buffer.is_null() || buffer_size <= 0 {
        return StatusCode::InvalidArgument;
    }
    let capacity = buffer_size as usize;

    LAST_ERROR.with(|slot| {
        let slot = slot.borrow();
        let message = slot.as_deref().unwrap_or("").as_bytes();
        let copied = message.len().min(capacity - 1);
        std::ptr::copy_nonoverlapping(message.as_ptr(), buffer.cast::<u8>(), copied);
        *buffer.add(copied) = 0;
    });
    StatusCode::Ok
}

/// Clear the calling thread's last error.
#[no_mangle]
pub extern "C" fn rclcore_reset_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = None);
}

/// Whether the calling thread has a recorded error.
#[no_mangle]
pub extern "C" fn rclcore_error_is_set() -> bool {
    LAST_ERROR.with(|slot| slot.borrow().is_some())
}
