// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Logging initialization for the C boundary

use rclcore::{EnvConfig, StatusCode};
use std::ffi::CStr;
use std::os::raw::c_char;

/// Log level
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RclLogLevel {
    RclLogOff = 0,
    RclLogError = 1,
    RclLogWarn = 2,
    RclLogInfo = 3,
    RclLogDebug = 4,
    RclLogTrace = 5,
}

impl From<RclLogLevel> for log::LevelFilter {
    fn from(level: RclLogLevel) -> Self {
        match level {
            RclLogLevel::RclLogOff => log::LevelFilter::Off,
            RclLogLevel::RclLogError => log::LevelFilter::Error,
            RclLogLevel::RclLogWarn => log::LevelFilter::Warn,
            RclLogLevel::RclLogInfo => log::LevelFilter::Info,
            RclLogLevel::RclLogDebug => log::LevelFilter::Debug,
            RclLogLevel::RclLogTrace => log::LevelFilter::Trace,
        }
    }
}

fn installed(result: Result<(), log::SetLoggerError>) -> StatusCode {
    match result {
        Ok(()) => StatusCode::Ok,
        // Already initialized
        Err(_) => StatusCode::Error,
    }
}

/// Initialize console logging at a fixed level.
///
/// Returns `Error` if a logger is already installed.
///
/// # Example (C)
/// ```c
/// rclcore_logging_init(RclLogInfo);
/// ```
#[no_mangle]
pub extern "C" fn rclcore_logging_init(level: RclLogLevel) -> StatusCode {
    let filter: log::LevelFilter = level.into();
    installed(
        env_logger::Builder::new()
            .filter_level(filter)
            .format_timestamp_millis()
            .try_init(),
    )
}

/// Initialize console logging from the environment.
///
/// `RUST_LOG` wins if set, then `RCLCORE_LOG_LEVEL`, then `default_level`.
#[no_mangle]
pub extern "C" fn rclcore_logging_init_env(default_level: RclLogLevel) -> StatusCode {
    let default_level = log::LevelFilter::from(default_level).to_string();
    let fallback = EnvConfig::from_lookup(|key| {
        std::env::var(key)
            .ok()
            .or_else(|| (key == rclcore::config::ENV_LOG_LEVEL).then(|| default_level.clone()))
    })
    .log_level;

    installed(
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(fallback))
            .format_timestamp_millis()
            .try_init(),
    )
}

/// Initialize console logging with an `env_logger` filter string.
///
/// # Safety
/// `filter` must be a valid NUL-terminated C string or NULL.
///
/// # Example (C)
/// ```c
/// rclcore_logging_init_with_filter("rclcore=debug,info");
/// ```
#[no_mangle]
pub unsafe extern "C" fn rclcore_logging_init_with_filter(filter: *const c_char) -> StatusCode {
    if filter.is_null() {
        return StatusCode::InvalidArgument;
    }
    let Ok(filter) = CStr::from_ptr(filter).to_str() else {
        return StatusCode::InvalidArgument;
    };

    installed(
        env_logger::Builder::new()
            .parse_filters(filter)
            .format_timestamp_millis()
            .try_init(),
    )
}
