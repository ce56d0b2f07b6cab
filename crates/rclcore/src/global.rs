// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide context singleton.
//!
//! Lifecycle:
//! - [`init`] creates the context on first call and returns the live one on
//!   later calls (idempotent)
//! - [`shutdown`] invalidates it; blocked wait sets wake up and entities start
//!   failing with `NotInit`
//! - a later [`init`] creates a fresh context
//! - [`init`] fails with `AlreadyInit` while a context created directly with
//!   [`Context::new`] is live
//!
//! Every function is safe to call from any thread; the slot is guarded by a
//! mutex that is never held while user code runs.

use crate::config::ContextOptions;
use crate::context::{Context, MIDDLEWARE_IDENTIFIER};
use crate::error::{Error, Result};
use parking_lot::Mutex;

static GLOBAL: Mutex<Option<Context>> = parking_lot::const_mutex(None);

/// Initialize the process-wide context from the environment.
pub fn init() -> Result<Context> {
    init_with(ContextOptions::from_env())
}

/// Initialize the process-wide context with explicit options.
///
/// If a live context already exists it is returned unchanged and `options`
/// are ignored.
pub fn init_with(options: ContextOptions) -> Result<Context> {
    let mut slot = GLOBAL.lock();
    if let Some(existing) = slot.as_ref().filter(|ctx| ctx.is_valid()) {
        log::debug!("[context] init called on live context, reusing it");
        return Ok(existing.clone());
    }

    let context = Context::new(options)?;
    *slot = Some(context.clone());
    Ok(context)
}

/// The live process-wide context.
pub fn context() -> Result<Context> {
    GLOBAL
        .lock()
        .as_ref()
        .filter(|ctx| ctx.is_valid())
        .cloned()
        .ok_or(Error::NotInit)
}

/// Whether the process-wide context is initialized and not shut down.
#[must_use]
pub fn is_ok() -> bool {
    GLOBAL.lock().as_ref().is_some_and(Context::is_valid)
}

/// Shut down the process-wide context.
pub fn shutdown() -> Result<()> {
    let context = GLOBAL.lock().take().ok_or(Error::NotInit)?;
    context.shutdown()
}

/// Identifier of the middleware backing the process-wide context.
#[must_use]
pub fn middleware_identifier() -> &'static str {
    MIDDLEWARE_IDENTIFIER
}
