// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Middleware context.
//!
//! A [`Context`] owns the entity graph of the intra-process backend and the
//! validity flag every entity checks before doing work. Contexts are cheap to
//! clone (shared ownership); the process-wide instance used by the C boundary
//! lives in [`crate::global`].
//!
//! At most one context is live per process. [`Context::new`] fails with
//! [`Error::AlreadyInit`] until the live one is shut down or its last handle
//! is dropped.

use crate::condition::WaiterList;
use crate::config::{ContextOptions, MAX_DOMAIN_ID};
use crate::error::{Error, Result};
use crate::gid::Gid;
use crate::graph::Graph;
use crate::node::Node;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Identifier reported by [`Context::middleware_identifier`].
pub const MIDDLEWARE_IDENTIFIER: &str = "rclcore_intra";

static NEXT_INSTANCE_ID: AtomicU32 = AtomicU32::new(1);

/// Set while a registered context is live
static LIVE: AtomicBool = AtomicBool::new(false);

pub(crate) struct ContextShared {
    instance_id: u32,
    options: ContextOptions,
    valid: AtomicBool,
    next_entity: AtomicU32,
    /// Holds the process-wide live slot
    registered: bool,
    pub(crate) graph: Graph,
    /// Wait sets blocked while the context is live; woken on shutdown
    pub(crate) shutdown_waiters: WaiterList,
}

impl ContextShared {
    fn release(&self) {
        if self.registered {
            LIVE.store(false, Ordering::Release);
        }
    }
}

impl Drop for ContextShared {
    fn drop(&mut self) {
        if self.valid.swap(false, Ordering::AcqRel) {
            log::debug!("[context] instance={} dropped while live", self.instance_id);
            self.release();
        }
    }
}

/// Shared handle to a middleware context.
#[derive(Clone)]
pub struct Context {
    shared: Arc<ContextShared>,
}

impl Context {
    /// Create a context with explicit options.
    ///
    /// Fails with [`Error::AlreadyInit`] while another context is live.
    pub fn new(options: ContextOptions) -> Result<Self> {
        Self::validate(&options)?;
        if LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::AlreadyInit);
        }
        Ok(Self::build(options, true))
    }

    /// Context outside the process-wide slot, so unit tests can run side by side.
    #[cfg(test)]
    pub(crate) fn isolated(options: ContextOptions) -> Result<Self> {
        Self::validate(&options)?;
        Ok(Self::build(options, false))
    }

    fn validate(options: &ContextOptions) -> Result<()> {
        if options.domain_id > MAX_DOMAIN_ID {
            return Err(Error::InvalidArgument(format!(
                "domain id {} exceeds {}",
                options.domain_id, MAX_DOMAIN_ID
            )));
        }
        Ok(())
    }

    fn build(options: ContextOptions, registered: bool) -> Self {
        let instance_id = NEXT_INSTANCE_ID.fetch_add(1, Ordering::Relaxed);
        log::info!(
            "[context] init instance={} domain={} enclave={:?}",
            instance_id,
            options.domain_id,
            options.enclave
        );

        Self {
            shared: Arc::new(ContextShared {
                instance_id,
                options,
                valid: AtomicBool::new(true),
                next_entity: AtomicU32::new(1),
                registered,
                graph: Graph::new(),
                shutdown_waiters: WaiterList::new(),
            }),
        }
    }

    /// Create a context configured from the environment.
    pub fn from_env() -> Result<Self> {
        Self::new(ContextOptions::from_env())
    }

    /// Whether the context has not been shut down.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.shared.valid.load(Ordering::Acquire)
    }

    /// Invalidate the context and wake every wait set blocked on it.
    ///
    /// Existing entities stay allocated but every operation on them fails
    /// with [`Error::NotInit`]. A second call also returns `NotInit`.
    pub fn shutdown(&self) -> Result<()> {
        if !self.shared.valid.swap(false, Ordering::AcqRel) {
            return Err(Error::NotInit);
        }
        log::info!("[context] shutdown instance={}", self.shared.instance_id);
        self.shared.release();
        self.shared.shutdown_waiters.notify_all();
        Ok(())
    }

    /// Create a node under this context.
    pub fn create_node(&self, name: &str, namespace: &str) -> Result<Node> {
        Node::new(self, name, namespace)
    }

    #[must_use]
    pub fn middleware_identifier(&self) -> &'static str {
        MIDDLEWARE_IDENTIFIER
    }

    #[must_use]
    pub fn instance_id(&self) -> u32 {
        self.shared.instance_id
    }

    #[must_use]
    pub fn domain_id(&self) -> u32 {
        self.shared.options.domain_id
    }

    #[must_use]
    pub fn enclave(&self) -> Option<&str> {
        self.shared.options.enclave.as_deref()
    }

    pub(crate) fn keep_all_limit(&self) -> usize {
        self.shared.options.keep_all_limit
    }

    pub(crate) fn ensure_valid(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::NotInit)
        }
    }

    pub(crate) fn next_gid(&self) -> Gid {
        let entity = self.shared.next_entity.fetch_add(1, Ordering::Relaxed);
        Gid::new(self.shared.instance_id, self.domain_id(), entity)
    }

    pub(crate) fn shared(&self) -> &ContextShared {
        &self.shared
    }

    pub(crate) fn graph(&self) -> &Graph {
        &self.shared.graph
    }

    /// Whether both handles refer to the same context instance.
    #[must_use]
    pub fn same_as(&self, other: &Context) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("instance_id", &self.shared.instance_id)
            .field("domain_id", &self.shared.options.domain_id)
            .field("valid", &self.is_valid())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The only test here that claims the process-wide slot
    #[test]
    fn one_live_context_per_process() {
        let first = Context::new(ContextOptions::default()).expect("first");
        assert!(matches!(
            Context::new(ContextOptions::default()),
            Err(Error::AlreadyInit)
        ));

        first.shutdown().expect("shutdown");
        let second = Context::new(ContextOptions::default()).expect("after shutdown");
        assert!(!second.same_as(&first));

        // Dropping the last handle frees the slot too
        drop(second);
        let third = Context::new(ContextOptions::default()).expect("after drop");
        third.shutdown().expect("release");
    }

    #[test]
    fn new_context_is_valid_until_shutdown() {
        let context = Context::isolated(ContextOptions::default()).expect("context");
        assert!(context.is_valid());
        assert_eq!(context.middleware_identifier(), MIDDLEWARE_IDENTIFIER);

        context.shutdown().expect("first shutdown");
        assert!(!context.is_valid());
        assert!(matches!(context.shutdown(), Err(Error::NotInit)));
        assert!(matches!(context.ensure_valid(), Err(Error::NotInit)));
    }

    #[test]
    fn instance_ids_are_unique() {
        let a = Context::isolated(ContextOptions::default()).expect("a");
        let b = Context::isolated(ContextOptions::default()).expect("b");
        assert_ne!(a.instance_id(), b.instance_id());
        assert!(a.same_as(&a.clone()));
        assert!(!a.same_as(&b));
    }

    #[test]
    fn out_of_range_domain_is_rejected() {
        let err = Context::isolated(ContextOptions::default().domain_id(MAX_DOMAIN_ID + 1))
            .expect_err("domain too large");
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn gids_carry_domain_and_are_unique() {
        let context = Context::isolated(ContextOptions::default().domain_id(3)).expect("context");
        let a = context.next_gid();
        let b = context.next_gid();
        assert_ne!(a, b);
        assert_eq!(&a.as_bytes()[8..12], &3u32.to_be_bytes());
    }

    #[test]
    fn options_are_exposed() {
        let context = Context::isolated(ContextOptions::default().enclave("/secure").keep_all_limit(5))
            .expect("context");
        assert_eq!(context.enclave(), Some("/secure"));
        assert_eq!(context.keep_all_limit(), 5);
        assert_eq!(context.domain_id(), 0);
    }
}
