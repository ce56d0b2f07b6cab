// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # rclcore - entity lifecycle and wait-set polling core
//!
//! The layer between an application and a pub/sub + request/response
//! middleware: it owns the process context, the entities created under it and
//! a capacity-bounded wait set used to multiplex their readiness in a single
//! blocking call. The bundled backend (`rclcore_intra`) routes messages
//! between entities of the same context.
//!
//! ## Quick Start
//!
//! ```rust
//! use rclcore::{
//!     Context, ContextOptions, SerializedMessage, TypeSupport, WaitSet, WaitSetCapacity,
//!     WaitStatus,
//! };
//! use std::time::Duration;
//!
//! fn main() -> rclcore::Result<()> {
//!     let context = Context::new(ContextOptions::default())?;
//!     let node = context.create_node("talker", "/demo")?;
//!     let ts = TypeSupport::named("std_msgs/msg/String");
//!
//!     let publisher = node.create_publisher("chatter", &ts)?;
//!     let subscription = node.create_subscription("chatter", &ts)?;
//!
//!     let mut wait_set = WaitSet::new(&context, WaitSetCapacity::new(1, 0, 0, 0, 0, 0))?;
//!     publisher.publish(&SerializedMessage::from_bytes(b"hello"))?;
//!
//!     wait_set.clear();
//!     let index = wait_set.add_subscription(&subscription)?;
//!     if wait_set.wait(Some(Duration::from_secs(1)))? == WaitStatus::Ready
//!         && wait_set.is_subscription_ready(index)
//!     {
//!         let mut message = SerializedMessage::new();
//!         if subscription.take(&mut message)?.is_some() {
//!             assert_eq!(message.as_bytes(), b"hello");
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Modules Overview
//!
//! - [`global`] - process-wide context singleton
//! - [`waitset`] - wait set, readiness queries and typed wait cycles
//! - [`qos`] - QoS profile, presets and compatibility rules
//! - [`names`] - node, namespace, topic and service naming rules
//! - [`executor`] - one-shot dispatch helper
//! - [`config`] - environment configuration

mod condition;
mod graph;
mod queue;
mod wake;

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod gid;
pub mod global;
pub mod guard_condition;
pub mod message;
pub mod names;
pub mod node;
pub mod publisher;
pub mod qos;
pub mod rpc;
pub mod service;
pub mod subscription;
pub mod waitset;

pub use client::Client;
pub use config::{ContextOptions, EnvConfig};
pub use context::{Context, MIDDLEWARE_IDENTIFIER};
pub use error::{EntityKind, Error, Result, StatusCode};
pub use executor::{spin_once, SpinCallbacks, SpinEntities};
pub use gid::Gid;
pub use guard_condition::GuardCondition;
pub use message::{MessageInfo, SerializedMessage, TypeSupport};
pub use node::{Node, NodeInUse};
pub use publisher::Publisher;
pub use qos::{
    check_compatible, Compatibility, DurabilityPolicy, HistoryPolicy, LivelinessPolicy,
    QosDuration, QosProfile, ReliabilityPolicy,
};
pub use rpc::RequestId;
pub use service::Service;
pub use subscription::Subscription;
pub use waitset::{duration_from_nanos, WaitCycle, WaitSet, WaitSetCapacity, WaitStatus, WaitableKind};
