// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy and numeric status codes.
//!
//! Every [`Error`] maps onto a stable [`StatusCode`] so the C boundary can
//! return a plain integer while the message goes to the last-error slot.
//! The numbering is layered per entity kind (1xx context and names, 2xx
//! node, 3xx publisher, ...), zero always meaning success.

use std::fmt;
use thiserror::Error;

use crate::waitset::WaitableKind;

/// Convenient alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric status returned across the C boundary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Operation completed successfully
    Ok = 0,
    /// Unspecified failure
    Error = 1,
    /// A wait returned without any entity becoming ready
    Timeout = 2,
    /// Operation is not supported by this backend
    Unsupported = 3,
    /// Allocation failed
    BadAlloc = 10,
    /// Invalid argument (null pointer, malformed string, out-of-range value)
    InvalidArgument = 11,

    // === Context and names (100-199) ===
    /// Context already initialized
    AlreadyInit = 100,
    /// Context not initialized or already shut down
    NotInit = 101,
    /// Entity belongs to a different middleware implementation
    MismatchedMiddleware = 102,
    /// Topic name violates the naming rules
    TopicNameInvalid = 103,
    /// Service name violates the naming rules
    ServiceNameInvalid = 104,

    // === Node (200-299) ===
    /// Node handle is invalid
    NodeInvalid = 200,
    /// Node name violates the naming rules
    NodeInvalidName = 201,
    /// Namespace violates the naming rules
    NodeInvalidNamespace = 202,
    /// Node still owns live entities
    NodeInUse = 210,

    // === Publisher / Subscription (300-499) ===
    /// Publisher handle is invalid
    PublisherInvalid = 300,
    /// Subscription handle is invalid
    SubscriptionInvalid = 400,
    /// No message was available to take
    SubscriptionTakeFailed = 401,

    // === Client / Service (500-699) ===
    /// Client handle is invalid
    ClientInvalid = 500,
    /// No response was available to take
    ClientTakeFailed = 501,
    /// Request id handle is invalid
    RequestIdInvalid = 502,
    /// Service handle is invalid
    ServiceInvalid = 600,
    /// No request was available to take
    ServiceTakeFailed = 601,

    // === Guard conditions (700-799) ===
    /// Guard condition handle is invalid
    GuardConditionInvalid = 700,

    // === Wait set (900-999) ===
    /// Wait set handle is invalid
    WaitSetInvalid = 900,
    /// Wait set has zero capacity for every kind
    WaitSetEmpty = 901,
    /// Capacity for the requested kind is exhausted
    WaitSetFull = 902,
    /// Slot token does not belong to the current wait cycle
    WaitSetStaleIndex = 903,

    // === QoS (1000-1099) ===
    /// Publisher and subscription QoS cannot be matched
    IncompatibleQos = 1000,
    /// Raw value does not name a known policy
    UnknownQosPolicy = 1001,
    /// QoS profile handle is invalid
    QosProfileInvalid = 1002,

    // === Buffers (1100-1199) ===
    /// Caller-supplied buffer cannot hold the payload
    BufferTooSmall = 1100,
}

impl StatusCode {
    /// Raw integer value.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Whether this code denotes success.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, StatusCode::Ok)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.as_i32())
    }
}

/// Entity kinds that can be referenced through a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Node,
    Publisher,
    Subscription,
    Service,
    Client,
    GuardCondition,
    WaitSet,
    RequestId,
    QosProfile,
}

impl EntityKind {
    /// Status reported when a handle of this kind is stale or unknown.
    #[must_use]
    pub const fn invalid_status(self) -> StatusCode {
        match self {
            EntityKind::Node => StatusCode::NodeInvalid,
            EntityKind::Publisher => StatusCode::PublisherInvalid,
            EntityKind::Subscription => StatusCode::SubscriptionInvalid,
            EntityKind::Service => StatusCode::ServiceInvalid,
            EntityKind::Client => StatusCode::ClientInvalid,
            EntityKind::GuardCondition => StatusCode::GuardConditionInvalid,
            EntityKind::WaitSet => StatusCode::WaitSetInvalid,
            EntityKind::RequestId => StatusCode::RequestIdInvalid,
            EntityKind::QosProfile => StatusCode::QosProfileInvalid,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Node => "node",
            EntityKind::Publisher => "publisher",
            EntityKind::Subscription => "subscription",
            EntityKind::Service => "service",
            EntityKind::Client => "client",
            EntityKind::GuardCondition => "guard condition",
            EntityKind::WaitSet => "wait set",
            EntityKind::RequestId => "request id",
            EntityKind::QosProfile => "qos profile",
        };
        f.write_str(name)
    }
}

/// Errors raised by the core.
#[derive(Debug, Error)]
pub enum Error {
    #[error("context already initialized")]
    AlreadyInit,
    #[error("context is not initialized or has been shut down")]
    NotInit,
    #[error("invalid node name '{name}': {reason}")]
    InvalidNodeName { name: String, reason: &'static str },
    #[error("invalid namespace '{namespace}': {reason}")]
    InvalidNamespace {
        namespace: String,
        reason: &'static str,
    },
    #[error("invalid topic name '{name}': {reason}")]
    InvalidTopicName { name: String, reason: &'static str },
    #[error("invalid service name '{name}': {reason}")]
    InvalidServiceName { name: String, reason: &'static str },
    #[error("node '{node}' still owns {children} entities")]
    NodeInUse { node: String, children: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("wait set {kind} capacity of {capacity} exceeded")]
    CapacityExceeded { kind: WaitableKind, capacity: usize },
    #[error("wait set has zero capacity for every entity kind")]
    WaitSetEmpty,
    #[error("wait set slot does not belong to the current wait cycle")]
    StaleSlot,
    #[error("incompatible QoS: {0}")]
    IncompatibleQos(String),
    #[error("unknown {policy} policy value {value}")]
    UnknownQosPolicy { policy: &'static str, value: i32 },
    #[error("buffer too small: need {required} bytes, have {available}")]
    BufferTooSmall { required: usize, available: usize },
    #[error("{0} handle is invalid or was already destroyed")]
    InvalidHandle(EntityKind),
}

impl Error {
    /// Numeric status associated with this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Error::AlreadyInit => StatusCode::AlreadyInit,
            Error::NotInit => StatusCode::NotInit,
            Error::InvalidNodeName { .. } => StatusCode::NodeInvalidName,
            Error::InvalidNamespace { .. } => StatusCode::NodeInvalidNamespace,
            Error::InvalidTopicName { .. } => StatusCode::TopicNameInvalid,
            Error::InvalidServiceName { .. } => StatusCode::ServiceNameInvalid,
            Error::NodeInUse { .. } => StatusCode::NodeInUse,
            Error::InvalidArgument(_) => StatusCode::InvalidArgument,
            Error::CapacityExceeded { .. } => StatusCode::WaitSetFull,
            Error::WaitSetEmpty => StatusCode::WaitSetEmpty,
            Error::StaleSlot => StatusCode::WaitSetStaleIndex,
            Error::IncompatibleQos(_) => StatusCode::IncompatibleQos,
            Error::UnknownQosPolicy { .. } => StatusCode::UnknownQosPolicy,
            Error::BufferTooSmall { .. } => StatusCode::BufferTooSmall,
            Error::InvalidHandle(kind) => kind.invalid_status(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_are_stable() {
        assert_eq!(StatusCode::Ok.as_i32(), 0);
        assert_eq!(StatusCode::Timeout.as_i32(), 2);
        assert_eq!(StatusCode::SubscriptionTakeFailed.as_i32(), 401);
        assert_eq!(StatusCode::WaitSetFull.as_i32(), 902);
        assert!(StatusCode::Ok.is_ok());
        assert!(!StatusCode::Error.is_ok());
    }

    #[test]
    fn errors_map_to_kind_specific_codes() {
        let err = Error::CapacityExceeded {
            kind: WaitableKind::Subscription,
            capacity: 2,
        };
        assert_eq!(err.status(), StatusCode::WaitSetFull);
        assert_eq!(err.to_string(), "wait set subscription capacity of 2 exceeded");

        assert_eq!(
            Error::InvalidHandle(EntityKind::Client).status(),
            StatusCode::ClientInvalid
        );
        assert_eq!(
            Error::InvalidHandle(EntityKind::QosProfile).to_string(),
            "qos profile handle is invalid or was already destroyed"
        );
    }
}
