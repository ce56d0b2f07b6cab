// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Delivery policy attached to publishers, subscriptions, services and clients.
//!
//! A [`QosProfile`] is a plain value: it is created from a preset, replaced
//! wholesale with [`QosProfile::write`] and copied into an entity at creation
//! time. The policy enums are owned by this crate; raw integers coming from a
//! foreign caller are translated with the `from_raw` constructors, which
//! reject values outside the closed set instead of passing them through.

use crate::error::{Error, Result};
use std::fmt;
use std::time::Duration;

/// Revision of the policy enum encoding accepted by `from_raw`.
pub const QOS_POLICY_REVISION: u32 = 1;

macro_rules! raw_policy {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $( $(#[$vmeta:meta])* $variant:ident = $value:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            /// Translate a raw integer from the foreign boundary.
            pub fn from_raw(value: i32) -> Result<Self> {
                match value {
                    $( $value => Ok($name::$variant), )+
                    _ => Err(Error::UnknownQosPolicy {
                        policy: $label,
                        value,
                    }),
                }
            }

            /// Raw integer used at the foreign boundary.
            #[must_use]
            pub const fn as_raw(self) -> i32 {
                match self {
                    $( $name::$variant => $value, )+
                }
            }
        }
    };
}

raw_policy! {
    /// History policy: how many samples are retained per queue.
    HistoryPolicy, "history" {
        /// Middleware default (resolves to KEEP_LAST)
        SystemDefault = 0,
        /// Keep the last `depth` samples
        KeepLast = 1,
        /// Keep every sample, up to the context resource limit
        KeepAll = 2,
    }
}

raw_policy! {
    /// Reliability policy.
    ReliabilityPolicy, "reliability" {
        /// Middleware default (resolves to RELIABLE)
        SystemDefault = 0,
        /// Every sample is delivered
        Reliable = 1,
        /// Samples may be dropped
        BestEffort = 2,
    }
}

raw_policy! {
    /// Durability policy.
    DurabilityPolicy, "durability" {
        /// Middleware default (resolves to VOLATILE)
        SystemDefault = 0,
        /// Publisher keeps its history for late-joining subscriptions
        TransientLocal = 1,
        /// No history is kept for late joiners
        Volatile = 2,
    }
}

raw_policy! {
    /// Liveliness policy. Raw value 2 (manual-by-node) is deprecated and rejected.
    LivelinessPolicy, "liveliness" {
        /// Middleware default (resolves to AUTOMATIC)
        SystemDefault = 0,
        /// Liveliness asserted by the middleware
        Automatic = 1,
        /// Liveliness asserted by publishing on the topic
        ManualByTopic = 3,
    }
}

/// Duration expressed as seconds plus nanoseconds. `0/0` means unspecified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QosDuration {
    pub sec: u64,
    pub nsec: u64,
}

impl QosDuration {
    /// Unspecified duration (infinite for deadline, lifespan and lease).
    pub const UNSPECIFIED: QosDuration = QosDuration { sec: 0, nsec: 0 };

    #[must_use]
    pub const fn new(sec: u64, nsec: u64) -> Self {
        Self { sec, nsec }
    }

    #[must_use]
    pub const fn is_unspecified(&self) -> bool {
        self.sec == 0 && self.nsec == 0
    }

    /// Convert to a [`Duration`]; `None` when unspecified.
    #[must_use]
    pub fn to_duration(&self) -> Option<Duration> {
        if self.is_unspecified() {
            return None;
        }
        Some(Duration::from_secs(self.sec).saturating_add(Duration::from_nanos(self.nsec)))
    }
}

impl From<Duration> for QosDuration {
    fn from(d: Duration) -> Self {
        Self {
            sec: d.as_secs(),
            nsec: u64::from(d.subsec_nanos()),
        }
    }
}

impl fmt::Display for QosDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            f.write_str("unspecified")
        } else {
            write!(f, "{}s{}ns", self.sec, self.nsec)
        }
    }
}

/// Delivery policy profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QosProfile {
    history: HistoryPolicy,
    depth: usize,
    reliability: ReliabilityPolicy,
    durability: DurabilityPolicy,
    deadline: QosDuration,
    lifespan: QosDuration,
    liveliness: LivelinessPolicy,
    liveliness_lease_duration: QosDuration,
    avoid_ros_namespace_conventions: bool,
}

impl Default for QosProfile {
    /// Middleware default: KEEP_LAST 10, RELIABLE, VOLATILE.
    fn default() -> Self {
        Self::with_policies(
            HistoryPolicy::KeepLast,
            10,
            ReliabilityPolicy::Reliable,
            DurabilityPolicy::Volatile,
        )
    }
}

impl QosProfile {
    const fn with_policies(
        history: HistoryPolicy,
        depth: usize,
        reliability: ReliabilityPolicy,
        durability: DurabilityPolicy,
    ) -> Self {
        Self {
            history,
            depth,
            reliability,
            durability,
            deadline: QosDuration::UNSPECIFIED,
            lifespan: QosDuration::UNSPECIFIED,
            liveliness: LivelinessPolicy::SystemDefault,
            liveliness_lease_duration: QosDuration::UNSPECIFIED,
            avoid_ros_namespace_conventions: false,
        }
    }

    /// Sensor streams: KEEP_LAST 5, BEST_EFFORT, VOLATILE.
    #[must_use]
    pub const fn sensor_data() -> Self {
        Self::with_policies(
            HistoryPolicy::KeepLast,
            5,
            ReliabilityPolicy::BestEffort,
            DurabilityPolicy::Volatile,
        )
    }

    /// Service endpoints: KEEP_LAST 10, RELIABLE, VOLATILE.
    #[must_use]
    pub const fn services_default() -> Self {
        Self::with_policies(
            HistoryPolicy::KeepLast,
            10,
            ReliabilityPolicy::Reliable,
            DurabilityPolicy::Volatile,
        )
    }

    /// Parameter services: KEEP_LAST 1000, RELIABLE, VOLATILE.
    #[must_use]
    pub const fn parameters() -> Self {
        Self::with_policies(
            HistoryPolicy::KeepLast,
            1000,
            ReliabilityPolicy::Reliable,
            DurabilityPolicy::Volatile,
        )
    }

    /// Every policy left to the middleware.
    #[must_use]
    pub const fn system_default() -> Self {
        Self::with_policies(
            HistoryPolicy::SystemDefault,
            0,
            ReliabilityPolicy::SystemDefault,
            DurabilityPolicy::SystemDefault,
        )
    }

    /// Overwrite every field in one operation.
    pub fn write(
        &mut self,
        history: HistoryPolicy,
        depth: usize,
        reliability: ReliabilityPolicy,
        durability: DurabilityPolicy,
        deadline: QosDuration,
        lifespan: QosDuration,
        liveliness: LivelinessPolicy,
        liveliness_lease_duration: QosDuration,
        avoid_ros_namespace_conventions: bool,
    ) {
        *self = Self {
            history,
            depth,
            reliability,
            durability,
            deadline,
            lifespan,
            liveliness,
            liveliness_lease_duration,
            avoid_ros_namespace_conventions,
        };
    }

    #[must_use]
    pub const fn history(&self) -> HistoryPolicy {
        self.history
    }

    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    #[must_use]
    pub const fn reliability(&self) -> ReliabilityPolicy {
        self.reliability
    }

    #[must_use]
    pub const fn durability(&self) -> DurabilityPolicy {
        self.durability
    }

    #[must_use]
    pub const fn deadline(&self) -> QosDuration {
        self.deadline
    }

    #[must_use]
    pub const fn lifespan(&self) -> QosDuration {
        self.lifespan
    }

    #[must_use]
    pub const fn liveliness(&self) -> LivelinessPolicy {
        self.liveliness
    }

    #[must_use]
    pub const fn liveliness_lease_duration(&self) -> QosDuration {
        self.liveliness_lease_duration
    }

    #[must_use]
    pub const fn avoid_ros_namespace_conventions(&self) -> bool {
        self.avoid_ros_namespace_conventions
    }

    /// Replace SYSTEM_DEFAULT policies with what this backend applies.
    #[must_use]
    pub(crate) fn resolved(&self) -> Self {
        let mut resolved = *self;
        if matches!(self.history, HistoryPolicy::SystemDefault) {
            resolved.history = HistoryPolicy::KeepLast;
            if resolved.depth == 0 {
                resolved.depth = 10;
            }
        }
        if matches!(self.reliability, ReliabilityPolicy::SystemDefault) {
            resolved.reliability = ReliabilityPolicy::Reliable;
        }
        if matches!(self.durability, DurabilityPolicy::SystemDefault) {
            resolved.durability = DurabilityPolicy::Volatile;
        }
        if matches!(self.liveliness, LivelinessPolicy::SystemDefault) {
            resolved.liveliness = LivelinessPolicy::Automatic;
        }
        resolved
    }

    /// Queue bound implied by the history policy.
    pub(crate) fn queue_limit(&self, keep_all_limit: usize) -> usize {
        let resolved = self.resolved();
        match resolved.history {
            HistoryPolicy::KeepAll => keep_all_limit.max(1),
            _ => resolved.depth.max(1),
        }
    }
}

/// Outcome of a publisher/subscription compatibility check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compatibility {
    /// Endpoints match
    Ok,
    /// Endpoints match, but SYSTEM_DEFAULT policies leave room for surprises
    Warning(String),
    /// Endpoints never match
    Error(String),
}

impl Compatibility {
    /// Whether the endpoints are matched by the backend.
    #[must_use]
    pub fn is_compatible(&self) -> bool {
        !matches!(self, Compatibility::Error(_))
    }
}

fn offered_longer(offered: QosDuration, requested: QosDuration) -> bool {
    match (offered.to_duration(), requested.to_duration()) {
        (_, None) => false,
        (None, Some(_)) => true,
        (Some(offered), Some(requested)) => offered > requested,
    }
}

/// Check whether a publisher profile satisfies a subscription profile.
#[must_use]
pub fn check_compatible(publisher: &QosProfile, subscription: &QosProfile) -> Compatibility {
    let mut warnings = Vec::new();
    if matches!(publisher.reliability, ReliabilityPolicy::SystemDefault)
        || matches!(subscription.reliability, ReliabilityPolicy::SystemDefault)
    {
        warnings.push("reliability is SYSTEM_DEFAULT");
    }
    if matches!(publisher.durability, DurabilityPolicy::SystemDefault)
        || matches!(subscription.durability, DurabilityPolicy::SystemDefault)
    {
        warnings.push("durability is SYSTEM_DEFAULT");
    }

    let publisher = publisher.resolved();
    let subscription = subscription.resolved();

    if publisher.reliability == ReliabilityPolicy::BestEffort
        && subscription.reliability == ReliabilityPolicy::Reliable
    {
        return Compatibility::Error(
            "BEST_EFFORT publisher and RELIABLE subscription".to_string(),
        );
    }

    if publisher.durability == DurabilityPolicy::Volatile
        && subscription.durability == DurabilityPolicy::TransientLocal
    {
        return Compatibility::Error(
            "VOLATILE publisher and TRANSIENT_LOCAL subscription".to_string(),
        );
    }

    if offered_longer(publisher.deadline, subscription.deadline) {
        return Compatibility::Error(format!(
            "publisher deadline {} is longer than subscription deadline {}",
            publisher.deadline, subscription.deadline
        ));
    }

    if publisher.liveliness == LivelinessPolicy::Automatic
        && subscription.liveliness == LivelinessPolicy::ManualByTopic
    {
        return Compatibility::Error(
            "AUTOMATIC publisher liveliness and MANUAL_BY_TOPIC subscription".to_string(),
        );
    }

    if offered_longer(
        publisher.liveliness_lease_duration,
        subscription.liveliness_lease_duration,
    ) {
        return Compatibility::Error(format!(
            "publisher lease {} is longer than subscription lease {}",
            publisher.liveliness_lease_duration, subscription.liveliness_lease_duration
        ));
    }

    if warnings.is_empty() {
        Compatibility::Ok
    } else {
        Compatibility::Warning(warnings.join(", "))
    }
}
