// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! QoS profile handles.
//!
//! Raw integer policy values coming from C are translated into the closed
//! enums of `rclcore::qos` here; unknown values are rejected with
//! `UnknownQosPolicy` before any profile is touched.

use crate::error::{fail, set_last_error, status_of};
use crate::handles::{RclHandle, Registry};
use crate::out_ok;
use rclcore::{
    check_compatible, Compatibility, DurabilityPolicy, EntityKind, Error, HistoryPolicy, LivelinessPolicy, QosDuration,
    QosProfile, ReliabilityPolicy, StatusCode,
};

pub(crate) static QOS_PROFILES: Registry<QosProfile> = Registry::new(EntityKind::QosProfile);

/// Built-in profiles.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RclQosPreset {
    RclQosDefault = 0,
    RclQosSensorData = 1,
    RclQosServicesDefault = 2,
    RclQosParameters = 3,
    RclQosSystemDefault = 4,
}

impl From<RclQosPreset> for QosProfile {
    fn from(preset: RclQosPreset) -> Self {
        match preset {
            RclQosPreset::RclQosDefault => QosProfile::default(),
            RclQosPreset::RclQosSensorData => QosProfile::sensor_data(),
            RclQosPreset::RclQosServicesDefault => QosProfile::services_default(),
            RclQosPreset::RclQosParameters => QosProfile::parameters(),
            RclQosPreset::RclQosSystemDefault => QosProfile::system_default(),
        }
    }
}

/// Flat view of a profile, policies as raw values.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RclQosValues {
    pub history: i32,
    pub depth: usize,
    pub reliability: i32,
    pub durability: i32,
    pub deadline_sec: u64,
    pub deadline_nsec: u64,
    pub lifespan_sec: u64,
    pub lifespan_nsec: u64,
    pub liveliness: i32,
    pub liveliness_lease_sec: u64,
    pub liveliness_lease_nsec: u64,
    pub avoid_ros_namespace_conventions: bool,
}

impl From<&QosProfile> for RclQosValues {
    fn from(qos: &QosProfile) -> Self {
        Self {
            history: qos.history().as_raw(),
            depth: qos.depth(),
            reliability: qos.reliability().as_raw(),
            durability: qos.durability().as_raw(),
            deadline_sec: qos.deadline().sec,
            deadline_nsec: qos.deadline().nsec,
            lifespan_sec: qos.lifespan().sec,
            lifespan_nsec: qos.lifespan().nsec,
            liveliness: qos.liveliness().as_raw(),
            liveliness_lease_sec: qos.liveliness_lease_duration().sec,
            liveliness_lease_nsec: qos.liveliness_lease_duration().nsec,
            avoid_ros_namespace_conventions: qos.avoid_ros_namespace_conventions(),
        }
    }
}

/// Resolve an optional profile handle; NULL selects `fallback`.
pub(crate) fn resolve(handle: RclHandle, fallback: QosProfile) -> Result<QosProfile, Error> {
    if handle.is_null() {
        return Ok(fallback);
    }
    QOS_PROFILES.get(handle)
}

/// Create a profile initialized from a preset.
///
/// # Safety
/// `out` must be a valid pointer to an `RclHandle`.
#[no_mangle]
pub unsafe extern "C" fn rclcore_qos_profile_create(
    out: *mut RclHandle,
    preset: RclQosPreset,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    *out = RclHandle::NULL;

    match QOS_PROFILES.insert(preset.into()) {
        Ok(handle) => out_ok(out, handle),
        Err(err) => fail(err),
    }
}

#[no_mangle]
pub extern "C" fn rclcore_qos_profile_destroy(qos: RclHandle) -> StatusCode {
    status_of(QOS_PROFILES.remove(qos).map(drop))
}

/// Overwrite every field of a profile.
///
/// Nothing is written if any raw policy value is unknown or `depth` is
/// negative.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub extern "C" fn rclcore_qos_profile_write(
    qos: RclHandle,
    history: i32,
    depth: i32,
    reliability: i32,
    durability: i32,
    deadline_sec: u64,
    deadline_nsec: u64,
    lifespan_sec: u64,
    lifespan_nsec: u64,
    liveliness: i32,
    liveliness_lease_sec: u64,
    liveliness_lease_nsec: u64,
    avoid_ros_namespace_conventions: bool,
) -> StatusCode {
    let result = (|| -> Result<_, Error> {
        let history = HistoryPolicy::from_raw(history)?;
        let reliability = ReliabilityPolicy::from_raw(reliability)?;
        let durability = DurabilityPolicy::from_raw(durability)?;
        let liveliness = LivelinessPolicy::from_raw(liveliness)?;
        let depth = usize::try_from(depth)
            .map_err(|_| Error::InvalidArgument(format!("negative history depth {depth}")))?;

        QOS_PROFILES.update(qos, |profile| {
            profile.write(
                history,
                depth,
                reliability,
                durability,
                QosDuration::new(deadline_sec, deadline_nsec),
                QosDuration::new(lifespan_sec, lifespan_nsec),
                liveliness,
                QosDuration::new(liveliness_lease_sec, liveliness_lease_nsec),
                avoid_ros_namespace_conventions,
            );
        })
    })();
    status_of(result)
}

/// Read a profile back.
///
/// # Safety
/// `out` must be a valid pointer to an `RclQosValues`.
#[no_mangle]
pub unsafe extern "C" fn rclcore_qos_profile_get(qos: RclHandle, out: *mut RclQosValues) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    match QOS_PROFILES.get(qos) {
        Ok(profile) => out_ok(out, RclQosValues::from(&profile)),
        Err(err) => fail(err),
    }
}

/// Outcome of matching a publisher profile against a subscription profile.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RclQosCompatibility {
    RclQosCompatible = 0,
    RclQosCompatibleWithWarning = 1,
    RclQosIncompatible = 2,
}

/// Check whether `publisher_qos` satisfies `subscription_qos`.
///
/// The reason for a warning or an incompatibility is stored in the
/// last-error slot.
///
/// # Safety
/// `out` must be a valid pointer to an `RclQosCompatibility`.
#[no_mangle]
pub unsafe extern "C" fn rclcore_qos_check_compatible(
    publisher_qos: RclHandle,
    subscription_qos: RclHandle,
    out: *mut RclQosCompatibility,
) -> StatusCode {
    if out.is_null() {
        return StatusCode::InvalidArgument;
    }
    let profiles = QOS_PROFILES
        .get(publisher_qos)
        .and_then(|publisher| Ok((publisher, QOS_PROFILES.get(subscription_qos)?)));
    let (publisher, subscription) = match profiles {
        Ok(profiles) => profiles,
        Err(err) => return fail(err),
    };

    let verdict = match check_compatible(&publisher, &subscription) {
        Compatibility::Ok => RclQosCompatibility::RclQosCompatible,
        Compatibility::Warning(reason) => {
            set_last_error(reason);
            RclQosCompatibility::RclQosCompatibleWithWarning
        }
        Compatibility::Error(reason) => {
            set_last_error(Error::IncompatibleQos(reason).to_string());
            RclQosCompatibility::RclQosIncompatible
        }
    };
    out_ok(out, verdict)
}
