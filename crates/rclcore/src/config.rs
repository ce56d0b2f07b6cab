// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Context configuration, read from the environment or built in code.
//!
//! ## Environment variables
//! - `RCLCORE_DOMAIN_ID`: domain id folded into every entity GID (default: 0,
//!   or `ROS_DOMAIN_ID` if set)
//! - `RCLCORE_KEEP_ALL_LIMIT`: maximum queued samples for KEEP_ALL history
//!   (default: 1000)
//! - `RCLCORE_LOG_LEVEL`: default log filter used by the C logging helpers
//!   (default: "info")
//! - `RCLCORE_ENCLAVE`: enclave name recorded in the context (fallback:
//!   `ROS_SECURITY_ENCLAVE`)
//!
//! # Example
//!
//! ```bash
//! export RCLCORE_DOMAIN_ID=42
//! export RCLCORE_KEEP_ALL_LIMIT=256
//! export RCLCORE_LOG_LEVEL=debug
//! ```

use std::env;
use std::str::FromStr;

/// Environment variable names
pub const ENV_DOMAIN_ID: &str = "RCLCORE_DOMAIN_ID";
pub const ENV_KEEP_ALL_LIMIT: &str = "RCLCORE_KEEP_ALL_LIMIT";
pub const ENV_LOG_LEVEL: &str = "RCLCORE_LOG_LEVEL";
pub const ENV_ENCLAVE: &str = "RCLCORE_ENCLAVE";

/// ROS 2 environment variable for domain ID (fallback)
pub const ENV_ROS_DOMAIN_ID: &str = "ROS_DOMAIN_ID";
/// ROS 2 security enclave (fallback)
pub const ENV_ROS_SECURITY_ENCLAVE: &str = "ROS_SECURITY_ENCLAVE";

/// Highest domain id accepted by the context.
pub const MAX_DOMAIN_ID: u32 = 232;

/// Default resource limit for KEEP_ALL queues.
pub const DEFAULT_KEEP_ALL_LIMIT: usize = 1000;

/// Runtime configuration from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Domain id (0-232)
    pub domain_id: u32,

    /// Resource limit applied to KEEP_ALL queues
    pub keep_all_limit: usize,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Enclave name
    pub enclave: Option<String>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            domain_id: 0,
            keep_all_limit: DEFAULT_KEEP_ALL_LIMIT,
            log_level: "info".to_string(),
            enclave: None,
        }
    }
}

impl EnvConfig {
    /// Load configuration from environment variables
    ///
    /// Priority for domain ID:
    /// 1. RCLCORE_DOMAIN_ID
    /// 2. ROS_DOMAIN_ID
    /// 3. Default (0)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup (used by tests).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let domain_id = parse_var::<u32, _>(&lookup, ENV_DOMAIN_ID)
            .or_else(|| parse_var::<u32, _>(&lookup, ENV_ROS_DOMAIN_ID))
            .unwrap_or(defaults.domain_id);

        let keep_all_limit = parse_var::<usize, _>(&lookup, ENV_KEEP_ALL_LIMIT)
            .filter(|limit| *limit > 0)
            .unwrap_or(defaults.keep_all_limit);

        let log_level = lookup(ENV_LOG_LEVEL)
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.log_level);

        let enclave = lookup(ENV_ENCLAVE)
            .or_else(|| lookup(ENV_ROS_SECURITY_ENCLAVE))
            .filter(|s| !s.is_empty());

        Self {
            domain_id,
            keep_all_limit,
            log_level,
            enclave,
        }
    }

    /// Convert into context options.
    #[must_use]
    pub fn to_options(&self) -> ContextOptions {
        ContextOptions {
            domain_id: self.domain_id,
            keep_all_limit: self.keep_all_limit,
            enclave: self.enclave.clone(),
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("[config] ignoring {}={:?}: not a valid number", key, raw);
            None
        }
    }
}

/// Options applied when a context is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextOptions {
    /// Domain id folded into entity GIDs
    pub domain_id: u32,
    /// Resource limit applied to KEEP_ALL queues
    pub keep_all_limit: usize,
    /// Enclave name
    pub enclave: Option<String>,
}

impl Default for ContextOptions {
    fn default() -> Self {
        EnvConfig::default().to_options()
    }
}

impl ContextOptions {
    /// Options read from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        EnvConfig::from_env().to_options()
    }

    /// Set the domain id.
    #[must_use]
    pub fn domain_id(mut self, domain_id: u32) -> Self {
        self.domain_id = domain_id;
        self
    }

    /// Set the KEEP_ALL resource limit.
    #[must_use]
    pub fn keep_all_limit(mut self, limit: usize) -> Self {
        self.keep_all_limit = limit;
        self
    }

    /// Set the enclave name.
    #[must_use]
    pub fn enclave(mut self, enclave: impl Into<String>) -> Self {
        self.enclave = Some(enclave.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = EnvConfig::from_lookup(|_| None);
        assert_eq!(config, EnvConfig::default());
        assert_eq!(config.keep_all_limit, DEFAULT_KEEP_ALL_LIMIT);
    }

    #[test]
    fn domain_id_prefers_own_variable_over_ros() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            (ENV_DOMAIN_ID, "7"),
            (ENV_ROS_DOMAIN_ID, "42"),
        ]));
        assert_eq!(config.domain_id, 7);

        let config = EnvConfig::from_lookup(lookup_from(&[(ENV_ROS_DOMAIN_ID, "42")]));
        assert_eq!(config.domain_id, 42);
    }

    #[test]
    fn malformed_numbers_fall_back_to_defaults() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            (ENV_DOMAIN_ID, "forty"),
            (ENV_KEEP_ALL_LIMIT, "0"),
        ]));
        assert_eq!(config.domain_id, 0);
        assert_eq!(config.keep_all_limit, DEFAULT_KEEP_ALL_LIMIT);
    }

    #[test]
    fn enclave_falls_back_to_ros_variable() {
        let config = EnvConfig::from_lookup(lookup_from(&[(ENV_ROS_SECURITY_ENCLAVE, "/robot")]));
        assert_eq!(config.enclave.as_deref(), Some("/robot"));
        assert_eq!(config.to_options().enclave.as_deref(), Some("/robot"));
    }
}
