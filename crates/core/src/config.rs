// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock client configuration
//!
//! Loaded from TOML. Durations use humantime syntax (`"100ms"`, `"10s"`).

use crate::codec::RESERVED_ATTRIBUTES;
use crate::id::KeySchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

fn default_retry_count() -> u32 {
    1
}

/// The table holding lock records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub partition_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<String>,
}

impl TableConfig {
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
            sort_key: None,
        }
    }

    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }

    pub fn schema(&self) -> KeySchema {
        let schema = KeySchema::new(&self.partition_key);
        match &self.sort_key {
            Some(sort_key) => schema.with_sort_key(sort_key),
            None => schema,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("table name must not be empty".into()));
        }
        let mut keys = vec![("partition_key", &self.partition_key)];
        if let Some(sort_key) = &self.sort_key {
            keys.push(("sort_key", sort_key));
        }
        for (field, name) in keys {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
            if RESERVED_ATTRIBUTES.contains(&name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "{} '{}' collides with a lock record attribute",
                    field, name
                )));
            }
        }
        if self.sort_key.as_ref() == Some(&self.partition_key) {
            return Err(ConfigError::Invalid(
                "sort_key must differ from partition_key".into(),
            ));
        }
        Ok(())
    }
}

/// Retry policy for exclusive, non-expiring locks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailClosedPolicy {
    /// Delay between attempts while the lock is held elsewhere
    #[serde(with = "humantime_serde")]
    pub acquire_period: Duration,
    /// Attempts after the first
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
}

impl FailClosedPolicy {
    pub fn new(acquire_period: Duration) -> Self {
        Self {
            acquire_period,
            retry_count: default_retry_count(),
        }
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }
}

/// Lease policy for expiring, fenced locks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailOpenPolicy {
    #[serde(with = "humantime_serde")]
    pub lease_duration: Duration,
    /// Renewal period; absent or zero disables heartbeats
    #[serde(with = "humantime_serde", default)]
    pub heartbeat_period: Option<Duration>,
    /// Shorten the wait before stealing by the time already elapsed on the
    /// holder's lease, per the local wall clock
    #[serde(default)]
    pub trust_local_time: bool,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
}

impl FailOpenPolicy {
    pub fn new(lease_duration: Duration) -> Self {
        Self {
            lease_duration,
            heartbeat_period: None,
            trust_local_time: false,
            retry_count: default_retry_count(),
        }
    }

    pub fn with_heartbeat_period(mut self, period: Duration) -> Self {
        self.heartbeat_period = Some(period);
        self
    }

    pub fn with_trust_local_time(mut self, trust: bool) -> Self {
        self.trust_local_time = trust;
        self
    }

    pub fn with_retry_count(mut self, retry_count: u32) -> Self {
        self.retry_count = retry_count;
        self
    }

    /// Heartbeat period, if heartbeats are enabled
    pub fn heartbeat(&self) -> Option<Duration> {
        self.heartbeat_period.filter(|p| !p.is_zero())
    }
}

/// Which acquirer a configuration selects
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode<'a> {
    FailClosed(&'a FailClosedPolicy),
    FailOpen(&'a FailOpenPolicy),
}

/// Top-level lock client configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub table: TableConfig,
    /// Diagnostic owner name; defaults to [`default_owner`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_closed: Option<FailClosedPolicy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_open: Option<FailOpenPolicy>,
}

impl ClientConfig {
    /// Load and validate a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML content
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ClientConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// The single configured lock mode
    pub fn mode(&self) -> Result<LockMode<'_>, ConfigError> {
        match (&self.fail_closed, &self.fail_open) {
            (Some(policy), None) => Ok(LockMode::FailClosed(policy)),
            (None, Some(policy)) => Ok(LockMode::FailOpen(policy)),
            (None, None) => Err(ConfigError::Invalid(
                "one of [fail_closed] or [fail_open] is required".into(),
            )),
            (Some(_), Some(_)) => Err(ConfigError::Invalid(
                "[fail_closed] and [fail_open] are mutually exclusive".into(),
            )),
        }
    }

    /// Owner name to write into lock records
    pub fn owner(&self) -> String {
        self.owner.clone().unwrap_or_else(default_owner)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.table.validate()?;
        if let Some(owner) = &self.owner {
            if owner.trim().is_empty() {
                return Err(ConfigError::Invalid("owner must not be empty".into()));
            }
        }
        if let LockMode::FailOpen(policy) = self.mode()? {
            if policy.lease_duration.is_zero() {
                return Err(ConfigError::Invalid(
                    "lease_duration must be greater than zero".into(),
                ));
            }
        }
        Ok(())
    }
}

/// `<package>@<version>_<user>@<hostname>`
pub fn default_owner() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = hostname::get()
        .map(|h| h.to_string_lossy().into_owned())
        .unwrap_or_else(|_| "localhost".to_string());
    format!(
        "{}@{}_{}@{}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        user,
        host
    )
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
