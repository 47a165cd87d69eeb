// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Tether sync core.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup.

use serde::{Deserialize, Serialize};

/// Top-level Tether configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TetherConfig {
    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Sync engine settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Media cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Background job settings.
    #[serde(default)]
    pub jobs: JobsConfig,

    /// Push-relay client settings.
    #[serde(default)]
    pub relay: RelayConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL journal mode.
    #[serde(default = "default_true")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: true,
        }
    }
}

/// Sync engine configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Page size for gateway dialog snapshot fetches.
    #[serde(default = "default_dialog_page_size")]
    pub dialog_page_size: u32,

    /// Identifier used as the sender of locally authored messages.
    #[serde(default)]
    pub self_user_id: i64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            dialog_page_size: default_dialog_page_size(),
            self_user_id: 0,
        }
    }
}

/// Media cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CacheConfig {
    /// Byte quota enforced by LRU eviction. Default 5 GiB.
    #[serde(default = "default_cache_quota_bytes")]
    pub quota_bytes: i64,

    /// Directory holding cached media files.
    #[serde(default = "default_cache_directory")]
    pub directory: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            quota_bytes: default_cache_quota_bytes(),
            directory: default_cache_directory(),
        }
    }
}

/// Background job configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct JobsConfig {
    /// Interval between periodic sync passes, in seconds. Default 15 minutes.
    #[serde(default = "default_periodic_interval_secs")]
    pub periodic_interval_secs: u64,

    /// Initial retry backoff, in milliseconds.
    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    /// Upper bound on retry backoff, in milliseconds.
    #[serde(default = "default_retry_cap_ms")]
    pub retry_cap_ms: u64,
}

impl Default for JobsConfig {
    fn default() -> Self {
        Self {
            periodic_interval_secs: default_periodic_interval_secs(),
            retry_base_ms: default_retry_base_ms(),
            retry_cap_ms: default_retry_cap_ms(),
        }
    }
}

/// Push-relay client configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Whether device registration and delivery acks are sent at all.
    #[serde(default)]
    pub enabled: bool,

    /// Base URL of the push-relay service.
    #[serde(default = "default_relay_base_url")]
    pub base_url: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            base_url: default_relay_base_url(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|d| d.join("tether/tether.db"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "tether.db".to_string())
}

fn default_dialog_page_size() -> u32 {
    50
}

fn default_cache_quota_bytes() -> i64 {
    5 * 1024 * 1024 * 1024
}

fn default_cache_directory() -> String {
    dirs::cache_dir()
        .map(|d| d.join("tether/media"))
        .and_then(|p| p.to_str().map(str::to_string))
        .unwrap_or_else(|| "media".to_string())
}

fn default_relay_base_url() -> String {
    String::new()
}

fn default_periodic_interval_secs() -> u64 {
    15 * 60
}

fn default_retry_base_ms() -> u64 {
    1_000
}

fn default_retry_cap_ms() -> u64 {
    5 * 60 * 1_000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_values() {
        let config = TetherConfig::default();
        assert_eq!(config.cache.quota_bytes, 5 * 1024 * 1024 * 1024);
        assert_eq!(config.jobs.periodic_interval_secs, 900);
        assert_eq!(config.sync.dialog_page_size, 50);
        assert_eq!(config.log.level, "info");
        assert!(config.storage.wal_mode);
        assert!(!config.relay.enabled);
    }
}
