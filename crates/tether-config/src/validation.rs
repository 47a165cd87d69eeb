// SPDX-FileCopyrightText: 2026 Tether Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and positive quotas.

use crate::diagnostic::ConfigError;
use crate::model::TetherConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TetherConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.cache.directory.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "cache.directory must not be empty".to_string(),
        });
    }

    if config.cache.quota_bytes <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "cache.quota_bytes must be positive, got {}",
                config.cache.quota_bytes
            ),
        });
    }

    if config.jobs.periodic_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "jobs.periodic_interval_secs must be positive".to_string(),
        });
    }

    if config.jobs.retry_base_ms == 0 || config.jobs.retry_cap_ms < config.jobs.retry_base_ms {
        errors.push(ConfigError::Validation {
            message: format!(
                "jobs retry backoff invalid: base {} ms, cap {} ms",
                config.jobs.retry_base_ms, config.jobs.retry_cap_ms
            ),
        });
    }

    if config.sync.dialog_page_size == 0 {
        errors.push(ConfigError::Validation {
            message: "sync.dialog_page_size must be positive".to_string(),
        });
    }

    if config.relay.enabled && config.relay.base_url.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "relay.base_url is required when relay.enabled = true".to_string(),
        });
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level must be one of {valid_levels:?}, got `{}`",
                config.log.level
            ),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&TetherConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors_without_failing_fast() {
        let mut config = TetherConfig::default();
        config.cache.quota_bytes = -1;
        config.jobs.periodic_interval_secs = 0;
        config.log.level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn relay_base_url_required_only_when_enabled() {
        let mut config = TetherConfig::default();
        config.relay.base_url = String::new();
        assert!(validate_config(&config).is_ok());

        config.relay.enabled = true;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn retry_cap_below_base_is_rejected() {
        let mut config = TetherConfig::default();
        config.jobs.retry_base_ms = 10_000;
        config.jobs.retry_cap_ms = 1_000;
        assert!(validate_config(&config).is_err());
    }
}
