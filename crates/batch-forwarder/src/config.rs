// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use crate::constants::{
    DEFAULT_HTTP_TIMEOUT, DEFAULT_LOG_LEVEL, DEFAULT_MAX_BATCH_SIZE, FIREHOSE_MAX_BATCH_RECORDS,
    HTTPS_PROXY_ENV, LOG_LEVEL_ENV, STATS_INTERVAL, VALID_LOG_LEVELS,
};
use crate::errors::ConfigError;
use std::env;
use std::num::NonZeroUsize;
use std::time::Duration;
use zstd::zstd_safe::CompressionLevel;

/// Settings for a single forwarding run
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Delivery stream (or intake destination) every batch is addressed to
    pub destination: String,
    /// AWS region for the Firehose client, ambient configuration when unset
    pub region: Option<String>,
    /// Pause after each line before reading the next one
    pub delay: Option<Duration>,
    /// Records per submission
    pub max_batch_size: usize,
    /// HTTP intake URL; when set, batches go there instead of Firehose
    pub endpoint: Option<String>,
    /// HTTPS proxy for the HTTP intake
    pub https_proxy: Option<String>,
    /// Per-request timeout for the HTTP intake
    pub timeout: Duration,
    /// zstd level for HTTP intake payloads, uncompressed when unset
    pub compression_level: Option<CompressionLevel>,
    /// Period of the stats line
    pub stats_interval: Duration,
    /// Log level (e.g., trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            destination: String::new(),
            region: None,
            delay: None,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            endpoint: None,
            https_proxy: None,
            timeout: DEFAULT_HTTP_TIMEOUT,
            compression_level: None,
            stats_interval: STATS_INTERVAL,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ForwarderConfig {
    #[must_use]
    pub fn new(destination: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            ..Default::default()
        }
    }

    /// Fills log level and proxy from the process environment.
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|key| env::var(key).ok())
    }

    /// Same as [`Self::apply_env`] with a custom variable lookup.
    #[must_use]
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            self.log_level = level.trim().to_lowercase();
        }
        if self.https_proxy.is_none() {
            self.https_proxy = lookup(HTTPS_PROXY_ENV)
                .or_else(|| lookup("HTTPS_PROXY"))
                .filter(|proxy| !proxy.trim().is_empty());
        }
        self
    }

    #[must_use]
    pub fn uses_firehose(&self) -> bool {
        self.endpoint.is_none()
    }

    /// Batch capacity after validation.
    pub fn batch_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.max_batch_size)
            .ok_or(ConfigError::InvalidBatchSize(self.max_batch_size))
    }

    /// Validate the configuration, including the limits of the sink it selects.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_run()?;

        if self.uses_firehose() && self.max_batch_size > FIREHOSE_MAX_BATCH_RECORDS {
            return Err(ConfigError::BatchSizeExceedsLimit {
                requested: self.max_batch_size,
                limit: FIREHOSE_MAX_BATCH_RECORDS,
            });
        }

        Ok(())
    }

    /// Checks the settings a forwarding run needs, whatever sink it is given.
    pub fn validate_run(&self) -> Result<(), ConfigError> {
        if self.destination.trim().is_empty() {
            return Err(ConfigError::MissingDestination);
        }

        self.batch_capacity()?;

        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(ConfigError::InvalidEndpoint(endpoint.clone()));
            }
        }

        if let Some(level) = self.compression_level {
            if !(1..=22).contains(&level) {
                return Err(ConfigError::InvalidCompressionLevel(level));
            }
        }

        if self.stats_interval.is_zero() {
            return Err(ConfigError::InvalidStatsInterval);
        }

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(self.log_level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config_needs_destination() {
        assert_eq!(
            ForwarderConfig::default().validate(),
            Err(ConfigError::MissingDestination)
        );
        assert!(ForwarderConfig::new("my-stream").validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config = ForwarderConfig::new("my-stream");
        assert_eq!(config.max_batch_size, 500);
        assert_eq!(config.stats_interval, Duration::from_secs(1));
        assert!(config.delay.is_none());
        assert!(config.uses_firehose());
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = ForwarderConfig {
            max_batch_size: 0,
            ..ForwarderConfig::new("s")
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidBatchSize(0)));
        assert!(config.batch_capacity().is_err());
    }

    #[test]
    fn test_firehose_batch_limit() {
        let config = ForwarderConfig {
            max_batch_size: 501,
            ..ForwarderConfig::new("s")
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::BatchSizeExceedsLimit {
                requested: 501,
                limit: 500
            })
        );

        let config = ForwarderConfig {
            endpoint: Some("http://localhost:8080/intake".to_string()),
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_run_checks_leave_sink_limits_out() {
        let config = ForwarderConfig {
            max_batch_size: 1000,
            ..ForwarderConfig::new("s")
        };
        assert!(config.validate_run().is_ok());
        assert!(config.validate().is_err());

        let config = ForwarderConfig {
            max_batch_size: 0,
            ..config
        };
        assert_eq!(config.validate_run(), Err(ConfigError::InvalidBatchSize(0)));
    }

    #[test]
    fn test_validate_endpoint_scheme() {
        let config = ForwarderConfig {
            endpoint: Some("localhost:8080".to_string()),
            ..ForwarderConfig::new("s")
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_validate_compression_level() {
        for (level, ok) in [(0, false), (1, true), (22, true), (23, false)] {
            let config = ForwarderConfig {
                endpoint: Some("https://intake.example.com".to_string()),
                compression_level: Some(level),
                ..ForwarderConfig::new("s")
            };
            assert_eq!(config.validate().is_ok(), ok, "level {level}");
        }
    }

    #[test]
    fn test_validate_log_level() {
        let config = ForwarderConfig {
            log_level: "verbose".to_string(),
            ..ForwarderConfig::new("s")
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env() {
        let config = ForwarderConfig::new("s").apply_env_with(lookup_from(&[
            ("PIPE2FIREHOSE_LOG_LEVEL", " DEBUG "),
            ("HTTPS_PROXY", "http://proxy:3128"),
        ]));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.https_proxy.as_deref(), Some("http://proxy:3128"));
    }

    #[test]
    fn test_apply_env_prefers_own_proxy_variable() {
        let config = ForwarderConfig::new("s").apply_env_with(lookup_from(&[
            ("PIPE2FIREHOSE_HTTPS_PROXY", "http://own:3128"),
            ("HTTPS_PROXY", "http://shared:3128"),
        ]));
        assert_eq!(config.https_proxy.as_deref(), Some("http://own:3128"));
        assert_eq!(config.log_level, "info");
    }
}
