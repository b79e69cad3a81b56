//! Configuration validation module.
//!
//! Provides validation for all configuration values, failing fast on
//! invalid configuration rather than at first use.

use crate::{AppConfig, ProviderKind};
use std::fmt;
use url::Url;

/// Configuration validation error variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// The selected provider needs an API key and none is configured.
    MissingApiKey { provider: String },
    /// URL format is invalid.
    InvalidUrl { url_type: String, message: String },
    /// Timeout value must be positive.
    NonPositiveTimeout { name: String, value: u64 },
    /// Retry count exceeds the allowed maximum.
    TooManyRetries { value: u32, maximum: u32 },
    /// Live-score TTL must be shorter than the long-lived TTL.
    TtlOrdering { live_secs: u64, default_secs: u64 },
    /// Cache namespace must not be empty.
    EmptyNamespace,
    /// Pool size configuration is invalid (min must be <= max).
    InvalidPoolSize { min: u32, max: u32 },
    /// Log format is not recognised.
    InvalidLogFormat { value: String },
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey { provider } => {
                write!(f, "API key is required for the '{}' provider", provider)
            }
            Self::InvalidUrl { url_type, message } => {
                write!(f, "Invalid {} URL: {}", url_type, message)
            }
            Self::NonPositiveTimeout { name, value } => {
                write!(f, "Timeout '{}' must be positive, got {}", name, value)
            }
            Self::TooManyRetries { value, maximum } => {
                write!(f, "Retry count {} exceeds maximum allowed ({})", value, maximum)
            }
            Self::TtlOrdering { live_secs, default_secs } => {
                write!(
                    f,
                    "Live-score TTL ({}s) must be shorter than the default TTL ({}s)",
                    live_secs, default_secs
                )
            }
            Self::EmptyNamespace => write!(f, "Cache namespace cannot be empty"),
            Self::InvalidPoolSize { min, max } => {
                write!(
                    f,
                    "Invalid pool size: min ({}) cannot be greater than max ({})",
                    min, max
                )
            }
            Self::InvalidLogFormat { value } => {
                write!(f, "Invalid log format: '{}' (valid: pretty, json)", value)
            }
        }
    }
}

impl std::error::Error for ConfigValidationError {}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Upper bound on retries (8 doubling retries wait 255s in total).
    const MAX_RETRIES: u32 = 8;

    /// Validates the entire application configuration.
    ///
    /// Returns Ok(()) if valid, or Err with all validation errors found.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        Self::validate_provider(config, &mut errors);
        Self::validate_cache(config, &mut errors);
        Self::validate_redis(config, &mut errors);
        Self::validate_database(config, &mut errors);
        Self::validate_logging(config, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_provider(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let provider = &config.provider;

        if provider.kind.requires_api_key()
            && provider.api_key.as_deref().map_or(true, |k| k.trim().is_empty())
        {
            errors.push(ConfigValidationError::MissingApiKey {
                provider: provider.kind.to_string(),
            });
        }

        if let Some(base_url) = provider.base_url.as_deref() {
            if let Err(message) = check_http_url(base_url) {
                errors.push(ConfigValidationError::InvalidUrl {
                    url_type: "provider base".to_string(),
                    message,
                });
            }
        }

        if provider.timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "provider.timeout_ms".to_string(),
                value: 0,
            });
        }

        if provider.retry_attempts > Self::MAX_RETRIES {
            errors.push(ConfigValidationError::TooManyRetries {
                value: provider.retry_attempts,
                maximum: Self::MAX_RETRIES,
            });
        }
    }

    fn validate_cache(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let cache = &config.cache;

        if cache.namespace.trim().is_empty() {
            errors.push(ConfigValidationError::EmptyNamespace);
        }
        if cache.default_ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.default_ttl_secs".to_string(),
                value: 0,
            });
        }
        if cache.live_ttl_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.live_ttl_secs".to_string(),
                value: 0,
            });
        }
        if cache.cleanup_interval_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "cache.cleanup_interval_secs".to_string(),
                value: 0,
            });
        }
        if cache.live_ttl_secs >= config.provider.cache_ttl_secs {
            errors.push(ConfigValidationError::TtlOrdering {
                live_secs: cache.live_ttl_secs,
                default_secs: config.provider.cache_ttl_secs,
            });
        }
    }

    fn validate_redis(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let redis = &config.redis;
        let Some(url) = redis.url.as_deref().filter(|u| !u.trim().is_empty()) else {
            return;
        };

        if !url.starts_with("redis://") && !url.starts_with("rediss://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: "URL must start with redis:// or rediss://".to_string(),
            });
        } else if let Err(e) = Url::parse(url) {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "redis".to_string(),
                message: e.to_string(),
            });
        }

        if redis.command_timeout_ms == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "redis.command_timeout_ms".to_string(),
                value: 0,
            });
        }
    }

    fn validate_database(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        if config.provider.kind != ProviderKind::Database {
            return;
        }
        let database = &config.database;

        if !database.url.starts_with("mysql://") {
            errors.push(ConfigValidationError::InvalidUrl {
                url_type: "database".to_string(),
                message: "URL must start with mysql://".to_string(),
            });
        }
        if database.min_connections > database.max_connections {
            errors.push(ConfigValidationError::InvalidPoolSize {
                min: database.min_connections,
                max: database.max_connections,
            });
        }
        if database.connect_timeout_secs == 0 {
            errors.push(ConfigValidationError::NonPositiveTimeout {
                name: "database.connect_timeout_secs".to_string(),
                value: 0,
            });
        }
    }

    fn validate_logging(config: &AppConfig, errors: &mut Vec<ConfigValidationError>) {
        let format = config.logging.format.to_lowercase();
        if format != "pretty" && format != "json" {
            errors.push(ConfigValidationError::InvalidLogFormat {
                value: config.logging.format.clone(),
            });
        }
    }
}

/// Checks that `raw` parses as an absolute http(s) URL.
fn check_http_url(raw: &str) -> Result<(), String> {
    let url = Url::parse(raw).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme '{}'", other)),
    }
}
