//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, at least one worker)
//! - Check the ClickHouse URL is a usable HTTP endpoint
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: Config → Result<(), Vec<ValidationError>>
//! - Runs after overlay decoding, before the rollup rules are loaded

use std::fmt;

use url::Url;

use crate::config::duration::Duration;
use crate::config::schema::Config;

/// A single rejected field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted config key, e.g. `clickhouse.data-timeout`.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

fn require_non_empty(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
    }
}

fn require_positive(errors: &mut Vec<ValidationError>, field: &'static str, value: Duration) {
    if value.is_zero() || value.is_negative() {
        errors.push(ValidationError::new(field, format!("must be positive, got {value}")));
    }
}

/// Validate an assembled configuration.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let common = &config.common;
    require_non_empty(&mut errors, "common.listen", &common.listen);
    if common.max_cpu == 0 {
        errors.push(ValidationError::new("common.max-cpu", "must be at least 1"));
    }
    if common.metrics.enabled {
        require_positive(&mut errors, "common.metrics.interval", common.metrics.interval);
        require_non_empty(&mut errors, "common.metrics.endpoint", &common.metrics.endpoint);
    }

    let clickhouse = &config.clickhouse;
    match Url::parse(&clickhouse.url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "clickhouse.url",
            format!("unsupported scheme {:?}", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new("clickhouse.url", e.to_string())),
    }
    require_non_empty(&mut errors, "clickhouse.data-table", &clickhouse.data_table);
    require_positive(&mut errors, "clickhouse.data-timeout", clickhouse.data_timeout);
    require_non_empty(&mut errors, "clickhouse.tree-table", &clickhouse.tree_table);
    require_positive(&mut errors, "clickhouse.tree-timeout", clickhouse.tree_timeout);
    require_non_empty(&mut errors, "clickhouse.rollup-conf", &clickhouse.rollup_conf);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
