//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the query
//! service together with its built-in defaults. All types derive `Serialize`
//! so the effective configuration can be rendered back to TOML; decoding goes
//! through the overlay patch types instead.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use tracing::level_filters::LevelFilter;

use crate::config::duration::Duration;
use crate::rollup::Rollup;

/// Root configuration for the query service.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct Config {
    /// Process-wide settings.
    pub common: CommonConfig,

    /// ClickHouse connection and query settings.
    pub clickhouse: ClickHouseConfig,

    /// Rollup rules, attached once by [`Config::freeze`].
    #[serde(skip)]
    rollup: Option<Rollup>,
}

impl Config {
    /// Creates a configuration populated with built-in defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// The loaded rollup rules, `None` until the configuration is frozen.
    pub fn rollup(&self) -> Option<&Rollup> {
        self.rollup.as_ref()
    }

    /// Attaches the rollup rules and turns the configuration into a shared,
    /// read-only snapshot.
    pub fn freeze(mut self, rollup: Rollup) -> Arc<Config> {
        self.rollup = Some(rollup);
        Arc::new(self)
    }
}

/// Process-wide settings (`[common]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommonConfig {
    /// Address the HTTP listener binds to (e.g., ":9090").
    pub listen: String,

    /// Log destination: a file path, or "stdout"/"stderr".
    pub logfile: String,

    /// Minimum severity written to the log.
    pub loglevel: LogLevel,

    /// Upper bound on worker threads.
    pub max_cpu: usize,

    /// Reserved for internal metrics; disabled by default.
    pub metrics: MetricsConfig,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            listen: ":9090".to_string(),
            logfile: "/var/log/graphite-clickhouse/graphite-clickhouse.log".to_string(),
            loglevel: LogLevel::Info,
            max_cpu: 1,
            metrics: MetricsConfig::default(),
        }
    }
}

/// Internal metrics settings (`[common.metrics]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetricsConfig {
    pub enabled: bool,

    /// Metric name prefix; `{host}` expands to the local hostname.
    pub prefix: String,

    /// Flush interval.
    pub interval: Duration,

    /// Where metrics are sent; "local" keeps them in-process.
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            prefix: "carbon.graphite-clickhouse.{host}".to_string(),
            interval: Duration::from_mins(1),
            endpoint: "local".to_string(),
        }
    }
}

/// ClickHouse backend settings (`[clickhouse]`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClickHouseConfig {
    /// ClickHouse HTTP interface URL.
    pub url: String,

    /// Table holding the points.
    pub data_table: String,

    /// Query timeout for `data_table`.
    pub data_timeout: Duration,

    /// Table holding the metric name tree.
    pub tree_table: String,

    /// Query timeout for `tree_table`.
    pub tree_timeout: Duration,

    /// Path to the rollup rules file.
    pub rollup_conf: String,

    /// Prefix prepended to every metric name; empty for none.
    pub extra_prefix: String,
}

impl ClickHouseConfig {
    /// The metric name prefix, or `None` when `extra_prefix` is empty.
    pub fn extra_prefix(&self) -> Option<&str> {
        Some(self.extra_prefix.as_str()).filter(|p| !p.is_empty())
    }
}

impl Default for ClickHouseConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            data_table: "graphite".to_string(),
            data_timeout: Duration::from_mins(1),
            tree_table: "graphite_tree".to_string(),
            tree_timeout: Duration::from_mins(1),
            rollup_conf: "/etc/graphite-clickhouse/rollup.xml".to_string(),
            extra_prefix: String::new(),
        }
    }
}

/// Log severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    DPanic,
    Panic,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized log level {0:?}")]
pub struct UnknownLogLevel(pub String);

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::DPanic => "dpanic",
            LogLevel::Panic => "panic",
            LogLevel::Fatal => "fatal",
        }
    }

    /// Maps onto the `tracing` filter. Levels above error collapse to it.
    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error | LogLevel::DPanic | LogLevel::Panic | LogLevel::Fatal => {
                LevelFilter::ERROR
            }
        }
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            // An empty value selects the default level.
            "info" | "" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "dpanic" => Ok(LogLevel::DPanic),
            "panic" => Ok(LogLevel::Panic),
            "fatal" => Ok(LogLevel::Fatal),
            _ => Err(UnknownLogLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for LogLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct LogLevelVisitor;

impl Visitor<'_> for LogLevelVisitor {
    type Value = LogLevel;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("one of debug, info, warn, error, dpanic, panic, fatal")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<LogLevel, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for LogLevel {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(LogLevelVisitor)
    }
}
