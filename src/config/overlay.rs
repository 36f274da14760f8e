//! Partial configuration decoded from an override file.
//!
//! Every leaf is an `Option`, so a key that is absent from the file stays
//! distinguishable from one explicitly set to a zero value. Applying a patch
//! only touches the fields it carries.
//!
//! Duration keys are kept as text until [`ConfigPatch::apply`], so a bad
//! value is reported as a [`DurationParseError`] rather than a TOML message.

use serde::Deserialize;
use thiserror::Error;

use crate::config::duration::{Duration, DurationParseError};
use crate::config::schema::{ClickHouseConfig, CommonConfig, Config, LogLevel, MetricsConfig};

/// A duration key whose value the codec rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{key}: {source}")]
pub struct InvalidDuration {
    /// Dotted config key, e.g. `clickhouse.data-timeout`.
    pub key: &'static str,
    #[source]
    pub source: DurationParseError,
}

/// Mirror of [`Config`] with every field optional.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigPatch {
    pub common: Option<CommonPatch>,
    pub clickhouse: Option<ClickHousePatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommonPatch {
    pub listen: Option<String>,
    pub logfile: Option<String>,
    pub loglevel: Option<LogLevel>,
    pub max_cpu: Option<usize>,
    pub metrics: Option<MetricsPatch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MetricsPatch {
    pub enabled: Option<bool>,
    pub prefix: Option<String>,
    pub interval: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClickHousePatch {
    pub url: Option<String>,
    pub data_table: Option<String>,
    pub data_timeout: Option<String>,
    pub tree_table: Option<String>,
    pub tree_timeout: Option<String>,
    pub rollup_conf: Option<String>,
    pub extra_prefix: Option<String>,
}

fn set<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn set_duration(
    slot: &mut Duration,
    key: &'static str,
    text: Option<String>,
) -> Result<(), InvalidDuration> {
    if let Some(text) = text {
        *slot = text
            .parse()
            .map_err(|source| InvalidDuration { key, source })?;
    }
    Ok(())
}

impl ConfigPatch {
    /// Parses a patch from TOML text without touching any configuration.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Overwrites the fields of `target` that this patch carries.
    ///
    /// Either every field is applied or, on error, `target` is unchanged.
    pub fn apply(self, target: &mut Config) -> Result<(), InvalidDuration> {
        let mut next = target.clone();
        if let Some(common) = self.common {
            common.apply(&mut next.common)?;
        }
        if let Some(clickhouse) = self.clickhouse {
            clickhouse.apply(&mut next.clickhouse)?;
        }
        *target = next;
        Ok(())
    }
}

impl CommonPatch {
    fn apply(self, target: &mut CommonConfig) -> Result<(), InvalidDuration> {
        set(&mut target.listen, self.listen);
        set(&mut target.logfile, self.logfile);
        set(&mut target.loglevel, self.loglevel);
        set(&mut target.max_cpu, self.max_cpu);
        if let Some(metrics) = self.metrics {
            metrics.apply(&mut target.metrics)?;
        }
        Ok(())
    }
}

impl MetricsPatch {
    fn apply(self, target: &mut MetricsConfig) -> Result<(), InvalidDuration> {
        set(&mut target.enabled, self.enabled);
        set(&mut target.prefix, self.prefix);
        set_duration(&mut target.interval, "common.metrics.interval", self.interval)?;
        set(&mut target.endpoint, self.endpoint);
        Ok(())
    }
}

impl ClickHousePatch {
    fn apply(self, target: &mut ClickHouseConfig) -> Result<(), InvalidDuration> {
        set(&mut target.url, self.url);
        set(&mut target.data_table, self.data_table);
        set_duration(&mut target.data_timeout, "clickhouse.data-timeout", self.data_timeout)?;
        set(&mut target.tree_table, self.tree_table);
        set_duration(&mut target.tree_timeout, "clickhouse.tree-timeout", self.tree_timeout)?;
        set(&mut target.rollup_conf, self.rollup_conf);
        set(&mut target.extra_prefix, self.extra_prefix);
        Ok(())
    }
}
