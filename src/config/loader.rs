//! Configuration loading from disk.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::duration::DurationParseError;
use crate::config::overlay::{ConfigPatch, InvalidDuration};
use crate::config::schema::Config;
use crate::config::validation::ValidationError;
use crate::rollup::RollupParserError;

/// Failure to decode an override file.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The file could not be opened or read.
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML or a value of the wrong type.
    #[error("invalid config {path}: {source}")]
    Syntax {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A duration key whose value is not a valid duration.
    #[error("invalid config {path}: {key}: {source}")]
    Duration {
        path: PathBuf,
        key: &'static str,
        #[source]
        source: DurationParseError,
    },
}

/// Error type for configuration assembly.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The rollup rules file could not be read.
    #[error("cannot read rollup config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The rollup rules file was read but rejected by the parser.
    #[error("invalid rollup config {path}: {source}")]
    RollupParse {
        path: PathBuf,
        #[source]
        source: RollupParserError,
    },

    #[error("cannot encode config: {0}")]
    Encode(#[from] toml::ser::Error),

    /// The rendered config could not be written out.
    #[error("cannot write config: {0}")]
    Write(#[source] std::io::Error),

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Overlays the TOML file at `path` onto `target`.
///
/// An empty path means no override file and leaves `target` as it is. The
/// file is parsed completely before any field is written, so on error
/// `target` is unchanged.
pub fn decode_overlay(path: &Path, target: &mut Config) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        tracing::debug!("No config file given, using defaults");
        return Ok(());
    }

    let content = fs::read_to_string(path).map_err(|source| DecodeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let patch = ConfigPatch::from_toml(&content).map_err(|source| DecodeError::Syntax {
        path: path.to_path_buf(),
        source,
    })?;

    patch
        .apply(target)
        .map_err(|InvalidDuration { key, source }| DecodeError::Duration {
            path: path.to_path_buf(),
            key,
            source,
        })?;
    tracing::debug!(path = %path.display(), "Config file applied");
    Ok(())
}
