//! Loading the rollup rules file.

use std::fs;
use std::path::Path;

use crate::config::loader::ConfigError;
use crate::rollup::{Rollup, RollupParser};

/// Read the rules file at `path` and hand its contents to `parser`.
pub fn load_rollup_policy(path: &Path, parser: &dyn RollupParser) -> Result<Rollup, ConfigError> {
    let body = fs::read(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let rollup = parser.parse(&body).map_err(|source| ConfigError::RollupParse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(
        path = %path.display(),
        patterns = rollup.patterns.len(),
        "Rollup rules loaded"
    );
    Ok(rollup)
}
