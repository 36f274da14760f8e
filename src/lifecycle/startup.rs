//! Startup orchestration.
//!
//! # Responsibilities
//! - Start from built-in defaults
//! - Overlay the optional config file
//! - Validate the result
//! - Load the rollup rules and freeze the configuration
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Steps run sequentially, once, before anything serves traffic
//! - The frozen Config is handed out as `Arc`, never as `&mut`

use std::path::Path;
use std::sync::Arc;

use crate::config::{decode_overlay, validate_config, Config, ConfigError};
use crate::rollup::{load_rollup_policy, RollupParser};

/// Build the service configuration.
///
/// `config_path` may be empty, in which case only defaults apply. The rollup
/// rules file named by `clickhouse.rollup-conf` must always be readable.
pub fn assemble(config_path: &Path, parser: &dyn RollupParser) -> Result<Arc<Config>, ConfigError> {
    let mut config = Config::new();
    decode_overlay(config_path, &mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    let rollup_path = Path::new(&config.clickhouse.rollup_conf);
    let rollup = load_rollup_policy(rollup_path, parser)?;

    tracing::debug!(
        config = %config_path.display(),
        rollup = %rollup_path.display(),
        "Configuration assembled"
    );
    Ok(config.freeze(rollup))
}
