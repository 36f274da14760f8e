//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from `[common]`
//! - Route output to stdout, stderr or an append-only log file
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - `RUST_LOG` overrides `loglevel` when set
//! - No ANSI colours when writing to a file

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CommonConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot install log subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Where log lines go, derived from the `logfile` setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stdout,
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    pub fn from_setting(logfile: &str) -> Self {
        match logfile {
            "" | "stdout" => LogTarget::Stdout,
            "stderr" => LogTarget::Stderr,
            path => LogTarget::File(PathBuf::from(path)),
        }
    }
}

fn open_log_file(path: &Path) -> Result<fs::File, LoggingError> {
    let open_error = |source| LoggingError::Open {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(open_error)?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(open_error)
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(common: &CommonConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::builder()
        .with_default_directive(common.loglevel.to_level_filter().into())
        .from_env_lossy();
    let registry = tracing_subscriber::registry().with(filter);

    match LogTarget::from_setting(&common.logfile) {
        LogTarget::Stdout => registry
            .with(fmt::layer().with_writer(std::io::stdout))
            .try_init()?,
        LogTarget::Stderr => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogTarget::File(path) => {
            let file = open_log_file(&path)?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()?
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_target_from_setting() {
        assert_eq!(LogTarget::from_setting(""), LogTarget::Stdout);
        assert_eq!(LogTarget::from_setting("stdout"), LogTarget::Stdout);
        assert_eq!(LogTarget::from_setting("stderr"), LogTarget::Stderr);
        assert_eq!(
            LogTarget::from_setting("/var/log/gch.log"),
            LogTarget::File(PathBuf::from("/var/log/gch.log"))
        );
    }

    #[test]
    fn test_open_log_file_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("service.log");
        open_log_file(&path).unwrap();
        assert!(path.exists());
    }
}
