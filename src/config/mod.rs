//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! Config::new() (built-in defaults)
//!     → loader.rs (optional TOML override, applied as a patch)
//!     → validation.rs (semantic checks)
//!     → rollup::loader (rules file → Rollup)
//!     → Config::freeze → Arc<Config> (immutable)
//!     → shared via Arc to all subsystems
//!
//! On demand:
//!     printer.rs renders the Config back to TOML
//! ```
//!
//! # Design Decisions
//! - Config is immutable once frozen; there is no reload
//! - Every field has a default, so the override file may be partial or absent
//! - Override files decode into `Option` fields so absent keys never clobber
//! - Validation separates syntactic (serde) from semantic checks

pub mod duration;
pub mod loader;
pub mod overlay;
pub mod printer;
pub mod schema;
pub mod validation;

pub use duration::{Duration, DurationParseError};
pub use loader::{decode_overlay, ConfigError, DecodeError};
pub use printer::{print_config, render_config, write_config};
pub use schema::{ClickHouseConfig, CommonConfig, Config, LogLevel, MetricsConfig};
pub use validation::{validate_config, ValidationError};
