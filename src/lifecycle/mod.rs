//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Defaults → Overlay file → Validate → Load rollup rules → Arc<Config>
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logging, then everything else
//! - No degraded mode: a config that fails to assemble stops the process

pub mod startup;

pub use startup::assemble;
