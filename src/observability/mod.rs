//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!
//! Consumers:
//!     → Log file, stdout or stderr
//! ```
//!
//! # Design Decisions
//! - Logging is configured from the assembled Config, so events emitted
//!   during assembly itself go nowhere unless a subscriber is already set

pub mod logging;

pub use logging::{init_logging, LoggingError};
