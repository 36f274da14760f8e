//! Rollup (retention and aggregation) rules.
//!
//! # Data Flow
//! ```text
//! rollup-conf path
//!     → loader.rs (read bytes)
//!     → RollupParser (injected; xml.rs in production)
//!     → Rollup, attached to the Config by Config::freeze
//! ```
//!
//! # Design Decisions
//! - Parsing sits behind a trait so the loader can be driven by a fake
//! - The loader never substitutes defaults: the rules file is required

pub mod loader;
pub mod xml;

use serde::Deserialize;

pub use loader::load_rollup_policy;
pub use xml::{RollupXmlError, RollupXmlParser};

/// Error reported by a [`RollupParser`].
pub type RollupParserError = Box<dyn std::error::Error + Send + Sync>;

/// Turns the raw contents of a rules file into a [`Rollup`].
pub trait RollupParser {
    fn parse(&self, body: &[u8]) -> Result<Rollup, RollupParserError>;
}

/// Parsed rollup rules.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Rollup {
    /// Patterns in file order; the first match wins.
    #[serde(rename = "pattern", default)]
    pub patterns: Vec<Pattern>,

    /// Applied to metrics no pattern matches.
    pub default: Pattern,
}

/// One rollup rule.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Pattern {
    /// Metric name regular expression.
    pub regexp: Option<String>,

    /// Aggregation function (avg, sum, max, ...).
    pub function: Option<String>,

    /// Retention steps, sorted by ascending age.
    #[serde(default)]
    pub retention: Vec<Retention>,
}

/// Point precision to use from a given age on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct Retention {
    /// Age in seconds.
    pub age: u32,

    /// Precision in seconds.
    pub precision: u32,
}
