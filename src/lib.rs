//! Configuration assembly for the Graphite ClickHouse query service.

pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod rollup;

pub use config::schema::Config;
pub use lifecycle::assemble;
pub use rollup::{Rollup, RollupParser, RollupXmlParser};
