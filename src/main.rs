//! Graphite ClickHouse query service configuration (v1)
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌──────────────────────────────────────────────────┐
//!                  │                 CONFIG ASSEMBLY                   │
//!                  │                                                   │
//!   --config ──────┼─▶ ┌──────────┐   ┌──────────┐   ┌────────────┐   │
//!   (optional)     │   │ defaults │──▶│ overlay  │──▶│ validation │   │
//!                  │   └──────────┘   └──────────┘   └─────┬──────┘   │
//!                  │                                       │          │
//!   rollup-conf ───┼──────────────────────────────▶ ┌──────▼──────┐   │
//!   (required)     │                                │ rollup load │   │
//!                  │                                └──────┬──────┘   │
//!                  │                                       ▼          │
//!                  │                               Arc<Config> ───────┼──▶ service
//!                  └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use graphite_ch_config::config::{print_config, Config};
use graphite_ch_config::lifecycle::assemble;
use graphite_ch_config::observability::init_logging;
use graphite_ch_config::rollup::RollupXmlParser;

#[derive(Parser)]
#[command(name = "graphite-ch-config")]
#[command(about = "Assemble and inspect the Graphite ClickHouse service configuration", long_about = None)]
struct Cli {
    /// Override file (TOML); built-in defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the built-in default configuration and exit
    #[arg(long)]
    print_default_config: bool,

    /// Print the assembled configuration and exit
    #[arg(long, conflicts_with = "print_default_config")]
    print_config: bool,

    /// Assemble the configuration, report the result and exit
    #[arg(long)]
    check: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.print_default_config {
        print_config(&Config::new())?;
        return Ok(());
    }

    let config_path = cli.config.unwrap_or_default();
    let config = assemble(&config_path, &RollupXmlParser)?;

    if cli.print_config {
        print_config(&config)?;
        return Ok(());
    }

    if cli.check {
        println!(
            "configuration ok: {} rollup patterns",
            config.rollup().map_or(0, |r| r.patterns.len())
        );
        return Ok(());
    }

    init_logging(&config.common)?;

    tracing::info!(
        listen = %config.common.listen,
        clickhouse = %config.clickhouse.url,
        data_table = %config.clickhouse.data_table,
        data_timeout = %config.clickhouse.data_timeout,
        tree_table = %config.clickhouse.tree_table,
        tree_timeout = %config.clickhouse.tree_timeout,
        max_cpu = config.common.max_cpu,
        rollup_patterns = config.rollup().map_or(0, |r| r.patterns.len()),
        "Configuration loaded"
    );

    Ok(())
}
