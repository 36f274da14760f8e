//! Rendering the effective configuration back to TOML.

use std::io::Write;

use crate::config::loader::ConfigError;
use crate::config::schema::Config;

/// Render `config` as TOML. Rollup rules are not part of the output.
pub fn render_config(config: &Config) -> Result<String, ConfigError> {
    Ok(toml::to_string(config)?)
}

/// Write the rendering of `config` to `out`.
pub fn write_config<W: Write>(config: &Config, mut out: W) -> Result<(), ConfigError> {
    let rendered = render_config(config)?;
    out.write_all(rendered.as_bytes())
        .and_then(|()| out.flush())
        .map_err(ConfigError::Write)
}

/// Write the rendering of `config` to stdout.
pub fn print_config(config: &Config) -> Result<(), ConfigError> {
    write_config(config, std::io::stdout().lock())
}
