//! Shared utilities for integration testing.

use std::fs;
use std::path::{Path, PathBuf};

use graphite_ch_config::rollup::{Pattern, Rollup, RollupParser, RollupParserError};

pub const ROLLUP_XML: &str = r#"<yandex>
<graphite_rollup>
    <pattern>
        <regexp>^carbon\.</regexp>
        <function>max</function>
        <retention><age>0</age><precision>60</precision></retention>
    </pattern>
    <default>
        <function>avg</function>
        <retention><age>0</age><precision>60</precision></retention>
        <retention><age>86400</age><precision>3600</precision></retention>
    </default>
</graphite_rollup>
</yandex>"#;

/// Write `contents` to `dir/name` and return the full path.
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

/// Write an override file whose `rollup-conf` points at a valid rules file in
/// the same directory, with `extra` appended to the `[clickhouse]` section.
#[allow(dead_code)]
pub fn write_config_with_rollup(dir: &Path, common: &str, extra: &str) -> PathBuf {
    let rollup = write_file(dir, "rollup.xml", ROLLUP_XML);
    let config = format!(
        "[common]\n{common}\n\n[clickhouse]\nrollup-conf = {:?}\n{extra}\n",
        rollup.to_string_lossy()
    );
    write_file(dir, "config.toml", &config)
}

/// Parser that accepts anything and returns an empty rule set.
#[allow(dead_code)]
pub struct AcceptAll;

impl RollupParser for AcceptAll {
    fn parse(&self, _body: &[u8]) -> Result<Rollup, RollupParserError> {
        Ok(Rollup {
            patterns: Vec::new(),
            default: Pattern {
                function: Some("avg".to_string()),
                ..Pattern::default()
            },
        })
    }
}
