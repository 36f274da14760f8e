//! End-to-end configuration assembly tests.

use std::error::Error;
use std::path::Path;

use graphite_ch_config::config::{
    decode_overlay, render_config, Config, ConfigError, DecodeError, Duration,
    DurationParseError, LogLevel,
};
use graphite_ch_config::lifecycle::assemble;
use graphite_ch_config::rollup::{load_rollup_policy, RollupXmlParser};

mod common;

#[test]
fn test_empty_path_keeps_defaults() {
    let mut config = Config::new();
    decode_overlay(Path::new(""), &mut config).unwrap();
    assert_eq!(config, Config::new());
}

#[test]
fn test_single_field_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "config.toml", "[common]\nmax-cpu = 4\n");

    let mut config = Config::new();
    decode_overlay(&path, &mut config).unwrap();

    let mut expected = Config::new();
    expected.common.max_cpu = 4;
    assert_eq!(config, expected);
}

#[test]
fn test_full_overlay() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(
        dir.path(),
        "config.toml",
        r#"
[common]
listen = ":9999"
logfile = "stderr"
loglevel = "debug"
max-cpu = 8

[clickhouse]
url = "http://clickhouse:8123/?max_query_size=1048576"
data-table = "graphite_data"
data-timeout = "1m30s"
tree-table = "graphite_names"
tree-timeout = "500ms"
rollup-conf = "/tmp/rollup.xml"
extra-prefix = "tenant.a"
"#,
    );

    let mut config = Config::new();
    decode_overlay(&path, &mut config).unwrap();

    assert_eq!(config.common.listen, ":9999");
    assert_eq!(config.common.logfile, "stderr");
    assert_eq!(config.common.loglevel, LogLevel::Debug);
    assert_eq!(config.common.max_cpu, 8);
    assert_eq!(config.clickhouse.data_table, "graphite_data");
    assert_eq!(config.clickhouse.data_timeout, Duration::from_secs(90));
    assert_eq!(config.clickhouse.tree_table, "graphite_names");
    assert_eq!(config.clickhouse.tree_timeout, Duration::from_nanos(500_000_000));
    assert_eq!(config.clickhouse.rollup_conf, "/tmp/rollup.xml");
    assert_eq!(config.clickhouse.extra_prefix(), Some("tenant.a"));
}

#[test]
fn test_overlay_preserves_prior_values() {
    let dir = tempfile::tempdir().unwrap();
    let first = common::write_file(dir.path(), "a.toml", "[clickhouse]\ndata-table = \"first\"\n");
    let second = common::write_file(dir.path(), "b.toml", "[clickhouse]\ntree-table = \"second\"\n");

    let mut config = Config::new();
    decode_overlay(&first, &mut config).unwrap();
    decode_overlay(&second, &mut config).unwrap();

    assert_eq!(config.clickhouse.data_table, "first");
    assert_eq!(config.clickhouse.tree_table, "second");
}

#[test]
fn test_bad_duration_leaves_target_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(
        dir.path(),
        "config.toml",
        "[common]\nmax-cpu = 4\n\n[clickhouse]\ndata-timeout = \"not-a-duration\"\n",
    );

    let mut config = Config::new();
    let err = decode_overlay(&path, &mut config).unwrap_err();

    match &err {
        ConfigError::Decode(DecodeError::Duration { key, source, .. }) => {
            assert_eq!(*key, "clickhouse.data-timeout");
            assert!(matches!(source, DurationParseError::Invalid(_)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains("invalid duration"));
    assert_eq!(config, Config::new());
}

#[test]
fn test_duration_error_is_reachable_through_source_chain() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(
        dir.path(),
        "config.toml",
        "[clickhouse]\ndata-timeout = \"not-a-duration\"\n",
    );

    let err = decode_overlay(&path, &mut Config::new()).unwrap_err();

    let mut cause: Option<&(dyn Error + 'static)> = Some(&err);
    let mut found = None;
    while let Some(e) = cause {
        if let Some(parse) = e.downcast_ref::<DurationParseError>() {
            found = Some(parse.clone());
        }
        cause = e.source();
    }
    assert_eq!(
        found,
        Some(DurationParseError::Invalid("not-a-duration".to_string()))
    );
}

#[test]
fn test_invalid_toml_is_decode_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(dir.path(), "config.toml", "[common\nlisten = ");

    let err = decode_overlay(&path, &mut Config::new()).unwrap_err();
    assert!(matches!(err, ConfigError::Decode(DecodeError::Syntax { .. })));
}

#[test]
fn test_missing_overlay_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = decode_overlay(&path, &mut Config::new()).unwrap_err();
    match err {
        ConfigError::Decode(DecodeError::Read { path: p, source }) => {
            assert_eq!(p, path);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_directory_overlay_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = Config::new();

    let err = decode_overlay(dir.path(), &mut config).unwrap_err();

    assert!(matches!(err, ConfigError::Decode(DecodeError::Read { .. })));
    assert_eq!(config, Config::new());
}

#[test]
fn test_rendered_defaults_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let text = render_config(&Config::new()).unwrap();
    let path = common::write_file(dir.path(), "printed.toml", &text);

    let mut config = Config::new();
    decode_overlay(&path, &mut config).unwrap();
    assert_eq!(config, Config::new());
}

#[test]
fn test_missing_rollup_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_rollup_policy(&dir.path().join("rollup.xml"), &RollupXmlParser).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_assemble_with_defaults_needs_rollup_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_file(
        dir.path(),
        "config.toml",
        &format!(
            "[clickhouse]\nrollup-conf = {:?}\n",
            dir.path().join("missing.xml").to_string_lossy()
        ),
    );

    let err = assemble(&path, &common::AcceptAll).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn test_assemble_attaches_rollup() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config_with_rollup(dir.path(), "max-cpu = 2", "data-timeout = \"30s\"");

    let config = assemble(&path, &RollupXmlParser).unwrap();

    assert_eq!(config.common.max_cpu, 2);
    assert_eq!(config.clickhouse.data_timeout, Duration::from_secs(30));
    let rollup = config.rollup().unwrap();
    assert_eq!(rollup.patterns.len(), 1);
    assert_eq!(rollup.default.function.as_deref(), Some("avg"));
}

#[test]
fn test_assemble_rejects_malformed_rollup() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config_with_rollup(dir.path(), "", "");
    common::write_file(dir.path(), "rollup.xml", "<yandex><graphite_rollup>");

    let err = assemble(&path, &RollupXmlParser).unwrap_err();
    assert!(matches!(err, ConfigError::RollupParse { .. }));
}

#[test]
fn test_assemble_rejects_invalid_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config_with_rollup(dir.path(), "max-cpu = 0", "tree-timeout = \"-1s\"");

    let err = assemble(&path, &RollupXmlParser).unwrap_err();
    match err {
        ConfigError::Validation(errors) => {
            let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
            assert_eq!(fields, vec!["common.max-cpu", "clickhouse.tree-timeout"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_assembled_config_is_shareable() {
    let dir = tempfile::tempdir().unwrap();
    let path = common::write_config_with_rollup(dir.path(), "", "");
    let config = assemble(&path, &common::AcceptAll).unwrap();

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let config = std::sync::Arc::clone(&config);
            std::thread::spawn(move || config.clickhouse.data_table.clone())
        })
        .collect();
    for reader in readers {
        assert_eq!(reader.join().unwrap(), "graphite");
    }
}
