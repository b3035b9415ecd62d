// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use clap::Parser;

#[test]
fn notifier_file_parses_ordered_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notifiers.toml");
    std::fs::write(
        &path,
        r#"
[[notifier]]
name = "mail"
cwd = "/etc/overc/alert.d"
command = "./send-mail admin@example.com"

[[notifier]]
name = "pager"
cwd = "/etc/overc/alert.d"
command = "./page 'ops team'"
"#,
    )
    .unwrap();

    let notifiers = load_notifiers(&path).unwrap();
    assert_eq!(notifiers.len(), 2);
    assert_eq!(notifiers[0].name, "mail");
    assert_eq!(notifiers[1].name, "pager");
    assert_eq!(notifiers[1].command, "./page 'ops team'");
}

#[test]
fn empty_notifier_file_is_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notifiers.toml");
    std::fs::write(&path, "").unwrap();
    assert!(load_notifiers(&path).unwrap().is_empty());
}

#[test]
fn missing_notifier_file_is_an_io_error() {
    let err = load_notifiers(Path::new("/nonexistent/notifiers.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn invalid_toml_is_a_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notifiers.toml");
    std::fs::write(&path, "[[notifier]]\nname = ").unwrap();
    assert!(matches!(load_notifiers(&path).unwrap_err(), ConfigError::Toml { .. }));
}

#[test]
fn cli_defaults() {
    let config = CollectorConfig::parse_from(["overcd"]);
    assert_eq!(config.bind.to_string(), "127.0.0.1:5000");
    assert_eq!(config.tick_secs, 3);
    assert_eq!(config.lock_wait_secs, 2);

    let sup = config.supervisor_config();
    assert_eq!(sup.tick_interval, Duration::from_secs(3));
    assert_eq!(sup.lock_wait, Duration::from_secs(2));
    assert_eq!(sup.lock_path, crate::lock::default_lock_path());
}

#[test]
fn cli_overrides() {
    let config = CollectorConfig::parse_from([
        "overcd",
        "--bind",
        "0.0.0.0:8080",
        "--lock",
        "/var/run/overc.lock",
        "--tick-secs",
        "1",
    ]);
    assert_eq!(config.bind.to_string(), "0.0.0.0:8080");
    assert_eq!(
        config.supervisor_config().lock_path,
        PathBuf::from("/var/run/overc.lock")
    );
    assert_eq!(config.supervisor_config().tick_interval, Duration::from_secs(1));
}
