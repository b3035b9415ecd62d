// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn write_config(content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("monitor.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

const FULL: &str = r#"
[server]
url = "http://127.0.0.1:5000"
name = "localhost"
key = "1234"

[[service]]
name = "app"
period = 60
cwd = "/etc/overc/service.d"
command = "./check-app.sh --fast"

[[service]]
name = "cpu"
period = 15
cwd = "/etc/overc/service.d"
command = "./check-cpu.sh"
max_lag = 5.0
"#;

#[test]
fn full_config_parses() {
    let (_dir, path) = write_config(FULL);
    let config = load(&path).unwrap();
    assert_eq!(config.server.name, "localhost");
    assert_eq!(config.services.len(), 2);
    assert_eq!(config.services[0].period, 60);
    assert_eq!(config.services[0].max_lag, None);
    assert_eq!(config.services[1].max_lag, Some(5.0));
    assert_eq!(config.services[1].command, "./check-cpu.sh");
}

#[test]
fn config_without_services_is_rejected() {
    let (_dir, path) = write_config(
        "[server]\nurl = \"http://x\"\nname = \"n\"\nkey = \"k\"\n",
    );
    assert!(matches!(load(&path).unwrap_err(), ConfigError::NoServices { .. }));
}

#[test]
fn unknown_keys_are_rejected() {
    let (_dir, path) = write_config(
        r#"
[server]
url = "http://x"
name = "n"
key = "k"
surprise = true

[[service]]
name = "a"
period = 60
cwd = "/"
command = "true"
"#,
    );
    assert!(matches!(load(&path).unwrap_err(), ConfigError::Toml { .. }));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load(Path::new("/nonexistent/monitor.toml")).unwrap_err(),
        ConfigError::Io { .. }
    ));
}
