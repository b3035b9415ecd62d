// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn spec(name: &str, cwd: &std::path::Path, command: &str) -> NotifierSpec {
    NotifierSpec {
        name: name.to_owned(),
        cwd: cwd.to_path_buf(),
        command: command.to_owned(),
    }
}

/// A notifier that appends its stdin to a file in its cwd.
fn file_notifier(name: &str, cwd: &std::path::Path, out: &str) -> NotifierSpec {
    spec(name, cwd, &format!("sh -c 'cat >> {out}'"))
}

#[tokio::test]
async fn delivers_to_every_notifier_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let set = NotifierSet::new(&[
        file_notifier("first", dir.path(), "first.txt"),
        file_notifier("second", dir.path(), "second.txt"),
    ])
    .unwrap();

    let report = set.deliver("alert text\n").await;
    assert_eq!(report.delivered, 2);
    assert!(report.failures.is_empty());
    assert!(report.succeeded());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("first.txt")).unwrap(),
        "alert text\n"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("second.txt")).unwrap(),
        "alert text\n"
    );
}

#[tokio::test]
async fn failure_escalates_through_the_working_notifier() {
    let dir = tempfile::tempdir().unwrap();
    let set = NotifierSet::new(&[
        spec("error", dir.path(), "sh -c 'exit 1'"),
        file_notifier("good", dir.path(), "good.txt"),
    ])
    .unwrap();

    let report = set.deliver("the alert\n").await;
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, "error");
    assert!(report.succeeded());

    let received = std::fs::read_to_string(dir.path().join("good.txt")).unwrap();
    // Primary delivery, then the escalation pass
    assert!(received.starts_with("the alert\n"));
    assert!(received.contains("Alert plugin `error` failed:"));
}

#[tokio::test]
async fn total_failure_is_reported_not_raised() {
    let dir = tempfile::tempdir().unwrap();
    let set = NotifierSet::new(&[
        spec("a", dir.path(), "sh -c 'exit 1'"),
        spec("b", dir.path(), "/nonexistent/overc-no-such-notifier"),
    ])
    .unwrap();

    let report = set.deliver("lost alert").await;
    assert_eq!(report.delivered, 0);
    assert_eq!(report.failures.len(), 2);
    assert!(!report.succeeded());
}

#[tokio::test]
async fn empty_set_counts_as_delivered() {
    let set = NotifierSet::new(&[]).unwrap();
    assert!(set.is_empty());
    let report = set.deliver("nobody listens").await;
    assert_eq!(report.delivered, 0);
    assert!(report.succeeded());
}

#[test]
fn bad_command_fails_at_construction() {
    let err = NotifierSet::new(&[spec("x", std::path::Path::new("/tmp"), "sh -c 'oops")]);
    assert!(err.is_err());
}
