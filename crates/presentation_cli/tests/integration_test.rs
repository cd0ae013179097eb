//! Integration tests for the calsync binary
//!
//! Each test runs the real binary against a fresh SQLite file. None of the
//! scenarios reach the network: feeds are either never fetched (unsafe URL,
//! disabled) or the subscription does not exist.

#![allow(clippy::expect_used, clippy::panic)]

use std::{
    path::Path,
    process::{Command, Output},
};

struct Workspace {
    dir: tempfile::TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("Failed to create temp dir"),
        }
    }

    fn database_url(&self) -> String {
        format!("sqlite://{}", self.dir.path().join("calsync.db").display())
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_calsync"))
            .args(args)
            .current_dir(self.dir.path())
            .env("CALSYNC_DATABASE__URL", self.database_url())
            .env("RUST_LOG", "off")
            .env_remove("CALSYNC_CONFIG")
            .output()
            .expect("Failed to run calsync")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "calsync {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).expect("stdout is UTF-8")
    }

    /// Subscribe and return the new subscription ID
    fn subscribe(&self, name: &str, url: &str) -> String {
        let stdout = self.run_ok(&["subscribe", "--name", name, "--url", url]);
        stdout
            .lines()
            .next()
            .and_then(|line| line.strip_prefix("Added subscription "))
            .map(str::to_string)
            .unwrap_or_else(|| panic!("Unexpected subscribe output: {stdout}"))
    }
}

#[test]
fn help_lists_commands() {
    let stdout = Workspace::new().run_ok(&["--help"]);
    for command in ["subscribe", "unsubscribe", "list", "events", "sync", "sync-all", "watch"] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn subscribe_then_list() {
    let ws = Workspace::new();
    let id = ws.subscribe("Team", "https://example.com/team.ics");

    let listing = ws.run_ok(&["list"]);
    assert!(listing.contains(&id));
    assert!(listing.contains("[pending]"));
    assert!(listing.contains("https://example.com/team.ics"));
    assert!(Path::new(&ws.dir.path().join("calsync.db")).exists());
}

#[test]
fn invalid_color_is_rejected() {
    let ws = Workspace::new();
    let output = ws.run(&[
        "subscribe",
        "--name",
        "Team",
        "--url",
        "https://example.com/team.ics",
        "--color",
        "blue",
    ]);

    assert!(!output.status.success());
    assert!(ws.run_ok(&["list"]).contains("No subscriptions"));
}

#[test]
fn failed_sync_exits_non_zero_and_records_error() {
    let ws = Workspace::new();
    let id = ws.subscribe("Router", "http://127.0.0.1/calendar.ics");

    let output = ws.run(&["sync", &id]);
    assert!(!output.status.success());

    let listing = ws.run_ok(&["list"]);
    assert!(listing.contains("[error]"));
    assert!(listing.contains(
        "last error: Feed URL is not allowed: only public http(s) addresses can be synced"
    ));
}

#[test]
fn disabled_subscription_sync_succeeds_without_fetching() {
    let ws = Workspace::new();
    let id = ws.subscribe("Team", "https://example.com/team.ics");
    ws.run_ok(&["disable", &id]);

    let stdout = ws.run_ok(&["sync", &id]);
    assert!(stdout.contains("disabled"));
    assert!(ws.run_ok(&["list"]).contains("[disabled]"));

    ws.run_ok(&["enable", &id]);
    assert!(ws.run_ok(&["list"]).contains("[pending]"));
}

#[test]
fn sync_of_unknown_subscription_fails() {
    let ws = Workspace::new();
    let output = ws.run(&["sync", "00000000-0000-4000-8000-000000000000"]);
    assert!(!output.status.success());
}

#[test]
fn sync_all_reports_failures_but_succeeds() {
    let ws = Workspace::new();
    ws.subscribe("Router", "http://10.0.0.1/calendar.ics");

    let stdout = ws.run_ok(&["sync-all"]);
    assert!(stdout.contains("Synced 0 of 1 subscriptions"));
    assert!(stdout.contains("failed: Router"));
}

#[test]
fn unsubscribe_removes_the_subscription() {
    let ws = Workspace::new();
    let id = ws.subscribe("Team", "https://example.com/team.ics");

    let stdout = ws.run_ok(&["unsubscribe", &id]);
    assert!(stdout.contains("0 imported event(s)"));
    assert!(ws.run_ok(&["list"]).contains("No subscriptions"));
    assert!(!ws.run(&["events", &id]).status.success());
}
