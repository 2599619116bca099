//! Focused CLI argument parsing tests.
//!
//! Tests that verify command-line argument parsing works correctly without
//! touching descriptor files.

#![allow(deprecated)] // Command::cargo_bin is deprecated but replacement requires newer assert_cmd

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn version_command_succeeds() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("brokerform"));
}

#[test]
fn version_flag_shows_version() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("brokerform"));
}

#[test]
fn help_flag_shows_usage() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("apply"))
        .stdout(predicate::str::contains("inspect"));
}

#[test]
fn apply_requires_ops() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .args(["apply", "broker.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--ops"));
}

#[test]
fn check_requires_descriptor() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn new_rejects_unknown_format() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .args(["new", "--format", "xml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn config_show_rejects_unknown_format() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .args(["config", "show", "--format", "ini"])
        .assert()
        .failure();
}

#[test]
fn unknown_subcommand_fails() {
    Command::cargo_bin("brokerform")
        .unwrap()
        .arg("deploy")
        .assert()
        .failure();
}
