//! Integration tests for the seedhost CLI
//!
//! These tests verify argument parsing and the commands that need no network.

#![allow(clippy::expect_used)]

use std::io::Write as _;

use assert_cmd::Command;
use predicates::prelude::*;

/// The binary with an empty environment, so host settings never leak in.
fn seedhost() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("seedhost"));
    cmd.env_clear().env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    seedhost().assert().code(2).stderr(predicate::str::contains(
        "Chat remote for a Transmission daemon on on-demand hosts",
    ));
}

#[test]
fn test_cli_help_flag_lists_commands() {
    seedhost()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("acquire"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("magnet"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    seedhost()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_shows_version() {
    seedhost()
        .arg("version")
        .assert()
        .success()
        .stdout(format!("seedhost {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = seedhost()
        .args(["version", "--json"])
        .output()
        .expect("runs");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_exits_with_error() {
    seedhost()
        .arg("provision")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

// --- Configuration errors ---

#[test]
fn test_acquire_without_control_plane_names_missing_variable() {
    seedhost()
        .arg("acquire")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: WORKSPACE_ID must be set"));
}

#[test]
fn test_acquire_rejects_zero_retry_budget() {
    seedhost()
        .arg("acquire")
        .env("TRANSMISSION_HOST", "10.0.0.2")
        .env("GET_HOST_IP_RETRIES", "0")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GET_HOST_IP_RETRIES"));
}

#[test]
fn test_serve_without_token_fails_before_connecting() {
    seedhost()
        .arg("serve")
        .env("TRANSMISSION_HOST", "10.0.0.2")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "Error: TELEGRAM_BOT_TOKEN must be set",
        ));
}

#[test]
fn test_destroy_with_static_host_has_no_control_plane() {
    seedhost()
        .arg("destroy")
        .env("TRANSMISSION_HOST", "10.0.0.2")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No control plane configured"));
}

// --- Magnet command ---

#[test]
fn test_magnet_prints_hex_info_hash_link() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"d8:announce3:url4:infod6:lengthi1e4:name1:xee")
        .expect("write torrent");

    let output = seedhost()
        .arg("magnet")
        .arg(file.path())
        .output()
        .expect("runs");

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf-8");
    let hash = stdout
        .trim()
        .strip_prefix("magnet:?xt=urn:btih:")
        .expect("magnet link");
    assert_eq!(hash.len(), 40);
    assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_magnet_rejects_non_torrent_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(b"<html>not a torrent</html>")
        .expect("write file");

    seedhost()
        .arg("magnet")
        .arg(file.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a valid torrent file"));
}

#[test]
fn test_magnet_missing_file_fails() {
    seedhost()
        .args(["magnet", "/nonexistent/file.torrent"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}
