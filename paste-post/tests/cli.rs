//! CLI integration tests for paste-post
//!
//! Every test points `PASTECAST_CONFIG` at a temporary file so the user's own
//! configuration never leaks in. No test reaches the real hosts: publishing
//! tests aim the adapters at a closed local port.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::net::TcpListener;
use tempfile::TempDir;

const ALL_KEYS: [&str; 7] = [
    "telegraph", "dpaste", "rentry", "paste-rs", "0x0", "hastebin", "catbox",
];

/// Write `content` as the config file and return its directory and path
fn setup_config(content: &str) -> (TempDir, String) {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, content).unwrap();
    (temp_dir, config_path.to_string_lossy().to_string())
}

/// Base URL on which nothing listens
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

/// Only paste-rs enabled, aimed at a closed port
fn unreachable_config() -> (TempDir, String) {
    let disabled: String = ALL_KEYS
        .iter()
        .filter(|k| **k != "paste-rs")
        .map(|k| format!("[platforms.\"{}\"]\nenabled = false\n\n", k))
        .collect();

    setup_config(&format!(
        "[publish]\ntimeout = \"3s\"\n\n{}[platforms.paste-rs]\nbase_url = \"{}\"\n",
        disabled,
        closed_port_url()
    ))
}

fn paste_post(config_path: &str) -> Command {
    let mut cmd = Command::cargo_bin("paste-post").unwrap();
    cmd.env("PASTECAST_CONFIG", config_path)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_flag() {
    Command::cargo_bin("paste-post")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Publish text to no-login paste hosts"))
        .stdout(predicate::str::contains("--platform"))
        .stdout(predicate::str::contains("EXIT CODES"));
}

#[test]
fn test_list_platforms_json_in_registry_order() {
    let (_temp_dir, config_path) = setup_config("");

    let output = paste_post(&config_path)
        .args(["--list", "--format", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let descriptors: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let keys: Vec<&str> = descriptors
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["key"].as_str().unwrap())
        .collect();
    assert_eq!(keys, ALL_KEYS);
    assert_eq!(descriptors[0]["supportsTitle"], true);
}

#[test]
fn test_list_respects_disabled_platforms() {
    let (_temp_dir, config_path) = setup_config("[platforms.catbox]\nenabled = false\n");

    paste_post(&config_path)
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("paste-rs"))
        .stdout(predicate::str::contains("catbox").not());
}

#[test]
fn test_missing_config_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    paste_post(&missing.to_string_lossy())
        .arg("--list")
        .assert()
        .success()
        .stdout(predicate::str::contains("telegraph"));
}

#[test]
fn test_empty_content_exits_3() {
    let (_temp_dir, config_path) = setup_config("");

    paste_post(&config_path)
        .arg("   ")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Content cannot be empty"));
}

#[test]
fn test_empty_stdin_exits_3_with_json_error() {
    let (_temp_dir, config_path) = setup_config("");

    let output = paste_post(&config_path)
        .args(["--format", "json"])
        .write_stdin("")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[test]
fn test_unknown_platform_json_lists_available() {
    let (_temp_dir, config_path) = setup_config("");

    let output = paste_post(&config_path)
        .args(["--platform", "myspace", "--format", "json", "hello"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["error"], "Unknown platform: myspace");
    let available: Vec<&str> = body["available"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(available, ALL_KEYS);
}

#[test]
fn test_unknown_platform_text_mentions_alternatives() {
    let (_temp_dir, config_path) = setup_config("");

    paste_post(&config_path)
        .args(["-p", "MySpace", "hello"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unknown platform: MySpace"))
        .stderr(predicate::str::contains("paste-rs"));
}

#[test]
fn test_blank_platform_selection_exits_3_without_publishing() {
    let (_temp_dir, config_path) = unreachable_config();

    for blank in ["", " ", ",,"] {
        let output = paste_post(&config_path)
            .args(["--platform", blank, "--format", "json", "hello"])
            .output()
            .unwrap();
        assert_eq!(output.status.code(), Some(3), "platform {:?}", blank);

        let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("--platform"));
        assert!(body.get("results").is_none());
    }
}

#[test]
fn test_bulk_publish_all_failed_exits_1() {
    let (_temp_dir, config_path) = unreachable_config();

    let output = paste_post(&config_path)
        .args(["--format", "json", "hello"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["total"], 1);
    assert_eq!(body["successful"], 0);
    assert_eq!(body["results"][0]["platform"], "paste-rs");
    assert_eq!(body["results"][0]["success"], false);
    assert!(body["results"][0]["error"].is_string());
}

#[test]
fn test_bulk_with_unknown_name_keeps_position() {
    let (_temp_dir, config_path) = unreachable_config();

    let output = paste_post(&config_path)
        .args(["--platform", "myspace,pasters", "--format", "json", "hello"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let body: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["total"], 2);
    assert_eq!(body["results"][0]["platform"], "myspace");
    assert_eq!(body["results"][0]["error"], "Unknown platform: myspace");
    assert_eq!(body["results"][1]["platform"], "paste-rs");
}

#[test]
fn test_single_platform_failure_prints_outcome() {
    let (_temp_dir, config_path) = unreachable_config();

    let output = paste_post(&config_path)
        .args(["--platform", "PASTE-RS", "--format", "json"])
        .write_stdin("from stdin\n")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));

    let outcome: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(outcome["platform"], "paste-rs");
    assert_eq!(outcome["success"], false);
    assert!(outcome.get("url").is_none());
}

#[test]
fn test_invalid_config_exits_1() {
    let (_temp_dir, config_path) = setup_config("[publish]\ntimeout = \"soon\"\n");

    paste_post(&config_path)
        .arg("hello")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_invalid_timeout_flag_exits_1() {
    let (_temp_dir, config_path) = setup_config("");

    paste_post(&config_path)
        .args(["--timeout", "0s", "--list"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("publish.timeout"));
}
