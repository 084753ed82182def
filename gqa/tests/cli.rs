//! Tests for the gqa binary

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// gqa command isolated from the user's config and log directories
fn gqa(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("gqa").expect("gqa binary should build");
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join(".config"))
        .env("XDG_DATA_HOME", home.path().join(".local/share"))
        .env_remove("RUST_LOG");
    cmd
}

fn write_config(home: &TempDir, script_body: &str) -> std::path::PathBuf {
    let bin = home.path().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let script = bin.join("fake-gemini");
    fs::write(&script, format!("#!/bin/sh\n{}\n", script_body)).unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let config = home.path().join("gqa.yml");
    fs::write(
        &config,
        format!(
            "assistant:\n  executable-name: fake-gemini\n  search-paths:\n    - {}\n",
            bin.display()
        ),
    )
    .unwrap();
    config
}

#[test]
fn test_tools_json_lists_catalog() {
    let home = TempDir::new().unwrap();
    gqa(&home)
        .args(["tools", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"review_code\""))
        .stdout(predicate::str::contains("\"inputSchema\""))
        .stdout(predicate::str::contains("\"ask_gemini\""));
}

#[test]
fn test_tools_text_marks_required_params() {
    let home = TempDir::new().unwrap();
    gqa(&home)
        .env("NO_COLOR", "1")
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("security_audit"))
        .stdout(predicate::str::contains("target_path (string, required)"));
}

#[test]
fn test_call_ask_gemini_prints_response() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "echo \"answer to $2\"");

    gqa(&home)
        .arg("--config")
        .arg(&config)
        .args(["call", "ask_gemini", "--args", r#"{"prompt":"hi"}"#])
        .assert()
        .success()
        .stdout(predicate::str::contains("✅ Gemini Response:"))
        .stdout(predicate::str::contains("answer to hi"));
}

#[test]
fn test_call_failure_exits_non_zero() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "echo 'bad key' >&2\nexit 2");

    gqa(&home)
        .arg("--config")
        .arg(&config)
        .args(["call", "ask_gemini", "--args", r#"{"prompt":"hi"}"#])
        .assert()
        .failure()
        .stdout(predicate::str::contains("❌ Gemini request failed: bad key"));
}

#[test]
fn test_call_rejects_arguments_before_running() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "touch \"$HOME/ran\"; echo ok");

    gqa(&home)
        .arg("--config")
        .arg(&config)
        .args(["call", "ask_gemini", "--args", "{}"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("prompt is required"));
    assert!(!home.path().join("ran").exists());
}

#[test]
fn test_doctor_lists_candidates_and_round_trips() {
    let home = TempDir::new().unwrap();
    let config = write_config(
        &home,
        r#"case "$1" in
  --version) echo "0.9.0" ;;
  --help) echo "  --prompt" ;;
  --prompt) echo "ready" ;;
esac"#,
    );

    gqa(&home)
        .arg("--config")
        .arg(&config)
        .args(["doctor", "--prompt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("exists & executable"))
        .stdout(predicate::str::contains("round-trip  ready"));
}

#[test]
fn test_call_unknown_tool_is_an_error() {
    let home = TempDir::new().unwrap();
    gqa(&home)
        .args(["call", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown tool: nope"));
}

#[test]
fn test_serve_answers_initialize_and_exits_on_eof() {
    let home = TempDir::new().unwrap();
    let config = write_config(&home, "echo 'fake 1.2.3'");

    gqa(&home)
        .arg("--config")
        .arg(&config)
        .arg("serve")
        .write_stdin(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test","version":"0.0.0"}}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n",
        ))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"protocolVersion\""))
        .stdout(predicate::str::contains("\"name\":\"gemini-qa-agent\""));
}
