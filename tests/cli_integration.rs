//! Integration tests that run the CLI binary.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

/// Binary with config, data, and cache dirs redirected into `home`.
fn bin(home: &Path) -> Command {
    // CARGO_BIN_EXE_<name> uses the binary target name; hyphens require concat! for env!()
    let bin = env!(concat!("CARGO_BIN_EXE_prompt", "-", "booster"));
    let mut cmd = Command::new(bin);
    cmd.env_remove("OPENROUTER_API_KEY")
        .env_remove("RUST_LOG")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .env("XDG_CACHE_HOME", home.join("cache"))
        // Run from the temp dir so dotenv() won't load .env from project root
        .current_dir(home);
    cmd
}

fn run_with_stdin(mut cmd: Command, input: &str) -> Output {
    let mut child = cmd
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("binary not found - run cargo build first");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(input.as_bytes())
        .expect("write stdin");
    child.wait_with_output().expect("wait")
}

#[test]
fn cli_help_succeeds_and_outputs_usage() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .arg("--help")
        .output()
        .expect("binary not found - run cargo build first");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("enhance"));
    assert!(stdout.contains("follow-up"));
}

#[test]
fn cli_version_succeeds() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path()).arg("--version").output().expect("run");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("prompt-booster"));
}

#[test]
fn cli_enhance_without_api_key_exits_with_error() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .args(["enhance", "hello"])
        .output()
        .expect("run");

    assert!(
        !output.status.success(),
        "expected failure when OPENROUTER_API_KEY is not set"
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("OPENROUTER_API_KEY"),
        "expected API key error message, got: {}",
        stderr
    );
}

#[test]
fn cli_segment_reads_stdin() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let mut cmd = bin(tmp.path());
    cmd.args(["segment", "--json"]);
    let output = run_with_stdin(
        cmd,
        "---PROMPT_START---\nWrite a haiku about rain.\n---PROMPT_END---\n---REASON_START---\nNamed the form.\n---REASON_END---",
    );

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(json["mainArtifact"], "Write a haiku about rain.");
    assert_eq!(json["rationale"], "Named the form.");
}

#[test]
fn cli_render_formats_tables() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let mut cmd = bin(tmp.path());
    cmd.arg("render");
    let output = run_with_stdin(cmd, "Totals\n\n| A | B |\n|---|---|\n| 1 | 2 |\n");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("<p>Totals</p>\n<div class=\"table-responsive\">"));
    assert!(stdout.contains("<td>1</td><td>2</td>"));
}

#[test]
fn cli_history_starts_empty() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .args(["history", "list"])
        .output()
        .expect("run");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("No sessions yet."));
}

#[test]
fn cli_history_show_unknown_id_fails() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .args(["history", "show", "123"])
        .output()
        .expect("run");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No session with id 123"));
}

#[test]
fn cli_completions_bash() {
    let tmp = tempfile::TempDir::new().expect("temp dir");
    let output = bin(tmp.path())
        .args(["completions", "bash"])
        .output()
        .expect("run");

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("prompt-booster"));
}
