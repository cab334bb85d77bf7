//! Integration tests for `valcon consolidate`.
#![allow(clippy::expect_used)]

use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Path to the compiled `valcon` binary.
fn valcon_bin() -> PathBuf {
    let mut path = std::env::current_exe().expect("current exe");
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.push("valcon");
    path
}

/// Path to a shared fixture file.
fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("../../tests/fixtures");
    path.push(name);
    path
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(valcon_bin())
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run valcon")
}

fn stdout_json(out: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&out.stdout);
    serde_json::from_str(stdout.trim()).expect("stdout should be valid JSON")
}

// ---------------------------------------------------------------------------
// success paths (exit 0)
// ---------------------------------------------------------------------------

#[test]
fn strong_change_adds_and_deletes() {
    let path = fixture("strong-add.json");
    let out = run(&["consolidate", path.to_str().expect("path")]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("fullName: 2 change(s)"), "stdout: {stdout}");
    assert!(
        stdout.contains("+ \"Captain Jack Sparrow\"  (sources: hr-feed)"),
        "stdout: {stdout}"
    );
    assert!(stdout.contains("- \"Jack Sparrow\""), "stdout: {stdout}");
}

#[test]
fn strong_change_json_output() {
    let path = fixture("strong-add.json");
    let out = run(&["consolidate", path.to_str().expect("path"), "--format", "json"]);
    assert_eq!(out.status.code(), Some(0));
    let value = stdout_json(&out);
    assert_eq!(value["delta"]["path"], "fullName");
    assert_eq!(
        value["delta"]["values_to_add"][0]["value"],
        "Captain Jack Sparrow"
    );
    assert_eq!(value["delta"]["values_to_delete"][0]["value"], "Jack Sparrow");
    assert!(value.get("operation").is_none(), "no record without --trace");
}

#[test]
fn case_ignore_match_yields_no_changes() {
    let path = fixture("unchanged.json");
    let out = run(&["consolidate", path.to_str().expect("path")]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "attributes/ri:mail: no changes\n"
    );
}

#[test]
fn apriori_replace_is_passed_through() {
    let path = fixture("apriori-replace.json");
    let out = run(&["consolidate", path.to_str().expect("path"), "-f", "json"]);
    assert_eq!(
        out.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    let value = stdout_json(&out);
    let replace = value["delta"]["values_to_replace"]
        .as_array()
        .expect("replace-shaped delta");
    assert_eq!(replace.len(), 1);
    assert_eq!(replace[0]["value"], "new");
    assert_eq!(replace[0]["metadata"]["sources"][0], "user");
}

#[test]
fn trace_adds_operation_record_to_json() {
    let path = fixture("strong-add.json");
    let out = run(&[
        "consolidate",
        path.to_str().expect("path"),
        "--trace",
        "--format",
        "json",
    ]);
    assert_eq!(out.status.code(), Some(0));
    let value = stdout_json(&out);
    let operation = &value["operation"];
    assert_eq!(operation["operation"], "valcon.cli.consolidate");
    assert_eq!(operation["status"], "success");
    let child = &operation["subresults"][0];
    assert_eq!(child["operation"], "valcon.consolidate_to_delta");
    assert_eq!(child["params"]["item_path"], "fullName");
    assert_eq!(child["traces"][0]["equivalence_class_count"], 2);
}

#[test]
fn trace_in_human_mode_goes_to_stderr() {
    let path = fixture("unchanged.json");
    let out = run(&["consolidate", path.to_str().expect("path"), "--trace"]);
    assert_eq!(out.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("valcon.consolidate_to_delta [success]"),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("1 equivalence class(es)"), "stderr: {stderr}");
}

#[test]
fn reads_request_from_stdin() {
    let request = std::fs::read(fixture("strong-add.json")).expect("read fixture");
    let mut child = Command::new(valcon_bin())
        .env_remove("RUST_LOG")
        .args(["consolidate", "-", "--format", "json"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn valcon");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(&request)
        .expect("write stdin");
    let out = child.wait_with_output().expect("wait");
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(stdout_json(&out)["delta"]["path"], "fullName");
}

// ---------------------------------------------------------------------------
// consolidation failure (exit 1)
// ---------------------------------------------------------------------------

#[test]
fn exclusive_conflict_exits_1() {
    let path = fixture("exclusive-conflict.json");
    let out = run(&["consolidate", path.to_str().expect("path")]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("exclusion conflict"), "stderr: {stderr}");
    assert!(stderr.contains("'title-a'"), "stderr: {stderr}");
    assert!(stderr.contains("'title-b'"), "stderr: {stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn exclusive_conflict_with_trace_prints_fatal_record() {
    let path = fixture("exclusive-conflict.json");
    let out = run(&["consolidate", path.to_str().expect("path"), "--trace"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("valcon.consolidate_to_delta [fatal_error]"),
        "stderr: {stderr}"
    );
}

// ---------------------------------------------------------------------------
// input failures (exit 2)
// ---------------------------------------------------------------------------

#[test]
fn missing_file_exits_2() {
    let out = run(&["consolidate", "/no/such/request.json"]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));
}

#[test]
fn malformed_request_exits_2() {
    let mut f = tempfile::NamedTempFile::new().expect("temp file");
    f.write_all(br#"{"item_path": "fullName", "triple": {"plus": [{"value": 1}]}}"#)
        .expect("write");
    let out = run(&["consolidate", f.path().to_str().expect("path")]);
    assert_eq!(out.status.code(), Some(2));
    assert!(
        String::from_utf8_lossy(&out.stderr).contains("invalid consolidation request"),
        "stderr: {}",
        String::from_utf8_lossy(&out.stderr)
    );
}

#[test]
fn oversized_request_exits_2() {
    let path = fixture("strong-add.json");
    let out = run(&[
        "consolidate",
        path.to_str().expect("path"),
        "--max-file-size",
        "16",
    ]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("too large"));
}

#[test]
fn version_prints_three_part_version() {
    let out = run(&["version"]);
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(stdout.trim().split('.').count(), 3, "stdout: {stdout}");
}
