//! CLI integration tests for the `fsml` binary.
//!
//! Uses `assert_cmd` to spawn the binary and verify exit codes, stdout
//! content, stderr content and written dump files.
//!
//! Tests that read the conformance fixtures set `current_dir` to the
//! workspace root so relative paths resolve.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `fsml` binary, rooted at workspace.
fn fsml() -> Command {
    let mut cmd = cargo_bin_cmd!("fsml");
    cmd.current_dir(workspace_root());
    cmd
}

const TWO_STATE: &str = "def m : Automaton = Gen.(sigma).{
    start 'a' -> S1
    S1 else -> S1
    terminal { S1 'b' -> S1 }
}
";

fn write_source(tmp: &TempDir, name: &str, src: &str) -> PathBuf {
    let path = tmp.path().join(name);
    fs::write(&path, src).unwrap();
    path
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    fsml()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Front end for the FSML automaton language",
        ));
}

#[test]
fn version_exits_0() {
    fsml()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fsml"));
}

#[test]
fn help_mentions_out_file() {
    fsml()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("<FILE>.out"));
}

#[test]
fn test_help_exits_0() {
    fsml()
        .args(["test", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("conformance"));
}

// ──────────────────────────────────────────────
// 2. Parsing a source file
// ──────────────────────────────────────────────

#[test]
fn parse_writes_dump_next_to_input() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(&tmp, "machine.fsml", TWO_STATE);

    fsml()
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::contains("1 declaration(s) written to"));

    let dump = fs::read_to_string(tmp.path().join("machine.fsml.out")).unwrap();
    assert!(dump.starts_with("Automaton m\n  alphabet: sigma\n"));
    assert!(dump.contains("  terminal:\n    S1\n      'b' -> S1\n"));
}

#[test]
fn parse_quiet_prints_nothing() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(&tmp, "machine.fsml", TWO_STATE);

    fsml()
        .arg("--quiet")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
    assert!(tmp.path().join("machine.fsml.out").exists());
}

#[test]
fn parse_to_stdout_writes_no_file() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(&tmp, "machine.fsml", TWO_STATE);

    fsml()
        .arg("--stdout")
        .arg(&src)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Automaton m\n"));
    assert!(!tmp.path().join("machine.fsml.out").exists());
}

#[test]
fn parse_out_flag_overrides_target() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(&tmp, "machine.fsml", TWO_STATE);
    let target = tmp.path().join("custom.txt");

    fsml()
        .arg("--quiet")
        .arg(&src)
        .arg("--out")
        .arg(&target)
        .assert()
        .success();
    assert!(target.exists());
    assert!(!tmp.path().join("machine.fsml.out").exists());
}

#[test]
fn parse_json_output_is_valid_json() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(&tmp, "machine.fsml", TWO_STATE);

    let assert = fsml()
        .args(["--stdout", "--output", "json"])
        .arg(&src)
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let decl = &json["declarations"][0];
    assert_eq!(decl["kind"], "automaton");
    assert_eq!(decl["alphabet_name"], "sigma");
    assert_eq!(decl["body"]["start_state"]["name"], "start");
    assert_eq!(decl["body"]["regular_states"][0]["name"], "S1");
}

#[test]
fn parse_nonexistent_file_exits_1() {
    fsml()
        .arg("nonexistent_file_xyz.fsml")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("cannot read"));
}

#[test]
fn syntax_error_reports_file_line_and_column() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(
        &tmp,
        "broken.fsml",
        "def m : Automaton = Gen.(s).{\n    start 'a' -> q\n}\n",
    );

    fsml()
        .arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("broken.fsml:3:1: unexpected '}'"));
    assert!(!tmp.path().join("broken.fsml.out").exists());
}

#[test]
fn syntax_error_as_json() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(&tmp, "broken.fsml", "def s : Alphabet = { }");

    let assert = fsml()
        .args(["--output", "json"])
        .arg(&src)
        .assert()
        .failure()
        .code(1);
    let stderr = String::from_utf8(assert.get_output().stderr.clone()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&stderr).unwrap();
    assert_eq!(json["error"]["kind"], "syntax");
    assert_eq!(json["error"]["position"]["line"], 1);
    assert_eq!(json["error"]["position"]["column"], 22);
    assert_eq!(json["error"]["found"], "'}'");
}

#[test]
fn lex_error_exits_1() {
    let tmp = TempDir::new().unwrap();
    let src = write_source(&tmp, "bad.fsml", "def s : Alphabet = { @ }");

    fsml()
        .arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("bad.fsml:1:22: unexpected character '@'"));
}

#[test]
fn max_depth_limits_nesting() {
    let tmp = TempDir::new().unwrap();
    let nested = format!(
        "def s : Alphabet = {{ {}1{} }}",
        "A(".repeat(40),
        ")".repeat(40)
    );
    let src = write_source(&tmp, "deep.fsml", &nested);

    fsml()
        .arg("--stdout")
        .arg(&src)
        .assert()
        .success();
    fsml()
        .args(["--stdout", "--max-depth", "16"])
        .arg(&src)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("stack depth"));
}

// ──────────────────────────────────────────────
// 3. Test subcommand
// ──────────────────────────────────────────────

#[test]
fn conformance_suite_passes() {
    fsml()
        .args(["test", "conformance"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TAP version 14"))
        .stdout(predicate::str::contains("# fail  0"));
}

#[test]
fn missing_suite_dir_exits_1() {
    fsml()
        .args(["test", "no_such_suite_dir"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn failing_fixture_fails_the_run() {
    let tmp = TempDir::new().unwrap();
    let positive = tmp.path().join("positive");
    fs::create_dir_all(&positive).unwrap();
    fs::write(positive.join("wrong.fsml"), "def s : Alphabet = { 1 }").unwrap();
    fs::write(positive.join("wrong.expected.out"), "something else\n").unwrap();

    fsml()
        .arg("test")
        .arg(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("not ok 1 - positive/wrong"));
}
