//! Conformance suite runner.
//!
//! Layout:
//!   positive/  -- *.fsml + *.expected.out (exact text dump)
//!   negative/  -- *.fsml + *.expected-error.json (error fields to match)
//!
//! An expected-error file lists only the fields it pins down; any field it
//! omits is not compared.

use std::path::{Path, PathBuf};

use fsml_core::{parse_source, ParseConfig};
use serde_json::Value;

use crate::tap::Tap;

pub const SOURCE_EXTENSION: &str = "fsml";

pub fn run_suite(suite_dir: &Path, config: &ParseConfig) -> Tap {
    let mut tap = Tap::new();
    run_positive_dir(&suite_dir.join("positive"), config, &mut tap);
    run_negative_dir(&suite_dir.join("negative"), config, &mut tap);
    log::debug!(
        "conformance suite {}: {} failure(s)",
        suite_dir.display(),
        tap.failure_count()
    );
    tap
}

fn run_positive_dir(dir: &Path, config: &ParseConfig, tap: &mut Tap) {
    for source in source_files(dir) {
        let name = format!("positive/{}", stem(&source));
        let expected_path = source.with_extension("expected.out");
        let expected = match std::fs::read_to_string(&expected_path) {
            Ok(text) => text,
            Err(e) => {
                tap.not_ok(
                    name,
                    format!("cannot read {}: {}", expected_path.display(), e),
                );
                continue;
            }
        };
        match read_and_parse(&source, config) {
            Ok(got) if got == expected => tap.ok(name),
            Ok(got) => tap.not_ok(
                name,
                format!("output mismatch:\n--- expected\n{}+++ got\n{}", expected, got),
            ),
            Err(e) => tap.not_ok(name, format!("unexpected failure: {}", e)),
        }
    }
}

fn run_negative_dir(dir: &Path, config: &ParseConfig, tap: &mut Tap) {
    for source in source_files(dir) {
        let name = format!("negative/{}", stem(&source));
        let expected_path = source.with_extension("expected-error.json");
        let expected = match read_json(&expected_path) {
            Ok(v) => v,
            Err(e) => {
                tap.not_ok(name, e);
                continue;
            }
        };
        let src = match std::fs::read_to_string(&source) {
            Ok(s) => s,
            Err(e) => {
                tap.not_ok(name, format!("cannot read {}: {}", source.display(), e));
                continue;
            }
        };
        match parse_source(&src, config) {
            Ok(_) => tap.not_ok(name, "expected an error but parsing succeeded"),
            Err(err) => {
                let got = match serde_json::to_value(&err) {
                    Ok(v) => v,
                    Err(e) => {
                        tap.not_ok(name, format!("cannot serialize error: {}", e));
                        continue;
                    }
                };
                if json_contains(&got, &expected) {
                    tap.ok(name);
                } else {
                    tap.not_ok(name, json_diff(&expected, &got));
                }
            }
        }
    }
}

fn read_and_parse(source: &Path, config: &ParseConfig) -> Result<String, String> {
    let src = std::fs::read_to_string(source)
        .map_err(|e| format!("cannot read {}: {}", source.display(), e))?;
    parse_source(&src, config)
        .map(|program| program.to_string())
        .map_err(|e| e.to_string())
}

// -- Helpers --

/// `*.fsml` files directly inside `dir`, sorted by name.
fn source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(SOURCE_EXTENSION))
            .collect(),
        Err(_) => Vec::new(),
    };
    files.sort();
    files
}

fn stem(path: &Path) -> String {
    path.file_stem()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string()
}

fn read_json(path: &Path) -> Result<Value, String> {
    let src = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
    serde_json::from_str(&src).map_err(|e| format!("invalid JSON in {}: {}", path.display(), e))
}

/// Every field present in `expected` is present and equal in `got`.
/// Arrays must match element-wise and in length.
fn json_contains(got: &Value, expected: &Value) -> bool {
    match (got, expected) {
        (Value::Object(g), Value::Object(e)) => e
            .iter()
            .all(|(k, ev)| g.get(k).is_some_and(|gv| json_contains(gv, ev))),
        (Value::Array(g), Value::Array(e)) => {
            g.len() == e.len() && g.iter().zip(e).all(|(g, e)| json_contains(g, e))
        }
        _ => got == expected,
    }
}

fn json_diff(expected: &Value, got: &Value) -> String {
    let exp_str = serde_json::to_string_pretty(expected).unwrap_or_default();
    let got_str = serde_json::to_string_pretty(got).unwrap_or_default();
    format!("error mismatch:\n--- expected\n{}\n+++ got\n{}", exp_str, got_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn partial_expectation_matches_superset() {
        let got = json!({
            "kind": "syntax",
            "position": { "line": 3, "column": 7 },
            "found": "'}'",
            "expected": ["'terminal'"],
        });
        assert!(json_contains(&got, &json!({ "kind": "syntax" })));
        assert!(json_contains(&got, &json!({ "position": { "line": 3 } })));
        assert!(!json_contains(&got, &json!({ "position": { "line": 4 } })));
        assert!(!json_contains(&got, &json!({ "expected": [] })));
        assert!(!json_contains(&got, &json!({ "missing": 1 })));
    }

    #[test]
    fn suite_runs_positive_and_negative_fixtures() {
        let dir = tempfile::tempdir().unwrap();
        let pos = dir.path().join("positive");
        let neg = dir.path().join("negative");
        std::fs::create_dir_all(&pos).unwrap();
        std::fs::create_dir_all(&neg).unwrap();

        std::fs::write(pos.join("one.fsml"), "def s : Alphabet = { 1 }").unwrap();
        std::fs::write(
            pos.join("one.expected.out"),
            "Alphabet s\n  constructor: enumeration\n  params:\n    1\n",
        )
        .unwrap();
        std::fs::write(neg.join("bad.fsml"), "def s : Alphabet = { }").unwrap();
        std::fs::write(
            neg.join("bad.expected-error.json"),
            r#"{ "kind": "syntax", "found": "'}'" }"#,
        )
        .unwrap();
        std::fs::write(neg.join("lying.fsml"), "def s : Alphabet = { 1 }").unwrap();
        std::fs::write(neg.join("lying.expected-error.json"), "{}").unwrap();

        let tap = run_suite(dir.path(), &ParseConfig::default());
        assert_eq!(tap.failure_count(), 1);
    }
}
