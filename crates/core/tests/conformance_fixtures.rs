//! Parses every fixture under conformance/ and checks the outcome:
//! positive programs must dump exactly to their `.expected.out`, negative
//! programs must fail.

use std::path::{Path, PathBuf};

use fsml_core::{parse_source, ParseConfig};

fn conformance_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../conformance")
}

fn fixtures(subdir: &str) -> Vec<PathBuf> {
    let dir = conformance_dir().join(subdir);
    let mut paths: Vec<_> = std::fs::read_dir(&dir)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", dir.display(), e))
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|e| e == "fsml"))
        .collect();
    paths.sort();
    paths
}

#[test]
fn positive_fixtures_match_expected_dump() {
    let paths = fixtures("positive");
    assert!(!paths.is_empty(), "no positive fixtures found");

    let mut failures = Vec::new();
    for path in &paths {
        let src = std::fs::read_to_string(path).unwrap();
        let expected = std::fs::read_to_string(path.with_extension("expected.out")).unwrap();
        match parse_source(&src, &ParseConfig::default()) {
            Ok(program) if program.to_string() == expected => {}
            Ok(program) => failures.push(format!(
                "{}: dump mismatch\n--- expected\n{}+++ got\n{}",
                path.display(),
                expected,
                program
            )),
            Err(e) => failures.push(format!("{}: {}", path.display(), e)),
        }
    }
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn negative_fixtures_fail() {
    let paths = fixtures("negative");
    assert!(!paths.is_empty(), "no negative fixtures found");

    for path in &paths {
        let src = std::fs::read_to_string(path).unwrap();
        assert!(
            parse_source(&src, &ParseConfig::default()).is_err(),
            "{} parsed but should have failed",
            path.display()
        );
    }
}

#[test]
fn every_automaton_has_a_start_state_with_transitions() {
    for path in fixtures("positive") {
        let src = std::fs::read_to_string(&path).unwrap();
        let program = parse_source(&src, &ParseConfig::default()).unwrap();
        for automaton in program.automata() {
            let start = &automaton.body.start_state;
            assert_eq!(start.name, fsml_core::ast::START_STATE_NAME);
            assert!(!start.transitions.is_empty(), "{}", path.display());
            assert!(automaton
                .body
                .states()
                .all(|s| !s.transitions.is_empty()));
        }
    }
}

#[test]
fn logic_chains_alternate_compare_and_operator() {
    use fsml_core::ast::LogicItem;

    for path in fixtures("positive") {
        let src = std::fs::read_to_string(&path).unwrap();
        let program = parse_source(&src, &ParseConfig::default()).unwrap();
        for method in program.classes().flat_map(|c| &c.methods) {
            let items = &method.operations.items;
            assert_eq!(items.len() % 2, 1);
            for (i, item) in items.iter().enumerate() {
                let is_compare = matches!(item, LogicItem::Compare(_));
                assert_eq!(is_compare, i % 2 == 0, "{}", path.display());
            }
        }
    }
}
