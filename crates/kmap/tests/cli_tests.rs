//! Integration tests for the kmap CLI.
//!
//! These tests run the built binary against dataset files in a temporary
//! directory and check its output.

use rstest::{fixture, rstest};
use tempfile::TempDir;

mod common;
use common::{run_kmap_in_dir, write_dataset};

const CONCEPTS: &str = r#"[
    {"id": "arith", "title": "Arithmetic"},
    {"id": "algebra", "title": "Algebra", "dependencies": [{"source": "arith"}]},
    {"id": "calc", "title": "Calculus", "dependencies": [
        {"source": "algebra"},
        {"source": "arith", "reason": "limits need numbers"}
    ]},
    {"id": "stats", "title": "Statistics", "dependencies": [
        {"source": "arith"},
        {"source": "stats"}
    ]}
]"#;

// ============================================================================
// Test Fixtures
// ============================================================================

/// Provides a temporary directory holding `concepts.json`
#[fixture]
fn dataset_dir() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    write_dataset(temp.path(), "concepts.json", CONCEPTS);
    temp
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_cli_help_shows_all_commands() {
    let temp = TempDir::new().unwrap();
    let output = run_kmap_in_dir(temp.path(), &["--help"]);
    assert!(output.status.success());

    let stdout = stdout_of(&output);
    for command in [
        "check",
        "topo",
        "path",
        "transitive",
        "ancestors",
        "unique-deps",
        "subgraph",
        "export",
    ] {
        assert!(stdout.contains(command), "help is missing {command}");
    }
}

#[test]
fn test_cli_version() {
    let temp = TempDir::new().unwrap();
    let output = run_kmap_in_dir(temp.path(), &["--version"]);
    assert!(output.status.success());
    assert!(stdout_of(&output).contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// Query Commands
// ============================================================================

#[rstest]
fn test_check_reports_counts_and_skipped_edges(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["check", "concepts.json"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Concepts:"));
    assert!(stdout.contains("4 (1 transitive, 0 cyclic)"));
    assert!(stdout.contains("skipped self-loop on stats"));
}

#[rstest]
fn test_check_json(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["--json", "check", "concepts.json"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(json["concepts"], 4);
    assert_eq!(json["dependencies"], 4);
    assert_eq!(json["warnings"].as_array().map(Vec::len), Some(1));
}

#[rstest]
fn test_topo_json_orders_prerequisites_first(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["topo", "concepts.json", "--json"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let order: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    let position = |id: &str| order.iter().position(|candidate| *candidate == id).unwrap();

    assert_eq!(order.len(), 4);
    assert!(position("arith") < position("algebra"));
    assert!(position("algebra") < position("calc"));
    assert!(position("arith") < position("stats"));
}

#[rstest]
#[case::forward("arith", "calc", "reachable")]
#[case::backward("calc", "arith", "not reachable")]
fn test_path(dataset_dir: TempDir, #[case] from: &str, #[case] to: &str, #[case] verdict: &str) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["path", "concepts.json", from, to]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    assert!(stdout_of(&output).trim_end().ends_with(&format!(": {verdict}")));
}

#[rstest]
fn test_path_unknown_node_fails(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["path", "concepts.json", "arith", "ghost"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("ghost"));
}

#[rstest]
fn test_transitive_lists_shortcut_with_reason(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["transitive", "concepts.json"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("arith -> calc"));
    assert!(stdout.contains("limits need numbers"));
    assert!(!stdout.contains("algebra -> calc"));
}

#[rstest]
fn test_unique_deps_json(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(
        dataset_dir.path(),
        &["--json", "unique-deps", "concepts.json", "calc"],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let ids: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|node| node["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["algebra"]);
}

#[rstest]
fn test_ancestors_text(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["ancestors", "concepts.json", "calc"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let stdout = stdout_of(&output);
    assert!(stdout.contains("Ancestors of calc (2):"));
    assert!(stdout.contains("Arithmetic"));
    assert!(stdout.contains("Algebra"));
}

// ============================================================================
// Export Commands
// ============================================================================

#[rstest]
fn test_export_writes_reloadable_file(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(
        dataset_dir.path(),
        &["export", "concepts.json", "-o", "normalized.json"],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));

    let written = std::fs::read_to_string(dataset_dir.path().join("normalized.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(json["concepts"].as_array().map(Vec::len), Some(4));
    assert_eq!(json["dependencies"].as_array().map(Vec::len), Some(4));

    let reload = run_kmap_in_dir(dataset_dir.path(), &["check", "normalized.json"]);
    assert!(reload.status.success(), "{}", stderr_of(&reload));
    assert!(stdout_of(&reload).contains("No edges skipped."));
}

#[rstest]
fn test_subgraph_prints_ancestor_closure(dataset_dir: TempDir) {
    let output = run_kmap_in_dir(dataset_dir.path(), &["subgraph", "concepts.json", "algebra"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let concepts: Vec<&str> = json["concepts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|concept| concept["id"].as_str().unwrap())
        .collect();
    assert_eq!(concepts, vec!["algebra", "arith"]);
}

#[rstest]
fn test_allow_cycles_flag_and_config(dataset_dir: TempDir) {
    write_dataset(
        dataset_dir.path(),
        "loop.json",
        r#"[
            {"id": "x", "title": "X", "dependencies": [{"source": "y"}]},
            {"id": "y", "title": "Y", "dependencies": [{"source": "x"}]}
        ]"#,
    );

    let strict = run_kmap_in_dir(dataset_dir.path(), &["--json", "check", "loop.json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout_of(&strict)).unwrap();
    assert_eq!(json["dependencies"], 1);

    let relaxed = run_kmap_in_dir(
        dataset_dir.path(),
        &["--json", "--allow-cycles", "check", "loop.json"],
    );
    let json: serde_json::Value = serde_json::from_str(&stdout_of(&relaxed)).unwrap();
    assert_eq!(json["dependencies"], 2);
    assert_eq!(json["cyclic"], 1);

    std::fs::write(dataset_dir.path().join("kmap.yaml"), "allow-cycles: true\n").unwrap();
    let configured = run_kmap_in_dir(dataset_dir.path(), &["--json", "check", "loop.json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout_of(&configured)).unwrap();
    assert_eq!(json["dependencies"], 2);
}

#[rstest]
#[case::bare_file_name("loop.json")]
#[case::dot_prefixed("./loop.json")]
fn test_config_found_above_working_directory(dataset_dir: TempDir, #[case] dataset: &str) {
    std::fs::write(dataset_dir.path().join("kmap.yaml"), "allow-cycles: true\n").unwrap();
    let sub = dataset_dir.path().join("sub");
    std::fs::create_dir(&sub).unwrap();
    write_dataset(
        &sub,
        "loop.json",
        r#"[
            {"id": "x", "title": "X", "dependencies": [{"source": "y"}]},
            {"id": "y", "title": "Y", "dependencies": [{"source": "x"}]}
        ]"#,
    );

    let output = run_kmap_in_dir(&sub, &["--json", "check", dataset]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let json: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    assert_eq!(json["dependencies"], 2);
}
