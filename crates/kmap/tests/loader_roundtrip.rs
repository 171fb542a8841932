//! Integration tests for dataset files: reading both input shapes, writing
//! exports and reloading them.

use kmap::domain::{EdgeRecord, GraphExport};
use kmap::graph::Graph;
use kmap::loader::{Dataset, LoadWarning, export, load_dataset, read_dataset, write_export};
use std::collections::BTreeSet;
use tempfile::tempdir;

mod common;
use common::{nid, write_dataset};

const CONCEPTS: &str = r#"[
    {"id": "sets", "title": "Sets", "color": "teal"},
    {"id": "functions", "title": "Functions", "dependencies": [
        {"source": "sets", "reason": "domain and codomain"}
    ]},
    {"id": "limits", "title": "Limits", "dependencies": [
        {"source": "functions"},
        {"source": "sets"}
    ]},
    {"title": "Derivatives", "dependencies": [{"source": "limits"}]}
]"#;

/// Edge identity that survives a reload: endpoints plus derived flags.
fn edge_shape(export: &GraphExport) -> BTreeSet<(String, String, bool, bool)> {
    export
        .dependencies
        .iter()
        .map(|edge: &EdgeRecord| {
            (
                edge.source.to_string(),
                edge.target.to_string(),
                edge.is_transitive,
                edge.causes_cycle,
            )
        })
        .collect()
}

#[tokio::test]
async fn test_node_array_loads_and_generates_missing_ids() {
    let temp = tempdir().unwrap();
    let path = write_dataset(temp.path(), "concepts.json", CONCEPTS);

    let dataset = read_dataset(&path).await.unwrap();
    assert!(matches!(dataset, Dataset::Nodes(_)));

    let mut graph = Graph::default();
    let report = load_dataset(&mut graph, dataset).unwrap();
    assert_eq!(report.nodes_added, 4);
    assert_eq!(report.edges_added, 4);

    let derivatives = graph
        .nodes()
        .into_iter()
        .find(|node| node.title == "Derivatives")
        .unwrap();
    assert_eq!(derivatives.id.as_str().len(), 8);

    let shortcut = graph
        .edges()
        .into_iter()
        .find(|edge| edge.source == nid("sets") && edge.target == nid("limits"))
        .unwrap();
    assert!(shortcut.is_transitive);

    let display = graph.display(&nid("sets")).unwrap();
    assert_eq!(display.get("color").and_then(|v| v.as_str()), Some("teal"));
}

#[tokio::test]
async fn test_export_reload_preserves_structure() {
    let temp = tempdir().unwrap();
    let path = write_dataset(temp.path(), "concepts.json", CONCEPTS);

    let mut original = Graph::default();
    load_dataset(&mut original, read_dataset(&path).await.unwrap()).unwrap();
    let first = export(&original);

    let out = temp.path().join("export.json");
    write_export(&out, &first).await.unwrap();
    assert!(!temp.path().join("export.tmp").exists());

    let reread = read_dataset(&out).await.unwrap();
    assert!(matches!(reread, Dataset::Export(_)));

    let mut reloaded = Graph::default();
    let report = load_dataset(&mut reloaded, reread).unwrap();
    assert!(report.warnings.is_empty());
    let second = export(&reloaded);

    // Generated ids are persisted, so the second export names the same
    // concepts and edges
    assert_eq!(first.concepts, second.concepts);
    assert_eq!(edge_shape(&first), edge_shape(&second));
    assert_eq!(
        first
            .dependencies
            .iter()
            .map(|edge| edge.id.clone())
            .collect::<Vec<_>>(),
        second
            .dependencies
            .iter()
            .map(|edge| edge.id.clone())
            .collect::<Vec<_>>()
    );
    assert_eq!(original.topo_sort(), reloaded.topo_sort());
}

#[tokio::test]
async fn test_export_keeps_reasons_and_display_fields() {
    let temp = tempdir().unwrap();
    let path = write_dataset(temp.path(), "concepts.json", CONCEPTS);

    let mut graph = Graph::default();
    load_dataset(&mut graph, read_dataset(&path).await.unwrap()).unwrap();
    let exported = export(&graph);

    let json = serde_json::to_value(&exported).unwrap();
    let sets = &json["concepts"][0];
    assert_eq!(sets["id"], "sets");
    assert_eq!(sets["color"], "teal");

    let functions = &json["concepts"][1];
    assert_eq!(
        functions["dependencies"][0]["reason"],
        "domain and codomain"
    );
    assert!(functions["dependencies"][0]["id"].is_string());
}

#[tokio::test]
async fn test_cyclic_dataset_reports_skipped_edge() {
    let temp = tempdir().unwrap();
    let path = write_dataset(
        temp.path(),
        "loop.json",
        r#"{"title": "Loop", "concepts": [
            {"id": "x", "title": "X", "dependencies": [{"source": "y"}]},
            {"id": "y", "title": "Y", "dependencies": [{"source": "x"}]}
        ]}"#,
    );

    let mut graph = Graph::default();
    let report = load_dataset(&mut graph, read_dataset(&path).await.unwrap()).unwrap();

    assert_eq!(graph.meta().title.as_deref(), Some("Loop"));
    assert_eq!(report.edges_added, 1);
    assert_eq!(
        report.warnings,
        vec![LoadWarning::CircularDependency {
            from: nid("x"),
            to: nid("y"),
        }]
    );
}

#[tokio::test]
async fn test_malformed_dataset_is_json_error() {
    let temp = tempdir().unwrap();
    let path = write_dataset(temp.path(), "bad.json", r#"{"concepts": 3}"#);

    let result = read_dataset(&path).await;
    assert!(matches!(result, Err(kmap::error::Error::Json(_))));
}
