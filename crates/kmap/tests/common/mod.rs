//! Common test utilities shared across integration tests.

#![allow(dead_code)]

use kmap::domain::{EdgeId, EdgeSpec, NewNode, NodeId};
use kmap::graph::{Graph, GraphConfig};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Path of the kmap binary built for this test run
pub fn kmap_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_kmap"))
}

/// Run the kmap binary in the specified directory
pub fn run_kmap_in_dir(dir: &Path, args: &[&str]) -> Output {
    Command::new(kmap_binary())
        .args(args)
        .current_dir(dir)
        .env("NO_COLOR", "1")
        .env("KMAP_ASCII", "1")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute kmap binary")
}

/// Write a dataset file into `dir` and return its path
pub fn write_dataset(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write dataset");
    path
}

/// A graph holding one node per id, titled after the id
pub fn graph_with_nodes(ids: &[&str]) -> Graph {
    graph_with_config(ids, GraphConfig::default())
}

/// Like [`graph_with_nodes`] with an explicit config
pub fn graph_with_config(ids: &[&str], config: GraphConfig) -> Graph {
    let mut graph = Graph::new(config);
    for id in ids {
        graph
            .add_node(NewNode::with_id(*id, id.to_uppercase()))
            .expect("Failed to add node");
    }
    graph
}

/// Add `source -> target`, panicking unless it is accepted
pub fn link(graph: &mut Graph, source: &str, target: &str) -> EdgeId {
    graph
        .add_edge(EdgeSpec::new(source, target))
        .expect("Failed to add edge")
        .edge_id()
        .cloned()
        .unwrap_or_else(|| panic!("edge {source} -> {target} was rejected"))
}

/// Shorthand for a node id
pub fn nid(id: &str) -> NodeId {
    NodeId::new(id)
}

/// Position of `id` in a topological order
pub fn position(order: &[NodeId], id: &str) -> usize {
    order
        .iter()
        .position(|candidate| candidate.as_str() == id)
        .unwrap_or_else(|| panic!("{id} missing from order"))
}
