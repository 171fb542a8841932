//! Bulk ingest, subgraph extraction and export.
//!
//! The loader turns node records (each carrying its own dependency list)
//! into `add_node`/`add_edge` calls: every node first, then every edge, so
//! edges always find both endpoints.
//!
//! # Error Handling
//!
//! - **Duplicate ids / unknown dependency sources**: caller errors. The batch
//!   is validated up front and rejected before the graph is touched.
//! - **Self-loops / cycles**: the edge is skipped and a [`LoadWarning`] is
//!   recorded; the rest of the batch still loads.
//!
//! **Example:**
//! ```
//! use kmap::domain::NodeRecord;
//! use kmap::graph::Graph;
//! use kmap::loader::{load_nodes, LoadWarning};
//!
//! let records = vec![
//!     NodeRecord::new("a", "Arithmetic"),
//!     NodeRecord::new("b", "Algebra").depends_on("a"),
//!     NodeRecord::new("c", "Loop").depends_on("c"),
//! ];
//!
//! let mut graph = Graph::default();
//! let report = load_nodes(&mut graph, records).unwrap();
//! assert_eq!(report.nodes_added, 3);
//! assert_eq!(report.edges_added, 1);
//! assert!(matches!(report.warnings[0], LoadWarning::SelfLoop { .. }));
//! ```

use crate::domain::{
    DependencyRecord, EdgeId, EdgeRecord, EdgeSpec, GraphExport, NewNode, NodeId, NodeRecord,
};
use crate::error::{Error, Result};
use crate::graph::{EdgeOutcome, EdgeRejection, Graph, GraphMeta};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, warn};

/// A non-fatal problem found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// A node listed itself as a dependency.
    ///
    /// **Effect**: the edge is skipped; the node is loaded.
    SelfLoop {
        /// The offending node
        node: NodeId,
    },

    /// Adding the dependency would close a cycle.
    ///
    /// **Effect**: the edge is skipped to keep the graph acyclic; both nodes
    /// are loaded.
    CircularDependency {
        /// Prerequisite side of the skipped edge
        from: NodeId,
        /// Dependent side of the skipped edge
        to: NodeId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { node } => write!(f, "skipped self-loop on {node}"),
            Self::CircularDependency { from, to } => {
                write!(f, "skipped circular dependency {from} -> {to}")
            }
        }
    }
}

impl From<EdgeRejection> for LoadWarning {
    fn from(rejection: EdgeRejection) -> Self {
        match rejection {
            EdgeRejection::SelfLoop { node } => Self::SelfLoop { node },
            EdgeRejection::Cycle { source, target } => Self::CircularDependency {
                from: source,
                to: target,
            },
        }
    }
}

/// Summary of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Nodes inserted
    pub nodes_added: usize,
    /// Edges inserted
    pub edges_added: usize,
    /// Skipped edges
    pub warnings: Vec<LoadWarning>,
}

/// A dataset file: either a bare node-record array or a full export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dataset {
    /// `[ { id, title, dependencies, ... }, ... ]`
    Nodes(Vec<NodeRecord>),
    /// `{ id, title, concepts, dependencies }`
    Export(GraphExport),
}

impl Dataset {
    /// Split into graph metadata and node records.
    #[must_use]
    pub fn into_parts(self) -> (GraphMeta, Vec<NodeRecord>) {
        match self {
            Self::Nodes(records) => (GraphMeta::default(), records),
            Self::Export(export) => (
                GraphMeta {
                    id: export.id,
                    title: export.title,
                },
                export.concepts,
            ),
        }
    }
}

/// Load node records into `graph`.
///
/// Each record's `dependencies` become edges targeting that record's node.
/// Extra fields go to the graph's display side table.
///
/// # Errors
///
/// - `Error::DuplicateNode` if a record id repeats or already exists
/// - `Error::DuplicateEdge` if a dependency id repeats or already exists
/// - `Error::UnknownEndpoint` if a dependency source is neither in the batch
///   nor in the graph
///
/// The graph is not modified when validation fails.
pub fn load_nodes(graph: &mut Graph, records: Vec<NodeRecord>) -> Result<LoadReport> {
    validate_batch(graph, &records)?;

    let mut report = LoadReport::default();
    let mut pending: Vec<(NodeId, Vec<DependencyRecord>)> = Vec::with_capacity(records.len());

    // First pass: nodes, with dependency lists set aside
    for mut record in records {
        let dependencies = std::mem::take(&mut record.dependencies);
        let id = graph.add_node(NewNode {
            id: record.given_id().cloned(),
            title: record.title,
            display: record.extra,
        })?;
        report.nodes_added += 1;
        pending.push((id, dependencies));
    }

    // Second pass: edges
    for (target, dependencies) in pending {
        for dep in dependencies {
            let spec = EdgeSpec {
                id: dep.id,
                source: dep.source,
                target: target.clone(),
                reason: dep.reason,
                middle_pts: dep.middle_pts,
                is_contracted: dep.is_contracted,
            };
            match graph.add_edge(spec)? {
                EdgeOutcome::Added(_) => report.edges_added += 1,
                EdgeOutcome::Rejected(rejection) => report.warnings.push(rejection.into()),
            }
        }
    }

    info!(
        nodes = report.nodes_added,
        edges = report.edges_added,
        skipped = report.warnings.len(),
        "loaded concepts"
    );
    Ok(report)
}

/// Load only the ancestor closure of `target` from `records`.
///
/// # Errors
///
/// Returns `Error::UnknownNode` if `target` is not among the records, plus
/// any error of [`load_nodes`].
pub fn load_subgraph(graph: &mut Graph, records: &[NodeRecord], target: &NodeId) -> Result<LoadReport> {
    let subgraph = extract_ancestor_subgraph(records, target)?;
    load_nodes(graph, subgraph)
}

/// Load a parsed dataset, adopting its metadata if it carries any.
///
/// # Errors
///
/// Same as [`load_nodes`].
pub fn load_dataset(graph: &mut Graph, dataset: Dataset) -> Result<LoadReport> {
    let (meta, records) = dataset.into_parts();
    if meta.id.is_some() || meta.title.is_some() {
        graph.set_meta(meta);
    }
    load_nodes(graph, records)
}

/// Collect `target` and every record it transitively depends on.
///
/// The target comes first; each record appears once. Dependency sources
/// missing from `records` are skipped here and surface as
/// `Error::UnknownEndpoint` when the result is loaded.
///
/// # Errors
///
/// Returns `Error::UnknownNode` if `target` is not among the records.
pub fn extract_ancestor_subgraph(records: &[NodeRecord], target: &NodeId) -> Result<Vec<NodeRecord>> {
    let by_id: HashMap<&NodeId, &NodeRecord> = records
        .iter()
        .filter_map(|record| record.given_id().map(|id| (id, record)))
        .collect();

    if !by_id.contains_key(target) {
        return Err(Error::UnknownNode(target.clone()));
    }

    let mut subgraph = Vec::new();
    let mut visited: HashSet<&NodeId> = HashSet::new();
    let mut stack = vec![target];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(record) = by_id.get(id) else {
            warn!(node = %id, "dependency source not present in input");
            continue;
        };
        subgraph.push((*record).clone());
        for dep in &record.dependencies {
            if !visited.contains(&dep.source) {
                stack.push(&dep.source);
            }
        }
    }

    debug!(target = %target, size = subgraph.len(), "extracted ancestor subgraph");
    Ok(subgraph)
}

/// Serialize the graph in the re-ingestible export shape.
///
/// Concepts and edges appear in insertion order. Each concept carries its
/// incoming edges and its display fields.
pub fn export(graph: &Graph) -> GraphExport {
    let concepts = graph
        .nodes()
        .into_iter()
        .map(|node| NodeRecord {
            id: Some(node.id.clone()),
            title: node.title.clone(),
            dependencies: graph
                .dependencies(&node.id)
                .unwrap_or_default()
                .into_iter()
                .map(DependencyRecord::from)
                .collect(),
            extra: graph.display(&node.id).cloned().unwrap_or_default(),
        })
        .collect();

    let dependencies = graph.edges().into_iter().map(EdgeRecord::from).collect();

    GraphExport {
        id: graph.meta().id.clone(),
        title: graph.meta().title.clone(),
        concepts,
        dependencies,
    }
}

/// Read a dataset file.
///
/// # Errors
///
/// Returns `Error::Io` if the file can't be read and `Error::Json` if it is
/// neither a node-record array nor an export object.
pub async fn read_dataset(path: &Path) -> Result<Dataset> {
    let contents = tokio::fs::read_to_string(path).await?;
    let dataset = serde_json::from_str(&contents)?;
    debug!(path = %path.display(), "read dataset");
    Ok(dataset)
}

/// Write an export with an atomic write-then-rename.
///
/// If the process is interrupted, the original file is left unchanged.
///
/// # Errors
///
/// Returns `Error::Io` or `Error::Json` on failure.
pub async fn write_export(path: &Path, export: &GraphExport) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let json = serde_json::to_vec_pretty(export)?;

    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&json).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;

    tokio::fs::rename(&temp_path, path).await?;
    debug!(path = %path.display(), concepts = export.concepts.len(), "wrote export");
    Ok(())
}

fn validate_batch(graph: &Graph, records: &[NodeRecord]) -> Result<()> {
    let mut batch_nodes: HashSet<&NodeId> = HashSet::new();
    for id in records.iter().filter_map(NodeRecord::given_id) {
        if graph.node(id).is_some() || !batch_nodes.insert(id) {
            return Err(Error::DuplicateNode(id.clone()));
        }
    }

    let mut batch_edges: HashSet<&EdgeId> = HashSet::new();
    for record in records {
        for dep in &record.dependencies {
            if !batch_nodes.contains(&dep.source) && graph.node(&dep.source).is_none() {
                return Err(Error::UnknownEndpoint {
                    from: dep.source.clone(),
                    to: record
                        .given_id()
                        .cloned()
                        .unwrap_or_else(|| NodeId::new(record.title.clone())),
                });
            }
            if let Some(edge_id) = dep.id.as_ref().filter(|id| !id.as_str().is_empty())
                && (graph.edge(edge_id).is_some() || !batch_edges.insert(edge_id))
            {
                return Err(Error::DuplicateEdge(edge_id.clone()));
            }
        }
    }

    Ok(())
}
