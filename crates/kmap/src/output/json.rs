//! JSON serialization for programmatic output.

use super::GraphSummary;
use crate::domain::{Edge, EdgeRecord, Node, NodeId};
use crate::loader::LoadWarning;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct NodeJson<'a> {
    id: &'a NodeId,
    title: &'a str,
}

impl<'a> From<&'a Node> for NodeJson<'a> {
    fn from(node: &'a Node) -> Self {
        Self {
            id: &node.id,
            title: &node.title,
        }
    }
}

#[derive(Serialize)]
struct SummaryJson<'a> {
    #[serde(flatten)]
    summary: &'a GraphSummary,
    warnings: Vec<String>,
}

#[derive(Serialize)]
struct PathJson<'a> {
    from: &'a NodeId,
    to: &'a NodeId,
    reachable: bool,
}

fn write_pretty<W: Write, T: Serialize>(w: &mut W, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(w, "{json}")
}

pub(super) fn write_summary_json<W: Write>(
    w: &mut W,
    summary: &GraphSummary,
    warnings: &[LoadWarning],
) -> io::Result<()> {
    write_pretty(
        w,
        &SummaryJson {
            summary,
            warnings: warnings.iter().map(ToString::to_string).collect(),
        },
    )
}

pub(super) fn write_nodes_json<W: Write>(w: &mut W, nodes: &[&Node]) -> io::Result<()> {
    let nodes: Vec<NodeJson<'_>> = nodes.iter().map(|node| NodeJson::from(*node)).collect();
    write_pretty(w, &nodes)
}

pub(super) fn write_edges_json<W: Write>(w: &mut W, edges: &[&Edge]) -> io::Result<()> {
    let edges: Vec<EdgeRecord> = edges.iter().map(|edge| EdgeRecord::from(*edge)).collect();
    write_pretty(w, &edges)
}

pub(super) fn write_path_json<W: Write>(
    w: &mut W,
    from: &NodeId,
    to: &NodeId,
    reachable: bool,
) -> io::Result<()> {
    write_pretty(w, &PathJson {
        from,
        to,
        reachable,
    })
}
