//! Reachability and transitivity tests.
//!
//! Both searches are iterative DFS with a visited set, so they terminate on
//! cyclic graphs. An optional edge predicate restricts which edges count as
//! part of a path; the rendering layer uses it to ask whether an edge is
//! redundant among the edges that are currently visible.

use super::Graph;
use crate::domain::{Edge, EdgeId, NodeId};
use crate::error::{Error, Result};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use std::collections::HashSet;

impl Graph {
    /// True if a path of one or more edges leads from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if either node doesn't exist.
    pub fn is_path_between(&self, from: &NodeId, to: &NodeId) -> Result<bool> {
        self.is_path_between_where(from, to, |_| true)
    }

    /// Like [`Graph::is_path_between`], following only edges accepted by
    /// `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if either node doesn't exist.
    pub fn is_path_between_where<P>(&self, from: &NodeId, to: &NodeId, predicate: P) -> Result<bool>
    where
        P: Fn(&Edge) -> bool,
    {
        let from = self.node_index(from)?;
        let to = self.node_index(to)?;
        Ok(self.path_exists(from, to, predicate))
    }

    /// True if another path makes the edge redundant.
    ///
    /// The edge itself never counts toward its own classification. Between
    /// parallel edges with the same endpoints, the earlier one is the
    /// alternate path for the later ones.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEdge` if the edge doesn't exist.
    pub fn check_if_transitive(&self, id: &EdgeId) -> Result<bool> {
        self.check_if_transitive_where(id, |_| true)
    }

    /// Like [`Graph::check_if_transitive`], considering only alternate paths
    /// made of edges accepted by `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEdge` if the edge doesn't exist.
    pub fn check_if_transitive_where<P>(&self, id: &EdgeId, predicate: P) -> Result<bool>
    where
        P: Fn(&Edge) -> bool,
    {
        let eix = self
            .edge_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownEdge(id.clone()))?;
        Ok(self.has_alternate_path(eix, predicate))
    }

    pub(super) fn path_exists<P>(&self, from: NodeIndex, to: NodeIndex, predicate: P) -> bool
    where
        P: Fn(&Edge) -> bool,
    {
        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            for edge in self.store.edges_directed(current, Direction::Outgoing) {
                if !predicate(edge.weight()) {
                    continue;
                }
                let next = edge.target();
                if next == to {
                    return true;
                }
                if !visited.contains(&next) {
                    stack.push(next);
                }
            }
        }

        false
    }

    pub(super) fn has_alternate_path<P>(&self, eix: EdgeIndex, predicate: P) -> bool
    where
        P: Fn(&Edge) -> bool,
    {
        let Some((source, target)) = self.store.edge_endpoints(eix) else {
            return false;
        };
        let seq = self.store[eix].seq;

        self.store
            .edges_directed(source, Direction::Outgoing)
            .filter(|outlink| outlink.id() != eix && predicate(outlink.weight()))
            .any(|outlink| {
                if outlink.target() == target {
                    outlink.weight().seq < seq
                } else {
                    self.path_exists(outlink.target(), target, |other| {
                        other.seq != seq && predicate(other)
                    })
                }
            })
    }
}
