//! Ancestor sets and minimal prerequisite queries.

use super::Graph;
use crate::domain::{Axis, Node, NodeId};
use crate::error::Result;
use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use petgraph::visit::EdgeRef;
use std::collections::HashSet;
use std::rc::Rc;

/// Decides which nodes take part in a query.
///
/// Callers inject their own notion of relevance here (for example "not yet
/// learned"); the graph has no knowledge of it.
pub trait NodeFilter {
    /// True if `node` should be considered.
    fn accepts(&self, node: &Node) -> bool;
}

impl<F> NodeFilter for F
where
    F: Fn(&Node) -> bool,
{
    fn accepts(&self, node: &Node) -> bool {
        self(node)
    }
}

/// A filter that accepts every node.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllNodes;

impl NodeFilter for AllNodes {
    fn accepts(&self, _node: &Node) -> bool {
        true
    }
}

impl Graph {
    /// Every node from which `id` can be reached.
    ///
    /// Sets are memoized per node until the edge set changes.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn ancestors(&self, id: &NodeId) -> Result<Rc<HashSet<NodeId>>> {
        let ix = self.node_index(id)?;
        Ok(self.ancestors_of(ix))
    }

    /// True if `candidate` is an ancestor of `id`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if `id` doesn't exist.
    pub fn is_ancestor(&self, id: &NodeId, candidate: &NodeId) -> Result<bool> {
        Ok(self.ancestors(id)?.contains(candidate))
    }

    /// The direct prerequisites of `id` that no other accepted prerequisite
    /// already depends on.
    ///
    /// Prerequisites rejected by `filter` are dropped first. The result keeps
    /// dependency insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn unique_deps<F>(&self, id: &NodeId, filter: &F) -> Result<Vec<NodeId>>
    where
        F: NodeFilter + ?Sized,
    {
        let ix = self.node_index(id)?;

        let mut members: Vec<NodeIndex> = Vec::new();
        for eix in self.axis_edges(ix, Axis::Dependencies) {
            let Some(source) = self.far_end(eix, Axis::Dependencies) else {
                continue;
            };
            if !members.contains(&source) && filter.accepts(&self.store[source]) {
                members.push(source);
            }
        }

        let ancestor_sets: Vec<Rc<HashSet<NodeId>>> =
            members.iter().map(|&m| self.ancestors_of(m)).collect();

        let unique = members
            .iter()
            .enumerate()
            .filter(|&(i, &member)| {
                let member_id = &self.store[member].id;
                !ancestor_sets
                    .iter()
                    .enumerate()
                    .any(|(j, set)| j != i && set.contains(member_id))
            })
            .map(|(_, &member)| self.store[member].id.clone())
            .collect();
        Ok(unique)
    }

    fn ancestors_of(&self, ix: NodeIndex) -> Rc<HashSet<NodeId>> {
        let id = &self.store[ix].id;
        if let Some(cached) = self.ancestor_cache.borrow().get(id) {
            return Rc::clone(cached);
        }

        let mut ancestors = HashSet::new();
        let mut visited = HashSet::new();
        let mut stack = vec![ix];

        while let Some(current) = stack.pop() {
            for edge in self.store.edges_directed(current, Direction::Incoming) {
                let source = edge.source();
                if !visited.insert(source) {
                    continue;
                }
                let source_id = &self.store[source].id;
                ancestors.insert(source_id.clone());

                // A memoized set already covers everything above `source`
                if let Some(known) = self.ancestor_cache.borrow().get(source_id) {
                    ancestors.extend(known.iter().cloned());
                    continue;
                }
                stack.push(source);
            }
        }

        let ancestors = Rc::new(ancestors);
        self.ancestor_cache
            .borrow_mut()
            .insert(id.clone(), Rc::clone(&ancestors));
        ancestors
    }
}
