//! Topological ordering over direct edges.

use super::Graph;
use crate::domain::{Axis, NodeId};
use petgraph::Direction;
use petgraph::stable_graph::NodeIndex;
use std::collections::HashSet;
use tracing::debug;

/// One pending node in the post-order walk.
struct Frame {
    node: NodeIndex,
    prerequisites: Vec<NodeIndex>,
    next: usize,
}

impl Graph {
    /// Node ids ordered so that every direct prerequisite precedes its
    /// dependents.
    ///
    /// The walk starts from nodes without outlinks, in insertion order, and
    /// emits each node after its direct (non-transitive) dependencies. Nodes
    /// the walk misses, which only happens on cyclic graphs, are walked
    /// afterwards in insertion order so each node still appears once.
    ///
    /// The result is memoized until the next structural change.
    pub fn topo_sort(&self) -> &[NodeId] {
        self.topo_cache.get_or_init(|| self.compute_topo_sort())
    }

    fn compute_topo_sort(&self) -> Vec<NodeId> {
        let mut by_insertion: Vec<NodeIndex> = self.store.node_indices().collect();
        by_insertion.sort_by_key(|&ix| self.store[ix].seq);

        let roots = by_insertion.iter().copied().filter(|&ix| {
            self.store
                .edges_directed(ix, Direction::Outgoing)
                .next()
                .is_none()
        });

        let mut order = Vec::with_capacity(by_insertion.len());
        let mut visited = HashSet::with_capacity(by_insertion.len());

        for root in roots {
            self.emit_post_order(root, &mut visited, &mut order);
        }

        if order.len() < by_insertion.len() {
            debug!(
                missed = by_insertion.len() - order.len(),
                "topological walk missed nodes on a cycle"
            );
            for &ix in &by_insertion {
                self.emit_post_order(ix, &mut visited, &mut order);
            }
        }

        order
    }

    fn emit_post_order(
        &self,
        start: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
        order: &mut Vec<NodeId>,
    ) {
        if !visited.insert(start) {
            return;
        }

        let mut stack = vec![self.frame(start)];
        while let Some(frame) = stack.last_mut() {
            let next = frame.prerequisites.get(frame.next).copied();
            frame.next += 1;

            match next {
                Some(prerequisite) => {
                    if visited.insert(prerequisite) {
                        stack.push(self.frame(prerequisite));
                    }
                }
                None => {
                    if let Some(done) = stack.pop() {
                        order.push(self.store[done.node].id.clone());
                    }
                }
            }
        }
    }

    fn frame(&self, node: NodeIndex) -> Frame {
        let prerequisites = self
            .axis_edges(node, Axis::Dependencies)
            .into_iter()
            .filter(|&eix| !self.store[eix].is_transitive)
            .filter_map(|eix| self.far_end(eix, Axis::Dependencies))
            .collect();
        Frame {
            node,
            prerequisites,
            next: 0,
        }
    }
}
