//! Display folding: contraction, expansion, visibility and scope.
//!
//! Folding never changes the graph structure. It only flips the
//! `is_contracted` flags that visibility queries read.

use super::Graph;
use crate::domain::{Axis, Edge, EdgeId, Node, NodeId};
use crate::error::{Error, Result};
use crate::events::GraphEvent;
use petgraph::stable_graph::{EdgeIndex, NodeIndex};
use std::collections::HashSet;
use tracing::debug;

impl Graph {
    /// Fold `id` along `axis`.
    ///
    /// Every edge on that axis is hidden. A neighbor whose edges on the
    /// opposite axis are then all hidden is hidden too, and the fold keeps
    /// going from there along the same axis.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn contract(&mut self, id: &NodeId, axis: Axis) -> Result<()> {
        let start = self.node_index(id)?;
        self.store[start].set_has_contracted(axis, true);

        let mut visited = HashSet::from([start]);
        let mut worklist = vec![start];
        let mut hidden = 0usize;

        while let Some(current) = worklist.pop() {
            for eix in self.axis_edges(current, axis) {
                self.store[eix].is_contracted = true;
                let Some(neighbor) = self.far_end(eix, axis) else {
                    continue;
                };
                if visited.contains(&neighbor) || !self.axis_fully_contracted(neighbor, axis.opposite()) {
                    continue;
                }
                visited.insert(neighbor);
                let node = &mut self.store[neighbor];
                node.is_contracted = true;
                node.set_has_contracted(axis, false);
                worklist.push(neighbor);
                hidden += 1;
            }
        }

        debug!(node = %id, %axis, hidden, "contracted");
        Ok(())
    }

    /// Unfold `id` along `axis`, revealing hidden neighbors transitively.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn expand(&mut self, id: &NodeId, axis: Axis) -> Result<()> {
        let start = self.node_index(id)?;
        self.store[start].set_has_contracted(axis, false);

        let mut visited = HashSet::from([start]);
        let mut worklist = vec![start];
        let mut revealed = 0usize;

        while let Some(current) = worklist.pop() {
            for eix in self.axis_edges(current, axis) {
                self.store[eix].is_contracted = false;
                let Some(neighbor) = self.far_end(eix, axis) else {
                    continue;
                };
                if visited.contains(&neighbor) || !self.store[neighbor].is_contracted {
                    continue;
                }
                visited.insert(neighbor);
                let node = &mut self.store[neighbor];
                node.is_contracted = false;
                node.set_has_contracted(axis, false);
                worklist.push(neighbor);
                revealed += 1;
            }
        }

        debug!(node = %id, %axis, revealed, "expanded");
        Ok(())
    }

    /// True if the node has at least one edge on `axis` and all of them are
    /// hidden.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn should_be_contracted(&self, id: &NodeId, axis: Axis) -> Result<bool> {
        let ix = self.node_index(id)?;
        Ok(self.axis_fully_contracted(ix, axis))
    }

    /// Clear every fold in the graph.
    pub fn expand_all(&mut self) {
        let nodes: Vec<NodeIndex> = self.store.node_indices().collect();
        for ix in nodes {
            let node = &mut self.store[ix];
            node.is_contracted = false;
            node.has_contracted_deps = false;
            node.has_contracted_ols = false;
        }
        let edges: Vec<EdgeIndex> = self.store.edge_indices().collect();
        for eix in edges {
            self.store[eix].is_contracted = false;
        }
    }

    /// A node is visible unless a fold hides it.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn is_node_visible(&self, id: &NodeId) -> Result<bool> {
        let ix = self.node_index(id)?;
        Ok(!self.store[ix].is_contracted)
    }

    /// An edge is visible if it is not folded and both endpoints are visible.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEdge` if the edge doesn't exist.
    pub fn is_edge_visible(&self, id: &EdgeId) -> Result<bool> {
        let edge = self.edge(id).ok_or_else(|| Error::UnknownEdge(id.clone()))?;
        Ok(self.edge_visible(edge))
    }

    /// True if the edge is transitive and an alternate path exists among
    /// visible edges alone.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEdge` if the edge doesn't exist.
    pub fn is_edge_visibly_transitive(&self, id: &EdgeId) -> Result<bool> {
        let edge = self.edge(id).ok_or_else(|| Error::UnknownEdge(id.clone()))?;
        if !edge.is_transitive {
            return Ok(false);
        }
        self.check_if_transitive_where(id, |other| self.edge_visible(other))
    }

    /// Visible nodes, in insertion order.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<&Node> {
        let mut nodes = self.nodes();
        nodes.retain(|node| !node.is_contracted);
        nodes
    }

    /// Visible edges, in insertion order.
    #[must_use]
    pub fn visible_edges(&self) -> Vec<&Edge> {
        let mut edges = self.edges();
        edges.retain(|edge| self.edge_visible(edge));
        edges
    }

    /// The node the view is currently scoped to.
    #[must_use]
    pub fn scope_node(&self) -> Option<&NodeId> {
        self.scope.as_ref()
    }

    /// Scope the view to `id` and its neighborhood, or clear the scope if
    /// `id` already holds it.
    ///
    /// Scoping expands everything, focuses the node, then hides every node
    /// and edge except the node, its edges and their far endpoints. Returns
    /// whether the node is scoped afterwards.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn toggle_node_scope(&mut self, id: &NodeId) -> Result<bool> {
        let ix = self.node_index(id)?;
        self.expand_all();

        if self.scope.as_ref() == Some(id) {
            self.scope = None;
            debug!(node = %id, "scope cleared");
            self.events.emit(&GraphEvent::NodeScopeToggled {
                id: id.clone(),
                scoped: false,
            });
            return Ok(false);
        }

        self.scope = Some(id.clone());
        self.set_focus_node(id)?;

        let mut keep_nodes = HashSet::from([ix]);
        let mut keep_edges = HashSet::new();
        for axis in [Axis::Dependencies, Axis::Outlinks] {
            for eix in self.axis_edges(ix, axis) {
                keep_edges.insert(eix);
                if let Some(neighbor) = self.far_end(eix, axis) {
                    keep_nodes.insert(neighbor);
                }
            }
        }

        let nodes: Vec<NodeIndex> = self.store.node_indices().collect();
        for node in nodes {
            self.store[node].is_contracted = !keep_nodes.contains(&node);
        }
        let edges: Vec<EdgeIndex> = self.store.edge_indices().collect();
        for eix in edges {
            self.store[eix].is_contracted = !keep_edges.contains(&eix);
        }

        debug!(node = %id, neighbors = keep_nodes.len() - 1, "scope set");
        self.events.emit(&GraphEvent::NodeScopeToggled {
            id: id.clone(),
            scoped: true,
        });
        Ok(true)
    }

    fn edge_visible(&self, edge: &Edge) -> bool {
        !edge.is_contracted
            && [&edge.source, &edge.target]
                .into_iter()
                .all(|end| self.node(end).is_some_and(|node| !node.is_contracted))
    }

    fn axis_fully_contracted(&self, ix: NodeIndex, axis: Axis) -> bool {
        let edges = self.axis_edges(ix, axis);
        !edges.is_empty() && edges.iter().all(|&eix| self.store[eix].is_contracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeSpec, NewNode};
    use crate::graph::GraphConfig;

    fn graph(nodes: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut graph = Graph::new(GraphConfig::default());
        for id in nodes {
            graph.add_node(NewNode::with_id(*id, *id)).unwrap();
        }
        for (s, t) in edges {
            let _ = graph.add_edge(EdgeSpec::new(*s, *t)).unwrap();
        }
        graph
    }

    fn n(id: &str) -> NodeId {
        NodeId::new(id)
    }

    #[test]
    fn contraction_follows_single_outlink_chains() {
        // a -> b -> c; b is reachable only through c's dependencies
        let mut graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        graph.contract(&n("c"), Axis::Dependencies).unwrap();

        assert!(graph.node(&n("c")).unwrap().has_contracted_deps);
        assert!(!graph.is_node_visible(&n("b")).unwrap());
        assert!(!graph.is_node_visible(&n("a")).unwrap());
        assert!(graph.is_node_visible(&n("c")).unwrap());
        assert!(graph.visible_edges().is_empty());
    }

    #[test]
    fn shared_prerequisite_stays_visible() {
        // a feeds both b and c, so folding c's dependencies must not hide a
        let mut graph = graph(&["a", "b", "c"], &[("a", "b"), ("a", "c")]);
        graph.contract(&n("c"), Axis::Dependencies).unwrap();

        assert!(graph.is_node_visible(&n("a")).unwrap());
        assert!(graph.should_be_contracted(&n("c"), Axis::Dependencies).unwrap());
        assert!(!graph.should_be_contracted(&n("a"), Axis::Outlinks).unwrap());
        assert_eq!(graph.visible_edges().len(), 1);
    }

    #[test]
    fn expand_reverses_contract() {
        let mut graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        graph.contract(&n("c"), Axis::Dependencies).unwrap();
        graph.expand(&n("c"), Axis::Dependencies).unwrap();

        assert!(graph.nodes().iter().all(|node| !node.is_contracted));
        assert!(graph.edges().iter().all(|edge| !edge.is_contracted));
        assert!(!graph.node(&n("c")).unwrap().has_contracted_deps);
    }

    #[test]
    fn outlink_axis_folds_dependents() {
        let mut graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        graph.contract(&n("a"), Axis::Outlinks).unwrap();

        assert!(graph.node(&n("a")).unwrap().has_contracted_ols);
        assert!(!graph.is_node_visible(&n("b")).unwrap());
        assert!(!graph.is_node_visible(&n("c")).unwrap());
    }

    #[test]
    fn node_without_edges_is_never_fully_contracted() {
        let graph = graph(&["lonely"], &[]);
        assert!(!graph.should_be_contracted(&n("lonely"), Axis::Dependencies).unwrap());
    }

    #[test]
    fn scope_toggles_on_and_off() {
        let mut graph = graph(
            &["a", "b", "c", "d"],
            &[("a", "b"), ("b", "c"), ("c", "d")],
        );

        assert!(graph.toggle_node_scope(&n("b")).unwrap());
        assert_eq!(graph.scope_node(), Some(&n("b")));
        assert_eq!(graph.focus_node(), Some(&n("b")));
        let visible: Vec<&str> = graph.visible_nodes().iter().map(|node| node.id.as_str()).collect();
        assert_eq!(visible, ["a", "b", "c"]);
        assert_eq!(graph.visible_edges().len(), 2);

        assert!(!graph.toggle_node_scope(&n("b")).unwrap());
        assert_eq!(graph.scope_node(), None);
        assert_eq!(graph.visible_nodes().len(), 4);
    }

    #[test]
    fn visibly_transitive_ignores_hidden_paths() {
        let mut graph = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c"), ("a", "c")]);
        let shortcut = graph
            .edges()
            .iter()
            .find(|edge| edge.source.as_str() == "a" && edge.target.as_str() == "c")
            .map(|edge| edge.id.clone())
            .unwrap();
        assert!(graph.is_edge_visibly_transitive(&shortcut).unwrap());

        // Scoping to c hides nothing c touches but hides the a -> b edge
        graph.toggle_node_scope(&n("c")).unwrap();
        assert!(graph.is_edge_visible(&shortcut).unwrap());
        assert!(!graph.is_edge_visibly_transitive(&shortcut).unwrap());
    }
}
