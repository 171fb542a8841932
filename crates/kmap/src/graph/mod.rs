//! The concept-dependency graph engine.
//!
//! [`Graph`] owns every node and edge, keeps the derived edge flags
//! (`is_transitive`, `causes_cycle`) consistent under arbitrary insertion
//! and removal sequences, and answers structural queries.
//!
//! # Architecture
//!
//! - `petgraph::StableDiGraph<Node, Edge>` holds the entities and their
//!   adjacency. Indices stay valid across removals.
//! - `HashMap<NodeId, NodeIndex>` / `HashMap<EdgeId, EdgeIndex>` resolve ids.
//! - A side table keeps extra per-node display fields.
//! - The topological order and per-node ancestor sets are memoized and
//!   cleared on every structural mutation.
//!
//! ## Edge Direction Convention
//!
//! Edges point from **prerequisite to dependent**:
//!
//! - **Edge source**: the concept that must be understood first
//! - **Edge target**: the concept that builds on it
//!
//! An edge therefore appears in its target's `dependencies` (incoming) and
//! in its source's `outlinks` (outgoing).
//!
//! # Example
//!
//! ```
//! use kmap::domain::{EdgeSpec, NewNode, NodeId};
//! use kmap::graph::{Graph, GraphConfig};
//!
//! let mut graph = Graph::new(GraphConfig::default());
//! for id in ["a", "b", "c"] {
//!     graph.add_node(NewNode::with_id(id, id.to_uppercase())).unwrap();
//! }
//! let _ = graph.add_edge(EdgeSpec::new("a", "b")).unwrap();
//! let _ = graph.add_edge(EdgeSpec::new("b", "c")).unwrap();
//! let shortcut = graph.add_edge(EdgeSpec::new("a", "c")).unwrap();
//!
//! let edge = graph.edge(shortcut.edge_id().unwrap()).unwrap();
//! assert!(edge.is_transitive);
//! assert_eq!(graph.topo_sort(), [NodeId::new("a"), NodeId::new("b"), NodeId::new("c")]);
//! ```
//!
//! # Performance Characteristics
//!
//! - Lookups by id: O(1)
//! - `add_edge`: two reachability searches, plus an O(E · (V + E)) re-scan
//!   of non-transitive edges when the new edge is direct
//! - `remove_edge`: O(E · (V + E)) re-scan of transitive edges
//! - `topo_sort`: O(V + E) on a cache miss, O(1) afterwards

mod ancestors;
mod contraction;
mod mutation;
mod reachability;
mod topo;

pub use ancestors::{AllNodes, NodeFilter};
pub use mutation::{EdgeOutcome, EdgeRejection};

use crate::domain::{Axis, Edge, EdgeId, Node, NodeId};
use crate::error::{Error, Result};
use crate::events::{EventBus, GraphEvent, Listener, ListenerId};
use crate::id_generation::{DEFAULT_ID_LENGTH, IdGenerator};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use serde_json::{Map, Value};
use std::cell::{OnceCell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::Rc;

/// Engine-facing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphConfig {
    /// Accept edges that close a cycle (flagged `causes_cycle`)
    pub allow_cycles: bool,

    /// Length of generated node and edge ids
    pub id_length: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            allow_cycles: false,
            id_length: DEFAULT_ID_LENGTH,
        }
    }
}

/// Graph-level metadata carried on export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphMeta {
    /// Graph id
    pub id: Option<String>,
    /// Graph title
    pub title: Option<String>,
}

/// A directed concept-dependency graph.
///
/// All mutation goes through the graph's entry points; consumers only ever
/// see shared references to [`Node`] and [`Edge`].
pub struct Graph {
    /// Entities and adjacency.
    ///
    /// Edge direction: source (prerequisite) -> target (dependent).
    pub(super) store: StableDiGraph<Node, Edge>,

    /// Every node in `store` has exactly one entry here.
    pub(super) node_map: HashMap<NodeId, NodeIndex>,

    /// Every edge in `store` has exactly one entry here.
    pub(super) edge_map: HashMap<EdgeId, EdgeIndex>,

    /// Extra display fields keyed by node id
    pub(super) display: HashMap<NodeId, Map<String, Value>>,

    /// Ids that were valid once and have been removed
    pub(super) retired_nodes: HashSet<NodeId>,
    pub(super) retired_edges: HashSet<EdgeId>,

    pub(super) config: GraphConfig,
    pub(super) meta: GraphMeta,

    pub(super) node_ids: IdGenerator,
    pub(super) edge_ids: IdGenerator,
    pub(super) next_seq: u64,

    /// Memoized topological order, cleared on structural change
    pub(super) topo_cache: OnceCell<Vec<NodeId>>,

    /// Memoized ancestor sets, cleared whenever the edge set changes
    pub(super) ancestor_cache: RefCell<HashMap<NodeId, Rc<HashSet<NodeId>>>>,

    pub(super) events: EventBus,
    pub(super) focus: Option<NodeId>,
    pub(super) scope: Option<NodeId>,
}

impl fmt::Debug for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("node_count", &self.node_map.len())
            .field("edge_count", &self.edge_map.len())
            .field("config", &self.config)
            .field("meta", &self.meta)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new(GraphConfig::default())
    }
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new(config: GraphConfig) -> Self {
        Self::with_generators(
            config,
            IdGenerator::new(config.id_length),
            IdGenerator::new(config.id_length),
        )
    }

    /// Create an empty graph whose generated ids are reproducible.
    #[must_use]
    pub fn with_id_seed(config: GraphConfig, seed: u64) -> Self {
        Self::with_generators(
            config,
            IdGenerator::with_seed(config.id_length, seed),
            IdGenerator::with_seed(config.id_length, seed.wrapping_add(1)),
        )
    }

    fn with_generators(config: GraphConfig, node_ids: IdGenerator, edge_ids: IdGenerator) -> Self {
        Self {
            store: StableDiGraph::default(),
            node_map: HashMap::new(),
            edge_map: HashMap::new(),
            display: HashMap::new(),
            retired_nodes: HashSet::new(),
            retired_edges: HashSet::new(),
            config,
            meta: GraphMeta::default(),
            node_ids,
            edge_ids,
            next_seq: 0,
            topo_cache: OnceCell::new(),
            ancestor_cache: RefCell::new(HashMap::new()),
            events: EventBus::new(),
            focus: None,
            scope: None,
        }
    }

    /// The graph's configuration.
    #[must_use]
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// True if cycle-inducing edges are accepted.
    #[must_use]
    pub fn allows_cycles(&self) -> bool {
        self.config.allow_cycles
    }

    /// Graph metadata.
    #[must_use]
    pub fn meta(&self) -> &GraphMeta {
        &self.meta
    }

    /// Replace the graph metadata.
    pub fn set_meta(&mut self, meta: GraphMeta) {
        self.meta = meta;
    }

    // ========== Notifications ==========

    /// Register a change listener.
    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        self.events.subscribe(listener)
    }

    /// Remove a change listener.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    // ========== Queries ==========

    /// Get a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_map.get(id).map(|&ix| &self.store[ix])
    }

    /// Get an edge by id.
    #[must_use]
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edge_map.get(id).map(|&ix| &self.store[ix])
    }

    /// All nodes, in insertion order.
    #[must_use]
    pub fn nodes(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.store.node_weights().collect();
        nodes.sort_by_key(|node| node.seq);
        nodes
    }

    /// All edges, in insertion order.
    #[must_use]
    pub fn edges(&self) -> Vec<&Edge> {
        let mut edges: Vec<&Edge> = self.store.edge_weights().collect();
        edges.sort_by_key(|edge| edge.seq);
        edges
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.node_map.len()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_map.len()
    }

    /// True if the graph holds any node or edge.
    #[must_use]
    pub fn is_populated(&self) -> bool {
        self.node_count() > 0 || self.edge_count() > 0
    }

    /// Incoming edges of a node (its prerequisites), in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn dependencies(&self, id: &NodeId) -> Result<Vec<&Edge>> {
        self.adjacent(id, Axis::Dependencies)
    }

    /// Outgoing edges of a node (its dependents), in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn outlinks(&self, id: &NodeId) -> Result<Vec<&Edge>> {
        self.adjacent(id, Axis::Outlinks)
    }

    /// Edges of a node along one axis, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn adjacent(&self, id: &NodeId, axis: Axis) -> Result<Vec<&Edge>> {
        let ix = self.node_index(id)?;
        Ok(self
            .axis_edges(ix, axis)
            .into_iter()
            .map(|eix| &self.store[eix])
            .collect())
    }

    /// Non-transitive incoming edges.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn direct_dependencies(&self, id: &NodeId) -> Result<Vec<&Edge>> {
        let mut edges = self.dependencies(id)?;
        edges.retain(|edge| !edge.is_transitive);
        Ok(edges)
    }

    /// Non-transitive outgoing edges.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn direct_outlinks(&self, id: &NodeId) -> Result<Vec<&Edge>> {
        let mut edges = self.outlinks(id)?;
        edges.retain(|edge| !edge.is_transitive);
        Ok(edges)
    }

    /// Extra display fields of a node, if any were stored.
    #[must_use]
    pub fn display(&self, id: &NodeId) -> Option<&Map<String, Value>> {
        self.display.get(id)
    }

    /// The node that currently has focus.
    #[must_use]
    pub fn focus_node(&self) -> Option<&NodeId> {
        self.focus.as_ref()
    }

    /// Set the focus node.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn set_focus_node(&mut self, id: &NodeId) -> Result<()> {
        self.node_index(id)?;
        self.focus = Some(id.clone());
        self.events
            .emit(&GraphEvent::FocusNodeChanged { id: id.clone() });
        Ok(())
    }

    // ========== Internal helpers ==========

    pub(super) fn node_index(&self, id: &NodeId) -> Result<NodeIndex> {
        self.node_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownNode(id.clone()))
    }

    /// Edge indices along `axis`, sorted by insertion sequence.
    pub(super) fn axis_edges(&self, ix: NodeIndex, axis: Axis) -> Vec<EdgeIndex> {
        let direction = match axis {
            Axis::Dependencies => Direction::Incoming,
            Axis::Outlinks => Direction::Outgoing,
        };
        let mut edges: Vec<EdgeIndex> = self
            .store
            .edges_directed(ix, direction)
            .map(|edge| edge.id())
            .collect();
        edges.sort_by_key(|&eix| self.store[eix].seq);
        edges
    }

    /// Node index on the far side of `eix` when walking along `axis`.
    pub(super) fn far_end(&self, eix: EdgeIndex, axis: Axis) -> Option<NodeIndex> {
        self.store
            .edge_endpoints(eix)
            .map(|(source, target)| match axis {
                Axis::Dependencies => source,
                Axis::Outlinks => target,
            })
    }

    pub(super) fn next_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }

    /// Drop every memoized result derived from the graph structure.
    pub(super) fn invalidate_caches(&mut self) {
        if self.topo_cache.take().is_some() {
            tracing::trace!("topological order invalidated");
        }
        self.ancestor_cache.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeSpec, NewNode};

    fn graph_with(ids: &[&str]) -> Graph {
        let mut graph = Graph::default();
        for id in ids {
            graph.add_node(NewNode::with_id(*id, *id)).unwrap();
        }
        graph
    }

    #[test]
    fn empty_graph_is_not_populated() {
        let graph = Graph::default();
        assert!(!graph.is_populated());
        assert_eq!(graph.node_count(), 0);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn nodes_and_edges_keep_insertion_order() {
        let mut graph = graph_with(&["c", "a", "b"]);
        let _ = graph.add_edge(EdgeSpec::new("c", "b").with_id("e2")).unwrap();
        let _ = graph.add_edge(EdgeSpec::new("a", "b").with_id("e1")).unwrap();

        let ids: Vec<&str> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);

        let edge_ids: Vec<&str> = graph.edges().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(edge_ids, ["e2", "e1"]);

        let deps: Vec<&str> = graph
            .dependencies(&NodeId::new("b"))
            .unwrap()
            .iter()
            .map(|e| e.source.as_str())
            .collect();
        assert_eq!(deps, ["c", "a"]);
    }

    #[test]
    fn adjacency_of_unknown_node_fails() {
        let graph = graph_with(&["a"]);
        assert!(matches!(
            graph.outlinks(&NodeId::new("zzz")),
            Err(Error::UnknownNode(_))
        ));
    }

    #[test]
    fn direct_views_skip_transitive_edges() {
        let mut graph = graph_with(&["a", "b", "c"]);
        let _ = graph.add_edge(EdgeSpec::new("a", "b")).unwrap();
        let _ = graph.add_edge(EdgeSpec::new("b", "c")).unwrap();
        let _ = graph.add_edge(EdgeSpec::new("a", "c")).unwrap();

        assert_eq!(graph.outlinks(&NodeId::new("a")).unwrap().len(), 2);
        let direct = graph.direct_outlinks(&NodeId::new("a")).unwrap();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].target.as_str(), "b");

        let direct_deps = graph.direct_dependencies(&NodeId::new("c")).unwrap();
        assert_eq!(direct_deps.len(), 1);
        assert_eq!(direct_deps[0].source.as_str(), "b");
    }

    #[test]
    fn focus_node_requires_existing_node() {
        let mut graph = graph_with(&["a"]);
        graph.set_focus_node(&NodeId::new("a")).unwrap();
        assert_eq!(graph.focus_node(), Some(&NodeId::new("a")));
        assert!(graph.set_focus_node(&NodeId::new("nope")).is_err());
    }
}
