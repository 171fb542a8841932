//! Node and edge insertion/removal with transitivity maintenance.

use super::Graph;
use crate::domain::{Axis, Edge, EdgeId, EdgeSpec, NewNode, Node, NodeId, Point};
use crate::error::{Error, Result};
use crate::events::GraphEvent;
use petgraph::stable_graph::EdgeIndex;
use serde_json::{Map, Value};
use std::fmt;
use tracing::{debug, warn};

/// Why an edge was not inserted.
///
/// These are data-quality rejections: the graph is left untouched and the
/// caller decides whether to surface them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeRejection {
    /// Source and target are the same node.
    SelfLoop {
        /// The node on both ends
        node: NodeId,
    },

    /// The target already reaches the source and cycles are disallowed.
    Cycle {
        /// Requested source
        source: NodeId,
        /// Requested target
        target: NodeId,
    },
}

impl fmt::Display for EdgeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLoop { node } => write!(f, "self-loop on {node}"),
            Self::Cycle { source, target } => {
                write!(f, "{source} -> {target} would create a cycle")
            }
        }
    }
}

/// Result of [`Graph::add_edge`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeOutcome {
    /// The edge was inserted under this id.
    Added(EdgeId),
    /// The edge was rejected; the graph is unchanged.
    Rejected(EdgeRejection),
}

impl EdgeOutcome {
    /// Id of the inserted edge, if any.
    #[must_use]
    pub fn edge_id(&self) -> Option<&EdgeId> {
        match self {
            Self::Added(id) => Some(id),
            Self::Rejected(_) => None,
        }
    }

    /// True if the edge was inserted.
    #[must_use]
    pub fn is_added(&self) -> bool {
        matches!(self, Self::Added(_))
    }

    /// The rejection reason, if the edge was rejected.
    #[must_use]
    pub fn rejection(&self) -> Option<&EdgeRejection> {
        match self {
            Self::Added(_) => None,
            Self::Rejected(reason) => Some(reason),
        }
    }
}

impl Graph {
    /// Insert a node.
    ///
    /// A missing or empty id is replaced with a generated token that
    /// collides with no live or previously removed id.
    ///
    /// # Errors
    ///
    /// - `Error::DuplicateNode` if the given id already exists
    /// - `Error::IdGeneration` if no free id could be generated
    pub fn add_node(&mut self, new_node: NewNode) -> Result<NodeId> {
        let requested = new_node.id.filter(|id| !id.as_str().is_empty());
        let (id, is_new) = match requested {
            Some(id) => {
                if self.node_map.contains_key(&id) {
                    return Err(Error::DuplicateNode(id));
                }
                (id, false)
            }
            None => (self.generate_node_id()?, true),
        };

        let seq = self.next_seq();
        let ix = self.store.add_node(Node {
            id: id.clone(),
            title: new_node.title,
            is_contracted: false,
            has_contracted_deps: false,
            has_contracted_ols: false,
            seq,
        });
        self.node_map.insert(id.clone(), ix);
        self.retired_nodes.remove(&id);
        if !new_node.display.is_empty() {
            self.display.insert(id.clone(), new_node.display);
        }

        self.invalidate_caches();
        debug!(node = %id, is_new, "node added");
        self.events.emit(&GraphEvent::NodeAdded {
            id: id.clone(),
            is_new,
        });
        Ok(id)
    }

    /// Insert an edge from `spec.source` (prerequisite) to `spec.target`.
    ///
    /// Self-loops, and cycle-inducing edges when cycles are disallowed, are
    /// returned as [`EdgeOutcome::Rejected`] without touching the graph.
    ///
    /// # Errors
    ///
    /// - `Error::UnknownEndpoint` if either endpoint is not in the graph
    /// - `Error::DuplicateEdge` if the given edge id already exists
    /// - `Error::IdGeneration` if no free id could be generated
    pub fn add_edge(&mut self, spec: EdgeSpec) -> Result<EdgeOutcome> {
        // === Phase 1: Validation (no mutations) ===
        let source_ix = self.node_map.get(&spec.source).copied();
        let target_ix = self.node_map.get(&spec.target).copied();
        let (Some(source_ix), Some(target_ix)) = (source_ix, target_ix) else {
            return Err(Error::UnknownEndpoint {
                from: spec.source,
                to: spec.target,
            });
        };

        if source_ix == target_ix {
            warn!(node = %spec.source, "Rejected self-loop edge");
            return Ok(EdgeOutcome::Rejected(EdgeRejection::SelfLoop {
                node: spec.source,
            }));
        }

        let requested = spec.id.filter(|id| !id.as_str().is_empty());
        if let Some(id) = &requested
            && self.edge_map.contains_key(id)
        {
            return Err(Error::DuplicateEdge(id.clone()));
        }

        // === Phase 2: Classification against the current edge set ===
        let is_transitive = self.path_exists(source_ix, target_ix, |_| true);
        let causes_cycle = self.path_exists(target_ix, source_ix, |_| true);

        if causes_cycle && !self.config.allow_cycles {
            warn!(
                source = %spec.source,
                target = %spec.target,
                "Rejected edge that would create a cycle"
            );
            return Ok(EdgeOutcome::Rejected(EdgeRejection::Cycle {
                source: spec.source,
                target: spec.target,
            }));
        }

        // === Phase 3: Insert ===
        let (id, is_new) = match requested {
            Some(id) => (id, false),
            None => (self.generate_edge_id()?, true),
        };

        let seq = self.next_seq();
        let eix = self.store.add_edge(
            source_ix,
            target_ix,
            Edge {
                id: id.clone(),
                source: spec.source,
                target: spec.target,
                is_transitive,
                causes_cycle,
                is_contracted: spec.is_contracted,
                reason: spec.reason,
                middle_pts: spec.middle_pts,
                seq,
            },
        );
        self.edge_map.insert(id.clone(), eix);
        self.retired_edges.remove(&id);

        // A new direct edge opens paths that can make older edges redundant
        if !is_transitive {
            self.reclassify_direct_edges(eix);
        }

        self.invalidate_caches();
        debug!(edge = %id, is_transitive, causes_cycle, is_new, "edge added");
        self.events.emit(&GraphEvent::EdgeAdded {
            id: id.clone(),
            is_new,
        });
        Ok(EdgeOutcome::Added(id))
    }

    /// Remove an edge.
    ///
    /// Returns `Ok(false)` if the id was valid once but is already gone.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEdge` if the id was never part of the graph.
    pub fn remove_edge(&mut self, id: &EdgeId) -> Result<bool> {
        let Some(eix) = self.edge_map.remove(id) else {
            if self.retired_edges.contains(id) {
                debug!(edge = %id, "edge already removed");
                return Ok(false);
            }
            return Err(Error::UnknownEdge(id.clone()));
        };

        self.store.remove_edge(eix);
        self.retired_edges.insert(id.clone());
        self.reclassify_transitive_edges();

        self.invalidate_caches();
        debug!(edge = %id, "edge removed");
        self.events
            .emit(&GraphEvent::EdgeRemoved { id: id.clone() });
        Ok(true)
    }

    /// Remove a node and every edge touching it.
    ///
    /// Returns `Ok(false)` if the id was valid once but is already gone.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the id was never part of the graph.
    pub fn remove_node(&mut self, id: &NodeId) -> Result<bool> {
        let Some(&ix) = self.node_map.get(id) else {
            if self.retired_nodes.contains(id) {
                debug!(node = %id, "node already removed");
                return Ok(false);
            }
            return Err(Error::UnknownNode(id.clone()));
        };

        // Edges go first so no edge ever references a missing node
        let incident: Vec<EdgeId> = [Axis::Dependencies, Axis::Outlinks]
            .into_iter()
            .flat_map(|axis| self.axis_edges(ix, axis))
            .map(|eix| self.store[eix].id.clone())
            .collect();
        for edge_id in &incident {
            self.remove_edge(edge_id)?;
        }

        self.store.remove_node(ix);
        self.node_map.remove(id);
        self.display.remove(id);
        self.retired_nodes.insert(id.clone());
        if self.focus.as_ref() == Some(id) {
            self.focus = None;
        }
        if self.scope.as_ref() == Some(id) {
            self.scope = None;
        }

        self.invalidate_caches();
        debug!(node = %id, edges_removed = incident.len(), "node removed");
        self.events
            .emit(&GraphEvent::NodeRemoved { id: id.clone() });
        Ok(true)
    }

    /// Replace a node's extra display fields.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownNode` if the node doesn't exist.
    pub fn set_node_display(&mut self, id: &NodeId, display: Map<String, Value>) -> Result<()> {
        self.node_index(id)?;
        if display.is_empty() {
            self.display.remove(id);
        } else {
            self.display.insert(id.clone(), display);
        }
        Ok(())
    }

    /// Replace an edge's layout waypoints.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownEdge` if the edge doesn't exist.
    pub fn set_edge_middle_pts(&mut self, id: &EdgeId, middle_pts: Vec<Point>) -> Result<()> {
        let eix = self
            .edge_map
            .get(id)
            .copied()
            .ok_or_else(|| Error::UnknownEdge(id.clone()))?;
        self.store[eix].middle_pts = middle_pts;
        Ok(())
    }

    fn generate_node_id(&mut self) -> Result<NodeId> {
        let live = &self.node_map;
        let retired = &self.retired_nodes;
        let raw = self
            .node_ids
            .generate(|candidate| live.contains_key(candidate) || retired.contains(candidate))?;
        Ok(NodeId::new(raw))
    }

    fn generate_edge_id(&mut self) -> Result<EdgeId> {
        let live = &self.edge_map;
        let retired = &self.retired_edges;
        let raw = self
            .edge_ids
            .generate(|candidate| live.contains_key(candidate) || retired.contains(candidate))?;
        Ok(EdgeId::new(raw))
    }

    /// Flag every direct edge (other than `added`) that now has an alternate path.
    fn reclassify_direct_edges(&mut self, added: EdgeIndex) {
        let newly_transitive: Vec<EdgeIndex> = self
            .store
            .edge_indices()
            .filter(|&eix| eix != added && !self.store[eix].is_transitive)
            .filter(|&eix| self.has_alternate_path(eix, |_| true))
            .collect();

        for eix in newly_transitive {
            debug!(edge = %self.store[eix].id, "edge became transitive");
            self.store[eix].is_transitive = true;
        }
    }

    /// Clear the flag on every transitive edge that lost its alternate path.
    fn reclassify_transitive_edges(&mut self) {
        let now_direct: Vec<EdgeIndex> = self
            .store
            .edge_indices()
            .filter(|&eix| self.store[eix].is_transitive)
            .filter(|&eix| !self.has_alternate_path(eix, |_| true))
            .collect();

        for eix in now_direct {
            debug!(edge = %self.store[eix].id, "edge became direct");
            self.store[eix].is_transitive = false;
        }
    }
}
