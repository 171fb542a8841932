//! Domain types for the concept-dependency graph.
//!
//! [`Node`] and [`Edge`] are the engine's internal, fixed-schema entities.
//! They can only be created through [`Graph`](crate::graph::Graph) entry
//! points. The `*Record` types mirror the JSON ingest and export shapes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Unique identifier for a concept node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Unique identifier for a dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub String);

impl EdgeId {
    /// Create a new edge ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the ID as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for EdgeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EdgeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::borrow::Borrow<str> for EdgeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A concept in the graph.
///
/// Adjacency is not stored on the node: the graph derives `dependencies`
/// and `outlinks` from its edge store, so they always agree with the edge
/// set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Stable identifier
    pub id: NodeId,

    /// Display label (inert to the engine)
    pub title: String,

    /// Hidden by a contraction
    pub is_contracted: bool,

    /// This node's dependencies axis is folded
    pub has_contracted_deps: bool,

    /// This node's outlinks axis is folded
    pub has_contracted_ols: bool,

    /// Insertion sequence, used for deterministic ordering
    pub(crate) seq: u64,
}

impl Node {
    /// Folded flag for the given axis
    #[must_use]
    pub fn has_contracted(&self, axis: Axis) -> bool {
        match axis {
            Axis::Dependencies => self.has_contracted_deps,
            Axis::Outlinks => self.has_contracted_ols,
        }
    }

    pub(crate) fn set_has_contracted(&mut self, axis: Axis, value: bool) {
        match axis {
            Axis::Dependencies => self.has_contracted_deps = value,
            Axis::Outlinks => self.has_contracted_ols = value,
        }
    }
}

/// A directed dependency: `source` is the prerequisite, `target` the dependent.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Unique identifier
    pub id: EdgeId,

    /// Prerequisite node
    pub source: NodeId,

    /// Dependent node
    pub target: NodeId,

    /// Another path from source to target exists without this edge
    pub is_transitive: bool,

    /// Target already reached source when the edge was inserted
    pub causes_cycle: bool,

    /// Hidden by a contraction
    pub is_contracted: bool,

    /// Free-text justification for the dependency
    pub reason: Option<String>,

    /// Routing waypoints, owned by the layout collaborator
    pub middle_pts: Vec<Point>,

    /// Insertion sequence, used for deterministic ordering
    pub(crate) seq: u64,
}

/// A 2D layout waypoint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f64,
    /// Vertical coordinate
    pub y: f64,
}

/// One of the two adjacency views of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Incoming edges (prerequisites)
    Dependencies,
    /// Outgoing edges (dependents)
    Outlinks,
}

impl Axis {
    /// The other axis
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Dependencies => Self::Outlinks,
            Self::Outlinks => Self::Dependencies,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dependencies => write!(f, "dependencies"),
            Self::Outlinks => write!(f, "outlinks"),
        }
    }
}

/// Data for creating a new node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewNode {
    /// Requested id; `None` or empty means generate one
    pub id: Option<NodeId>,

    /// Display label
    pub title: String,

    /// Extra display fields, kept in the graph's side table
    pub display: Map<String, Value>,
}

impl NewNode {
    /// A node with a caller-assigned id
    pub fn with_id(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: title.into(),
            display: Map::new(),
        }
    }

    /// A node whose id will be generated
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            display: Map::new(),
        }
    }
}

/// Data for creating a new edge
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    /// Requested id; `None` means generate one
    pub id: Option<EdgeId>,

    /// Prerequisite node id
    pub source: NodeId,

    /// Dependent node id
    pub target: NodeId,

    /// Free-text justification
    pub reason: Option<String>,

    /// Layout waypoints
    pub middle_pts: Vec<Point>,

    /// Initial contraction flag
    pub is_contracted: bool,
}

impl EdgeSpec {
    /// An edge from `source` (prerequisite) to `target` (dependent)
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            reason: None,
            middle_pts: Vec::new(),
            is_contracted: false,
        }
    }

    /// Set a caller-assigned id
    #[must_use]
    pub fn with_id(mut self, id: impl Into<EdgeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Attach a reason
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

/// A node as it appears in ingest data and in exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Node id; missing or empty means "generate one"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,

    /// Display label
    #[serde(default)]
    pub title: String,

    /// Incoming edges, each naming its source
    #[serde(default)]
    pub dependencies: Vec<DependencyRecord>,

    /// Extra display fields, carried through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NodeRecord {
    /// A record with no dependencies
    pub fn new(id: impl Into<NodeId>, title: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            title: title.into(),
            dependencies: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Add a dependency on `source`
    #[must_use]
    pub fn depends_on(mut self, source: impl Into<NodeId>) -> Self {
        self.dependencies.push(DependencyRecord::new(source));
        self
    }

    /// The id if present and non-empty
    #[must_use]
    pub fn given_id(&self) -> Option<&NodeId> {
        self.id.as_ref().filter(|id| !id.as_str().is_empty())
    }
}

/// An incoming edge as listed on a [`NodeRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRecord {
    /// Prerequisite node id
    pub source: NodeId,

    /// Edge id, if already assigned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EdgeId>,

    /// Free-text justification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Layout waypoints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middle_pts: Vec<Point>,

    /// Display contraction flag
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_contracted: bool,
}

impl DependencyRecord {
    /// A dependency on `source` with no metadata
    pub fn new(source: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            id: None,
            reason: None,
            middle_pts: Vec::new(),
            is_contracted: false,
        }
    }
}

/// An edge as it appears in the export's `dependencies` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeRecord {
    /// Edge id
    pub id: EdgeId,

    /// Prerequisite node id
    pub source: NodeId,

    /// Dependent node id
    pub target: NodeId,

    /// Derived transitivity flag
    #[serde(default)]
    pub is_transitive: bool,

    /// Derived cycle flag (only present in graphs that allow cycles)
    #[serde(default, skip_serializing_if = "is_false")]
    pub causes_cycle: bool,

    /// Display contraction flag
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_contracted: bool,

    /// Free-text justification
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Layout waypoints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middle_pts: Vec<Point>,
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            is_transitive: edge.is_transitive,
            causes_cycle: edge.causes_cycle,
            is_contracted: edge.is_contracted,
            reason: edge.reason.clone(),
            middle_pts: edge.middle_pts.clone(),
        }
    }
}

impl From<&Edge> for DependencyRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            id: Some(edge.id.clone()),
            reason: edge.reason.clone(),
            middle_pts: edge.middle_pts.clone(),
            is_contracted: edge.is_contracted,
        }
    }
}

/// Serialized form of a whole graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphExport {
    /// Graph id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Graph title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Node records, each carrying its own dependency list
    pub concepts: Vec<NodeRecord>,

    /// Flat edge list (redundant with `concepts`, kept for consumers)
    #[serde(default)]
    pub dependencies: Vec<EdgeRecord>,
}
