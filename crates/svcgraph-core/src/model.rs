//! Canonical node/edge model and the CRUD operations over it.
//!
//! CRUD never fails on unknown ids: updating or deleting something that is already gone is a
//! silent no-op, because the caller may race a stale id against a delete. Deleting a node removes
//! its incident edges in the same call, so a [`Graph`] is never observed with a dangling edge.

use crate::error::{Error, Result};
use crate::layout::{LayoutOptions, layout_nodes};
use crate::registry::TypeRegistry;
use serde::Serialize;
use std::collections::HashSet;

/// Position given to nodes created interactively, before any layout pass.
pub const DEFAULT_NODE_POSITION: (f64, f64) = (100.0, 100.0);

const ID_TOKEN_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub namespace: Option<String>,
    pub x: f64,
    pub y: f64,
    /// `None` means the default footprint.
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            node_type: node_type.into(),
            namespace: None,
            x: 0.0,
            y: 0.0,
            width: None,
            height: None,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = normalize_namespace(namespace);
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub edge_type: Option<String>,
    pub label: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            edge_type: None,
            label: None,
        }
    }

    pub fn with_type(mut self, edge_type: Option<&str>) -> Self {
        self.edge_type = edge_type.map(str::to_string);
        self
    }

    pub fn with_label(mut self, label: Option<&str>) -> Self {
        self.label = label.map(str::to_string);
        self
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }

    fn connects_pair(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// Partial update for a node. Each field is applied independently.
///
/// The doubly-optional fields distinguish "leave alone" (`None`) from "clear" (`Some(None)`).
/// Setting `namespace` to an empty string also clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodePatch {
    pub name: Option<String>,
    pub node_type: Option<String>,
    pub namespace: Option<Option<String>>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<Option<f64>>,
    pub height: Option<Option<f64>>,
}

impl NodePatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Default::default()
        }
    }

    /// Every coordinate and size the patch carries is a finite number.
    pub fn is_finite(&self) -> bool {
        let sizes = [self.width.flatten(), self.height.flatten()];
        [self.x, self.y]
            .into_iter()
            .chain(sizes)
            .flatten()
            .all(f64::is_finite)
    }

    fn apply(self, node: &mut Node) {
        if let Some(name) = self.name {
            node.name = name;
        }
        if let Some(node_type) = self.node_type {
            node.node_type = node_type;
        }
        if let Some(namespace) = self.namespace {
            node.namespace = normalize_namespace(namespace.as_deref());
        }
        if let Some(x) = self.x {
            node.x = x;
        }
        if let Some(y) = self.y {
            node.y = y;
        }
        if let Some(width) = self.width {
            node.width = width;
        }
        if let Some(height) = self.height {
            node.height = height;
        }
    }
}

/// Partial update for an edge, with the same semantics as [`NodePatch`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgePatch {
    pub edge_type: Option<Option<String>>,
    pub label: Option<Option<String>>,
}

impl EdgePatch {
    fn apply(self, edge: &mut Edge) {
        if let Some(edge_type) = self.edge_type {
            edge.edge_type = edge_type;
        }
        if let Some(label) = self.label {
            edge.label = label;
        }
    }
}

/// The working graph. Nodes and edges keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    revision: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from already-constructed parts, rejecting duplicate ids and dangling edges.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Result<Self> {
        let mut graph = Self::new();
        graph.replace(nodes, edges)?;
        Ok(graph)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn incident_edges<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.touches(node_id))
    }

    /// Bumped on every mutation that changes the graph. Derived data is keyed on it.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn into_parts(self) -> (Vec<Node>, Vec<Edge>) {
        (self.nodes, self.edges)
    }

    /// Adds a node with a generated id, the default position and the default footprint.
    ///
    /// The type is trusted; use [`Graph::try_add_node`] when it comes from user input.
    pub fn add_node(&mut self, name: &str, node_type: &str, namespace: Option<&str>) -> String {
        let slug = slugify(name);
        let mut id = format!("{slug}-{}", random_token());
        while self.node(&id).is_some() {
            id = format!("{slug}-{}", random_token());
        }

        let (x, y) = DEFAULT_NODE_POSITION;
        self.nodes.push(
            Node::new(id.clone(), name, node_type)
                .with_namespace(namespace)
                .with_position(x, y),
        );
        self.bump();
        tracing::debug!(node_id = %id, node_type, "added node");
        id
    }

    pub fn try_add_node(
        &mut self,
        registry: &TypeRegistry,
        name: &str,
        node_type: &str,
        namespace: Option<&str>,
    ) -> Result<String> {
        if name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if !registry.is_node_type(node_type) {
            return Err(Error::UnknownNodeType {
                service_id: slugify(name),
                node_type: node_type.to_string(),
            });
        }
        Ok(self.add_node(name, node_type, namespace))
    }

    /// Returns `false` (and changes nothing) when `id` is unknown or the patch carries a
    /// non-finite coordinate or size.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) else {
            tracing::trace!(node_id = id, "update_node: unknown id, ignoring");
            return false;
        };
        if !patch.is_finite() {
            tracing::debug!(node_id = id, "update_node: non-finite geometry, ignoring");
            return false;
        }
        patch.apply(node);
        self.bump();
        true
    }

    /// Removes the node and every edge that starts or ends at it.
    pub fn delete_node(&mut self, id: &str) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            tracing::trace!(node_id = id, "delete_node: unknown id, ignoring");
            return false;
        }

        let edges_before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        self.bump();
        tracing::debug!(
            node_id = id,
            removed_edges = edges_before - self.edges.len(),
            "deleted node"
        );
        true
    }

    /// Connects `source` to `target` under the strict duplicate policy.
    ///
    /// Returns `None` when either endpoint is unknown or when the unordered pair is already
    /// connected in either direction.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        edge_type: Option<&str>,
    ) -> Option<String> {
        if self.node(source).is_none() || self.node(target).is_none() {
            tracing::trace!(source, target, "add_edge: unknown endpoint, ignoring");
            return None;
        }
        if self.edges.iter().any(|e| e.connects_pair(source, target)) {
            tracing::trace!(source, target, "add_edge: pair already connected, ignoring");
            return None;
        }

        let mut id = format!("edge-{}", random_token());
        while self.edge(&id).is_some() {
            id = format!("edge-{}", random_token());
        }
        self.edges
            .push(Edge::new(id.clone(), source, target).with_type(edge_type));
        self.bump();
        Some(id)
    }

    pub fn update_edge(&mut self, id: &str, patch: EdgePatch) -> bool {
        let Some(edge) = self.edges.iter_mut().find(|e| e.id == id) else {
            tracing::trace!(edge_id = id, "update_edge: unknown id, ignoring");
            return false;
        };
        patch.apply(edge);
        self.bump();
        true
    }

    pub fn delete_edge(&mut self, id: &str) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        if self.edges.len() == before {
            tracing::trace!(edge_id = id, "delete_edge: unknown id, ignoring");
            return false;
        }
        self.bump();
        true
    }

    /// Swaps in a whole new node/edge set.
    ///
    /// The new parts are checked first; on error the current graph is left untouched.
    pub fn replace(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) -> Result<()> {
        check_consistency(&nodes, &edges)?;
        self.nodes = nodes;
        self.edges = edges;
        self.bump();
        tracing::debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "replaced graph"
        );
        Ok(())
    }

    /// Runs auto-layout and writes the computed positions back into the graph.
    pub fn apply_layout(&mut self, options: &LayoutOptions) {
        self.nodes = layout_nodes(&self.nodes, &self.edges, options);
        self.bump();
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}

/// Unique node ids, unique edge ids, and every edge endpoint present.
pub(crate) fn check_consistency(nodes: &[Node], edges: &[Edge]) -> Result<()> {
    let mut node_ids: HashSet<&str> = HashSet::with_capacity(nodes.len());
    for n in nodes {
        if !node_ids.insert(n.id.as_str()) {
            return Err(Error::DuplicateNodeId { id: n.id.clone() });
        }
    }

    let mut edge_ids: HashSet<&str> = HashSet::with_capacity(edges.len());
    for e in edges {
        if !edge_ids.insert(e.id.as_str()) {
            return Err(Error::DuplicateEdgeId { id: e.id.clone() });
        }
        for endpoint in [&e.source, &e.target] {
            if !node_ids.contains(endpoint.as_str()) {
                return Err(Error::MissingEndpoint {
                    edge_id: e.id.clone(),
                    node_id: endpoint.clone(),
                });
            }
        }
    }
    Ok(())
}

/// Empty and whitespace-only namespaces mean "no namespace".
pub(crate) fn normalize_namespace(namespace: Option<&str>) -> Option<String> {
    namespace
        .filter(|ns| !ns.trim().is_empty())
        .map(str::to_string)
}

/// Lowercase ASCII slug: alphanumerics kept, every other run collapsed to `-`.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let out = out.trim_matches('-');
    if out.is_empty() {
        "node".to_string()
    } else {
        out.to_string()
    }
}

/// Base-36 token drawn from a v4 UUID (122 random bits, truncated to the token length).
fn random_token() -> String {
    const ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut bits = uuid::Uuid::new_v4().as_u128();
    let mut out = String::with_capacity(ID_TOKEN_LEN);
    for _ in 0..ID_TOKEN_LEN {
        out.push(ALPHABET[(bits % 36) as usize] as char);
        bits /= 36;
    }
    out
}
