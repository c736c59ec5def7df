//! Flat snapshot: node and edge arrays with explicit positions.
//!
//! Import is lenient about types (unknown node types become the fallback type, unknown edge types
//! are dropped) but strict about shape: ids, endpoints and coordinates must be present. Positions
//! are taken verbatim; no layout pass runs.

use super::{ImportedGraph, parse_json};
use crate::error::{Error, Result};
use crate::model::{Edge, Node, check_consistency};
use crate::registry::{FALLBACK_NODE_TYPE, TypeRegistry};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

pub const SNAPSHOT_VERSION: &str = "1.0";

/// Export payload. Absent optional fields serialize as explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub version: String,
    #[serde(rename = "exportedAt")]
    pub exported_at: String,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl Snapshot {
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let text = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(text)
    }
}

pub fn export_snapshot(nodes: &[Node], edges: &[Edge]) -> Snapshot {
    export_snapshot_at(nodes, edges, Utc::now())
}

pub fn export_snapshot_at(nodes: &[Node], edges: &[Edge], exported_at: DateTime<Utc>) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION.to_string(),
        exported_at: exported_at.to_rfc3339_opts(SecondsFormat::Millis, true),
        nodes: nodes.to_vec(),
        edges: edges.to_vec(),
    }
}

pub fn import_snapshot(text: &str, registry: &TypeRegistry) -> Result<ImportedGraph> {
    let doc = parse_json(text)?;
    let Some(root) = doc.as_object() else {
        return Err(structural("root must be an object"));
    };
    let Some(raw_nodes) = root.get("nodes").and_then(Value::as_array) else {
        return Err(structural("nodes must be an array"));
    };
    let Some(raw_edges) = root.get("edges").and_then(Value::as_array) else {
        return Err(structural("edges must be an array"));
    };

    let nodes = raw_nodes
        .iter()
        .enumerate()
        .map(|(idx, raw)| read_node(idx, raw, registry))
        .collect::<Result<Vec<_>>>()?;
    let edges = raw_edges
        .iter()
        .enumerate()
        .map(|(idx, raw)| read_edge(idx, raw, registry))
        .collect::<Result<Vec<_>>>()?;
    check_consistency(&nodes, &edges)?;

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        "imported snapshot"
    );
    Ok(ImportedGraph { nodes, edges })
}

fn structural(message: &str) -> Error {
    Error::Structural {
        message: message.to_string(),
    }
}

fn read_node(idx: usize, raw: &Value, registry: &TypeRegistry) -> Result<Node> {
    let invalid = |node_id: String, message: &str| Error::InvalidNode {
        node_id,
        message: message.to_string(),
    };

    let Some(obj) = raw.as_object() else {
        return Err(invalid(format!("#{idx}"), "node must be an object"));
    };
    let Some(id) = str_field(obj, "id") else {
        return Err(invalid(format!("#{idx}"), "id must be a string"));
    };
    let Some(name) = str_field(obj, "name") else {
        return Err(invalid(id.to_string(), "name must be a string"));
    };
    let Some(x) = obj.get("x").and_then(Value::as_f64) else {
        return Err(invalid(id.to_string(), "x must be a number"));
    };
    let Some(y) = obj.get("y").and_then(Value::as_f64) else {
        return Err(invalid(id.to_string(), "y must be a number"));
    };

    let node_type = str_field(obj, "type")
        .filter(|ty| registry.is_node_type(ty))
        .unwrap_or(FALLBACK_NODE_TYPE);

    let mut node = Node::new(id, name, node_type)
        .with_namespace(str_field(obj, "namespace"))
        .with_position(x, y);
    node.width = obj.get("width").and_then(Value::as_f64);
    node.height = obj.get("height").and_then(Value::as_f64);
    Ok(node)
}

fn read_edge(idx: usize, raw: &Value, registry: &TypeRegistry) -> Result<Edge> {
    let invalid = |edge_id: String, message: &str| Error::InvalidEdge {
        edge_id,
        message: message.to_string(),
    };

    let Some(obj) = raw.as_object() else {
        return Err(invalid(format!("#{idx}"), "edge must be an object"));
    };
    let Some(id) = str_field(obj, "id") else {
        return Err(invalid(format!("#{idx}"), "id must be a string"));
    };
    let Some(source) = str_field(obj, "source") else {
        return Err(invalid(id.to_string(), "source must be a string"));
    };
    let Some(target) = str_field(obj, "target") else {
        return Err(invalid(id.to_string(), "target must be a string"));
    };

    let edge_type = str_field(obj, "type").filter(|ty| registry.is_integration_type(ty));
    Ok(Edge::new(id, source, target)
        .with_type(edge_type)
        .with_label(str_field(obj, "label")))
}

fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}
