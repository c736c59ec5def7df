//! Hierarchical "service schema": services with their integrations nested underneath.
//!
//! Import is strict. The document is validated first and nothing is built unless the report is
//! empty; construction then re-checks types against the registry and resolves every integration
//! target, failing on the first problem. The result is laid out before it is returned.

use super::{ImportedGraph, parse_json};
use crate::error::{Error, Result};
use crate::layout::{LayoutOptions, layout_nodes};
use crate::model::{Edge, Node, check_consistency};
use crate::registry::TypeRegistry;
use crate::schema::validate_service_schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

pub const SERVICE_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceSchema {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub services: Vec<Service>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integrations: Option<Vec<Integration>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Integration {
    pub target: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub integration_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

pub fn import_service_schema(
    text: &str,
    registry: &TypeRegistry,
    options: &LayoutOptions,
) -> Result<ImportedGraph> {
    let doc = parse_json(text)?;
    check_structure(&doc)?;

    let errors = validate_service_schema(&doc, registry);
    if !errors.is_empty() {
        tracing::debug!(errors = errors.len(), "service schema rejected");
        return Err(Error::Validation { errors });
    }

    let schema: ServiceSchema = serde_json::from_value(doc).map_err(|err| Error::Parse {
        message: err.to_string(),
    })?;
    let (nodes, edges) = build(&schema, registry)?;
    check_consistency(&nodes, &edges)?;

    let nodes = layout_nodes(&nodes, &edges, options);
    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        "imported service schema"
    );
    Ok(ImportedGraph { nodes, edges })
}

fn check_structure(doc: &Value) -> Result<()> {
    let Some(root) = doc.as_object() else {
        return Err(Error::Structural {
            message: "root must be an object".to_string(),
        });
    };
    if !root.get("services").is_some_and(Value::is_array) {
        return Err(Error::Structural {
            message: "services must be an array".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn build(
    schema: &ServiceSchema,
    registry: &TypeRegistry,
) -> Result<(Vec<Node>, Vec<Edge>)> {
    let known: HashSet<&str> = schema.services.iter().map(|s| s.id.as_str()).collect();

    let mut nodes = Vec::with_capacity(schema.services.len());
    let mut edges = Vec::new();
    for service in &schema.services {
        if !registry.is_node_type(&service.service_type) {
            return Err(Error::UnknownNodeType {
                service_id: service.id.clone(),
                node_type: service.service_type.clone(),
            });
        }
        nodes.push(
            Node::new(&service.id, &service.name, &service.service_type)
                .with_namespace(service.namespace.as_deref()),
        );

        for integration in service.integrations.iter().flatten() {
            if !known.contains(integration.target.as_str()) {
                return Err(Error::MissingTarget {
                    service_id: service.id.clone(),
                    target: integration.target.clone(),
                });
            }
            if let Some(ty) = integration.integration_type.as_deref() {
                if !registry.is_integration_type(ty) {
                    return Err(Error::UnknownIntegrationType {
                        service_id: service.id.clone(),
                        integration_type: ty.to_string(),
                    });
                }
            }
            edges.push(
                Edge::new(
                    format!("edge-{}", edges.len() + 1),
                    &service.id,
                    &integration.target,
                )
                .with_type(integration.integration_type.as_deref())
                .with_label(integration.label.as_deref()),
            );
        }
    }

    Ok((nodes, edges))
}

/// Nests each edge under its source node. Positions and sizes are not part of this format.
pub fn export_service_schema(nodes: &[Node], edges: &[Edge]) -> ServiceSchema {
    let mut integrations: IndexMap<&str, Vec<Integration>> = IndexMap::new();
    for e in edges {
        integrations
            .entry(e.source.as_str())
            .or_default()
            .push(Integration {
                target: e.target.clone(),
                integration_type: e.edge_type.clone(),
                label: e.label.clone(),
            });
    }

    let services = nodes
        .iter()
        .map(|n| Service {
            id: n.id.clone(),
            name: n.name.clone(),
            service_type: n.node_type.clone(),
            namespace: n.namespace.clone(),
            integrations: integrations.swap_remove(n.id.as_str()),
        })
        .collect();

    ServiceSchema {
        version: Some(SERVICE_SCHEMA_VERSION.to_string()),
        services,
    }
}
