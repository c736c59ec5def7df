use crate::schema::SchemaError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid JSON: {message}")]
    Parse { message: String },

    #[error("invalid document structure: {message}")]
    Structural { message: String },

    #[error("{}", format_schema_errors(.errors))]
    Validation { errors: Vec<SchemaError> },

    #[error("service {service_id} integrates with unknown service: {target}")]
    MissingTarget { service_id: String, target: String },

    #[error("edge {edge_id} references missing node: {node_id}")]
    MissingEndpoint { edge_id: String, node_id: String },

    #[error("service {service_id} has unknown type: {node_type}")]
    UnknownNodeType {
        service_id: String,
        node_type: String,
    },

    #[error("service {service_id} has an integration with unknown type: {integration_type}")]
    UnknownIntegrationType {
        service_id: String,
        integration_type: String,
    },

    #[error("invalid node {node_id}: {message}")]
    InvalidNode { node_id: String, message: String },

    #[error("invalid edge {edge_id}: {message}")]
    InvalidEdge { edge_id: String, message: String },

    #[error("duplicate node id: {id}")]
    DuplicateNodeId { id: String },

    #[error("duplicate edge id: {id}")]
    DuplicateEdgeId { id: String },

    #[error("node name must not be empty")]
    EmptyName,

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn format_schema_errors(errors: &[SchemaError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
