//! Translators between the canonical model and its external representations.
//!
//! Imports are all-or-nothing: the caller gets a complete, consistent node/edge set or an error,
//! never a partially built graph.

mod markup;
pub(crate) mod service_schema;
mod snapshot;

pub use markup::export_markup;
pub use service_schema::{
    Integration, SERVICE_SCHEMA_VERSION, Service, ServiceSchema, export_service_schema,
    import_service_schema,
};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, export_snapshot, export_snapshot_at, import_snapshot};

use crate::error::{Error, Result};
use crate::model::{Edge, Graph, Node};
use serde_json::Value;

/// Result of a successful import.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl ImportedGraph {
    pub fn into_graph(self) -> Result<Graph> {
        Graph::from_parts(self.nodes, self.edges)
    }

    /// Replaces `graph` wholesale with the imported content.
    pub fn replace_into(self, graph: &mut Graph) -> Result<()> {
        graph.replace(self.nodes, self.edges)
    }
}

fn parse_json(text: &str) -> Result<Value> {
    serde_json::from_str(text).map_err(|err| Error::Parse {
        message: err.to_string(),
    })
}
