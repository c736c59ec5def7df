#![forbid(unsafe_code)]

//! Headless data core for service-dependency diagrams.
//!
//! Nodes are services, datastores and brokers; edges are directed integrations between them.
//! This crate owns:
//! - the type registry (display metadata keyed by node/integration type)
//! - the service-schema validator
//! - the canonical graph model and its CRUD operations
//! - dependency-depth auto-layout and derived namespace groups
//! - import/export translators (service schema, flat snapshot, diagram markup)
//!
//! Everything here is synchronous, pure computation over in-memory data. Rendering and I/O belong
//! to the caller.

pub mod error;
pub mod formats;
pub mod groups;
pub mod layout;
pub mod model;
pub mod registry;
pub mod schema;

pub use error::{Error, Result};
pub use formats::{
    ImportedGraph, Snapshot, export_markup, export_service_schema, export_snapshot,
    export_snapshot_at, import_service_schema, import_snapshot,
};
pub use groups::{GroupCache, GroupOptions, NamespaceGroup, namespace_groups};
pub use layout::{LayoutOptions, assign_depths, layout_nodes};
pub use model::{Edge, EdgePatch, Graph, Node, NodePatch};
pub use registry::{IntegrationTypeInfo, NodeTypeInfo, TypeRegistry};
pub use schema::{SchemaError, validate_service_schema};
