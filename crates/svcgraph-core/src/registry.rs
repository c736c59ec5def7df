//! Static display metadata keyed by node type and integration type.
//!
//! Consumers only ever look keys up; nothing branches on a specific key. Adding a type is a data
//! change: append a row to the built-in table or extend a registry with
//! [`TypeRegistry::with_node_type`] / [`TypeRegistry::with_integration_type`].

use indexmap::IndexMap;
use serde::Serialize;
use std::sync::OnceLock;

/// Node type assigned to flat-snapshot nodes whose type is missing or unknown.
pub const FALLBACK_NODE_TYPE: &str = "external";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTypeInfo {
    pub label: &'static str,
    pub fill: &'static str,
    pub stroke: &'static str,
    pub text: &'static str,
    pub icon: &'static str,
    /// Rendered with a dashed outline.
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntegrationTypeInfo {
    pub label: &'static str,
    pub stroke: &'static str,
    pub text: &'static str,
}

#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    node_types: IndexMap<String, NodeTypeInfo>,
    integration_types: IndexMap<String, IntegrationTypeInfo>,
}

const fn node(
    label: &'static str,
    fill: &'static str,
    stroke: &'static str,
    icon: &'static str,
) -> NodeTypeInfo {
    NodeTypeInfo {
        label,
        fill,
        stroke,
        text: "#1f2937",
        icon,
        dashed: false,
    }
}

const fn integration(label: &'static str, stroke: &'static str) -> IntegrationTypeInfo {
    IntegrationTypeInfo {
        label,
        stroke,
        text: "#374151",
    }
}

const BUILTIN_NODE_TYPES: &[(&str, NodeTypeInfo)] = &[
    ("nodejs", node("Node.js", "#e8f5e9", "#43a047", "nodejs")),
    ("python", node("Python", "#e3f2fd", "#1e88e5", "python")),
    ("go", node("Go", "#e0f7fa", "#00acc1", "go")),
    ("java", node("Java", "#fff3e0", "#fb8c00", "java")),
    ("rust", node("Rust", "#fbe9e7", "#d84315", "rust")),
    ("dotnet", node(".NET", "#ede7f6", "#5e35b1", "dotnet")),
    ("frontend", node("Frontend", "#f3e5f5", "#8e24aa", "browser")),
    ("gateway", node("API Gateway", "#eceff1", "#546e7a", "gateway")),
    ("postgres", node("PostgreSQL", "#e8eaf6", "#3949ab", "database")),
    ("mysql", node("MySQL", "#e1f5fe", "#0277bd", "database")),
    ("mongodb", node("MongoDB", "#f1f8e9", "#558b2f", "database")),
    ("redis", node("Redis", "#ffebee", "#e53935", "cache")),
    ("elasticsearch", node("Elasticsearch", "#fffde7", "#f9a825", "search")),
    ("kafka", node("Kafka", "#fafafa", "#212121", "stream")),
    ("rabbitmq", node("RabbitMQ", "#fff8e1", "#ff6f00", "queue")),
    ("s3", node("Object Storage", "#fff3e0", "#ef6c00", "bucket")),
    (
        FALLBACK_NODE_TYPE,
        NodeTypeInfo {
            label: "External",
            fill: "#f5f5f5",
            stroke: "#9e9e9e",
            text: "#424242",
            icon: "cloud",
            dashed: true,
        },
    ),
];

const BUILTIN_INTEGRATION_TYPES: &[(&str, IntegrationTypeInfo)] = &[
    ("http", integration("HTTP", "#607d8b")),
    ("grpc", integration("gRPC", "#00897b")),
    ("graphql", integration("GraphQL", "#d81b60")),
    ("websocket", integration("WebSocket", "#7cb342")),
    ("database", integration("Database", "#3949ab")),
    ("cache", integration("Cache", "#e53935")),
    ("queue", integration("Queue", "#ff6f00")),
    ("pubsub", integration("Pub/Sub", "#8e24aa")),
    ("storage", integration("Storage", "#ef6c00")),
    ("event", integration("Event", "#6d4c41")),
];

impl TypeRegistry {
    /// An empty registry. Every key is unknown until added.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, initialised once per process.
    pub fn builtin() -> &'static TypeRegistry {
        static BUILTIN: OnceLock<TypeRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let mut reg = TypeRegistry::new();
            for (key, info) in BUILTIN_NODE_TYPES {
                reg.node_types.insert((*key).to_string(), info.clone());
            }
            for (key, info) in BUILTIN_INTEGRATION_TYPES {
                reg.integration_types
                    .insert((*key).to_string(), info.clone());
            }
            reg
        })
    }

    pub fn with_node_type(mut self, key: impl Into<String>, info: NodeTypeInfo) -> Self {
        self.node_types.insert(key.into(), info);
        self
    }

    pub fn with_integration_type(
        mut self,
        key: impl Into<String>,
        info: IntegrationTypeInfo,
    ) -> Self {
        self.integration_types.insert(key.into(), info);
        self
    }

    pub fn node_type(&self, key: &str) -> Option<&NodeTypeInfo> {
        self.node_types.get(key)
    }

    pub fn integration_type(&self, key: &str) -> Option<&IntegrationTypeInfo> {
        self.integration_types.get(key)
    }

    pub fn is_node_type(&self, key: &str) -> bool {
        self.node_types.contains_key(key)
    }

    pub fn is_integration_type(&self, key: &str) -> bool {
        self.integration_types.contains_key(key)
    }

    /// Node type keys in registration order.
    pub fn node_type_keys(&self) -> impl Iterator<Item = &str> {
        self.node_types.keys().map(String::as_str)
    }

    /// Integration type keys in registration order.
    pub fn integration_type_keys(&self) -> impl Iterator<Item = &str> {
        self.integration_types.keys().map(String::as_str)
    }

    /// Display label for a node type, falling back to the raw key.
    pub fn node_label<'a>(&'a self, key: &'a str) -> &'a str {
        self.node_type(key).map(|info| info.label).unwrap_or(key)
    }
}
