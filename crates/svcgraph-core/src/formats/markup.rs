//! Flowchart markup export (Mermaid syntax). Write-only.

use crate::model::{Edge, Node};
use crate::registry::TypeRegistry;
use indexmap::IndexMap;
use std::collections::{HashMap, HashSet};

const INDENT: &str = "    ";

/// Words the flowchart grammar treats as keywords when they appear as a bare id.
const RESERVED_IDS: &[&str] = &[
    "end",
    "graph",
    "flowchart",
    "subgraph",
    "style",
    "class",
    "classdef",
    "click",
    "linkstyle",
    "default",
    "direction",
];

/// Renders nodes (grouped into `subgraph` blocks per namespace) followed by one arrow per edge.
///
/// Ungrouped nodes come first at the top level; namespaces follow in order of first appearance.
pub fn export_markup(nodes: &[Node], edges: &[Edge], registry: &TypeRegistry) -> String {
    let mut ids = IdAllocator::default();
    let node_ids: HashMap<&str, String> = nodes
        .iter()
        .map(|n| (n.id.as_str(), ids.allocate(&n.id)))
        .collect();

    let mut ungrouped: Vec<&Node> = Vec::new();
    let mut grouped: IndexMap<&str, Vec<&Node>> = IndexMap::new();
    for n in nodes {
        match n.namespace.as_deref() {
            Some(ns) => grouped.entry(ns).or_default().push(n),
            None => ungrouped.push(n),
        }
    }

    let mut out = String::from("flowchart LR\n");
    for n in ungrouped {
        push_node_line(&mut out, INDENT, n, &node_ids, registry);
    }
    for (ns, members) in grouped {
        let block_id = ids.allocate(&format!("ns_{ns}"));
        out.push_str(&format!("{INDENT}subgraph {block_id}[\"{}\"]\n", escape(ns)));
        let inner = format!("{INDENT}{INDENT}");
        for n in members {
            push_node_line(&mut out, &inner, n, &node_ids, registry);
        }
        out.push_str(&format!("{INDENT}end\n"));
    }

    for e in edges {
        let source = markup_id_for(&e.source, &node_ids);
        let target = markup_id_for(&e.target, &node_ids);
        match e.edge_type.as_deref().or(e.label.as_deref()) {
            Some(annotation) => out.push_str(&format!(
                "{INDENT}{source} -->|{}| {target}\n",
                escape(annotation)
            )),
            None => out.push_str(&format!("{INDENT}{source} --> {target}\n")),
        }
    }

    out
}

fn push_node_line(
    out: &mut String,
    indent: &str,
    node: &Node,
    node_ids: &HashMap<&str, String>,
    registry: &TypeRegistry,
) {
    let id = markup_id_for(&node.id, node_ids);
    let label = format!("{} ({})", node.name, registry.node_label(&node.node_type));
    out.push_str(&format!("{indent}{id}[\"{}\"]\n", escape(&label)));
}

fn markup_id_for(id: &str, node_ids: &HashMap<&str, String>) -> String {
    node_ids.get(id).cloned().unwrap_or_else(|| sanitize_id(id))
}

/// Hands out markup ids that are unique within one export.
#[derive(Default)]
struct IdAllocator {
    used: HashSet<String>,
}

impl IdAllocator {
    fn allocate(&mut self, raw: &str) -> String {
        let base = sanitize_id(raw);
        let mut candidate = base.clone();
        let mut n = 1;
        while !self.used.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{base}_{n}");
        }
        candidate
    }
}

fn sanitize_id(raw: &str) -> String {
    let mut out: String = raw
        .chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' {
                ch
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        out.push('_');
    }
    if RESERVED_IDS.contains(&out.to_ascii_lowercase().as_str()) {
        out.insert_str(0, "n_");
    }
    out
}

/// Quotes and pipes become entity codes; line breaks become `<br/>` so a declaration never spans
/// lines.
fn escape(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "<br/>")
        .replace('"', "#quot;")
        .replace('|', "#124;")
}
