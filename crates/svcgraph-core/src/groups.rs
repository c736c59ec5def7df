//! Namespace group rectangles, derived from node positions.
//!
//! Groups are never stored as independent state: [`namespace_groups`] recomputes them from the
//! nodes, and [`GroupCache`] only memoises that result against [`Graph::revision`].

use crate::layout::LayoutOptions;
use crate::model::{Graph, Node};
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupOptions {
    pub padding: f64,
    /// Extra room above the members for the namespace caption.
    pub header_height: f64,
    pub layout: LayoutOptions,
}

impl Default for GroupOptions {
    fn default() -> Self {
        Self {
            padding: 16.0,
            header_height: 24.0,
            layout: LayoutOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceGroup {
    pub namespace: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub node_ids: Vec<String>,
}

/// One rectangle per namespace, in order of first appearance. Nodes without a namespace are
/// not grouped.
pub fn namespace_groups(nodes: &[Node], options: &GroupOptions) -> Vec<NamespaceGroup> {
    let mut by_ns: IndexMap<&str, Vec<&Node>> = IndexMap::new();
    for node in nodes {
        if let Some(ns) = node.namespace.as_deref() {
            by_ns.entry(ns).or_default().push(node);
        }
    }

    by_ns
        .into_iter()
        .map(|(ns, members)| {
            let mut min_x = f64::INFINITY;
            let mut min_y = f64::INFINITY;
            let mut max_x = f64::NEG_INFINITY;
            let mut max_y = f64::NEG_INFINITY;
            for n in &members {
                min_x = min_x.min(n.x);
                min_y = min_y.min(n.y);
                max_x = max_x.max(n.x + options.layout.node_width(n));
                max_y = max_y.max(n.y + options.layout.node_height(n));
            }

            let top = options.padding + options.header_height;
            NamespaceGroup {
                namespace: ns.to_string(),
                x: min_x - options.padding,
                y: min_y - top,
                width: (max_x - min_x) + options.padding * 2.0,
                height: (max_y - min_y) + top + options.padding,
                node_ids: members.iter().map(|n| n.id.clone()).collect(),
            }
        })
        .collect()
}

/// Memoised groups for a single graph.
#[derive(Debug, Clone, Default)]
pub struct GroupCache {
    cached: Option<(u64, GroupOptions, Vec<NamespaceGroup>)>,
}

impl GroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Groups for the graph's current revision, recomputed only when the revision or the
    /// options moved.
    pub fn groups(&mut self, graph: &Graph, options: &GroupOptions) -> &[NamespaceGroup] {
        let stale = self.cached.as_ref().is_none_or(|(revision, cached_options, _)| {
            *revision != graph.revision() || cached_options != options
        });
        if stale {
            let groups = namespace_groups(graph.nodes(), options);
            self.cached = Some((graph.revision(), *options, groups));
        }
        match &self.cached {
            Some((_, _, groups)) => groups,
            None => &[],
        }
    }
}
