//! Dependency-depth auto-layout.
//!
//! Nodes are layered into columns by their depth: the length of the longest path from any node
//! without incoming edges. Columns run left to right by ascending depth; within a column nodes are
//! stably sorted by namespace so members of a namespace sit together.
//!
//! The pass is a pure function of its input. Map iteration never leaks into the output: columns
//! are keyed by a `BTreeMap` and the per-column order starts from input order.

use crate::model::{Edge, Node};
use rustc_hash::FxHashMap;
use std::collections::{BTreeMap, VecDeque};

pub const LAYOUT_MARGIN: f64 = 40.0;
pub const COL_GAP: f64 = 120.0;
pub const ROW_GAP: f64 = 40.0;
pub const DEFAULT_NODE_WIDTH: f64 = 180.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 64.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    pub margin: f64,
    pub column_gap: f64,
    pub row_gap: f64,
    pub default_node_width: f64,
    pub default_node_height: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            margin: LAYOUT_MARGIN,
            column_gap: COL_GAP,
            row_gap: ROW_GAP,
            default_node_width: DEFAULT_NODE_WIDTH,
            default_node_height: DEFAULT_NODE_HEIGHT,
        }
    }
}

impl LayoutOptions {
    pub fn node_width(&self, node: &Node) -> f64 {
        node.width.unwrap_or(self.default_node_width)
    }

    pub fn node_height(&self, node: &Node) -> f64 {
        node.height.unwrap_or(self.default_node_height)
    }
}

/// Depth per node, in node order.
///
/// Sources start at depth 0 and depths are relaxed breadth-first: a node is released once all of
/// its predecessors are final, so each depth is the longest path to it.
///
/// Nodes on or behind a cycle are never released by that pass. A second breadth-first sweep starts
/// from the released nodes and settles each remaining reachable node exactly once, at one past the
/// deepest predecessor settled before it. Nodes no source can reach stay at 0.
pub fn assign_depths(nodes: &[Node], edges: &[Edge]) -> Vec<usize> {
    let index: FxHashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();

    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    let mut incoming: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
    for e in edges {
        let (Some(&s), Some(&t)) = (index.get(e.source.as_str()), index.get(e.target.as_str()))
        else {
            continue;
        };
        outgoing[s].push(t);
        incoming[t].push(s);
    }

    let mut pending: Vec<usize> = incoming.iter().map(Vec::len).collect();
    let mut depth = vec![0usize; nodes.len()];
    let mut queue: VecDeque<usize> = (0..nodes.len()).filter(|&i| pending[i] == 0).collect();

    while let Some(u) = queue.pop_front() {
        for &v in &outgoing[u] {
            depth[v] = depth[v].max(depth[u] + 1);
            pending[v] -= 1;
            if pending[v] == 0 {
                queue.push_back(v);
            }
        }
    }

    let mut settled: Vec<bool> = pending.iter().map(|&p| p == 0).collect();
    if settled.iter().all(|&s| s) {
        return depth;
    }

    let mut queued = settled.clone();
    let mut queue: VecDeque<usize> = VecDeque::new();
    for u in (0..nodes.len()).filter(|&u| settled[u]) {
        for &v in &outgoing[u] {
            if !queued[v] {
                queued[v] = true;
                queue.push_back(v);
            }
        }
    }

    while let Some(v) = queue.pop_front() {
        depth[v] = incoming[v]
            .iter()
            .filter(|&&p| settled[p])
            .map(|&p| depth[p] + 1)
            .max()
            .unwrap_or(0);
        settled[v] = true;
        for &w in &outgoing[v] {
            if !queued[w] {
                queued[w] = true;
                queue.push_back(w);
            }
        }
    }

    let unreached = settled.iter().filter(|&&s| !s).count();
    if unreached > 0 {
        tracing::trace!(unreached, "nodes on closed cycles placed in the first column");
    }
    depth
}

/// Returns a copy of `nodes` with fresh `x`/`y`; every other field is untouched.
pub fn layout_nodes(nodes: &[Node], edges: &[Edge], options: &LayoutOptions) -> Vec<Node> {
    let depths = assign_depths(nodes, edges);

    let mut columns: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &d) in depths.iter().enumerate() {
        columns.entry(d).or_default().push(i);
    }

    let mut out = nodes.to_vec();
    let mut x = options.margin;
    for members in columns.values_mut() {
        // Stable: ties (most often "no namespace") keep input order.
        members.sort_by(|&a, &b| {
            let na = nodes[a].namespace.as_deref().unwrap_or("");
            let nb = nodes[b].namespace.as_deref().unwrap_or("");
            na.cmp(nb)
        });

        let mut y = options.margin;
        let mut column_width: f64 = 0.0;
        for &i in members.iter() {
            out[i].x = x;
            out[i].y = y;
            y += options.node_height(&nodes[i]) + options.row_gap;
            column_width = column_width.max(options.node_width(&nodes[i]));
        }
        x += column_width + options.column_gap;
    }

    tracing::debug!(
        nodes = nodes.len(),
        edges = edges.len(),
        columns = columns.len(),
        "computed layout"
    );
    out
}
