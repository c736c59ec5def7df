use crate::layout::{COL_GAP, DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH, LAYOUT_MARGIN, ROW_GAP};
use crate::*;

fn nodes(ids: &[&str]) -> Vec<Node> {
    ids.iter().map(|id| Node::new(*id, *id, "go")).collect()
}

fn edges(pairs: &[(&str, &str)]) -> Vec<Edge> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, (s, t))| Edge::new(format!("e{i}"), *s, *t))
        .collect()
}

fn position(laid_out: &[Node], id: &str) -> (f64, f64) {
    let n = laid_out.iter().find(|n| n.id == id).unwrap();
    (n.x, n.y)
}

#[test]
fn linear_chain_depths_increase_by_one() {
    let ns = nodes(&["a", "b", "c", "d"]);
    let es = edges(&[("a", "b"), ("b", "c"), ("c", "d")]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 1, 2, 3]);
}

#[test]
fn diamond_uses_longest_path() {
    let ns = nodes(&["a", "b", "c", "d"]);
    let es = edges(&[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 1, 1, 2]);
}

#[test]
fn later_longer_path_pushes_depth_further() {
    // a -> d directly, and a -> b -> c -> d.
    let ns = nodes(&["a", "d", "b", "c"]);
    let es = edges(&[("a", "d"), ("a", "b"), ("b", "c"), ("c", "d")]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 3, 1, 2]);
}

#[test]
fn isolated_nodes_and_closed_cycles_fall_back_to_zero() {
    let ns = nodes(&["lonely", "x", "y"]);
    let es = edges(&[("x", "y"), ("y", "x")]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 0, 0]);
}

#[test]
fn cycle_entered_from_a_source_continues_past_its_entry() {
    let ns = nodes(&["root", "x", "y"]);
    let es = edges(&[("root", "x"), ("x", "y"), ("y", "x")]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 1, 2]);
}

#[test]
fn nodes_downstream_of_a_cycle_sit_right_of_it() {
    let ns = nodes(&["root", "x", "y", "z"]);
    let es = edges(&[("root", "x"), ("x", "y"), ("y", "x"), ("y", "z")]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 1, 2, 3]);

    let out = layout_nodes(&ns, &es, &LayoutOptions::default());
    assert!(position(&out, "y").0 < position(&out, "z").0);
}

#[test]
fn cycle_sweep_uses_the_deepest_settled_predecessor() {
    // "late" is released by the first pass at depth 2 and feeds the cycle alongside "root".
    let ns = nodes(&["root", "mid", "late", "x", "y"]);
    let es = edges(&[
        ("root", "mid"),
        ("mid", "late"),
        ("root", "x"),
        ("late", "x"),
        ("x", "y"),
        ("y", "x"),
    ]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 1, 2, 3, 4]);
}

#[test]
fn closed_cycle_beside_a_reached_one_stays_at_zero() {
    let ns = nodes(&["root", "x", "y", "p", "q"]);
    let es = edges(&[("root", "x"), ("x", "y"), ("y", "x"), ("p", "q"), ("q", "p")]);
    assert_eq!(assign_depths(&ns, &es), vec![0, 1, 2, 0, 0]);
}

#[test]
fn columns_and_rows_use_margin_gaps_and_sizes() {
    let mut ns = nodes(&["a", "b", "c"]);
    ns[1].width = Some(300.0);
    ns[1].height = Some(100.0);
    let es = edges(&[("a", "b"), ("a", "c")]);

    let out = layout_nodes(&ns, &es, &LayoutOptions::default());

    assert_eq!(position(&out, "a"), (LAYOUT_MARGIN, LAYOUT_MARGIN));
    let col1 = LAYOUT_MARGIN + DEFAULT_NODE_WIDTH + COL_GAP;
    assert_eq!(position(&out, "b"), (col1, LAYOUT_MARGIN));
    assert_eq!(
        position(&out, "c"),
        (col1, LAYOUT_MARGIN + 100.0 + ROW_GAP)
    );
}

#[test]
fn column_width_is_the_widest_member() {
    let mut ns = nodes(&["a", "b", "c", "d"]);
    ns[1].width = Some(400.0);
    let es = edges(&[("a", "b"), ("a", "c"), ("c", "d")]);

    let out = layout_nodes(&ns, &es, &LayoutOptions::default());
    let col1 = LAYOUT_MARGIN + DEFAULT_NODE_WIDTH + COL_GAP;
    assert_eq!(position(&out, "d").0, col1 + 400.0 + COL_GAP);
}

#[test]
fn namespaces_group_within_a_column_and_empty_sorts_first() {
    let ns = vec![
        Node::new("p", "P", "go").with_namespace(Some("payments")),
        Node::new("o", "O", "go"),
        Node::new("b", "B", "go").with_namespace(Some("billing")),
        Node::new("p2", "P2", "go").with_namespace(Some("payments")),
        Node::new("o2", "O2", "go"),
    ];
    let out = layout_nodes(&ns, &[], &LayoutOptions::default());

    let mut by_y: Vec<&Node> = out.iter().collect();
    by_y.sort_by(|a, b| a.y.total_cmp(&b.y));
    let order: Vec<&str> = by_y.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(order, vec!["o", "o2", "b", "p", "p2"]);

    let step = DEFAULT_NODE_HEIGHT + ROW_GAP;
    assert_eq!(position(&out, "o2").1, LAYOUT_MARGIN + step);
}

#[test]
fn layout_only_touches_positions() {
    let mut ns = nodes(&["a", "b"]);
    ns[0].namespace = Some("edge".to_string());
    ns[1].width = Some(10.0);
    let es = edges(&[("a", "b")]);

    let out = layout_nodes(&ns, &es, &LayoutOptions::default());
    for (before, after) in ns.iter().zip(&out) {
        let mut moved = before.clone();
        moved.x = after.x;
        moved.y = after.y;
        assert_eq!(&moved, after);
    }
}

#[test]
fn layout_is_deterministic() {
    let mut ns = Vec::new();
    for i in 0..60 {
        let ns_name = match i % 3 {
            0 => None,
            1 => Some("alpha"),
            _ => Some("beta"),
        };
        ns.push(Node::new(format!("n{i}"), format!("N{i}"), "go").with_namespace(ns_name));
    }
    let mut es = Vec::new();
    for i in 0..60 {
        for step in [1, 7, 13] {
            let j = i + step;
            if j < 60 {
                es.push(Edge::new(format!("e{i}-{j}"), format!("n{i}"), format!("n{j}")));
            }
        }
    }

    let first = layout_nodes(&ns, &es, &LayoutOptions::default());
    let second = layout_nodes(&ns, &es, &LayoutOptions::default());
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}
