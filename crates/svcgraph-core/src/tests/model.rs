use crate::model::{DEFAULT_NODE_POSITION, slugify};
use crate::*;
use std::collections::HashSet;

fn sample() -> Graph {
    Graph::from_parts(
        vec![
            Node::new("a", "A", "nodejs"),
            Node::new("b", "B", "redis"),
            Node::new("c", "C", "postgres"),
        ],
        vec![
            Edge::new("e1", "a", "b"),
            Edge::new("e2", "a", "c"),
            Edge::new("e3", "c", "b"),
        ],
    )
    .unwrap()
}

#[test]
fn add_node_uses_slug_and_random_suffix() {
    let mut g = Graph::new();
    let id = g.add_node("Payments API", "nodejs", Some("billing"));

    let (slug, token) = id.rsplit_once('-').unwrap();
    assert_eq!(slug, "payments-api");
    assert!(token.len() >= 5);
    assert!(
        token
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
    );

    let node = g.node(&id).unwrap();
    assert_eq!(node.name, "Payments API");
    assert_eq!(node.namespace.as_deref(), Some("billing"));
    assert_eq!((node.x, node.y), DEFAULT_NODE_POSITION);
    assert_eq!((node.width, node.height), (None, None));
}

#[test]
fn generated_node_ids_never_collide() {
    let mut g = Graph::new();
    let mut ids = HashSet::new();
    for _ in 0..10_000 {
        assert!(ids.insert(g.add_node("svc", "go", None)));
    }
    assert_eq!(g.nodes().len(), 10_000);
}

#[test]
fn try_add_node_checks_type_and_name() {
    let reg = TypeRegistry::builtin();
    let mut g = Graph::new();

    assert!(matches!(
        g.try_add_node(reg, "Cache", "memcached-ish", None),
        Err(Error::UnknownNodeType { .. })
    ));
    assert!(matches!(
        g.try_add_node(reg, "   ", "redis", None),
        Err(Error::EmptyName)
    ));
    assert!(g.nodes().is_empty());

    let id = g.try_add_node(reg, "Cache", "redis", None).unwrap();
    assert_eq!(g.node(&id).unwrap().node_type, "redis");
}

#[test]
fn slugify_collapses_separators() {
    assert_eq!(slugify("  Order  Service v2! "), "order-service-v2");
    assert_eq!(slugify("***"), "node");
}

#[test]
fn update_node_merges_only_given_fields() {
    let mut g = sample();
    g.update_node(
        "a",
        NodePatch {
            namespace: Some(Some("edge".to_string())),
            width: Some(Some(240.0)),
            ..Default::default()
        },
    );
    g.update_node("a", NodePatch::position(10.0, 20.0));

    let a = g.node("a").unwrap();
    assert_eq!(a.name, "A");
    assert_eq!(a.node_type, "nodejs");
    assert_eq!(a.namespace.as_deref(), Some("edge"));
    assert_eq!(a.width, Some(240.0));
    assert_eq!(a.height, None);
    assert_eq!((a.x, a.y), (10.0, 20.0));
}

#[test]
fn update_node_clears_namespace() {
    let mut g = sample();
    g.update_node(
        "b",
        NodePatch {
            namespace: Some(Some("data".to_string())),
            ..Default::default()
        },
    );
    g.update_node(
        "b",
        NodePatch {
            namespace: Some(Some(String::new())),
            ..Default::default()
        },
    );
    assert_eq!(g.node("b").unwrap().namespace, None);

    g.update_node(
        "b",
        NodePatch {
            namespace: Some(Some("data".to_string())),
            ..Default::default()
        },
    );
    g.update_node(
        "b",
        NodePatch {
            namespace: Some(None),
            ..Default::default()
        },
    );
    assert_eq!(g.node("b").unwrap().namespace, None);
}

#[test]
fn update_node_refuses_non_finite_geometry() {
    let mut g = sample();
    let before = (g.node("a").unwrap().clone(), g.revision());

    assert!(!g.update_node("a", NodePatch::position(f64::NAN, 20.0)));
    assert!(!g.update_node("a", NodePatch::position(10.0, f64::INFINITY)));
    assert!(!g.update_node(
        "a",
        NodePatch {
            name: Some("renamed".to_string()),
            width: Some(Some(f64::NEG_INFINITY)),
            ..Default::default()
        },
    ));
    assert_eq!((g.node("a").unwrap().clone(), g.revision()), before);

    // Whatever update_node accepts survives a snapshot round trip.
    assert!(g.update_node("a", NodePatch::position(-0.5, 1e300)));
    let json = export_snapshot(g.nodes(), g.edges()).to_json(false).unwrap();
    let back = import_snapshot(&json, TypeRegistry::builtin()).unwrap();
    assert_eq!(back.nodes, g.nodes());
}

#[test]
fn crud_on_unknown_ids_is_a_noop() {
    let mut g = sample();
    let before = (g.nodes().to_vec(), g.edges().to_vec(), g.revision());

    assert!(!g.update_node("zzz", NodePatch::position(1.0, 1.0)));
    assert!(!g.delete_node("zzz"));
    assert!(!g.update_edge("zzz", EdgePatch::default()));
    assert!(!g.delete_edge("zzz"));

    assert_eq!((g.nodes().to_vec(), g.edges().to_vec(), g.revision()), before);
}

#[test]
fn delete_node_cascades_to_incident_edges() {
    let mut g = sample();
    assert!(g.delete_node("b"));

    assert!(g.node("b").is_none());
    assert!(g.edges().iter().all(|e| !e.touches("b")));
    assert_eq!(
        g.edges().iter().map(|e| e.id.as_str()).collect::<Vec<_>>(),
        vec!["e2"]
    );
}

#[test]
fn cascade_holds_for_every_node() {
    let base = sample();
    for node in base.nodes() {
        let mut g = base.clone();
        g.delete_node(&node.id);
        assert_eq!(g.incident_edges(&node.id).count(), 0, "node {}", node.id);
        for e in g.edges() {
            assert!(g.node(&e.source).is_some() && g.node(&e.target).is_some());
        }
    }
}

#[test]
fn add_edge_rejects_either_direction_of_a_connected_pair() {
    let mut g = sample();
    assert_eq!(g.add_edge("a", "b", Some("http")), None);
    assert_eq!(g.add_edge("b", "a", None), None);
    assert_eq!(g.edges().len(), 3);

    g.delete_edge("e1");
    let id = g.add_edge("b", "a", Some("cache")).unwrap();
    let edge = g.edge(&id).unwrap();
    assert_eq!((edge.source.as_str(), edge.target.as_str()), ("b", "a"));
    assert_eq!(edge.edge_type.as_deref(), Some("cache"));
}

#[test]
fn add_edge_requires_existing_endpoints() {
    let mut g = sample();
    assert_eq!(g.add_edge("a", "ghost", None), None);
    assert_eq!(g.add_edge("ghost", "a", None), None);
    assert_eq!(g.edges().len(), 3);
}

#[test]
fn update_edge_merges_type_and_label() {
    let mut g = sample();
    g.update_edge(
        "e1",
        EdgePatch {
            label: Some(Some("reads".to_string())),
            ..Default::default()
        },
    );
    g.update_edge(
        "e1",
        EdgePatch {
            edge_type: Some(Some("cache".to_string())),
            ..Default::default()
        },
    );
    let e = g.edge("e1").unwrap();
    assert_eq!(e.label.as_deref(), Some("reads"));
    assert_eq!(e.edge_type.as_deref(), Some("cache"));

    g.update_edge(
        "e1",
        EdgePatch {
            label: Some(None),
            ..Default::default()
        },
    );
    assert_eq!(g.edge("e1").unwrap().label, None);
}

#[test]
fn replace_rejects_inconsistent_parts_and_keeps_old_graph() {
    let mut g = sample();
    let revision = g.revision();

    let err = g
        .replace(
            vec![Node::new("x", "X", "go")],
            vec![Edge::new("e", "x", "y")],
        )
        .unwrap_err();
    assert!(matches!(err, Error::MissingEndpoint { ref node_id, .. } if node_id == "y"));

    let err = g
        .replace(
            vec![Node::new("x", "X", "go"), Node::new("x", "X2", "go")],
            vec![],
        )
        .unwrap_err();
    assert!(matches!(err, Error::DuplicateNodeId { .. }));

    assert_eq!(g.nodes().len(), 3);
    assert_eq!(g.revision(), revision);

    g.replace(vec![Node::new("x", "X", "go")], vec![]).unwrap();
    assert_eq!(g.nodes().len(), 1);
    assert!(g.edges().is_empty());
    assert!(g.revision() > revision);
}

#[test]
fn apply_layout_writes_positions_back() {
    let mut g = sample();
    g.apply_layout(&LayoutOptions::default());
    let a = g.node("a").unwrap();
    let c = g.node("c").unwrap();
    let b = g.node("b").unwrap();
    assert!(a.x < c.x && c.x < b.x);
}
