use crate::registry::FALLBACK_NODE_TYPE;
use crate::*;

#[test]
fn builtin_registry_knows_common_types() {
    let reg = TypeRegistry::builtin();
    assert!(reg.is_node_type("redis"));
    assert!(reg.is_node_type("nodejs"));
    assert!(reg.is_node_type(FALLBACK_NODE_TYPE));
    assert!(reg.is_integration_type("cache"));
    assert!(reg.is_integration_type("http"));
    assert!(!reg.is_node_type("cache"));
    assert!(!reg.is_integration_type("redis"));
}

#[test]
fn fallback_node_type_is_dashed() {
    let reg = TypeRegistry::builtin();
    let info = reg.node_type(FALLBACK_NODE_TYPE).unwrap();
    assert!(info.dashed);
    assert!(!reg.node_type("postgres").unwrap().dashed);
}

#[test]
fn extended_registry_flows_into_validation() {
    let reg = TypeRegistry::builtin().clone().with_node_type(
        "clickhouse",
        NodeTypeInfo {
            label: "ClickHouse",
            fill: "#fffde7",
            stroke: "#fbc02d",
            text: "#1f2937",
            icon: "database",
            dashed: false,
        },
    );
    let doc = serde_json::json!({
        "services": [{ "id": "olap", "name": "OLAP", "type": "clickhouse" }]
    });

    assert!(validate_service_schema(&doc, &reg).is_empty());
    assert_eq!(
        validate_service_schema(&doc, TypeRegistry::builtin()).len(),
        1
    );
    assert_eq!(reg.node_type_keys().last(), Some("clickhouse"));
}

#[test]
fn node_label_falls_back_to_key() {
    let reg = TypeRegistry::builtin();
    assert_eq!(reg.node_label("redis"), "Redis");
    assert_eq!(reg.node_label("no-such-type"), "no-such-type");
}
