//! Every declared attribute must survive the typed record, and every kind
//! must require `metadata.name`.

use crdform_crds::{ClusterPolicy, CrdObject, CustomResourceKind, MiniCluster, Policy, PolicyException};
use serde_json::Value;

fn assert_consistent<K: CustomResourceKind>() {
    let schema = K::object_schema();
    let state = schema.example_state();

    let wire = schema.to_wire(&state).unwrap();
    let object: CrdObject<K::Spec> = serde_json::from_value(wire.clone())
        .unwrap_or_else(|e| panic!("{}: typed record rejects wire form: {}", K::KIND, e));
    let reserialized = serde_json::to_value(&object).unwrap();
    let back = schema.to_state(&reserialized).unwrap();

    assert_eq!(
        back,
        state,
        "{}: attributes lost between schema and typed record",
        K::KIND
    );
}

fn assert_identity<K: CustomResourceKind>() {
    let schema = K::object_schema();
    let name = schema.attribute("metadata.name").unwrap();
    assert!(name.required, "{}: metadata.name must be required", K::KIND);
    assert!(name.requires_replace);

    let namespace = schema.attribute("metadata.namespace");
    assert_eq!(namespace.is_some(), K::NAMESPACED, "{}", K::KIND);
    if let Some(namespace) = namespace {
        assert!(namespace.required && namespace.requires_replace);
    }
    assert_eq!(schema.attribute("spec").unwrap().required, K::SPEC_REQUIRED);
}

#[test]
fn mini_cluster_schema_matches_record() {
    assert_consistent::<MiniCluster>();
    assert_identity::<MiniCluster>();
}

#[test]
fn cluster_policy_schema_matches_record() {
    assert_consistent::<ClusterPolicy>();
    assert_identity::<ClusterPolicy>();
}

#[test]
fn policy_schema_matches_record() {
    assert_consistent::<Policy>();
    assert_identity::<Policy>();
}

#[test]
fn policy_exception_schema_matches_record() {
    assert_consistent::<PolicyException>();
    assert_identity::<PolicyException>();
}

#[test]
fn example_state_sets_nested_wire_names() {
    let schema = MiniCluster::object_schema();
    let wire = schema.to_wire(&schema.example_state()).unwrap();
    let container = &wire["spec"]["containers"][0];
    assert_eq!(container["workingDir"], Value::from("example"));
    assert_eq!(container["commands"]["runFluxAsRoot"], Value::from(true));
    assert!(container.get("working_dir").is_none());
}
