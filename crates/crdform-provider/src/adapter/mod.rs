//! Generic adapters over [`CustomResourceKind`]
//!
//! Each kind gets three registered types from the same code:
//! - [`CrdResource`]: managed through server-side apply
//! - [`CrdDataSource`]: read-only lookup of an existing object
//! - [`CrdManifest`]: renders the configured object to YAML, offline

mod data_source;
mod manifest;
mod resource;

pub use data_source::CrdDataSource;
pub use manifest::CrdManifest;
pub use resource::CrdResource;

use serde_json::{Value, json};

use crdform_core::{Attribute, AttributeType, Diagnostics, Schema, resource_id};
use crdform_crds::{CrdObject, CustomResourceKind, ObjectMetadata, metadata_attribute};
use crdform_kube::ResourceRef;

use crate::error::{ProviderError, Result};
use crate::options::{bookkeeping_attributes, id_attribute};

/// `id`, `metadata`, `spec` and the bookkeeping attributes
pub fn resource_schema<K: CustomResourceKind>() -> Schema {
    let object = K::object_schema();
    let mut schema = Schema::new(object.description).with_attribute("id", id_attribute());
    schema.attributes.extend(object.attributes);
    schema.attributes.extend(bookkeeping_attributes());
    schema
}

/// Lookup by `metadata.name` (and namespace); everything else is computed
pub fn data_source_schema<K: CustomResourceKind>() -> Schema {
    let mut metadata = metadata_attribute(K::NAMESPACED);
    if let AttributeType::SingleNested { attributes } = &mut metadata.attr_type {
        for (name, attr) in attributes.iter_mut() {
            *attr = match name.as_str() {
                "name" | "namespace" => Attribute {
                    requires_replace: false,
                    ..attr.clone()
                },
                _ => attr.clone().into_computed(),
            };
        }
    }

    let spec = Attribute::single_nested(K::spec_attributes())
        .into_computed()
        .describe("Specification of the object as stored in the cluster.");

    Schema::new(K::DESCRIPTION)
        .with_attribute("id", id_attribute())
        .with_attribute("metadata", metadata)
        .with_attribute("spec", spec)
}

/// Object attributes plus the rendered `yaml`
pub fn manifest_schema<K: CustomResourceKind>() -> Schema {
    let object = K::object_schema();
    let mut schema = Schema::new(format!(
        "{} Renders the object as a YAML manifest without contacting a cluster.",
        object.description
    ))
    .with_attribute("id", id_attribute());
    schema.attributes.extend(object.attributes);
    schema.with_attribute(
        "yaml",
        Attribute::string()
            .computed()
            .state_only()
            .describe("The generated manifest in YAML format."),
    )
}

/// Reject a configuration before anything else happens
fn check_config(schema: &Schema, config: &Value) -> Result<()> {
    let diags = schema.validate_config(config);
    if diags.has_error() {
        return Err(ProviderError::InvalidConfig(diags));
    }
    Ok(())
}

/// Typed object for a state value, with `apiVersion` and `kind` injected
fn object_from_state<K: CustomResourceKind>(
    schema: &Schema,
    state: &Value,
) -> Result<CrdObject<K::Spec>> {
    let mut wire = schema.to_wire(state)?;
    if let Some(obj) = wire.as_object_mut() {
        obj.insert("apiVersion".to_string(), json!(K::api_version()));
        obj.insert("kind".to_string(), json!(K::KIND));
    }
    serde_json::from_value(wire).map_err(|e| ProviderError::Marshal(e.to_string()))
}

/// State value for an object returned by the API server
fn state_from_object<K: CustomResourceKind>(schema: &Schema, object: &Value) -> Result<Value> {
    let typed: CrdObject<K::Spec> = serde_json::from_value(object.clone())
        .map_err(|e| ProviderError::Unmarshal(e.to_string()))?;
    let wire = serde_json::to_value(&typed).map_err(|e| ProviderError::Marshal(e.to_string()))?;
    Ok(schema.to_state(&wire)?)
}

/// `metadata.name` / `metadata.namespace` of a state or config value
fn identity<K: CustomResourceKind>(state: &Value) -> Result<ObjectMetadata> {
    let metadata: ObjectMetadata = state
        .get("metadata")
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| ProviderError::Unmarshal(e.to_string()))?
        .unwrap_or_default();

    let mut diags = Diagnostics::new();
    if metadata.name.is_empty() {
        diags.add_attribute_error(
            "metadata.name",
            "Missing required argument",
            "The argument \"metadata.name\" is required, but no definition was found.",
        );
    }
    if K::NAMESPACED && metadata.namespace.as_deref().unwrap_or_default().is_empty() {
        diags.add_attribute_error(
            "metadata.namespace",
            "Missing required argument",
            "The argument \"metadata.namespace\" is required, but no definition was found.",
        );
    }
    if diags.has_error() {
        return Err(ProviderError::InvalidConfig(diags));
    }
    Ok(metadata)
}

fn resource_ref<K: CustomResourceKind>(metadata: &ObjectMetadata) -> ResourceRef {
    ResourceRef::new(
        K::GROUP,
        K::VERSION,
        K::KIND,
        K::PLURAL,
        namespace_of::<K>(metadata).map(str::to_string),
        metadata.name.clone(),
    )
}

fn namespace_of<K: CustomResourceKind>(metadata: &ObjectMetadata) -> Option<&str> {
    if K::NAMESPACED {
        metadata.namespace.as_deref()
    } else {
        None
    }
}

fn object_id<K: CustomResourceKind>(metadata: &ObjectMetadata) -> String {
    resource_id(namespace_of::<K>(metadata), &metadata.name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdform_crds::{ClusterPolicy, MiniCluster};

    #[test]
    fn test_resource_schema_layout() {
        let schema = resource_schema::<MiniCluster>();
        let names: Vec<_> = schema.attributes.keys().map(String::as_str).collect();
        assert_eq!(
            names,
            [
                "id",
                "metadata",
                "spec",
                "field_manager",
                "force_conflicts",
                "wait_for_upsert",
                "wait_for_delete"
            ]
        );
        assert!(schema.attribute("id").unwrap().computed);
    }

    #[test]
    fn test_data_source_schema_lookup_keys() {
        let schema = data_source_schema::<MiniCluster>();
        let name = schema.attribute("metadata.name").unwrap();
        assert!(name.required && !name.requires_replace);
        assert!(schema.attribute("metadata.namespace").unwrap().required);
        assert!(schema.attribute("metadata.labels").unwrap().computed);
        assert!(schema.attribute("spec.size").unwrap().computed);
        assert!(!schema.attribute("spec.containers").unwrap().required);
    }

    #[test]
    fn test_manifest_schema() {
        let schema = manifest_schema::<ClusterPolicy>();
        assert!(schema.attribute("metadata.name").unwrap().required);
        assert!(schema.attribute("metadata.namespace").is_none());
        assert!(schema.attribute("yaml").unwrap().computed);
        assert!(schema.attribute("field_manager").is_none());
    }

    #[test]
    fn test_identity_requires_namespace_for_namespaced_kinds() {
        let state = json!({ "metadata": { "name": "flux-sample" } });
        assert!(matches!(
            identity::<MiniCluster>(&state),
            Err(ProviderError::InvalidConfig(_))
        ));
        let metadata = identity::<ClusterPolicy>(&state).unwrap();
        assert_eq!(object_id::<ClusterPolicy>(&metadata), "flux-sample");

        match identity::<ClusterPolicy>(&json!({ "metadata": {} })) {
            Err(ProviderError::InvalidConfig(diags)) => {
                let diag = diags.errors().next().unwrap();
                assert_eq!(diag.attribute.as_deref(), Some("metadata.name"));
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_object_from_state_injects_identity() {
        let schema = resource_schema::<MiniCluster>();
        let state = json!({
            "id": "ignored",
            "field_manager": "me",
            "metadata": { "name": "flux-sample", "namespace": "flux-operator" },
            "spec": { "size": 2, "containers": [{ "image": "flux", "working_dir": "/data" }] }
        });
        let object = object_from_state::<MiniCluster>(&schema, &state).unwrap();
        assert_eq!(object.api_version, "flux-framework.org/v1alpha1");
        assert_eq!(object.kind, "MiniCluster");

        let wire = serde_json::to_value(&object).unwrap();
        assert_eq!(wire["spec"]["containers"][0]["workingDir"], "/data");
        assert!(wire.get("field_manager").is_none());
        assert!(wire.get("id").is_none());
    }

    #[test]
    fn test_state_from_object_drops_server_fields() {
        let schema = resource_schema::<MiniCluster>();
        let state = state_from_object::<MiniCluster>(
            &schema,
            &json!({
                "apiVersion": "flux-framework.org/v1alpha1",
                "kind": "MiniCluster",
                "metadata": { "name": "flux-sample", "namespace": "flux-operator", "uid": "1" },
                "spec": { "size": 2, "flux": { "logLevel": 6 } },
                "status": { "size": 2 }
            }),
        )
        .unwrap();
        assert_eq!(
            state,
            json!({
                "metadata": { "name": "flux-sample", "namespace": "flux-operator" },
                "spec": { "size": 2, "flux": { "log_level": 6 } }
            })
        );
    }
}
