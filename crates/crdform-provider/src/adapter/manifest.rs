//! YAML rendering of a configured object
//!
//! Works without provider configuration and never contacts a cluster.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::marker::PhantomData;
use std::sync::Arc;

use crdform_core::Schema;
use crdform_crds::CustomResourceKind;

use super::{check_config, identity, manifest_schema, object_from_state, object_id};
use crate::data::ProviderData;
use crate::error::Result;
use crate::framework::DataSource;
use crate::options::ID;

pub struct CrdManifest<K> {
    schema: Schema,
    kind: PhantomData<fn() -> K>,
}

impl<K: CustomResourceKind> CrdManifest<K> {
    pub fn new() -> Self {
        Self {
            schema: manifest_schema::<K>(),
            kind: PhantomData,
        }
    }

    /// The object as a YAML document
    pub fn render(&self, config: &Value) -> Result<String> {
        check_config(&self.schema, config)?;
        let object = object_from_state::<K>(&self.schema, config)?;
        Ok(serde_yaml::to_string(&object)?)
    }
}

impl<K: CustomResourceKind> Default for CrdManifest<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CustomResourceKind> DataSource for CrdManifest<K> {
    fn type_name(&self) -> String {
        format!("{}_manifest", K::type_name())
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn configure(&mut self, _data: Arc<ProviderData>) {}

    async fn read(&self, config: Value) -> Result<Value> {
        let yaml = self.render(&config)?;
        let metadata = identity::<K>(&config)?;

        let mut state = config;
        if let Some(obj) = state.as_object_mut() {
            obj.insert(ID.to_string(), json!(object_id::<K>(&metadata)));
            obj.insert("yaml".to_string(), json!(yaml));
        }
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crdform_crds::{ClusterPolicy, MiniCluster, Policy, PolicyException};

    #[tokio::test]
    async fn test_render_mini_cluster() {
        let manifest = CrdManifest::<MiniCluster>::new();
        assert_eq!(
            manifest.type_name(),
            "k8s_flux_framework_org_mini_cluster_v1alpha1_manifest"
        );

        let state = manifest
            .read(json!({
                "metadata": { "name": "flux-sample", "namespace": "flux-operator" },
                "spec": {
                    "size": 4,
                    "containers": [{ "image": "ghcr.io/flux-framework/flux-restful-api:latest", "run_flux": true }]
                }
            }))
            .await
            .unwrap();

        assert_eq!(state["id"], "flux-operator/flux-sample");
        let yaml = state["yaml"].as_str().unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc["apiVersion"].as_str(), Some("flux-framework.org/v1alpha1"));
        assert_eq!(doc["kind"].as_str(), Some("MiniCluster"));
        assert_eq!(doc["metadata"]["namespace"].as_str(), Some("flux-operator"));
        assert_eq!(doc["spec"]["size"].as_i64(), Some(4));
        assert_eq!(doc["spec"]["containers"][0]["runFlux"].as_bool(), Some(true));
        assert!(yaml.starts_with("apiVersion: flux-framework.org/v1alpha1\nkind: MiniCluster\n"));
    }

    #[tokio::test]
    async fn test_render_cluster_policy() {
        let manifest = CrdManifest::<ClusterPolicy>::new();
        let state = manifest
            .read(json!({
                "metadata": { "name": "require-labels", "labels": { "team": "platform" } },
                "spec": { "validation_failure_action": "Audit", "background": false }
            }))
            .await
            .unwrap();

        assert_eq!(state["id"], "require-labels");
        let doc: serde_yaml::Value = serde_yaml::from_str(state["yaml"].as_str().unwrap()).unwrap();
        assert_eq!(doc["spec"]["validationFailureAction"].as_str(), Some("Audit"));
        assert!(doc["metadata"].get("namespace").is_none());
    }

    #[tokio::test]
    async fn test_render_policy_exception() {
        let manifest = CrdManifest::<PolicyException>::new();
        let yaml = manifest
            .render(&json!({
                "metadata": { "name": "allow-debug", "namespace": "kyverno" },
                "spec": {
                    "exceptions": [{ "policy_name": "disallow-host-path", "rule_names": ["host-path"] }],
                    "match": { "any": [{ "resources": { "kinds": ["Pod"], "namespaces": ["debug"] } }] }
                }
            }))
            .unwrap();
        let doc: serde_yaml::Value = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(doc["apiVersion"].as_str(), Some("kyverno.io/v2beta1"));
        assert_eq!(doc["spec"]["exceptions"][0]["policyName"].as_str(), Some("disallow-host-path"));
    }

    #[tokio::test]
    async fn test_invalid_config() {
        let manifest = CrdManifest::<Policy>::new();
        let err = manifest
            .read(json!({ "metadata": { "name": "require-labels" } }))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
    }
}
