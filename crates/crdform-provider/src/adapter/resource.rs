//! Managed resource backed by server-side apply

use async_trait::async_trait;
use serde_json::{Value, json};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info};

use crdform_core::{ImportId, Schema};
use crdform_crds::CustomResourceKind;
use crdform_kube::{wait_for_delete, wait_for_upsert};

use super::{
    check_config, identity, object_from_state, object_id, resource_ref, resource_schema,
    state_from_object,
};
use crate::data::ProviderData;
use crate::error::{ProviderError, Result};
use crate::framework::{PlanResult, Resource};
use crate::options::{ID, ResourceOptions, carry_bookkeeping};

pub struct CrdResource<K> {
    schema: Schema,
    data: Option<Arc<ProviderData>>,
    kind: PhantomData<fn() -> K>,
}

impl<K: CustomResourceKind> CrdResource<K> {
    pub fn new() -> Self {
        Self {
            schema: resource_schema::<K>(),
            data: None,
            kind: PhantomData,
        }
    }

    fn data(&self) -> Result<&ProviderData> {
        self.data.as_deref().ok_or(ProviderError::Unconfigured)
    }

    /// Apply the planned state and wait for it to settle
    async fn apply(&self, planned: Value) -> Result<Value> {
        check_config(&self.schema, &planned)?;
        let data = self.data()?;
        let client = data.client()?;

        let metadata = identity::<K>(&planned)?;
        let resource = resource_ref::<K>(&metadata);
        let options = ResourceOptions::from_state(&planned, data)?;
        let object = object_from_state::<K>(&self.schema, &planned)?;
        let body = serde_json::to_value(&object).map_err(|e| ProviderError::Marshal(e.to_string()))?;

        info!(
            resource = %resource.display_name(),
            field_manager = %options.field_manager,
            "applying"
        );
        let applied = client
            .apply(&resource, &body, &options.apply_params())
            .await
            .map_err(|e| ProviderError::api("Error applying resource", e))?;

        wait_for_upsert(client.as_ref(), &resource, &options.wait_for_upsert)
            .await
            .map_err(|e| ProviderError::api("Error waiting for resource", e))?;

        let mut state = state_from_object::<K>(&self.schema, &applied)?;
        carry_bookkeeping(&planned, &mut state);
        options.fill_computed(&mut state, object_id::<K>(&metadata));
        Ok(state)
    }
}

impl<K: CustomResourceKind> Default for CrdResource<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CustomResourceKind> Resource for CrdResource<K> {
    fn type_name(&self) -> String {
        K::type_name()
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn configure(&mut self, data: Arc<ProviderData>) {
        self.data = Some(data);
    }

    async fn create(&self, planned: Value) -> Result<Value> {
        self.apply(planned).await
    }

    async fn read(&self, state: Value) -> Result<Option<Value>> {
        let data = self.data()?;
        let client = data.client()?;
        let metadata = identity::<K>(&state)?;
        let resource = resource_ref::<K>(&metadata);

        let object = client
            .get_opt(&resource)
            .await
            .map_err(|e| ProviderError::api("Error reading resource", e))?;
        let Some(object) = object else {
            debug!(resource = %resource.display_name(), "object is gone");
            return Ok(None);
        };

        let mut refreshed = state_from_object::<K>(&self.schema, &object)?;
        carry_bookkeeping(&state, &mut refreshed);
        if let Some(obj) = refreshed.as_object_mut() {
            obj.insert(ID.to_string(), json!(object_id::<K>(&metadata)));
        }
        Ok(Some(refreshed))
    }

    /// Re-apply the full planned object; replacements are decided by
    /// `modify_plan`
    async fn update(&self, _prior: Value, planned: Value) -> Result<Value> {
        self.apply(planned).await
    }

    async fn delete(&self, state: Value) -> Result<()> {
        let data = self.data()?;
        let client = data.client()?;
        let metadata = identity::<K>(&state)?;
        let resource = resource_ref::<K>(&metadata);
        let options = ResourceOptions::from_state(&state, data)?;

        info!(resource = %resource.display_name(), "deleting");
        match client.delete(&resource).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!(resource = %resource.display_name(), "already deleted");
                return Ok(());
            }
            Err(e) => return Err(ProviderError::api("Error deleting resource", e)),
        }

        if let Some(wait) = &options.wait_for_delete {
            wait_for_delete(client.as_ref(), &resource, wait)
                .await
                .map_err(|e| ProviderError::api("Error waiting for deletion", e))?;
        }
        Ok(())
    }

    async fn import_state(&self, id: &str) -> Result<Value> {
        let import = ImportId::parse(id, K::NAMESPACED)?;
        let mut metadata = json!({ "name": import.name() });
        if let Some(ns) = import.namespace() {
            metadata["namespace"] = json!(ns);
        }
        Ok(json!({ "id": import.to_id(), "metadata": metadata }))
    }

    async fn modify_plan(&self, prior: Option<Value>, planned: Value) -> Result<PlanResult> {
        let data = self.data()?;
        let metadata = identity::<K>(&planned)?;
        let options = ResourceOptions::from_state(&planned, data)?;

        let mut planned_state = planned;
        options.fill_computed(&mut planned_state, object_id::<K>(&metadata));

        let Some(prior) = prior else {
            return Ok(PlanResult::with_changes(planned_state, Vec::new()));
        };
        if prior == planned_state {
            return Ok(PlanResult::no_change(planned_state));
        }
        let paths = self.schema.requires_replace(&prior, &planned_state);
        Ok(PlanResult::with_changes(planned_state, paths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdform_core::ProviderConfig;
    use crdform_crds::{ClusterPolicy, MiniCluster};
    use crdform_kube::{MockDynamicClient, ResourceRef};

    fn configured<K: CustomResourceKind>(client: &MockDynamicClient) -> CrdResource<K> {
        let config = ProviderConfig {
            field_manager: "platform-team".to_string(),
            force_conflicts: true,
            ..Default::default()
        };
        let mut resource = CrdResource::<K>::new();
        resource.configure(Arc::new(ProviderData::with_client(
            Arc::new(client.clone()),
            &config,
        )));
        resource
    }

    fn mini_cluster_ref() -> ResourceRef {
        ResourceRef::new(
            "flux-framework.org",
            "v1alpha1",
            "MiniCluster",
            "miniclusters",
            Some("flux-operator".to_string()),
            "flux-sample",
        )
    }

    fn planned() -> Value {
        json!({
            "metadata": {
                "name": "flux-sample",
                "namespace": "flux-operator",
                "labels": { "app": "lammps" }
            },
            "spec": {
                "size": 4,
                "containers": [{ "image": "ghcr.io/rse-ops/lammps:flux-sched-focal", "working_dir": "/data" }]
            }
        })
    }

    #[tokio::test]
    async fn test_create_applies_once() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);

        let state = resource.create(planned()).await.unwrap();
        assert_eq!(client.operation_counts().applies, 1);
        assert_eq!(client.operation_counts().gets, 0);

        let (target, body, params) = client.last_apply().unwrap();
        assert_eq!(target, mini_cluster_ref());
        assert_eq!(params.field_manager, "platform-team");
        assert!(params.force);
        assert_eq!(body["apiVersion"], "flux-framework.org/v1alpha1");
        assert_eq!(body["kind"], "MiniCluster");
        assert_eq!(body["spec"]["containers"][0]["workingDir"], "/data");

        assert_eq!(state["id"], "flux-operator/flux-sample");
        assert_eq!(state["field_manager"], "platform-team");
        assert_eq!(state["force_conflicts"], true);
        assert_eq!(state["spec"]["containers"][0]["working_dir"], "/data");
        assert!(state["metadata"].get("uid").is_none());
    }

    #[tokio::test]
    async fn test_create_resource_level_field_manager() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let mut config = planned();
        config["field_manager"] = json!("team-a");
        config["force_conflicts"] = json!(false);

        let state = resource.create(config).await.unwrap();
        let (_, body, params) = client.last_apply().unwrap();
        assert_eq!(params.field_manager, "team-a");
        assert!(!params.force);
        assert!(body.get("field_manager").is_none());
        assert_eq!(state["field_manager"], "team-a");
    }

    #[tokio::test]
    async fn test_create_waits_for_condition() {
        let client = MockDynamicClient::with_object(
            &mini_cluster_ref(),
            json!({
                "metadata": { "name": "flux-sample", "namespace": "flux-operator" },
                "status": { "size": 4 }
            }),
        );
        let resource = configured::<MiniCluster>(&client);
        let mut config = planned();
        config["wait_for_upsert"] = json!([{
            "jsonpath": ".status.size",
            "value": "4",
            "timeout": 0,
            "poll_interval": 0
        }]);

        let state = resource.create(config).await.unwrap();
        assert_eq!(client.operation_counts().gets, 1);
        assert_eq!(state["wait_for_upsert"][0]["jsonpath"], ".status.size");
    }

    #[tokio::test]
    async fn test_create_wait_timeout() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let mut config = planned();
        config["wait_for_upsert"] = json!([{
            "jsonpath": ".status.size",
            "value": "4",
            "timeout": 0,
            "poll_interval": 0
        }]);

        let err = resource.create(config).await.unwrap_err();
        let diags = err.to_diagnostics();
        assert_eq!(diags.iter().next().unwrap().summary, "Error waiting for resource");
    }

    #[tokio::test]
    async fn test_create_invalid_config_makes_no_calls() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let mut config = planned();
        config["metadata"]["name"] = json!("Not_A_Name");

        let err = resource.create(config).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidConfig(_)));
        assert_eq!(client.operation_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_create_apply_conflict() {
        let client = MockDynamicClient::new();
        client.fail_with(409, "Apply failed with 1 conflict");
        let resource = configured::<MiniCluster>(&client);

        let err = resource.create(planned()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { action: "Error applying resource", .. }));
        let diags = err.to_diagnostics();
        assert!(diags.iter().next().unwrap().detail.contains("force_conflicts = true"));
    }

    #[tokio::test]
    async fn test_create_forbidden_has_no_conflict_hint() {
        let client = MockDynamicClient::new();
        client.fail_with(403, "forbidden");
        let resource = configured::<MiniCluster>(&client);

        let diags = resource.create(planned()).await.unwrap_err().to_diagnostics();
        assert!(!diags.iter().next().unwrap().detail.contains("force_conflicts"));
    }

    #[tokio::test]
    async fn test_create_wait_out_of_range() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let mut config = planned();
        config["wait_for_upsert"] = json!([{
            "jsonpath": ".status.size",
            "value": "4",
            "timeout": 9_300_000_000_000_000i64,
            "poll_interval": 0
        }]);
        config["wait_for_delete"] = json!({ "poll_interval": 86_400 });

        match resource.create(config).await.unwrap_err() {
            ProviderError::InvalidConfig(diags) => {
                let paths: Vec<_> = diags.errors().filter_map(|d| d.attribute.clone()).collect();
                assert!(paths.contains(&"wait_for_upsert[0].timeout".to_string()));
                assert!(paths.contains(&"wait_for_delete.poll_interval".to_string()));
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
        assert_eq!(client.operation_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_create_size_beyond_int32() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let mut config = planned();
        config["spec"]["size"] = json!(4_294_967_296i64);

        match resource.create(config).await.unwrap_err() {
            ProviderError::InvalidConfig(diags) => {
                let diag = diags.errors().next().unwrap();
                assert_eq!(diag.attribute.as_deref(), Some("spec.size"));
            }
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
        assert_eq!(client.operation_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_offline_makes_no_calls() {
        let client = MockDynamicClient::new();
        let mut resource = CrdResource::<MiniCluster>::new();
        resource.configure(Arc::new(ProviderData::offline(&ProviderConfig::default())));

        let err = resource.create(planned()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Offline));
        assert_eq!(client.operation_counts().total(), 0);
    }

    #[tokio::test]
    async fn test_unconfigured() {
        let resource = CrdResource::<MiniCluster>::new();
        let err = resource.read(planned()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unconfigured));
    }

    #[tokio::test]
    async fn test_read_refreshes_and_keeps_bookkeeping() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let state = resource.create(planned()).await.unwrap();

        // drift on the server
        let mut object = client.object(&mini_cluster_ref()).unwrap();
        object["spec"]["size"] = json!(8);
        client.insert(&mini_cluster_ref(), object);

        let refreshed = resource.read(state).await.unwrap().unwrap();
        assert_eq!(refreshed["spec"]["size"], 8);
        assert_eq!(refreshed["id"], "flux-operator/flux-sample");
        assert_eq!(refreshed["field_manager"], "platform-team");
    }

    #[tokio::test]
    async fn test_read_missing_returns_none() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        assert_eq!(resource.read(planned()).await.unwrap(), None);
        assert_eq!(client.operation_counts().gets, 1);
    }

    #[tokio::test]
    async fn test_update_reapplies() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let prior = resource.create(planned()).await.unwrap();

        let mut next = prior.clone();
        next["spec"]["size"] = json!(6);
        let state = resource.update(prior, next).await.unwrap();

        assert_eq!(client.operation_counts().applies, 2);
        assert_eq!(state["spec"]["size"], 6);
        assert_eq!(client.object(&mini_cluster_ref()).unwrap()["metadata"]["generation"], 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let state = resource.create(planned()).await.unwrap();

        resource.delete(state.clone()).await.unwrap();
        assert!(client.object(&mini_cluster_ref()).is_none());

        // already gone
        resource.delete(state).await.unwrap();
        assert_eq!(client.operation_counts().deletes, 2);
    }

    #[tokio::test]
    async fn test_delete_waits() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        let mut state = resource.create(planned()).await.unwrap();
        state["wait_for_delete"] = json!({ "timeout": 0, "poll_interval": 0 });

        resource.delete(state).await.unwrap();
        assert_eq!(client.operation_counts().gets, 1);
    }

    #[tokio::test]
    async fn test_delete_forbidden() {
        let client = MockDynamicClient::new();
        client.fail_with(403, "forbidden");
        let resource = configured::<MiniCluster>(&client);

        let err = resource.delete(planned()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { action: "Error deleting resource", .. }));
    }

    #[tokio::test]
    async fn test_import_state() {
        let resource = CrdResource::<MiniCluster>::new();
        let state = resource.import_state("flux-operator/flux-sample").await.unwrap();
        assert_eq!(
            state,
            json!({
                "id": "flux-operator/flux-sample",
                "metadata": { "name": "flux-sample", "namespace": "flux-operator" }
            })
        );
        assert!(resource.import_state("flux-sample").await.is_err());

        let resource = CrdResource::<ClusterPolicy>::new();
        let state = resource.import_state("require-labels").await.unwrap();
        assert_eq!(state["metadata"], json!({ "name": "require-labels" }));
        assert!(resource.import_state("kyverno/require-labels").await.is_err());
    }

    #[tokio::test]
    async fn test_imported_state_reads_back() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);
        resource.create(planned()).await.unwrap();

        let imported = resource.import_state("flux-operator/flux-sample").await.unwrap();
        let state = resource.read(imported).await.unwrap().unwrap();
        assert_eq!(state["spec"]["size"], 4);
        assert_eq!(state["metadata"]["labels"]["app"], "lammps");
    }

    #[tokio::test]
    async fn test_modify_plan() {
        let client = MockDynamicClient::new();
        let resource = configured::<MiniCluster>(&client);

        let plan = resource.modify_plan(None, planned()).await.unwrap();
        assert!(plan.changed);
        assert_eq!(plan.planned_state["id"], "flux-operator/flux-sample");
        assert_eq!(plan.planned_state["field_manager"], "platform-team");

        let prior = plan.planned_state.clone();
        let plan = resource.modify_plan(Some(prior.clone()), planned()).await.unwrap();
        assert!(!plan.changed);

        let mut moved = planned();
        moved["metadata"]["namespace"] = json!("other");
        let plan = resource.modify_plan(Some(prior), moved).await.unwrap();
        assert!(plan.changed);
        assert_eq!(plan.requires_replace, vec!["metadata.namespace".to_string()]);
        assert_eq!(plan.planned_state["id"], "other/flux-sample");
        assert_eq!(client.operation_counts().total(), 0);
    }
}
