//! Dynamic Kubernetes client
//!
//! Adapters never see typed `kube` APIs. They address objects by
//! group/version/plural (+ namespace) and exchange plain JSON, which keeps one
//! code path for every custom resource kind:
//!
//! - `get` - GET the object
//! - `apply` - server-side apply PATCH (`application/apply-patch+yaml`)
//! - `delete` - DELETE the object

use async_trait::async_trait;
use kube::{
    Client,
    api::{Api, DeleteParams, DynamicObject, Patch, PatchParams},
    config::{KubeConfigOptions, Kubeconfig},
    discovery::ApiResource,
};
use serde_json::Value;
use tracing::debug;

use crdform_core::ProviderConfig;

use crate::error::Result;

/// Location of a single object in the API
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    /// None for cluster-scoped kinds
    pub namespace: Option<String>,
    pub name: String,
}

impl ResourceRef {
    pub fn new(
        group: impl Into<String>,
        version: impl Into<String>,
        kind: impl Into<String>,
        plural: impl Into<String>,
        namespace: Option<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
            plural: plural.into(),
            namespace,
            name: name.into(),
        }
    }

    /// `group/version`, or just `version` for the core group
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// `kube` discovery metadata for this kind
    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }

    /// REST path of the object
    pub fn url_path(&self) -> String {
        let prefix = if self.group.is_empty() {
            format!("/api/{}", self.version)
        } else {
            format!("/apis/{}/{}", self.group, self.version)
        };
        match &self.namespace {
            Some(ns) => format!("{}/namespaces/{}/{}/{}", prefix, ns, self.plural, self.name),
            None => format!("{}/{}/{}", prefix, self.plural, self.name),
        }
    }

    /// Display name for logging
    pub fn display_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}/{}", ns, self.kind, self.name),
            None => format!("{}/{}", self.kind, self.name),
        }
    }
}

/// Server-side apply settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyParams {
    pub field_manager: String,
    /// Take ownership of conflicting fields
    pub force: bool,
}

/// The verbs adapters need from the API server
///
/// Implementations must be Send + Sync for use across async tasks.
#[async_trait]
pub trait DynamicClient: Send + Sync {
    /// GET an object
    async fn get(&self, resource: &ResourceRef) -> Result<Value>;

    /// Server-side apply the full object, returning the merged result
    async fn apply(
        &self,
        resource: &ResourceRef,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value>;

    /// DELETE an object
    async fn delete(&self, resource: &ResourceRef) -> Result<()>;

    /// GET an object, mapping 404 to `None`
    async fn get_opt(&self, resource: &ResourceRef) -> Result<Option<Value>> {
        match self.get(resource).await {
            Ok(object) => Ok(Some(object)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// `kube`-backed dynamic client
#[derive(Clone)]
pub struct KubeDynamicClient {
    client: Client,
}

impl KubeDynamicClient {
    /// Build a client from provider configuration
    ///
    /// An explicit kubeconfig path or context wins; otherwise the usual
    /// inference applies (`KUBECONFIG`, `~/.kube/config`, in-cluster).
    pub async fn from_config(config: &ProviderConfig) -> Result<Self> {
        let options = KubeConfigOptions {
            context: config.context.clone(),
            ..Default::default()
        };

        let mut kube_config = match &config.kubeconfig {
            Some(path) => {
                let kubeconfig = Kubeconfig::read_from(path)?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &options).await?
            }
            None if config.context.is_some() => kube::Config::from_kubeconfig(&options).await?,
            None => kube::Config::infer().await?,
        };

        if let Some(timeout) = config.request_timeout {
            kube_config.read_timeout = Some(timeout);
        }

        debug!(cluster_url = %kube_config.cluster_url, "configured Kubernetes client");
        let client = Client::try_from(kube_config)?;
        Ok(Self { client })
    }

    /// Create with an existing Kubernetes client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn api(&self, resource: &ResourceRef) -> Api<DynamicObject> {
        let api_resource = resource.api_resource();
        match &resource.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &api_resource),
            None => Api::all_with(self.client.clone(), &api_resource),
        }
    }
}

#[async_trait]
impl DynamicClient for KubeDynamicClient {
    async fn get(&self, resource: &ResourceRef) -> Result<Value> {
        debug!(resource = %resource.display_name(), "GET");
        let object = self.api(resource).get(&resource.name).await?;
        Ok(serde_json::to_value(object)?)
    }

    async fn apply(
        &self,
        resource: &ResourceRef,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value> {
        debug!(
            resource = %resource.display_name(),
            field_manager = %params.field_manager,
            force = params.force,
            "server-side apply"
        );
        let mut patch_params = PatchParams::apply(&params.field_manager);
        patch_params.force = params.force;

        let applied = self
            .api(resource)
            .patch(&resource.name, &patch_params, &Patch::Apply(object))
            .await?;
        Ok(serde_json::to_value(applied)?)
    }

    async fn delete(&self, resource: &ResourceRef) -> Result<()> {
        debug!(resource = %resource.display_name(), "DELETE");
        self.api(resource)
            .delete(&resource.name, &DeleteParams::default())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mini_cluster() -> ResourceRef {
        ResourceRef::new(
            "flux-framework.org",
            "v1alpha1",
            "MiniCluster",
            "miniclusters",
            Some("flux-operator".to_string()),
            "flux-sample",
        )
    }

    fn cluster_policy() -> ResourceRef {
        ResourceRef::new(
            "kyverno.io",
            "v1",
            "ClusterPolicy",
            "clusterpolicies",
            None,
            "require-labels",
        )
    }

    #[test]
    fn test_api_version() {
        assert_eq!(mini_cluster().api_version(), "flux-framework.org/v1alpha1");

        let core = ResourceRef::new("", "v1", "ConfigMap", "configmaps", None, "x");
        assert_eq!(core.api_version(), "v1");
    }

    #[test]
    fn test_url_path() {
        assert_eq!(
            mini_cluster().url_path(),
            "/apis/flux-framework.org/v1alpha1/namespaces/flux-operator/miniclusters/flux-sample"
        );
        assert_eq!(
            cluster_policy().url_path(),
            "/apis/kyverno.io/v1/clusterpolicies/require-labels"
        );
    }

    #[test]
    fn test_api_resource() {
        let ar = mini_cluster().api_resource();
        assert_eq!(ar.group, "flux-framework.org");
        assert_eq!(ar.api_version, "flux-framework.org/v1alpha1");
        assert_eq!(ar.plural, "miniclusters");
        assert_eq!(ar.kind, "MiniCluster");
    }

    #[test]
    fn test_display_name() {
        assert_eq!(mini_cluster().display_name(), "flux-operator/MiniCluster/flux-sample");
        assert_eq!(cluster_policy().display_name(), "ClusterPolicy/require-labels");
    }
}
