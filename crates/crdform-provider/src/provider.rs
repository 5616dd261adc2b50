//! Provider registry and configuration

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crdform_core::{Attribute, ProviderConfig, Schema, Validator};
use crdform_crds::{ClusterPolicy, CustomResourceKind, MiniCluster, Policy, PolicyException};
use crdform_kube::KubeDynamicClient;

use crate::adapter::{CrdDataSource, CrdManifest, CrdResource};
use crate::data::ProviderData;
use crate::error::{ProviderError, Result};
use crate::framework::{DataSource, Resource};

pub const PROVIDER_NAME: &str = "crdform";

/// Every resource, data source and manifest type, keyed by type name
pub struct Provider {
    resources: BTreeMap<String, Box<dyn Resource>>,
    data_sources: BTreeMap<String, Box<dyn DataSource>>,
    data: Option<Arc<ProviderData>>,
}

impl Provider {
    /// Provider with all supported kinds registered, not yet configured
    pub fn new() -> Self {
        let mut provider = Self {
            resources: BTreeMap::new(),
            data_sources: BTreeMap::new(),
            data: None,
        };
        provider.register_kind::<MiniCluster>();
        provider.register_kind::<ClusterPolicy>();
        provider.register_kind::<Policy>();
        provider.register_kind::<PolicyException>();
        provider
    }

    /// Register the resource, data source and manifest types of a kind
    pub fn register_kind<K: CustomResourceKind>(&mut self) {
        self.add_resource(Box::new(CrdResource::<K>::new()));
        self.add_data_source(Box::new(CrdDataSource::<K>::new()));
        self.add_data_source(Box::new(CrdManifest::<K>::new()));
    }

    fn add_resource(&mut self, mut resource: Box<dyn Resource>) {
        if let Some(data) = &self.data {
            resource.configure(data.clone());
        }
        self.resources.insert(resource.type_name(), resource);
    }

    fn add_data_source(&mut self, mut source: Box<dyn DataSource>) {
        if let Some(data) = &self.data {
            source.configure(data.clone());
        }
        self.data_sources.insert(source.type_name(), source);
    }

    /// Provider-level configuration block
    pub fn schema() -> Schema {
        Schema::new("Manage Kubernetes custom resources through server-side apply.")
            .with_attribute(
                "offline",
                Attribute::bool()
                    .optional()
                    .describe("Never contact a cluster. Only manifest data sources work."),
            )
            .with_attribute(
                "kubeconfig",
                Attribute::string()
                    .optional()
                    .describe("Path to a kubeconfig file. Defaults to the usual lookup."),
            )
            .with_attribute(
                "context",
                Attribute::string()
                    .optional()
                    .describe("Kubeconfig context to use."),
            )
            .with_attribute(
                "field_manager",
                Attribute::string()
                    .optional()
                    .validate(Validator::MaxLength(128))
                    .describe("Default server-side apply field manager."),
            )
            .with_attribute(
                "force_conflicts",
                Attribute::bool()
                    .optional()
                    .describe("Default for taking ownership of conflicting fields."),
            )
            .with_attribute(
                "request_timeout",
                Attribute::string()
                    .optional()
                    .describe("Per-request timeout, e.g. '30s'."),
            )
    }

    /// Build the shared provider data and hand it to every type
    ///
    /// In offline mode no client is created and no cluster is contacted.
    pub async fn configure(&mut self, config: ProviderConfig) -> Result<()> {
        config.validate()?;
        let data = if config.offline {
            info!("provider configured offline");
            ProviderData::offline(&config)
        } else {
            let client = KubeDynamicClient::from_config(&config)
                .await
                .map_err(ProviderError::Client)?;
            info!(field_manager = %config.field_manager, "provider configured");
            ProviderData::with_client(Arc::new(client), &config)
        };
        self.configure_with(data);
        Ok(())
    }

    /// Configure with prepared provider data
    pub fn configure_with(&mut self, data: ProviderData) {
        let data = Arc::new(data);
        for resource in self.resources.values_mut() {
            resource.configure(data.clone());
        }
        for source in self.data_sources.values_mut() {
            source.configure(data.clone());
        }
        self.data = Some(data);
    }

    pub fn is_configured(&self) -> bool {
        self.data.is_some()
    }

    pub fn resource(&self, type_name: &str) -> Result<&dyn Resource> {
        self.resources
            .get(type_name)
            .map(|boxed| &**boxed)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    pub fn data_source(&self, type_name: &str) -> Result<&dyn DataSource> {
        self.data_sources
            .get(type_name)
            .map(|boxed| &**boxed)
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn data_source_types(&self) -> impl Iterator<Item = &str> {
        self.data_sources.keys().map(String::as_str)
    }

    /// Schema of a resource or data source by type name
    pub fn type_schema(&self, type_name: &str) -> Result<&Schema> {
        if let Some(resource) = self.resources.get(type_name) {
            return Ok(resource.schema());
        }
        self.data_source(type_name).map(|source| source.schema())
    }
}

impl Default for Provider {
    fn default() -> Self {
        Self::new()
    }
}
