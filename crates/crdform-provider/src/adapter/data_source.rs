//! Read-only lookup of an existing object

use async_trait::async_trait;
use serde_json::{Value, json};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crdform_core::Schema;
use crdform_crds::CustomResourceKind;

use super::{check_config, data_source_schema, identity, object_id, resource_ref, state_from_object};
use crate::data::ProviderData;
use crate::error::{ProviderError, Result};
use crate::framework::DataSource;
use crate::options::ID;

pub struct CrdDataSource<K> {
    schema: Schema,
    data: Option<Arc<ProviderData>>,
    kind: PhantomData<fn() -> K>,
}

impl<K: CustomResourceKind> CrdDataSource<K> {
    pub fn new() -> Self {
        Self {
            schema: data_source_schema::<K>(),
            data: None,
            kind: PhantomData,
        }
    }
}

impl<K: CustomResourceKind> Default for CrdDataSource<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: CustomResourceKind> DataSource for CrdDataSource<K> {
    fn type_name(&self) -> String {
        K::type_name()
    }

    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn configure(&mut self, data: Arc<ProviderData>) {
        self.data = Some(data);
    }

    async fn read(&self, config: Value) -> Result<Value> {
        check_config(&self.schema, &config)?;
        let data = self.data.as_deref().ok_or(ProviderError::Unconfigured)?;
        let client = data.client()?;

        let metadata = identity::<K>(&config)?;
        let resource = resource_ref::<K>(&metadata);
        debug!(resource = %resource.display_name(), "reading data source");

        let object = client
            .get_opt(&resource)
            .await
            .map_err(|e| ProviderError::api("Error reading resource", e))?
            .ok_or_else(|| ProviderError::NotFound {
                resource: resource.display_name(),
            })?;

        let mut state = state_from_object::<K>(&self.schema, &object)?;
        if let Some(obj) = state.as_object_mut() {
            obj.insert(ID.to_string(), json!(object_id::<K>(&metadata)));
        }
        Ok(state)
    }
}
