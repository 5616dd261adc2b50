//! Read command - fetch an object from the cluster by import ID

use crdform_core::ImportId;
use crdform_provider::{DataSource, Provider, ProviderError};
use serde_json::{Value, json};

use super::{Settings, provider_error};
use crate::error::Result;
use crate::util::to_display_yaml;

/// Refresh a resource, or look up a data source, and print its state
pub async fn run(settings: &Settings, type_name: &str, id: &str) -> Result<()> {
    let provider = settings.provider().await?;
    let state = fetch(&provider, type_name, id).await?;
    let schema = provider.type_schema(type_name)?;
    print!("{}", to_display_yaml(schema, &state)?);
    Ok(())
}

async fn fetch(provider: &Provider, type_name: &str, id: &str) -> Result<Value> {
    if let Ok(resource) = provider.resource(type_name) {
        let imported = resource.import_state(id).await.map_err(provider_error)?;
        return resource
            .read(imported)
            .await
            .map_err(provider_error)?
            .ok_or_else(|| {
                ProviderError::NotFound {
                    resource: id.to_string(),
                }
                .into()
            });
    }

    let source = provider.data_source(type_name)?;
    let config = lookup_config(source, id)?;
    source.read(config).await.map_err(provider_error)
}

/// `metadata` block addressing the object named by an import ID
fn lookup_config(source: &dyn DataSource, id: &str) -> Result<Value> {
    let namespaced = source.schema().attribute("metadata.namespace").is_some();
    let import = ImportId::parse(id, namespaced).map_err(ProviderError::from)?;

    let mut metadata = json!({ "name": import.name() });
    if let Some(ns) = import.namespace() {
        metadata["namespace"] = json!(ns);
    }
    Ok(json!({ "metadata": metadata }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;

    #[test]
    fn test_lookup_config() {
        let provider = Provider::new();

        let source = provider.data_source("k8s_kyverno_io_policy_v1").unwrap();
        assert_eq!(
            lookup_config(source, "apps/require-labels").unwrap(),
            json!({ "metadata": { "name": "require-labels", "namespace": "apps" } })
        );

        let source = provider.data_source("k8s_kyverno_io_cluster_policy_v1").unwrap();
        assert_eq!(
            lookup_config(source, "require-labels").unwrap(),
            json!({ "metadata": { "name": "require-labels" } })
        );
        assert!(matches!(
            lookup_config(source, "apps/require-labels").unwrap_err(),
            CliError::Provider { .. }
        ));
    }
}
