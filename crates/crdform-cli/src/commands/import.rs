//! Import command - adopt an existing object into a state file

use crdform_provider::ProviderError;
use std::path::Path;

use super::{Settings, provider_error};
use crate::display::{step, success};
use crate::error::Result;
use crate::util::{to_display_yaml, write_state};

pub async fn run(
    settings: &Settings,
    type_name: &str,
    id: &str,
    state_path: Option<&Path>,
) -> Result<()> {
    let provider = settings.provider().await?;
    let resource = provider.resource(type_name)?;

    step(format!("Importing {}", id));
    let imported = resource.import_state(id).await.map_err(provider_error)?;
    let state = resource
        .read(imported)
        .await
        .map_err(provider_error)?
        .ok_or_else(|| ProviderError::NotFound {
            resource: id.to_string(),
        })?;

    match state_path {
        Some(path) => write_state(path, &state)?,
        None => print!("{}", to_display_yaml(resource.schema(), &state)?),
    }
    success(format!("Imported {}", id));
    Ok(())
}
