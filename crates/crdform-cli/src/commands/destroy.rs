//! Destroy command - delete a resource

use std::path::Path;

use super::{Settings, provider_error};
use crate::display::{step, success};
use crate::error::{CliError, Result};
use crate::util::read_state;

/// Delete by state file (keeps `wait_for_delete`) or by import ID
pub async fn run(
    settings: &Settings,
    type_name: &str,
    id: Option<&str>,
    state_path: Option<&Path>,
) -> Result<()> {
    let provider = settings.provider().await?;
    let resource = provider.resource(type_name)?;

    let prior = state_path.map(read_state).transpose()?.flatten();
    let state = match (prior, id) {
        (Some(state), _) => state,
        (None, Some(id)) => resource.import_state(id).await.map_err(provider_error)?,
        (None, None) => {
            return Err(CliError::input_with_help(
                "nothing to destroy",
                "Pass --id or a non-empty --state file.",
            ));
        }
    };

    let label = state["id"].as_str().unwrap_or_default().to_string();
    step(format!("Destroying {}", label));
    resource.delete(state).await.map_err(provider_error)?;

    if let Some(path) = state_path.filter(|p| p.exists()) {
        std::fs::remove_file(path)?;
    }
    success(format!("Destroyed {}", label));
    Ok(())
}
