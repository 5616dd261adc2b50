//! Apply command - create, update or replace a resource

use crdform_provider::ProviderError;
use serde_json::Value;
use std::path::Path;

use super::plan::{plan_change, show_plan};
use super::{Settings, provider_error};
use crate::display::{step, success};
use crate::error::Result;
use crate::util::{to_display_yaml, write_state};

pub async fn run(
    settings: &Settings,
    type_name: &str,
    file: &Path,
    state_path: Option<&Path>,
    replace: bool,
) -> Result<()> {
    let provider = settings.provider().await?;
    let resource = provider.resource(type_name)?;

    let (prior, plan) = plan_change(resource, file, state_path).await?;
    show_plan(resource.schema(), prior.as_ref(), &plan)?;
    let id = plan.planned_state["id"].as_str().unwrap_or_default().to_string();

    let state: Value = match prior {
        None => {
            step(format!("Creating {}", id));
            resource.create(plan.planned_state).await.map_err(provider_error)?
        }
        Some(_) if !plan.changed => return Ok(()),
        Some(prior) if plan.requires_replacement() => {
            if !replace {
                return Err(ProviderError::RequiresReplace {
                    paths: plan.requires_replace,
                }
                .into());
            }
            step(format!("Replacing {}", id));
            resource.delete(prior).await.map_err(provider_error)?;
            resource.create(plan.planned_state).await.map_err(provider_error)?
        }
        Some(prior) => {
            step(format!("Updating {}", id));
            resource
                .update(prior, plan.planned_state)
                .await
                .map_err(provider_error)?
        }
    };

    match state_path {
        Some(path) => write_state(path, &state)?,
        None => print!("{}", to_display_yaml(resource.schema(), &state)?),
    }
    success(format!("Applied {}", id));
    Ok(())
}
