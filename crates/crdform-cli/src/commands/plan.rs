//! Plan command - show what apply would change

use crdform_core::Schema;
use crdform_provider::{PlanResult, Resource};
use serde_json::Value;
use std::path::Path;

use super::{Settings, provider_error};
use crate::display::{print_diagnostics, render_diff, success, warning};
use crate::error::{CliError, Result};
use crate::util::{read_document, read_state, to_display_yaml};

/// Validate the configuration and plan it against optional prior state
pub async fn plan_change(
    resource: &dyn Resource,
    file: &Path,
    state: Option<&Path>,
) -> Result<(Option<Value>, PlanResult)> {
    let config = read_document(file)?;
    let diags = resource.validate(&config);
    if diags.has_error() {
        print_diagnostics(&diags);
        return Err(CliError::validation(&diags));
    }

    let prior = state.map(read_state).transpose()?.flatten();
    let plan = resource
        .modify_plan(prior.clone(), config)
        .await
        .map_err(provider_error)?;
    Ok((prior, plan))
}

/// Print the plan as a YAML diff, sensitive values masked
pub fn show_plan(schema: &Schema, prior: Option<&Value>, plan: &PlanResult) -> Result<()> {
    if !plan.changed {
        success("No changes. The state matches the configuration.");
        return Ok(());
    }

    let old = match prior {
        Some(state) => to_display_yaml(schema, state)?,
        None => String::new(),
    };
    let new = to_display_yaml(schema, &plan.planned_state)?;
    print!("{}", render_diff(&old, &new));

    if plan.requires_replacement() {
        warning(format!(
            "{} must be replaced: {} cannot change in place",
            plan.planned_state["id"].as_str().unwrap_or_default(),
            plan.requires_replace.join(", ")
        ));
    }
    Ok(())
}

/// Plans never build a client; only defaults are needed
pub async fn run(
    settings: &Settings,
    type_name: &str,
    file: &Path,
    state: Option<&Path>,
) -> Result<()> {
    let provider = settings.offline_provider()?;
    let resource = provider.resource(type_name)?;

    let (prior, plan) = plan_change(resource, file, state).await?;
    let summary = match (&prior, plan.changed, plan.requires_replacement()) {
        (None, _, _) => "1 to create",
        (Some(_), false, _) => "no changes",
        (Some(_), true, true) => "1 to replace",
        (Some(_), true, false) => "1 to update",
    };
    show_plan(resource.schema(), prior.as_ref(), &plan)?;
    println!("Plan: {}", summary);
    Ok(())
}
