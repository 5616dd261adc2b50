//! Shared utility functions for CLI commands

use crdform_core::Schema;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::error::{CliError, Result};

/// Read a configuration block or state file (YAML or JSON)
pub fn read_document(path: &Path) -> Result<Value> {
    let content = read_file(path)?;
    parse_document(&content).map_err(|e| {
        CliError::input_with_help(
            format!("{} is not valid YAML or JSON: {}", path.display(), e),
            "Configuration files hold a single object keyed by attribute name.",
        )
    })
}

fn read_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::Io {
        message: format!("{}: {}", path.display(), e),
    })
}

fn parse_document(content: &str) -> std::result::Result<Value, serde_yaml::Error> {
    if content.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    let value: Value = serde_yaml::from_str(content)?;
    Ok(match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    })
}

/// Read prior state; a missing or empty file means no prior state
pub fn read_state(path: &Path) -> Result<Option<Value>> {
    if !path.exists() || read_file(path)?.trim().is_empty() {
        return Ok(None);
    }
    let state = read_document(path)?;
    let empty = state.as_object().is_some_and(|obj| obj.is_empty());
    Ok((!empty).then_some(state))
}

pub fn write_state(path: &Path, state: &Value) -> Result<()> {
    std::fs::write(path, to_yaml(state)?)?;
    Ok(())
}

pub fn to_yaml(value: &Value) -> Result<String> {
    serde_yaml::to_string(value).map_err(|e| CliError::input(format!("cannot render YAML: {}", e)))
}

/// YAML for the terminal, with sensitive attributes masked
pub fn to_display_yaml(schema: &Schema, value: &Value) -> Result<String> {
    to_yaml(&schema.redact_sensitive(value))
}

pub fn to_json(value: &impl Serialize) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::input(format!("cannot render JSON: {}", e)))
}

/// `k8s_kyverno_io_policy_v1` -> `k8s_kyverno_io_policy_v1_manifest`
#[must_use]
pub fn manifest_type(type_name: &str) -> String {
    if type_name.ends_with("_manifest") {
        type_name.to_string()
    } else {
        format!("{}_manifest", type_name)
    }
}
