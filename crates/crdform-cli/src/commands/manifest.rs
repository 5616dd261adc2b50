//! Manifest command - render a configuration block as a Kubernetes manifest

use crdform_provider::Provider;
use std::path::Path;

use super::provider_error;
use crate::display::success;
use crate::error::{CliError, Result};
use crate::util::{manifest_type, read_document};

/// Render without provider configuration; never contacts a cluster
pub async fn run(type_name: &str, file: &Path, output: Option<&Path>) -> Result<()> {
    let provider = Provider::new();
    let source = provider.data_source(&manifest_type(type_name))?;
    let config = read_document(file)?;

    let state = source.read(config).await.map_err(provider_error)?;
    let yaml = state["yaml"]
        .as_str()
        .ok_or_else(|| CliError::input("manifest rendering produced no YAML"))?;

    match output {
        Some(path) => {
            std::fs::write(path, yaml)?;
            success(format!("Wrote {}", path.display()));
        }
        None => print!("{}", yaml),
    }
    Ok(())
}
