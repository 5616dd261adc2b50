//! CLI commands

pub mod apply;
pub mod destroy;
pub mod import;
pub mod manifest;
pub mod plan;
pub mod read;
pub mod schema;
pub mod types;
pub mod validate;

use std::path::PathBuf;

use crdform_core::ProviderConfig;
use crdform_provider::{Provider, ProviderData, ProviderError};
use tracing::debug;

use crate::display::print_diagnostics;
use crate::error::{CliError, Result};

/// Provider settings gathered from global flags
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config: Option<PathBuf>,
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub offline: bool,
    pub field_manager: Option<String>,
}

impl Settings {
    /// Config file (or default location), then environment, then flags
    pub fn provider_config(&self) -> Result<ProviderConfig> {
        let mut config = match &self.config {
            Some(path) => ProviderConfig::load_from(path)?,
            None => ProviderConfig::load()?,
        }
        .with_env();

        if self.offline {
            config.offline = true;
        }
        if let Some(path) = &self.kubeconfig {
            config.kubeconfig = Some(path.clone());
        }
        if let Some(context) = &self.context {
            config.context = Some(context.clone());
        }
        if let Some(manager) = &self.field_manager {
            config.field_manager = manager.clone();
        }
        config.validate()?;
        debug!(
            offline = config.offline,
            context = ?config.context,
            field_manager = %config.field_manager,
            "provider configuration"
        );
        Ok(config)
    }

    /// Provider configured against the cluster (or offline)
    pub async fn provider(&self) -> Result<Provider> {
        let mut provider = Provider::new();
        provider.configure(self.provider_config()?).await?;
        Ok(provider)
    }

    /// Provider configured with defaults only; never builds a client
    pub fn offline_provider(&self) -> Result<Provider> {
        let config = self.provider_config()?;
        let mut provider = Provider::new();
        provider.configure_with(ProviderData::offline(&config));
        Ok(provider)
    }
}

/// Print validation diagnostics before converting into a CLI error
pub fn provider_error(err: ProviderError) -> CliError {
    if let ProviderError::InvalidConfig(diags) = &err {
        print_diagnostics(diags);
    }
    CliError::from(err)
}
