//! Provider configuration
//!
//! Stored in `~/.config/crdform/provider.yaml`. Environment variables
//! override the file, command line flags override both.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{CoreError, Result};

/// Field manager used when neither the resource nor the provider sets one
pub const DEFAULT_FIELD_MANAGER: &str = "crdform";

pub const ENV_OFFLINE: &str = "CRDFORM_OFFLINE";
pub const ENV_FIELD_MANAGER: &str = "CRDFORM_FIELD_MANAGER";
pub const ENV_CONTEXT: &str = "CRDFORM_CONTEXT";
pub const ENV_KUBECONFIG: &str = "KUBECONFIG";

/// Provider-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ProviderConfig {
    /// Never contact a cluster; only manifest data sources work
    pub offline: bool,

    /// Explicit kubeconfig path (falls back to the usual inference)
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    pub context: Option<String>,

    /// Default server-side apply field manager
    pub field_manager: String,

    /// Default for forcing server-side apply conflicts
    pub force_conflicts: bool,

    /// Per-request timeout for API calls
    #[serde(with = "humantime_serde")]
    pub request_timeout: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            offline: false,
            kubeconfig: None,
            context: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
            request_timeout: None,
        }
    }
}

impl ProviderConfig {
    /// Load configuration from the default location, if present
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("crdform").join("provider.yaml"))
    }

    /// Apply overrides from the process environment
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(offline) = lookup(ENV_OFFLINE) {
            self.offline = matches!(offline.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(manager) = lookup(ENV_FIELD_MANAGER).filter(|m| !m.is_empty()) {
            self.field_manager = manager;
        }
        if let Some(context) = lookup(ENV_CONTEXT).filter(|c| !c.is_empty()) {
            self.context = Some(context);
        }
        if self.kubeconfig.is_none() {
            // Only a single path; multi-file KUBECONFIG is left to kube's inference
            if let Some(path) = lookup(ENV_KUBECONFIG).filter(|p| !p.is_empty() && !p.contains(':')) {
                self.kubeconfig = Some(PathBuf::from(path));
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.field_manager.trim().is_empty() {
            return Err(CoreError::InvalidConfig {
                message: "field_manager must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
