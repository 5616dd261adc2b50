//! Provider error types

use crdform_core::{CoreError, Diagnostic, Diagnostics};
use crdform_kube::KubeError;
use thiserror::Error;

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;

const REPORT_BUG: &str = "Please report this issue to the provider developers.";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider in offline mode")]
    Offline,

    #[error("Provider is not configured")]
    Unconfigured,

    #[error("Invalid configuration:\n{0}")]
    InvalidConfig(Diagnostics),

    #[error("Error marshalling JSON: {0}")]
    Marshal(String),

    #[error("Error unmarshalling JSON: {0}")]
    Unmarshal(String),

    #[error("Error rendering YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{action}: {source}")]
    Api {
        action: &'static str,
        #[source]
        source: KubeError,
    },

    #[error("Unable to find resource {resource}")]
    NotFound { resource: String },

    #[error("Changing {} requires replacing the resource", .paths.join(", "))]
    RequiresReplace { paths: Vec<String> },

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Unable to create Kubernetes client: {0}")]
    Client(#[source] KubeError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ProviderError {
    pub fn api(action: &'static str, source: KubeError) -> Self {
        ProviderError::Api { action, source }
    }

    /// Render as user-facing diagnostics
    pub fn to_diagnostics(&self) -> Diagnostics {
        let diagnostic = match self {
            ProviderError::InvalidConfig(diags) => return diags.clone(),
            ProviderError::Offline => Diagnostic::error(
                "Provider in offline mode",
                "The provider is configured with offline = true and cannot contact a cluster. \
                 Only manifest data sources are available.",
            ),
            ProviderError::Unconfigured => Diagnostic::error(
                "Unconfigured provider",
                format!("Expected configured provider data. {}", REPORT_BUG),
            ),
            ProviderError::Marshal(e) => Diagnostic::error(
                "Error marshalling JSON",
                format!("Could not marshal the object to JSON: {}. {}", e, REPORT_BUG),
            ),
            ProviderError::Unmarshal(e) => Diagnostic::error(
                "Error unmarshalling JSON",
                format!("Could not unmarshal the API response: {}. {}", e, REPORT_BUG),
            ),
            ProviderError::Yaml(e) => Diagnostic::error(
                "Error rendering YAML",
                format!("Could not render the manifest: {}. {}", e, REPORT_BUG),
            ),
            ProviderError::Api { action, source } if source.is_conflict() => Diagnostic::error(
                *action,
                format!(
                    "{}. Another field manager owns some of these fields; set force_conflicts = true \
                     to take them over.",
                    source
                ),
            ),
            ProviderError::Api { action, source } => Diagnostic::error(*action, source.to_string()),
            ProviderError::NotFound { .. } => Diagnostic::error(
                "Unable to find resource",
                "The requested resource cannot be found.",
            ),
            ProviderError::RequiresReplace { paths } => Diagnostic::error(
                "Resource requires replacement",
                self.to_string(),
            )
            .with_attribute(paths.first().cloned().unwrap_or_default()),
            ProviderError::UnknownType(name) => Diagnostic::error(
                "Unknown type",
                format!("No resource or data source named '{}' is registered.", name),
            ),
            ProviderError::Client(e) => {
                Diagnostic::error("Unable to create Kubernetes client", e.to_string())
            }
            ProviderError::Core(e @ CoreError::InvalidImportId { .. }) => {
                Diagnostic::error("Invalid import ID", e.to_string())
            }
            ProviderError::Core(e) => Diagnostic::error("Invalid configuration", e.to_string()),
        };
        diagnostic.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_diagnostic() {
        let diags = ProviderError::Offline.to_diagnostics();
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.summary, "Provider in offline mode");
    }

    #[test]
    fn test_not_found_diagnostic() {
        let err = ProviderError::NotFound {
            resource: "flux-operator/MiniCluster/flux-sample".to_string(),
        };
        let diags = err.to_diagnostics();
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.summary, "Unable to find resource");
        assert_eq!(diag.detail, "The requested resource cannot be found.");
    }

    #[test]
    fn test_import_id_diagnostic() {
        let err = ProviderError::from(crdform_core::ImportId::parse("no-slash", true).unwrap_err());
        let diags = err.to_diagnostics();
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.summary, "Invalid import ID");
        assert!(diag.detail.contains("namespace/name"));
    }

    #[test]
    fn test_invalid_config_keeps_attribute_paths() {
        let mut diags = Diagnostics::new();
        diags.add_attribute_error("metadata.name", "Missing required argument", "required");
        let out = ProviderError::InvalidConfig(diags).to_diagnostics();
        assert_eq!(out.len(), 1);
        assert_eq!(out.iter().next().unwrap().attribute.as_deref(), Some("metadata.name"));
    }

    #[test]
    fn test_requires_replace_message() {
        let err = ProviderError::RequiresReplace {
            paths: vec!["metadata.name".to_string(), "metadata.namespace".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Changing metadata.name, metadata.namespace requires replacing the resource"
        );
    }
}
