use std::fmt;
use std::sync::Arc;

use crdform_core::{DEFAULT_FIELD_MANAGER, ProviderConfig};
use crdform_kube::DynamicClient;

use crate::error::{ProviderError, Result};

/// Shared, immutable data handed to every adapter by `configure`
#[derive(Clone)]
pub struct ProviderData {
    /// None in offline mode
    client: Option<Arc<dyn DynamicClient>>,
    /// Default server-side apply field manager
    pub field_manager: String,
    /// Default for forcing apply conflicts
    pub force_conflicts: bool,
}

impl ProviderData {
    /// Provider data without a client
    pub fn offline(config: &ProviderConfig) -> Self {
        Self {
            client: None,
            field_manager: config.field_manager.clone(),
            force_conflicts: config.force_conflicts,
        }
    }

    pub fn with_client(client: Arc<dyn DynamicClient>, config: &ProviderConfig) -> Self {
        Self {
            client: Some(client),
            ..Self::offline(config)
        }
    }

    pub fn is_offline(&self) -> bool {
        self.client.is_none()
    }

    /// The dynamic client, or `Offline`
    pub fn client(&self) -> Result<&Arc<dyn DynamicClient>> {
        self.client.as_ref().ok_or(ProviderError::Offline)
    }
}

impl Default for ProviderData {
    fn default() -> Self {
        Self {
            client: None,
            field_manager: DEFAULT_FIELD_MANAGER.to_string(),
            force_conflicts: false,
        }
    }
}

impl fmt::Debug for ProviderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderData")
            .field("offline", &self.is_offline())
            .field("field_manager", &self.field_manager)
            .field("force_conflicts", &self.force_conflicts)
            .finish()
    }
}
