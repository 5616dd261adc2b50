//! The provider surface: what a resource or data source implementation
//! exposes to the plugin host
//!
//! Values crossing this boundary are JSON objects in state form (snake_case
//! attribute names). Every operation is a stateless one-shot call; the only
//! shared state is the immutable [`ProviderData`] handed over by
//! `configure`.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crdform_core::{Diagnostics, Schema};

use crate::data::ProviderData;
use crate::error::Result;

/// Outcome of planning a change to a resource
#[derive(Debug, Clone, PartialEq)]
pub struct PlanResult {
    /// Planned state with computed attributes filled in where known
    pub planned_state: Value,
    /// Whether applying the plan changes anything
    pub changed: bool,
    /// Attribute paths whose change forces a replacement
    pub requires_replace: Vec<String>,
}

impl PlanResult {
    pub fn no_change(state: Value) -> Self {
        Self {
            planned_state: state,
            changed: false,
            requires_replace: Vec::new(),
        }
    }

    pub fn with_changes(planned_state: Value, requires_replace: Vec<String>) -> Self {
        Self {
            planned_state,
            changed: true,
            requires_replace,
        }
    }

    pub fn requires_replacement(&self) -> bool {
        !self.requires_replace.is_empty()
    }
}

/// A managed resource
#[async_trait]
pub trait Resource: Send + Sync {
    /// Registered type name, e.g. `k8s_kyverno_io_policy_v1`
    fn type_name(&self) -> String;

    fn schema(&self) -> &Schema;

    /// Receive the shared provider data
    fn configure(&mut self, data: Arc<ProviderData>);

    /// Static validation of a configuration
    fn validate(&self, config: &Value) -> Diagnostics {
        self.schema().validate_config(config)
    }

    async fn create(&self, planned: Value) -> Result<Value>;

    /// Refresh state; `None` means the object is gone
    async fn read(&self, state: Value) -> Result<Option<Value>>;

    async fn update(&self, prior: Value, planned: Value) -> Result<Value>;

    async fn delete(&self, state: Value) -> Result<()>;

    /// Minimal state for an import ID; the host follows up with `read`
    async fn import_state(&self, id: &str) -> Result<Value>;

    /// Fill computed attributes and detect replacements
    async fn modify_plan(&self, prior: Option<Value>, planned: Value) -> Result<PlanResult>;
}

/// A read-only data source
#[async_trait]
pub trait DataSource: Send + Sync {
    fn type_name(&self) -> String;

    fn schema(&self) -> &Schema;

    /// Receive the shared provider data; sources that never talk to a
    /// cluster ignore it
    fn configure(&mut self, data: Arc<ProviderData>);

    fn validate(&self, config: &Value) -> Diagnostics {
        self.schema().validate_config(config)
    }

    async fn read(&self, config: Value) -> Result<Value>;
}
