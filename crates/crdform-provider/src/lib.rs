//! crdform Provider - Kubernetes custom resources as Terraform-style
//! resources and data sources
//!
//! For every supported kind the provider registers:
//! - a managed resource (server-side apply, read, delete, import)
//! - a data source reading an existing object
//! - a `_manifest` data source rendering YAML without a cluster
//!
//! # Example
//!
//! ```no_run
//! use crdform_core::ProviderConfig;
//! use crdform_provider::Provider;
//! use serde_json::json;
//!
//! # async fn example() -> crdform_provider::Result<()> {
//! let mut provider = Provider::new();
//! provider.configure(ProviderConfig::default()).await?;
//!
//! let policy = provider.resource("k8s_kyverno_io_cluster_policy_v1")?;
//! let state = policy
//!     .create(json!({
//!         "metadata": { "name": "require-labels" },
//!         "spec": { "validation_failure_action": "Audit" }
//!     }))
//!     .await?;
//! println!("created {}", state["id"]);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod data;
pub mod error;
pub mod framework;
pub mod options;
pub mod provider;

pub use adapter::{CrdDataSource, CrdManifest, CrdResource};
pub use data::ProviderData;
pub use error::{ProviderError, Result};
pub use framework::{DataSource, PlanResult, Resource};
pub use options::ResourceOptions;
pub use provider::{PROVIDER_NAME, Provider};
