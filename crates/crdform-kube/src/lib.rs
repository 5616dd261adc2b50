//! crdform Kube - Kubernetes access for crdform adapters
//!
//! This crate provides:
//! - **DynamicClient**: The get / server-side apply / delete seam every adapter talks to
//! - **KubeDynamicClient**: The `kube`-backed implementation
//! - **MockDynamicClient**: In-memory client with operation counts for tests
//! - **Wait conditions**: Post-apply JSONPath polling and post-delete polling

pub mod client;
pub mod error;
pub mod mock;
pub mod wait;

pub use client::{ApplyParams, DynamicClient, KubeDynamicClient, ResourceRef};
pub use error::{KubeError, Result};
pub use mock::{MockDynamicClient, OperationCounts};
pub use wait::{WaitForDelete, WaitForUpsert, wait_for_delete, wait_for_upsert};
