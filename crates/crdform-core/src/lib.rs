//! crdform Core - shared types for exposing Kubernetes custom resources as
//! Terraform-style resources
//!
//! This crate provides the foundational pieces used by every adapter:
//! - `Schema`: Attribute trees with state <-> wire conversion
//! - `Diagnostics`: User-facing errors and warnings
//! - `validators`: Kubernetes name, namespace, label and annotation checks
//! - `ImportId`: Parsing of `name` / `namespace/name` import identifiers
//! - `JsonPath`: The JSONPath subset used by post-apply wait conditions
//! - `ProviderConfig`: Provider-level configuration

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod import;
pub mod jsonpath;
pub mod schema;
pub mod validators;

pub use config::{DEFAULT_FIELD_MANAGER, ProviderConfig};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CoreError, Result};
pub use import::{ImportId, resource_id};
pub use jsonpath::JsonPath;
pub use schema::{Attribute, AttributeType, Attributes, Schema, Validator, attributes};
