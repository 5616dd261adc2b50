//! crdform CRDs - typed custom resource models and their attribute schemas
//!
//! One module per API group, one submodule per kind and version. Each kind
//! is a unit struct implementing [`CustomResourceKind`]: the coordinates of
//! the kind on the API server, the typed `spec` record and the declared
//! attribute tree of that record. The generic adapters in `crdform-provider`
//! do everything else.

pub mod common;
pub mod flux_framework_org;
mod kind;
pub mod kyverno_io;
mod object;

pub use kind::{CustomResourceKind, snake_case};
pub use object::{CrdObject, ObjectMetadata, metadata_attribute};

pub use flux_framework_org::mini_cluster_v1alpha1::MiniCluster;
pub use kyverno_io::cluster_policy_v1::ClusterPolicy;
pub use kyverno_io::policy_exception_v2beta1::PolicyException;
pub use kyverno_io::policy_v1::Policy;
