//! `kyverno.io` API group

pub mod cluster_policy_v1;
pub mod match_resources;
pub mod policy_exception_v2beta1;
pub mod policy_spec_v1;
pub mod policy_v1;
