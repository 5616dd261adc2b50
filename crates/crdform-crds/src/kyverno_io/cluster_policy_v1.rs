//! `kyverno.io/v1` `ClusterPolicy`

use crdform_core::Attributes;

use super::policy_spec_v1::{PolicySpec, policy_spec_attributes};
use crate::kind::CustomResourceKind;

/// Cluster-wide set of rules to validate, mutate, generate or verify resources
pub struct ClusterPolicy;

impl CustomResourceKind for ClusterPolicy {
    const GROUP: &'static str = "kyverno.io";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "ClusterPolicy";
    const PLURAL: &'static str = "clusterpolicies";
    const NAMESPACED: bool = false;
    const SPEC_REQUIRED: bool = true;
    const DESCRIPTION: &'static str =
        "ClusterPolicy declares validation, mutation, and generation behaviors for matching resources.";

    type Spec = PolicySpec;

    fn spec_attributes() -> Attributes {
        policy_spec_attributes()
    }
}
