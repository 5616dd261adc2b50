//! `kyverno.io/v1` `Policy`, the namespaced variant of `ClusterPolicy`

use crdform_core::Attributes;

use super::policy_spec_v1::{PolicySpec, policy_spec_attributes};
use crate::kind::CustomResourceKind;

pub struct Policy;

impl CustomResourceKind for Policy {
    const GROUP: &'static str = "kyverno.io";
    const VERSION: &'static str = "v1";
    const KIND: &'static str = "Policy";
    const PLURAL: &'static str = "policies";
    const NAMESPACED: bool = true;
    const SPEC_REQUIRED: bool = true;
    const DESCRIPTION: &'static str =
        "Policy declares validation, mutation, and generation behaviors for matching resources in its namespace.";

    type Spec = PolicySpec;

    fn spec_attributes() -> Attributes {
        policy_spec_attributes()
    }
}
