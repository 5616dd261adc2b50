use crdform_core::{Attribute, Attributes, Schema};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Debug;

use crate::object::metadata_attribute;

/// A custom resource kind served by the API server
///
/// Implementors are unit structs; everything is associated.
pub trait CustomResourceKind: Send + Sync + 'static {
    const GROUP: &'static str;
    const VERSION: &'static str;
    const KIND: &'static str;
    /// Lowercase plural used in REST paths
    const PLURAL: &'static str;
    const NAMESPACED: bool;
    /// Whether a configuration must carry a `spec` block
    const SPEC_REQUIRED: bool = false;
    const DESCRIPTION: &'static str;

    /// Typed `spec` record
    type Spec: Serialize + DeserializeOwned + Debug + Clone + PartialEq + Send + Sync;

    /// Attribute tree of `spec`, keyed by state name
    fn spec_attributes() -> Attributes;

    fn api_version() -> String {
        format!("{}/{}", Self::GROUP, Self::VERSION)
    }

    /// `k8s_<group>_<kind>_<version>`, e.g. `k8s_kyverno_io_cluster_policy_v1`
    fn type_name() -> String {
        format!(
            "k8s_{}_{}_{}",
            Self::GROUP.replace(['.', '-'], "_"),
            snake_case(Self::KIND),
            Self::VERSION
        )
    }

    /// Object schema: `metadata` plus `spec`, without provider bookkeeping
    fn object_schema() -> Schema {
        let mut spec = Attribute::single_nested(Self::spec_attributes())
            .describe("Specification of the desired behavior of the object.");
        spec = if Self::SPEC_REQUIRED {
            spec.required()
        } else {
            spec.optional()
        };

        Schema::new(Self::DESCRIPTION)
            .with_attribute("metadata", metadata_attribute(Self::NAMESPACED))
            .with_attribute("spec", spec)
    }
}

/// `PolicyException` -> `policy_exception`
pub fn snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
