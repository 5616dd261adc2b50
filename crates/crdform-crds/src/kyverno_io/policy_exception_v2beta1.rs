//! `kyverno.io/v2beta1` `PolicyException`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crdform_core::{Attribute, AttributeType, Attributes, attributes};

use super::match_resources::{
    MatchResources, ResourceFilter, condition_operator, resource_description_attribute,
};
use super::policy_spec_v1::{PodSecurityStandard, pod_security_standard_attributes};
use crate::common::subject_attribute;
use crate::kind::CustomResourceKind;

/// Exempts matching resources from the named policy rules
pub struct PolicyException;

impl CustomResourceKind for PolicyException {
    const GROUP: &'static str = "kyverno.io";
    const VERSION: &'static str = "v2beta1";
    const KIND: &'static str = "PolicyException";
    const PLURAL: &'static str = "policyexceptions";
    const NAMESPACED: bool = true;
    const SPEC_REQUIRED: bool = true;
    const DESCRIPTION: &'static str = "PolicyException declares resources to be excluded from specified policies.";

    type Spec = PolicyExceptionSpec;

    fn spec_attributes() -> Attributes {
        spec_attributes()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyExceptionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exceptions: Option<Vec<Exception>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#match: Option<MatchResources>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Conditions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_security: Option<Vec<PodSecurityStandard>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exception {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_names: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<Vec<Condition>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<Condition>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

fn condition_attribute() -> Attribute {
    Attribute::list_nested(attributes([
        ("key", Attribute::dynamic().optional()),
        (
            "operator",
            Attribute::string().optional().validate(condition_operator()),
        ),
        ("value", Attribute::dynamic().optional()),
        ("message", Attribute::string().optional()),
    ]))
    .optional()
}

fn filter_attributes() -> Attributes {
    attributes([
        ("resources", resource_description_attribute()),
        ("roles", Attribute::list(AttributeType::String).optional()),
        ("cluster_roles", Attribute::list(AttributeType::String).optional()),
        ("subjects", subject_attribute()),
    ])
}

fn spec_attributes() -> Attributes {
    attributes([
        (
            "background",
            Attribute::bool()
                .optional()
                .describe("Whether the exception applies during background scans."),
        ),
        (
            "exceptions",
            Attribute::list_nested(attributes([
                (
                    "policy_name",
                    Attribute::string()
                        .required()
                        .describe("Name of the policy, `namespace/name` for namespaced policies."),
                ),
                (
                    "rule_names",
                    Attribute::list(AttributeType::String)
                        .required()
                        .describe("Rules of the policy the exception applies to."),
                ),
            ]))
            .required(),
        ),
        (
            "match",
            Attribute::single_nested(attributes([
                ("any", Attribute::list_nested(filter_attributes()).optional()),
                ("all", Attribute::list_nested(filter_attributes()).optional()),
            ]))
            .required()
            .describe("Resources the exception applies to."),
        ),
        (
            "conditions",
            Attribute::single_nested(attributes([
                ("any", condition_attribute()),
                ("all", condition_attribute()),
            ]))
            .optional(),
        ),
        (
            "pod_security",
            Attribute::list_nested(pod_security_standard_attributes())
                .optional()
                .describe("Pod Security Standard controls to exempt."),
        ),
    ])
}

impl PolicyExceptionSpec {
    /// Resource filters, `any` before `all`
    pub fn filters(&self) -> impl Iterator<Item = &ResourceFilter> {
        self.r#match
            .iter()
            .flat_map(|m| m.any.iter().chain(m.all.iter()))
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::CrdObject;

    #[test]
    fn test_parse_exception() {
        let object: CrdObject<PolicyExceptionSpec> = serde_yaml::from_str(
            r#"
apiVersion: kyverno.io/v2beta1
kind: PolicyException
metadata:
  name: delta-exception
  namespace: delta
spec:
  exceptions:
    - policyName: disallow-host-namespaces
      ruleNames:
        - host-namespaces
        - autogen-host-namespaces
  match:
    any:
      - resources:
          kinds: [Pod, Deployment]
          namespaces: [delta]
          names: [important-tool*]
  conditions:
    any:
      - key: "{{ request.object.metadata.labels.app || '' }}"
        operator: Equals
        value: busybox
"#,
        )
        .unwrap();

        let spec = object.spec.unwrap();
        let exception = &spec.exceptions.as_ref().unwrap()[0];
        assert_eq!(exception.policy_name.as_deref(), Some("disallow-host-namespaces"));
        assert_eq!(exception.rule_names.as_ref().unwrap().len(), 2);

        let filters: Vec<_> = spec.filters().collect();
        assert_eq!(filters.len(), 1);
        assert_eq!(
            filters[0].resources.as_ref().unwrap().names.as_deref(),
            Some(&["important-tool*".to_string()][..])
        );

        let condition = &spec.conditions.unwrap().any.unwrap()[0];
        assert_eq!(condition.operator.as_deref(), Some("Equals"));
    }

    #[test]
    fn test_required_blocks() {
        let attrs = spec_attributes();
        assert!(attrs["exceptions"].required);
        assert!(attrs["match"].required);
        assert!(attrs["conditions"].optional);
    }
}
