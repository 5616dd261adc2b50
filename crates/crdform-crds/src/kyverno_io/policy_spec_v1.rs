//! `kyverno.io/v1` policy spec, shared by `ClusterPolicy` and `Policy`

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crdform_core::{Attribute, AttributeType, Attributes, Validator, attributes};

use super::match_resources::{MatchResources, match_resources_attribute};
use crate::common::label_selector_attribute;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apply_rules: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_policy: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_failure_action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_failure_action_overrides: Option<Vec<ValidationFailureActionOverride>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_validation: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_timeout_seconds: Option<i32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutate_existing_on_policy_update: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_existing: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_server_side_apply: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailureActionOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<ContextEntry>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#match: Option<MatchResources>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<MatchResources>,

    /// Untyped: `any` / `all` condition lists or a legacy condition array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validate: Option<Validation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutate: Option<Mutation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate: Option<Generation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_images: Option<Vec<ImageVerification>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip_background_requests: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map: Option<ConfigMapReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_call: Option<ApiCall>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<Variable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_registry: Option<ImageRegistry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigMapReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<RequestData>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jmes_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceCall>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_bundle: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jmes_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRegistry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jmes_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any_pattern: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deny: Option<Deny>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod_security: Option<PodSecurity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cel: Option<Cel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deny {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PodSecurity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<PodSecurityStandard>>,
}

/// Pod Security Standard control to exempt
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodSecurityStandard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restricted_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expressions: Option<Vec<CelExpression>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CelExpression {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch_strategic_merge: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patches_json6902: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<Vec<TargetResource>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetResource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Generation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronize: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orphan_downstream_on_policy_delete: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clone: Option<CloneFrom>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CloneFrom {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageVerification {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_references: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutate_digest: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_digest: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attestors: Option<Vec<AttestorSet>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttestorSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<i32>,

    /// Keys, certificates, keyless or nested attestor sets; left untyped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<Value>>,
}

fn one_of(values: &[&str]) -> Validator {
    Validator::OneOf(values.iter().map(|v| v.to_string()).collect())
}

fn validation_failure_action() -> Validator {
    one_of(&["audit", "enforce", "Audit", "Enforce"])
}

fn string_list() -> Attribute {
    Attribute::list(AttributeType::String).optional()
}

/// Pod Security Standard exclusion, also used by policy exceptions
pub fn pod_security_standard_attributes() -> Attributes {
    attributes([
        (
            "control_name",
            Attribute::string()
                .required()
                .describe("Name of the Pod Security Standard control."),
        ),
        ("images", string_list()),
        ("restricted_field", Attribute::string().optional()),
        ("values", string_list()),
    ])
}

fn context_attribute() -> Attribute {
    Attribute::list_nested(attributes([
        ("name", Attribute::string().required()),
        (
            "config_map",
            Attribute::single_nested(attributes([
                ("name", Attribute::string().required()),
                ("namespace", Attribute::string().optional()),
            ]))
            .optional(),
        ),
        (
            "api_call",
            Attribute::single_nested(attributes([
                ("url_path", Attribute::string().optional()),
                (
                    "method",
                    Attribute::string().optional().validate(one_of(&["GET", "POST"])),
                ),
                (
                    "data",
                    Attribute::list_nested(attributes([
                        ("key", Attribute::string().required()),
                        ("value", Attribute::dynamic().required()),
                    ]))
                    .optional(),
                ),
                ("jmes_path", Attribute::string().optional()),
                (
                    "service",
                    Attribute::single_nested(attributes([
                        ("url", Attribute::string().required()),
                        ("ca_bundle", Attribute::string().optional()),
                    ]))
                    .optional(),
                ),
            ]))
            .optional(),
        ),
        (
            "variable",
            Attribute::single_nested(attributes([
                ("value", Attribute::dynamic().optional()),
                ("jmes_path", Attribute::string().optional()),
                ("default", Attribute::dynamic().optional()),
            ]))
            .optional(),
        ),
        (
            "image_registry",
            Attribute::single_nested(attributes([
                ("reference", Attribute::string().required()),
                ("jmes_path", Attribute::string().optional()),
            ]))
            .optional(),
        ),
    ]))
    .optional()
    .describe("Variables made available to the rule.")
}

fn validate_attribute() -> Attribute {
    Attribute::single_nested(attributes([
        (
            "message",
            Attribute::string()
                .optional()
                .describe("Message reported on validation failure."),
        ),
        ("pattern", Attribute::dynamic().optional()),
        ("any_pattern", Attribute::dynamic().optional()),
        (
            "deny",
            Attribute::single_nested(attributes([(
                "conditions",
                Attribute::dynamic().optional(),
            )]))
            .optional(),
        ),
        (
            "pod_security",
            Attribute::single_nested(attributes([
                (
                    "level",
                    Attribute::string()
                        .optional()
                        .validate(one_of(&["privileged", "baseline", "restricted"])),
                ),
                (
                    "version",
                    Attribute::string()
                        .optional()
                        .validate(Validator::Pattern(r"^(v1\.\d+|latest)$".to_string())),
                ),
                (
                    "exclude",
                    Attribute::list_nested(pod_security_standard_attributes()).optional(),
                ),
            ]))
            .optional(),
        ),
        (
            "cel",
            Attribute::single_nested(attributes([(
                "expressions",
                Attribute::list_nested(attributes([
                    ("expression", Attribute::string().required()),
                    ("message", Attribute::string().optional()),
                ]))
                .optional(),
            )]))
            .optional(),
        ),
    ]))
    .optional()
}

fn mutate_attribute() -> Attribute {
    Attribute::single_nested(attributes([
        ("patch_strategic_merge", Attribute::dynamic().optional()),
        (
            "patches_json6902",
            Attribute::string()
                .optional()
                .describe("RFC 6902 JSON patch as a YAML string."),
        ),
        (
            "targets",
            Attribute::list_nested(attributes([
                ("api_version", Attribute::string().optional()),
                ("kind", Attribute::string().optional()),
                ("name", Attribute::string().optional()),
                ("namespace", Attribute::string().optional()),
            ]))
            .optional(),
        ),
    ]))
    .optional()
}

fn generate_attribute() -> Attribute {
    Attribute::single_nested(attributes([
        ("api_version", Attribute::string().optional()),
        ("kind", Attribute::string().optional()),
        ("name", Attribute::string().optional()),
        ("namespace", Attribute::string().optional()),
        (
            "synchronize",
            Attribute::bool()
                .optional()
                .describe("Keep the generated resource in sync with the policy."),
        ),
        ("orphan_downstream_on_policy_delete", Attribute::bool().optional()),
        ("data", Attribute::dynamic().optional()),
        (
            "clone",
            Attribute::single_nested(attributes([
                ("name", Attribute::string().optional()),
                ("namespace", Attribute::string().optional()),
            ]))
            .optional(),
        ),
    ]))
    .optional()
}

fn verify_images_attribute() -> Attribute {
    Attribute::list_nested(attributes([
        ("image_references", string_list()),
        ("repository", Attribute::string().optional()),
        ("mutate_digest", Attribute::bool().optional()),
        ("verify_digest", Attribute::bool().optional()),
        ("required", Attribute::bool().optional()),
        (
            "attestors",
            Attribute::list_nested(attributes([
                ("count", Attribute::int32().optional().validate(Validator::AtLeast(1))),
                ("entries", Attribute::list(AttributeType::Dynamic).optional()),
            ]))
            .optional(),
        ),
    ]))
    .optional()
}

fn rule_attributes() -> Attributes {
    attributes([
        (
            "name",
            Attribute::string()
                .required()
                .validate(Validator::MaxLength(63))
                .describe("Name of the rule."),
        ),
        ("context", context_attribute()),
        (
            "match",
            match_resources_attribute().describe("Resources the rule applies to."),
        ),
        (
            "exclude",
            match_resources_attribute().describe("Resources the rule does not apply to."),
        ),
        ("preconditions", Attribute::dynamic().optional()),
        ("validate", validate_attribute()),
        ("mutate", mutate_attribute()),
        ("generate", generate_attribute()),
        ("verify_images", verify_images_attribute()),
        ("skip_background_requests", Attribute::bool().optional()),
    ])
}

pub fn policy_spec_attributes() -> Attributes {
    attributes([
        (
            "rules",
            Attribute::list_nested(rule_attributes())
                .optional()
                .describe("List of rules applied to matching resources."),
        ),
        (
            "apply_rules",
            Attribute::string()
                .optional()
                .validate(one_of(&["All", "One"])),
        ),
        (
            "failure_policy",
            Attribute::string()
                .optional()
                .validate(one_of(&["Ignore", "Fail"])),
        ),
        (
            "validation_failure_action",
            Attribute::string()
                .optional()
                .validate(validation_failure_action())
                .describe("Whether a failed validation blocks (Enforce) or reports (Audit)."),
        ),
        (
            "validation_failure_action_overrides",
            Attribute::list_nested(attributes([
                (
                    "action",
                    Attribute::string()
                        .optional()
                        .validate(validation_failure_action()),
                ),
                ("namespaces", string_list()),
                ("namespace_selector", label_selector_attribute()),
            ]))
            .optional(),
        ),
        ("admission", Attribute::bool().optional()),
        (
            "background",
            Attribute::bool()
                .optional()
                .describe("Apply the policy to existing resources during background scans."),
        ),
        ("schema_validation", Attribute::bool().optional()),
        (
            "webhook_timeout_seconds",
            Attribute::int32()
                .optional()
                .validate(Validator::AtLeast(1))
                .validate(Validator::AtMost(30)),
        ),
        ("mutate_existing_on_policy_update", Attribute::bool().optional()),
        ("generate_existing", Attribute::bool().optional()),
        ("use_server_side_apply", Attribute::bool().optional()),
    ])
}
