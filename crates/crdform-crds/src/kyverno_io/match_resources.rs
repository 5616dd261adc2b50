//! Resource filters used by policy rules (`match` / `exclude`) and by
//! policy exceptions

use k8s_openapi::api::rbac::v1::Subject;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::LabelSelector;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crdform_core::{Attribute, AttributeType, Attributes, Validator, attributes};

use crate::common::{label_selector_attribute, subject_attribute};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResources {
    /// Filters ORed together
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub any: Option<Vec<ResourceFilter>>,

    /// Filters ANDed together
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<ResourceFilter>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceDescription>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_roles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Subject>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<ResourceDescription>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_roles: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Subject>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDescription {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kinds: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespaces: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace_selector: Option<LabelSelector>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<String>>,
}

fn string_list() -> Attribute {
    Attribute::list(AttributeType::String).optional()
}

pub fn resource_description_attribute() -> Attribute {
    Attribute::single_nested(attributes([
        (
            "kinds",
            string_list().describe("Kinds is a list of resource kinds."),
        ),
        ("name", Attribute::string().optional()),
        (
            "names",
            string_list().describe("Names are the names of the resources, wildcards allowed."),
        ),
        ("namespaces", string_list()),
        ("annotations", Attribute::map(AttributeType::String).optional()),
        ("selector", label_selector_attribute()),
        ("namespace_selector", label_selector_attribute()),
        (
            "operations",
            Attribute::list(AttributeType::String)
                .optional()
                .describe("Admission operations: CREATE, CONNECT, UPDATE or DELETE."),
        ),
    ]))
    .optional()
    .describe("Describes the resources to match.")
}

fn user_info_attributes() -> Attributes {
    attributes([
        ("roles", string_list().describe("Namespaced role names.")),
        ("cluster_roles", string_list().describe("Cluster-wide role names.")),
        ("subjects", subject_attribute()),
    ])
}

fn resource_filter_attributes() -> Attributes {
    let mut attrs = attributes([("resources", resource_description_attribute())]);
    attrs.extend(user_info_attributes());
    attrs
}

/// `match` / `exclude` block
pub fn match_resources_attribute() -> Attribute {
    let mut attrs = attributes([
        (
            "any",
            Attribute::list_nested(resource_filter_attributes())
                .optional()
                .describe("Resource filters, any of which must match."),
        ),
        (
            "all",
            Attribute::list_nested(resource_filter_attributes())
                .optional()
                .describe("Resource filters, all of which must match."),
        ),
        ("resources", resource_description_attribute()),
    ]);
    attrs.extend(user_info_attributes());
    Attribute::single_nested(attrs).optional()
}

pub(crate) fn condition_operator() -> Validator {
    Validator::OneOf(
        [
            "Equals",
            "NotEquals",
            "AnyIn",
            "AllIn",
            "AnyNotIn",
            "AllNotIn",
            "GreaterThanOrEquals",
            "GreaterThan",
            "LessThanOrEquals",
            "LessThan",
            "DurationGreaterThanOrEquals",
            "DurationGreaterThan",
            "DurationLessThanOrEquals",
            "DurationLessThan",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
    )
}
