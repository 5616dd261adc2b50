//! The object envelope shared by every kind

use crdform_core::{Attribute, AttributeType, Validator, attributes};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A custom resource object: identity, metadata and typed spec
///
/// `status` and server-managed metadata are not modeled and are dropped on
/// deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdObject<S> {
    #[serde(default)]
    pub api_version: String,

    #[serde(default)]
    pub kind: String,

    pub metadata: ObjectMetadata,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<S>,
}

/// The user-settable part of `ObjectMeta`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,
}

/// The `metadata` block; `namespace` exists only for namespaced kinds
pub fn metadata_attribute(namespaced: bool) -> Attribute {
    let mut attrs = attributes([(
        "name",
        Attribute::string()
            .required()
            .requires_replace()
            .validate(Validator::Name)
            .describe("Unique name of the object. Changing it replaces the object."),
    )]);

    if namespaced {
        attrs.insert(
            "namespace".to_string(),
            Attribute::string()
                .required()
                .requires_replace()
                .validate(Validator::Namespace)
                .describe("Namespace of the object. Changing it replaces the object."),
        );
    }

    attrs.insert(
        "labels".to_string(),
        Attribute::map(AttributeType::String)
            .optional()
            .validate(Validator::LabelKeys)
            .validate(Validator::LabelValues)
            .describe("Map of string keys and values used to organize and select objects."),
    );
    attrs.insert(
        "annotations".to_string(),
        Attribute::map(AttributeType::String)
            .optional()
            .validate(Validator::AnnotationKeys)
            .describe("Unstructured key value map stored with the object."),
    );

    Attribute::single_nested(attrs)
        .required()
        .describe("Data that helps uniquely identify this object.")
}
