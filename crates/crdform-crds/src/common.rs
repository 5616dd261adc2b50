//! Attribute trees for built-in Kubernetes types embedded in CRDs
//!
//! The typed fields use the `k8s-openapi` structs directly.

use crdform_core::{Attribute, AttributeType, Validator, attributes};

/// `metav1.LabelSelector`
pub fn label_selector_attribute() -> Attribute {
    Attribute::single_nested(attributes([
        (
            "match_expressions",
            Attribute::list_nested(attributes([
                (
                    "key",
                    Attribute::string()
                        .required()
                        .describe("Label key that the selector applies to."),
                ),
                (
                    "operator",
                    Attribute::string()
                        .required()
                        .describe("One of In, NotIn, Exists and DoesNotExist."),
                ),
                ("values", Attribute::list(AttributeType::String).optional()),
            ]))
            .optional()
            .describe("List of label selector requirements, ANDed."),
        ),
        (
            "match_labels",
            Attribute::map(AttributeType::String)
                .optional()
                .describe("Map of key value pairs, each equivalent to an In requirement."),
        ),
    ]))
    .optional()
}

/// `rbacv1.Subject`
pub fn subject_attribute() -> Attribute {
    Attribute::list_nested(attributes([
        (
            "api_group",
            Attribute::string().optional(),
        ),
        (
            "kind",
            Attribute::string()
                .required()
                .validate(Validator::OneOf(vec![
                    "User".to_string(),
                    "Group".to_string(),
                    "ServiceAccount".to_string(),
                ])),
        ),
        ("name", Attribute::string().required()),
        ("namespace", Attribute::string().optional()),
    ]))
    .optional()
    .describe("Users, groups or service accounts.")
}
