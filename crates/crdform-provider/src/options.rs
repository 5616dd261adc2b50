//! Provider bookkeeping carried by every resource
//!
//! These attributes live only in state and never reach the API server:
//! `id`, `field_manager`, `force_conflicts`, `wait_for_upsert` and
//! `wait_for_delete`.

use serde::Deserialize;
use serde_json::{Value, json};

use crdform_core::{Attribute, Attributes, Validator, attributes};
use crdform_kube::{ApplyParams, WaitForDelete, WaitForUpsert};

use crate::data::ProviderData;
use crate::error::{ProviderError, Result};

pub const ID: &str = "id";
pub const FIELD_MANAGER: &str = "field_manager";
pub const FORCE_CONFLICTS: &str = "force_conflicts";
pub const WAIT_FOR_UPSERT: &str = "wait_for_upsert";
pub const WAIT_FOR_DELETE: &str = "wait_for_delete";

/// Longest accepted `timeout`, one week
pub const MAX_TIMEOUT_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Longest accepted `poll_interval`, one hour
pub const MAX_POLL_INTERVAL_SECONDS: i64 = 60 * 60;

/// State keys kept from prior state across a refresh
pub const BOOKKEEPING: [&str; 5] = [ID, FIELD_MANAGER, FORCE_CONFLICTS, WAIT_FOR_UPSERT, WAIT_FOR_DELETE];

/// `id`, first attribute of every resource and data source
pub fn id_attribute() -> Attribute {
    Attribute::string()
        .computed()
        .state_only()
        .describe("Identifier: 'namespace/name' for namespaced objects, 'name' otherwise.")
}

/// Bookkeeping attributes appended to resource schemas
pub fn bookkeeping_attributes() -> Attributes {
    let timeout = || {
        Attribute::int64()
            .optional()
            .validate(Validator::AtLeast(0))
            .validate(Validator::AtMost(MAX_TIMEOUT_SECONDS))
            .describe("Seconds to wait before giving up, at most one week. Defaults to 30.")
    };
    let poll_interval = || {
        Attribute::int64()
            .optional()
            .validate(Validator::AtLeast(0))
            .validate(Validator::AtMost(MAX_POLL_INTERVAL_SECONDS))
            .describe("Seconds between checks, at most one hour. Defaults to 5.")
    };

    attributes([
        (
            FIELD_MANAGER,
            Attribute::string()
                .optional()
                .computed()
                .state_only()
                .validate(Validator::MaxLength(128))
                .describe("Server-side apply field manager. Defaults to the provider setting."),
        ),
        (
            FORCE_CONFLICTS,
            Attribute::bool()
                .optional()
                .computed()
                .state_only()
                .describe("Take ownership of fields managed by others. Defaults to the provider setting."),
        ),
        (
            WAIT_FOR_UPSERT,
            Attribute::list_nested(attributes([
                (
                    "jsonpath",
                    Attribute::string()
                        .required()
                        .describe("JSONPath into the object, e.g. '.status.phase'."),
                ),
                (
                    "value",
                    Attribute::string()
                        .required()
                        .describe("Expected value at the JSONPath."),
                ),
                ("timeout", timeout()),
                ("poll_interval", poll_interval()),
            ]))
            .optional()
            .state_only()
            .describe("Conditions to wait for after create and update."),
        ),
        (
            WAIT_FOR_DELETE,
            Attribute::single_nested(attributes([
                ("timeout", timeout()),
                ("poll_interval", poll_interval()),
            ]))
            .optional()
            .state_only()
            .describe("Wait until the object is gone after delete."),
        ),
    ])
}

#[derive(Debug, Default, Deserialize)]
struct RawOptions {
    field_manager: Option<String>,
    force_conflicts: Option<bool>,
    wait_for_upsert: Option<Vec<WaitForUpsert>>,
    wait_for_delete: Option<WaitForDelete>,
}

/// Bookkeeping of one resource, with provider defaults applied
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceOptions {
    pub field_manager: String,
    pub force_conflicts: bool,
    pub wait_for_upsert: Vec<WaitForUpsert>,
    pub wait_for_delete: Option<WaitForDelete>,
}

impl ResourceOptions {
    /// Read bookkeeping from a state or plan value
    pub fn from_state(state: &Value, defaults: &ProviderData) -> Result<Self> {
        let raw: RawOptions = serde_json::from_value(strip_nulls(state))
            .map_err(|e| ProviderError::Unmarshal(e.to_string()))?;

        Ok(Self {
            field_manager: raw
                .field_manager
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| defaults.field_manager.clone()),
            force_conflicts: raw.force_conflicts.unwrap_or(defaults.force_conflicts),
            wait_for_upsert: raw.wait_for_upsert.unwrap_or_default(),
            wait_for_delete: raw.wait_for_delete,
        })
    }

    pub fn apply_params(&self) -> ApplyParams {
        ApplyParams {
            field_manager: self.field_manager.clone(),
            force: self.force_conflicts,
        }
    }

    /// Write the computed bookkeeping attributes into a state value
    pub fn fill_computed(&self, state: &mut Value, id: String) {
        if let Some(obj) = state.as_object_mut() {
            obj.insert(ID.to_string(), Value::String(id));
            obj.insert(FIELD_MANAGER.to_string(), json!(self.field_manager));
            obj.insert(FORCE_CONFLICTS.to_string(), json!(self.force_conflicts));
        }
    }
}

/// Unset nested attributes arrive as explicit nulls
fn strip_nulls(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.clone(), strip_nulls(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(strip_nulls).collect()),
        other => other.clone(),
    }
}

/// Copy bookkeeping keys present in `from` into `to`
pub fn carry_bookkeeping(from: &Value, to: &mut Value) {
    let (Some(from), Some(to)) = (from.as_object(), to.as_object_mut()) else {
        return;
    };
    for key in BOOKKEEPING {
        if let Some(value) = from.get(key).filter(|v| !v.is_null()) {
            to.insert(key.to_string(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crdform_core::ProviderConfig;

    fn defaults() -> ProviderData {
        ProviderData::offline(&ProviderConfig {
            field_manager: "platform".to_string(),
            force_conflicts: true,
            ..Default::default()
        })
    }

    fn field(value: &impl serde::Serialize, name: &str) -> Value {
        serde_json::to_value(value).unwrap()[name].clone()
    }

    #[test]
    fn test_defaults_from_provider() {
        let options =
            ResourceOptions::from_state(&json!({ "metadata": { "name": "x" } }), &defaults())
                .unwrap();
        assert_eq!(options.field_manager, "platform");
        assert!(options.force_conflicts);
        assert!(options.wait_for_upsert.is_empty());
        assert!(options.wait_for_delete.is_none());
    }

    #[test]
    fn test_resource_overrides() {
        let state = json!({
            "field_manager": "team-a",
            "force_conflicts": false,
            "wait_for_upsert": [{ "jsonpath": ".status.phase", "value": "Ready", "timeout": 120 }],
            "wait_for_delete": { "poll_interval": 1 }
        });
        let options = ResourceOptions::from_state(&state, &defaults()).unwrap();
        assert_eq!(
            options.apply_params(),
            ApplyParams {
                field_manager: "team-a".to_string(),
                force: false
            }
        );
        assert_eq!(field(&options.wait_for_upsert[0], "timeout"), json!(120));
        assert_eq!(field(&options.wait_for_upsert[0], "poll_interval"), json!(5));
        assert_eq!(
            field(options.wait_for_delete.as_ref().unwrap(), "poll_interval"),
            json!(1)
        );
    }

    #[test]
    fn test_nulls_fall_back_to_defaults() {
        let state = json!({ "field_manager": null, "force_conflicts": null, "wait_for_upsert": null });
        let options = ResourceOptions::from_state(&state, &defaults()).unwrap();
        assert_eq!(options.field_manager, "platform");
        assert!(options.wait_for_upsert.is_empty());

        let state = json!({
            "wait_for_upsert": [{ "jsonpath": ".status.phase", "value": "Ready", "timeout": null }]
        });
        let options = ResourceOptions::from_state(&state, &defaults()).unwrap();
        assert_eq!(field(&options.wait_for_upsert[0], "timeout"), json!(30));
    }

    #[test]
    fn test_fill_computed() {
        let options = ResourceOptions::from_state(&json!({}), &defaults()).unwrap();
        let mut state = json!({ "metadata": { "name": "x", "namespace": "ns" } });
        options.fill_computed(&mut state, "ns/x".to_string());
        assert_eq!(state["id"], "ns/x");
        assert_eq!(state["field_manager"], "platform");
        assert_eq!(state["force_conflicts"], true);
    }

    #[test]
    fn test_carry_bookkeeping() {
        let prior = json!({
            "id": "ns/x",
            "field_manager": "me",
            "wait_for_delete": { "timeout": 10 },
            "spec": { "a": 1 }
        });
        let mut refreshed = json!({ "metadata": { "name": "x" }, "spec": { "a": 2 } });
        carry_bookkeeping(&prior, &mut refreshed);
        assert_eq!(refreshed["id"], "ns/x");
        assert_eq!(refreshed["field_manager"], "me");
        assert_eq!(refreshed["wait_for_delete"]["timeout"], 10);
        assert_eq!(refreshed["spec"]["a"], 2);
    }
}
