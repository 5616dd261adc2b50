//! Attribute schemas
//!
//! A [`Schema`] is the declarative attribute tree of one resource or data
//! source. Besides describing the user-facing attributes it is the single
//! authority for converting between the two JSON shapes of the same object:
//!
//! - **state form**: snake_case attribute names, as written in configuration
//!   and stored in state
//! - **wire form**: the upstream camelCase JSON names sent to the API server
//!
//! Map keys (labels, annotations, environment variables) are data and are
//! never renamed. Attributes marked [`Attribute::state_only`] exist only in
//! state (provider bookkeeping such as `field_manager`) and are dropped on
//! the way to the wire.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::diagnostics::Diagnostics;
use crate::error::{CoreError, Result};
use crate::validators;

/// Ordered attribute map, keyed by state name
pub type Attributes = IndexMap<String, Attribute>;

/// Build an [`Attributes`] map from `(name, attribute)` pairs
pub fn attributes<I, S>(items: I) -> Attributes
where
    I: IntoIterator<Item = (S, Attribute)>,
    S: Into<String>,
{
    items
        .into_iter()
        .map(|(name, attr)| (name.into(), attr))
        .collect()
}

/// Value type of an attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum AttributeType {
    String,
    Int64,
    Bool,
    /// Untyped JSON (`x-kubernetes-preserve-unknown-fields`, int-or-string)
    Dynamic,
    Map { element: Box<AttributeType> },
    List { element: Box<AttributeType> },
    SingleNested { attributes: Attributes },
    ListNested { attributes: Attributes },
    MapNested { attributes: Attributes },
}

impl AttributeType {
    /// Nested attributes, for the nested variants
    pub fn nested_attributes(&self) -> Option<&Attributes> {
        match self {
            AttributeType::SingleNested { attributes }
            | AttributeType::ListNested { attributes }
            | AttributeType::MapNested { attributes } => Some(attributes),
            _ => None,
        }
    }

    fn into_computed(self) -> Self {
        let computed = |attributes: Attributes| {
            attributes
                .into_iter()
                .map(|(name, attr)| (name, attr.into_computed()))
                .collect()
        };
        match self {
            AttributeType::SingleNested { attributes } => AttributeType::SingleNested {
                attributes: computed(attributes),
            },
            AttributeType::ListNested { attributes } => AttributeType::ListNested {
                attributes: computed(attributes),
            },
            AttributeType::MapNested { attributes } => AttributeType::MapNested {
                attributes: computed(attributes),
            },
            other => other,
        }
    }
}

/// Value check attached to an attribute
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Validator {
    OneOf(Vec<String>),
    AtLeast(i64),
    AtMost(i64),
    MaxLength(usize),
    Pattern(String),
    Name,
    Namespace,
    LabelKeys,
    LabelValues,
    AnnotationKeys,
}

impl Validator {
    /// Check a value whose type has already been verified
    pub fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match self {
            Validator::OneOf(allowed) => match value.as_str() {
                Some(s) if !allowed.iter().any(|a| a == s) => Err(format!(
                    "value must be one of: {}",
                    allowed
                        .iter()
                        .map(|a| format!("\"{}\"", a))
                        .collect::<Vec<_>>()
                        .join(", ")
                )),
                _ => Ok(()),
            },
            Validator::AtLeast(min) => integers(value).try_for_each(|n| {
                if n < i128::from(*min) {
                    Err(format!("value must be at least {}, got {}", min, n))
                } else {
                    Ok(())
                }
            }),
            Validator::AtMost(max) => integers(value).try_for_each(|n| {
                if n > i128::from(*max) {
                    Err(format!("value must be at most {}, got {}", max, n))
                } else {
                    Ok(())
                }
            }),
            Validator::MaxLength(max) => match value.as_str() {
                Some(s) if s.chars().count() > *max => Err(format!(
                    "string length must be at most {}, got {}",
                    max,
                    s.chars().count()
                )),
                _ => Ok(()),
            },
            Validator::Pattern(pattern) => {
                let Some(s) = value.as_str() else {
                    return Ok(());
                };
                if validators::matches_pattern(pattern, s)? {
                    Ok(())
                } else {
                    Err(format!("value must match pattern '{}'", pattern))
                }
            }
            Validator::Name => value.as_str().map_or(Ok(()), validators::validate_name),
            Validator::Namespace => value
                .as_str()
                .map_or(Ok(()), validators::validate_namespace),
            Validator::LabelKeys => check_keys(value, validators::validate_label_key),
            Validator::LabelValues => match value.as_object() {
                Some(map) => map
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k, s)))
                    .try_for_each(|(k, s)| {
                        validators::validate_label_value(s)
                            .map_err(|e| format!("label \"{}\": {}", k, e))
                    }),
                None => Ok(()),
            },
            Validator::AnnotationKeys => check_keys(value, validators::validate_annotation_key),
        }
    }
}

/// Whole numbers of a scalar or of each list element
fn integers(value: &Value) -> impl Iterator<Item = i128> + '_ {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        other => std::slice::from_ref(other),
    };
    items.iter().filter_map(|v| {
        v.as_i64()
            .map(i128::from)
            .or_else(|| v.as_u64().map(i128::from))
    })
}

fn check_keys(
    value: &Value,
    check: fn(&str) -> std::result::Result<(), String>,
) -> std::result::Result<(), String> {
    match value.as_object() {
        Some(map) => map.keys().try_for_each(|k| check(k)),
        None => Ok(()),
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A single attribute declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,

    /// Explicit wire name; derived from the state name when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wire_name: Option<String>,

    /// Attribute exists only in state and is never sent to the API server
    #[serde(skip_serializing_if = "is_false")]
    pub state_only: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub required: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub optional: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub computed: bool,

    #[serde(skip_serializing_if = "is_false")]
    pub sensitive: bool,

    /// Changing the value plans a replacement instead of an update
    #[serde(skip_serializing_if = "is_false")]
    pub requires_replace: bool,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<Validator>,
}

impl Attribute {
    pub fn new(attr_type: AttributeType) -> Self {
        Self {
            attr_type,
            wire_name: None,
            state_only: false,
            required: false,
            optional: false,
            computed: false,
            sensitive: false,
            requires_replace: false,
            description: String::new(),
            validators: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(AttributeType::String)
    }

    pub fn int64() -> Self {
        Self::new(AttributeType::Int64)
    }

    /// Whole number that must fit the 32-bit integer of the wire type
    pub fn int32() -> Self {
        Self::int64()
            .validate(Validator::AtLeast(i64::from(i32::MIN)))
            .validate(Validator::AtMost(i64::from(i32::MAX)))
    }

    pub fn bool() -> Self {
        Self::new(AttributeType::Bool)
    }

    pub fn dynamic() -> Self {
        Self::new(AttributeType::Dynamic)
    }

    pub fn map(element: AttributeType) -> Self {
        Self::new(AttributeType::Map {
            element: Box::new(element),
        })
    }

    pub fn list(element: AttributeType) -> Self {
        Self::new(AttributeType::List {
            element: Box::new(element),
        })
    }

    pub fn single_nested(attributes: Attributes) -> Self {
        Self::new(AttributeType::SingleNested { attributes })
    }

    pub fn list_nested(attributes: Attributes) -> Self {
        Self::new(AttributeType::ListNested { attributes })
    }

    pub fn map_nested(attributes: Attributes) -> Self {
        Self::new(AttributeType::MapNested { attributes })
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn requires_replace(mut self) -> Self {
        self.requires_replace = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Use an explicit wire name instead of the camelCase of the state name
    pub fn wire(mut self, name: impl Into<String>) -> Self {
        self.wire_name = Some(name.into());
        self
    }

    pub fn state_only(mut self) -> Self {
        self.state_only = true;
        self
    }

    pub fn validate(mut self, validator: Validator) -> Self {
        self.validators.push(validator);
        self
    }

    /// Whether a configuration may set this attribute
    pub fn is_configurable(&self) -> bool {
        self.required || self.optional
    }

    /// Wire key for an attribute with the given state name
    pub fn wire_key(&self, name: &str) -> Option<String> {
        if self.state_only {
            return None;
        }
        Some(
            self.wire_name
                .clone()
                .unwrap_or_else(|| camel_case(name)),
        )
    }

    /// Turn the attribute (and everything below it) into a read-only one
    pub fn into_computed(mut self) -> Self {
        self.required = false;
        self.optional = false;
        self.computed = true;
        self.requires_replace = false;
        self.validators.clear();
        self.attr_type = self.attr_type.into_computed();
        self
    }
}

/// Attribute tree of one resource or data source
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub version: i64,
    pub description: String,
    pub attributes: Attributes,
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    ToWire,
    ToState,
}

impl Schema {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            version: 0,
            description: description.into(),
            attributes: Attributes::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Look up an attribute by dotted path, e.g. `metadata.name`
    pub fn attribute(&self, path: &str) -> Option<&Attribute> {
        let mut attrs = &self.attributes;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let attr = attrs.get(segment)?;
            if segments.peek().is_none() {
                return Some(attr);
            }
            attrs = attr.attr_type.nested_attributes()?;
        }
        None
    }

    /// Check a configuration (state form) against the schema
    pub fn validate_config(&self, config: &Value) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if config.is_object() {
            validate_object(&self.attributes, config, "", &mut diags);
        } else {
            diags.add_error(
                "Incorrect configuration type",
                "The configuration must be an object of attributes.",
            );
        }
        diags
    }

    /// Convert a state-form value into the wire form
    pub fn to_wire(&self, state: &Value) -> Result<Value> {
        convert_object(&self.attributes, state, "", Direction::ToWire)
    }

    /// Convert a wire-form value into the state form
    ///
    /// Wire keys the schema does not declare (`status`, `metadata.uid`,
    /// `managedFields`, ...) are dropped.
    pub fn to_state(&self, wire: &Value) -> Result<Value> {
        convert_object(&self.attributes, wire, "", Direction::ToState)
    }

    /// Paths of changed attributes that force a replacement
    pub fn requires_replace(&self, prior: &Value, planned: &Value) -> Vec<String> {
        let mut paths = Vec::new();
        collect_replacements(&self.attributes, Some(prior), Some(planned), "", &mut paths);
        paths
    }

    /// Read-only variant of the schema, used by data sources
    pub fn into_computed(mut self) -> Self {
        self.attributes = self
            .attributes
            .into_iter()
            .map(|(name, attr)| (name, attr.into_computed()))
            .collect();
        self
    }

    /// Copy of a state value with sensitive attributes masked, for display
    pub fn redact_sensitive(&self, state: &Value) -> Value {
        redact_object(&self.attributes, state)
    }

    /// A state value with every configurable attribute set
    ///
    /// Used to check that a typed model carries every declared attribute.
    pub fn example_state(&self) -> Value {
        example_object(&self.attributes)
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn validate_object(attrs: &Attributes, value: &Value, path: &str, diags: &mut Diagnostics) {
    let Some(obj) = value.as_object() else {
        return;
    };

    for key in obj.keys() {
        if !attrs.contains_key(key) {
            diags.add_attribute_error(
                &join(path, key),
                "Unsupported argument",
                format!("An argument named \"{}\" is not expected here.", key),
            );
        }
    }

    for (name, attr) in attrs {
        let attr_path = join(path, name);
        match obj.get(name).filter(|v| !v.is_null()) {
            None if attr.required => diags.add_attribute_error(
                &attr_path,
                "Missing required argument",
                format!(
                    "The argument \"{}\" is required, but no definition was found.",
                    attr_path
                ),
            ),
            None => {}
            Some(v) => {
                if check_type(&attr.attr_type, v, &attr_path, diags) {
                    for validator in &attr.validators {
                        if let Err(message) = validator.check(v) {
                            diags.add_attribute_error(&attr_path, "Invalid attribute value", message);
                        }
                    }
                }
            }
        }
    }
}

/// Returns false when the value itself has the wrong type
fn check_type(t: &AttributeType, v: &Value, path: &str, diags: &mut Diagnostics) -> bool {
    let expected = match t {
        AttributeType::Dynamic => return true,
        AttributeType::String if v.is_string() => return true,
        AttributeType::String => "a string",
        AttributeType::Int64 if v.is_i64() || v.is_u64() => return true,
        AttributeType::Int64 => "a whole number",
        AttributeType::Bool if v.is_boolean() => return true,
        AttributeType::Bool => "a bool",
        AttributeType::Map { element } => match v.as_object() {
            Some(map) => {
                for (key, item) in map {
                    check_type(element, item, &format!("{}[\"{}\"]", path, key), diags);
                }
                return true;
            }
            None => "a map",
        },
        AttributeType::List { element } => match v.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    check_type(element, item, &format!("{}[{}]", path, i), diags);
                }
                return true;
            }
            None => "a list",
        },
        AttributeType::SingleNested { attributes } => {
            if v.is_object() {
                validate_object(attributes, v, path, diags);
                return true;
            }
            "an object"
        }
        AttributeType::ListNested { attributes } => match v.as_array() {
            Some(items) => {
                for (i, item) in items.iter().enumerate() {
                    let item_path = format!("{}[{}]", path, i);
                    if item.is_object() {
                        validate_object(attributes, item, &item_path, diags);
                    } else {
                        type_error(&item_path, "an object", diags);
                    }
                }
                return true;
            }
            None => "a list of objects",
        },
        AttributeType::MapNested { attributes } => match v.as_object() {
            Some(map) => {
                for (key, item) in map {
                    let item_path = format!("{}[\"{}\"]", path, key);
                    if item.is_object() {
                        validate_object(attributes, item, &item_path, diags);
                    } else {
                        type_error(&item_path, "an object", diags);
                    }
                }
                return true;
            }
            None => "a map of objects",
        },
    };
    type_error(path, expected, diags);
    false
}

fn type_error(path: &str, expected: &str, diags: &mut Diagnostics) {
    diags.add_attribute_error(
        path,
        "Incorrect attribute value type",
        format!("Inappropriate value for attribute \"{}\": {} is required.", path, expected),
    );
}

fn mismatch(path: &str, expected: &str) -> CoreError {
    CoreError::TypeMismatch {
        path: if path.is_empty() { "<root>".to_string() } else { path.to_string() },
        expected: expected.to_string(),
    }
}

fn convert_object(attrs: &Attributes, value: &Value, path: &str, dir: Direction) -> Result<Value> {
    let obj = value.as_object().ok_or_else(|| mismatch(path, "an object"))?;
    let mut out = Map::new();

    for (name, attr) in attrs {
        let Some(wire_key) = attr.wire_key(name) else {
            continue;
        };
        let (from, to) = match dir {
            Direction::ToWire => (name.as_str(), wire_key.as_str()),
            Direction::ToState => (wire_key.as_str(), name.as_str()),
        };
        let Some(v) = obj.get(from).filter(|v| !v.is_null()) else {
            continue;
        };
        let converted = convert_value(&attr.attr_type, v, &join(path, name), dir)?;
        out.insert(to.to_string(), converted);
    }

    Ok(Value::Object(out))
}

fn convert_value(t: &AttributeType, v: &Value, path: &str, dir: Direction) -> Result<Value> {
    match t {
        AttributeType::SingleNested { attributes } => convert_object(attributes, v, path, dir),
        AttributeType::ListNested { attributes } => {
            let items = v.as_array().ok_or_else(|| mismatch(path, "a list of objects"))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| convert_object(attributes, item, &format!("{}[{}]", path, i), dir))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        AttributeType::MapNested { attributes } => {
            let map = v.as_object().ok_or_else(|| mismatch(path, "a map of objects"))?;
            map.iter()
                .map(|(key, item)| {
                    convert_object(attributes, item, &format!("{}[\"{}\"]", path, key), dir)
                        .map(|converted| (key.clone(), converted))
                })
                .collect::<Result<Map<_, _>>>()
                .map(Value::Object)
        }
        _ => Ok(v.clone()),
    }
}

fn collect_replacements(
    attrs: &Attributes,
    prior: Option<&Value>,
    planned: Option<&Value>,
    path: &str,
    out: &mut Vec<String>,
) {
    for (name, attr) in attrs {
        let before = prior.and_then(|v| v.get(name)).filter(|v| !v.is_null());
        let after = planned.and_then(|v| v.get(name)).filter(|v| !v.is_null());
        let attr_path = join(path, name);

        if attr.requires_replace && before != after {
            out.push(attr_path);
            continue;
        }
        if let AttributeType::SingleNested { attributes } = &attr.attr_type {
            collect_replacements(attributes, before, after, &attr_path, out);
        }
    }
}

/// Replacement shown for sensitive values
pub const REDACTED: &str = "(sensitive value)";

fn redact_object(attrs: &Attributes, value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };
    let redacted = obj
        .iter()
        .map(|(key, v)| {
            let v = match attrs.get(key) {
                Some(_) if v.is_null() => Value::Null,
                Some(attr) if attr.sensitive => json!(REDACTED),
                Some(attr) => redact_value(&attr.attr_type, v),
                None => v.clone(),
            };
            (key.clone(), v)
        })
        .collect();
    Value::Object(redacted)
}

fn redact_value(t: &AttributeType, v: &Value) -> Value {
    match (t, v) {
        (AttributeType::SingleNested { attributes }, _) => redact_object(attributes, v),
        (AttributeType::ListNested { attributes }, Value::Array(items)) => Value::Array(
            items.iter().map(|item| redact_object(attributes, item)).collect(),
        ),
        (AttributeType::MapNested { attributes }, Value::Object(map)) => Value::Object(
            map.iter()
                .map(|(key, item)| (key.clone(), redact_object(attributes, item)))
                .collect(),
        ),
        _ => v.clone(),
    }
}

fn example_object(attrs: &Attributes) -> Value {
    let obj: Map<String, Value> = attrs
        .iter()
        .filter(|(_, attr)| attr.is_configurable())
        .map(|(name, attr)| (name.clone(), example_value(&attr.attr_type)))
        .collect();
    Value::Object(obj)
}

fn example_value(t: &AttributeType) -> Value {
    match t {
        AttributeType::String => json!("example"),
        AttributeType::Int64 => json!(1),
        AttributeType::Bool => json!(true),
        // a string is valid for both untyped JSON and int-or-string fields
        AttributeType::Dynamic => json!("example"),
        AttributeType::Map { element } => json!({ "key": example_value(element) }),
        AttributeType::List { element } => json!([example_value(element)]),
        AttributeType::SingleNested { attributes } => example_object(attributes),
        AttributeType::ListNested { attributes } => json!([example_object(attributes)]),
        AttributeType::MapNested { attributes } => json!({ "key": example_object(attributes) }),
    }
}

/// `image_pull_secret` -> `imagePullSecret`
pub fn camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_schema() -> Schema {
        Schema::new("test resource")
            .with_attribute("id", Attribute::string().computed().state_only())
            .with_attribute("field_manager", Attribute::string().optional().state_only())
            .with_attribute(
                "metadata",
                Attribute::single_nested(attributes([
                    (
                        "name",
                        Attribute::string()
                            .required()
                            .requires_replace()
                            .validate(Validator::Name),
                    ),
                    (
                        "labels",
                        Attribute::map(AttributeType::String)
                            .optional()
                            .validate(Validator::LabelKeys),
                    ),
                ]))
                .required(),
            )
            .with_attribute(
                "spec",
                Attribute::single_nested(attributes([
                    ("max_size", Attribute::int64().optional().validate(Validator::AtLeast(1))),
                    ("image_pull_secret", Attribute::string().optional()),
                    (
                        "volumes",
                        Attribute::map_nested(attributes([(
                            "read_only",
                            Attribute::bool().optional(),
                        )]))
                        .optional(),
                    ),
                    (
                        "users",
                        Attribute::list_nested(attributes([(
                            "user_name",
                            Attribute::string().required().wire("name"),
                        )]))
                        .optional(),
                    ),
                ]))
                .optional(),
            )
    }

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("image_pull_secret"), "imagePullSecret");
        assert_eq!(camel_case("api_version"), "apiVersion");
        assert_eq!(camel_case("patches_json6902"), "patchesJson6902");
        assert_eq!(camel_case("size"), "size");
    }

    #[test]
    fn test_validate_missing_required() {
        let diags = test_schema().validate_config(&json!({ "metadata": {} }));
        assert!(diags.has_error());
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.summary, "Missing required argument");
        assert_eq!(diag.attribute.as_deref(), Some("metadata.name"));
    }

    #[test]
    fn test_validate_unsupported_argument() {
        let diags = test_schema().validate_config(&json!({
            "metadata": { "name": "demo" },
            "spce": {}
        }));
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.summary, "Unsupported argument");
        assert_eq!(diag.attribute.as_deref(), Some("spce"));
    }

    #[test]
    fn test_validate_type_mismatch_in_list() {
        let diags = test_schema().validate_config(&json!({
            "metadata": { "name": "demo" },
            "spec": { "users": [{ "user_name": 42 }] }
        }));
        let diag = diags.errors().next().unwrap();
        assert_eq!(diag.summary, "Incorrect attribute value type");
        assert_eq!(diag.attribute.as_deref(), Some("spec.users[0].user_name"));
    }

    #[test]
    fn test_validate_runs_validators() {
        let diags = test_schema().validate_config(&json!({
            "metadata": { "name": "Not_A_Name", "labels": { "bad key!": "x" } },
            "spec": { "max_size": 0 }
        }));
        let paths: Vec<_> = diags.errors().filter_map(|d| d.attribute.clone()).collect();
        assert!(paths.contains(&"metadata.name".to_string()));
        assert!(paths.contains(&"metadata.labels".to_string()));
        assert!(paths.contains(&"spec.max_size".to_string()));
    }

    #[test]
    fn test_validate_valid_config() {
        let diags = test_schema().validate_config(&json!({
            "field_manager": "me",
            "metadata": { "name": "demo", "labels": { "app.kubernetes.io/name": "demo" } },
            "spec": { "max_size": 4, "volumes": { "data": { "read_only": true } } }
        }));
        assert!(diags.is_empty(), "unexpected diagnostics: {}", diags);
    }

    #[test]
    fn test_to_wire_renames_and_drops_state_only() {
        let state = json!({
            "id": "demo",
            "field_manager": "me",
            "metadata": { "name": "demo", "labels": { "some_label": "v" } },
            "spec": {
                "image_pull_secret": "regcred",
                "volumes": { "my_data": { "read_only": true } },
                "users": [{ "user_name": "flux" }],
                "max_size": null
            }
        });
        let wire = test_schema().to_wire(&state).unwrap();
        assert_eq!(
            wire,
            json!({
                "metadata": { "name": "demo", "labels": { "some_label": "v" } },
                "spec": {
                    "imagePullSecret": "regcred",
                    "volumes": { "my_data": { "readOnly": true } },
                    "users": [{ "name": "flux" }]
                }
            })
        );
    }

    #[test]
    fn test_to_state_ignores_server_fields() {
        let wire = json!({
            "metadata": { "name": "demo", "uid": "1234", "managedFields": [] },
            "spec": { "maxSize": 3 },
            "status": { "phase": "Ready" }
        });
        let state = test_schema().to_state(&wire).unwrap();
        assert_eq!(
            state,
            json!({ "metadata": { "name": "demo" }, "spec": { "max_size": 3 } })
        );
    }

    #[test]
    fn test_to_wire_type_mismatch() {
        let err = test_schema()
            .to_wire(&json!({ "metadata": "demo" }))
            .unwrap_err();
        assert!(err.to_string().contains("metadata"));
    }

    #[test]
    fn test_requires_replace() {
        let schema = test_schema();
        let prior = json!({ "metadata": { "name": "a" }, "spec": { "max_size": 1 } });
        let renamed = json!({ "metadata": { "name": "b" }, "spec": { "max_size": 1 } });
        let resized = json!({ "metadata": { "name": "a" }, "spec": { "max_size": 2 } });

        assert_eq!(schema.requires_replace(&prior, &renamed), vec!["metadata.name"]);
        assert!(schema.requires_replace(&prior, &resized).is_empty());
    }

    #[test]
    fn test_attribute_lookup() {
        let schema = test_schema();
        assert!(schema.attribute("metadata.name").unwrap().required);
        assert!(schema.attribute("spec.users.user_name").is_some());
        assert!(schema.attribute("spec.missing").is_none());
        assert!(schema.attribute("metadata.name.deeper").is_none());
    }

    #[test]
    fn test_into_computed() {
        let schema = test_schema().into_computed();
        let name = schema.attribute("metadata.name").unwrap();
        assert!(name.computed);
        assert!(!name.required);
        assert!(name.validators.is_empty());
        assert!(!name.requires_replace);
    }

    #[test]
    fn test_int32_bounds_apply_to_list_elements() {
        let schema = Schema::new("bounds")
            .with_attribute("size", Attribute::int32().optional())
            .with_attribute(
                "ports",
                Attribute::list(AttributeType::Int64)
                    .optional()
                    .validate(Validator::AtMost(65535)),
            );

        let diags = schema.validate_config(&json!({
            "size": 4294967296i64,
            "ports": [80, 70000]
        }));
        let errors: Vec<_> = diags.errors().collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].attribute.as_deref(), Some("size"));
        assert!(errors[0].detail.contains("at most 2147483647"));
        assert_eq!(errors[1].attribute.as_deref(), Some("ports"));

        let diags = schema.validate_config(&json!({ "size": u64::MAX }));
        assert!(diags.has_error());
        assert!(schema.validate_config(&json!({ "size": -5, "ports": [80] })).is_empty());
    }

    #[test]
    fn test_redact_sensitive() {
        let schema = test_schema().with_attribute(
            "auth",
            Attribute::single_nested(attributes([
                ("user", Attribute::string().optional()),
                ("password", Attribute::string().optional().sensitive()),
                (
                    "keys",
                    Attribute::list_nested(attributes([(
                        "secret",
                        Attribute::string().optional().sensitive(),
                    )]))
                    .optional(),
                ),
            ]))
            .optional(),
        );
        let state = json!({
            "metadata": { "name": "demo" },
            "auth": { "user": "flux", "password": "hunter2", "keys": [{ "secret": "s3" }, {}] }
        });
        assert_eq!(
            schema.redact_sensitive(&state),
            json!({
                "metadata": { "name": "demo" },
                "auth": {
                    "user": "flux",
                    "password": REDACTED,
                    "keys": [{ "secret": REDACTED }, {}]
                }
            })
        );

        let unset = json!({ "auth": { "password": null } });
        assert_eq!(schema.redact_sensitive(&unset), unset);
    }

    #[test]
    fn test_example_state_is_valid() {
        let schema = test_schema();
        let example = schema.example_state();
        assert!(example.get("id").is_none());
        assert_eq!(example["spec"]["users"][0]["user_name"], "example");
    }
}
