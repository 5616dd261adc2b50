//! Kubernetes object name, namespace, label and annotation validation
//!
//! Mirrors the apimachinery rules: DNS-1123 subdomains for object names,
//! DNS-1123 labels for namespaces and qualified names for label and
//! annotation keys.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;
use regex::Regex;

const DNS1123_SUBDOMAIN_MAX_LENGTH: usize = 253;
const DNS1123_LABEL_MAX_LENGTH: usize = 63;
const QUALIFIED_NAME_MAX_LENGTH: usize = 63;
const LABEL_VALUE_MAX_LENGTH: usize = 63;

static DNS1123_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").unwrap());

static DNS1123_SUBDOMAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$").unwrap()
});

static QUALIFIED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9]$").unwrap());

static LABEL_VALUE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(([A-Za-z0-9][-A-Za-z0-9_.]*)?[A-Za-z0-9])?$").unwrap());

/// Compiled attribute patterns, keyed by source
static PATTERNS: Lazy<RwLock<HashMap<String, Regex>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Match `value` against an attribute pattern, compiling it once
pub fn matches_pattern(pattern: &str, value: &str) -> Result<bool, String> {
    if let Some(re) = PATTERNS
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .get(pattern)
    {
        return Ok(re.is_match(value));
    }

    let re = Regex::new(pattern).map_err(|e| format!("invalid pattern '{}': {}", pattern, e))?;
    let matched = re.is_match(value);
    PATTERNS
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .insert(pattern.to_string(), re);
    Ok(matched)
}

/// Object names must be DNS-1123 subdomains
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.len() > DNS1123_SUBDOMAIN_MAX_LENGTH {
        return Err(format!(
            "name must be no more than {} characters",
            DNS1123_SUBDOMAIN_MAX_LENGTH
        ));
    }
    if !DNS1123_SUBDOMAIN.is_match(name) {
        return Err(format!(
            "'{}' is not a valid name: a lowercase RFC 1123 subdomain must consist of lower case alphanumeric characters, '-' or '.', and must start and end with an alphanumeric character",
            name
        ));
    }
    Ok(())
}

/// Namespaces must be DNS-1123 labels
pub fn validate_namespace(namespace: &str) -> Result<(), String> {
    if namespace.is_empty() {
        return Err("namespace must not be empty".to_string());
    }
    if namespace.len() > DNS1123_LABEL_MAX_LENGTH {
        return Err(format!(
            "namespace must be no more than {} characters",
            DNS1123_LABEL_MAX_LENGTH
        ));
    }
    if !DNS1123_LABEL.is_match(namespace) {
        return Err(format!(
            "'{}' is not a valid namespace: a lowercase RFC 1123 label must consist of lower case alphanumeric characters or '-', and must start and end with an alphanumeric character",
            namespace
        ));
    }
    Ok(())
}

/// `[prefix/]name` where prefix is a DNS subdomain and name a qualified name
fn validate_qualified_name(kind: &str, key: &str) -> Result<(), String> {
    let (prefix, name) = match key.split_once('/') {
        Some((prefix, name)) => (Some(prefix), name),
        None => (None, key),
    };

    if let Some(prefix) = prefix {
        if prefix.is_empty() {
            return Err(format!("{} '{}': prefix part must not be empty", kind, key));
        }
        if prefix.len() > DNS1123_SUBDOMAIN_MAX_LENGTH || !DNS1123_SUBDOMAIN.is_match(prefix) {
            return Err(format!(
                "{} '{}': prefix part must be a lowercase RFC 1123 subdomain",
                kind, key
            ));
        }
    }

    if name.is_empty() {
        return Err(format!("{} '{}': name part must not be empty", kind, key));
    }
    if name.len() > QUALIFIED_NAME_MAX_LENGTH {
        return Err(format!(
            "{} '{}': name part must be no more than {} characters",
            kind, key, QUALIFIED_NAME_MAX_LENGTH
        ));
    }
    if !QUALIFIED_NAME.is_match(name) {
        return Err(format!(
            "{} '{}': name part must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character",
            kind, key
        ));
    }
    Ok(())
}

pub fn validate_label_key(key: &str) -> Result<(), String> {
    validate_qualified_name("label key", key)
}

pub fn validate_annotation_key(key: &str) -> Result<(), String> {
    validate_qualified_name("annotation key", key)
}

/// Label values may be empty
pub fn validate_label_value(value: &str) -> Result<(), String> {
    if value.len() > LABEL_VALUE_MAX_LENGTH {
        return Err(format!(
            "must be no more than {} characters",
            LABEL_VALUE_MAX_LENGTH
        ));
    }
    if !LABEL_VALUE.is_match(value) {
        return Err(format!(
            "'{}' must consist of alphanumeric characters, '-', '_' or '.', and must start and end with an alphanumeric character",
            value
        ));
    }
    Ok(())
}
