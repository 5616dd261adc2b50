//! Import identifiers
//!
//! Namespaced resources import as `namespace/name`, cluster-scoped ones as
//! `name`. The same strings are used as the resource `id` in state.

use crate::error::{CoreError, Result};
use crate::validators::{validate_name, validate_namespace};

/// Parsed import identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportId {
    Namespaced { namespace: String, name: String },
    Cluster { name: String },
}

impl ImportId {
    /// Parse an identifier for a namespaced or cluster-scoped kind
    pub fn parse(id: &str, namespaced: bool) -> Result<Self> {
        if namespaced {
            Self::parse_namespaced(id)
        } else {
            Self::parse_cluster(id)
        }
    }

    fn parse_namespaced(id: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidImportId {
            id: id.to_string(),
            expected: format!("'namespace/name' ({})", reason),
        };

        let parts: Vec<&str> = id.split('/').collect();
        let [namespace, name] = parts.as_slice() else {
            return Err(invalid("exactly one '/' separator"));
        };
        if namespace.is_empty() || name.is_empty() {
            return Err(invalid("both parts must be non-empty"));
        }
        validate_namespace(namespace).map_err(|e| invalid(&e))?;
        validate_name(name).map_err(|e| invalid(&e))?;

        Ok(ImportId::Namespaced {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })
    }

    fn parse_cluster(id: &str) -> Result<Self> {
        let invalid = |reason: &str| CoreError::InvalidImportId {
            id: id.to_string(),
            expected: format!("'name' ({})", reason),
        };

        if id.is_empty() {
            return Err(invalid("must be non-empty"));
        }
        if id.contains('/') {
            return Err(invalid("cluster-scoped resources have no namespace"));
        }
        validate_name(id).map_err(|e| invalid(&e))?;

        Ok(ImportId::Cluster {
            name: id.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        match self {
            ImportId::Namespaced { name, .. } | ImportId::Cluster { name } => name,
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            ImportId::Namespaced { namespace, .. } => Some(namespace),
            ImportId::Cluster { .. } => None,
        }
    }

    /// Identifier as stored in state
    pub fn to_id(&self) -> String {
        resource_id(self.namespace(), self.name())
    }
}

/// `namespace/name` for namespaced objects, `name` otherwise
pub fn resource_id(namespace: Option<&str>, name: &str) -> String {
    match namespace {
        Some(ns) => format!("{}/{}", ns, name),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_namespaced() {
        let id = ImportId::parse("flux-operator/flux-sample", true).unwrap();
        assert_eq!(id.namespace(), Some("flux-operator"));
        assert_eq!(id.name(), "flux-sample");
        assert_eq!(id.to_id(), "flux-operator/flux-sample");
    }

    #[test]
    fn test_parse_namespaced_rejects_malformed() {
        for id in ["flux-sample", "/flux-sample", "flux-operator/", "a/b/c", "", "/"] {
            let err = ImportId::parse(id, true).unwrap_err();
            assert!(
                matches!(err, CoreError::InvalidImportId { .. }),
                "expected InvalidImportId for '{}'",
                id
            );
        }
    }

    #[test]
    fn test_parse_namespaced_rejects_invalid_names() {
        assert!(ImportId::parse("Bad_NS/name", true).is_err());
        assert!(ImportId::parse("ns/Bad_Name", true).is_err());
    }

    #[test]
    fn test_parse_cluster() {
        let id = ImportId::parse("require-labels", false).unwrap();
        assert_eq!(id, ImportId::Cluster { name: "require-labels".to_string() });
        assert_eq!(id.namespace(), None);
        assert_eq!(id.to_id(), "require-labels");
    }

    #[test]
    fn test_parse_cluster_rejects_namespace() {
        assert!(ImportId::parse("default/require-labels", false).is_err());
        assert!(ImportId::parse("", false).is_err());
    }

    #[test]
    fn test_resource_id() {
        assert_eq!(resource_id(Some("ns"), "name"), "ns/name");
        assert_eq!(resource_id(None, "name"), "name");
    }
}
