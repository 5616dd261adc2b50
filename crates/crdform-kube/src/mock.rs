//! Mock dynamic client for testing
//!
//! Stores objects in memory, useful for unit tests without requiring a
//! Kubernetes cluster. Apply behaves like a server that keeps `status` and
//! stamps `uid` / `resourceVersion` into metadata.

use async_trait::async_trait;
use kube::core::ErrorResponse;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::client::{ApplyParams, DynamicClient, ResourceRef};
use crate::error::{KubeError, Result};

/// In-memory dynamic client for testing
#[derive(Clone, Default)]
pub struct MockDynamicClient {
    /// Storage: REST path -> object
    objects: Arc<RwLock<HashMap<String, Value>>>,
    /// Track operation counts for assertions
    operations: Arc<RwLock<OperationCounts>>,
    /// Every apply call, in order
    applies: Arc<RwLock<Vec<(ResourceRef, Value, ApplyParams)>>>,
    /// API error returned by every call while set
    failure: Arc<RwLock<Option<(u16, String)>>>,
}

/// Counts of operations performed for testing assertions
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OperationCounts {
    pub gets: usize,
    pub applies: usize,
    pub deletes: usize,
}

impl OperationCounts {
    pub fn total(&self) -> usize {
        self.gets + self.applies + self.deletes
    }
}

impl MockDynamicClient {
    /// Create a new empty mock client
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with a pre-populated object
    pub fn with_object(resource: &ResourceRef, object: Value) -> Self {
        let client = Self::new();
        client.insert(resource, object);
        client
    }

    /// Store an object as if it existed on the server
    pub fn insert(&self, resource: &ResourceRef, object: Value) {
        self.objects
            .write()
            .unwrap()
            .insert(resource.url_path(), object);
    }

    /// Current server-side object
    pub fn object(&self, resource: &ResourceRef) -> Option<Value> {
        self.objects.read().unwrap().get(&resource.url_path()).cloned()
    }

    /// Make every following call fail with the given HTTP status
    pub fn fail_with(&self, code: u16, message: impl Into<String>) {
        *self.failure.write().unwrap() = Some((code, message.into()));
    }

    pub fn clear_failure(&self) {
        *self.failure.write().unwrap() = None;
    }

    /// Get operation counts for assertions
    pub fn operation_counts(&self) -> OperationCounts {
        self.operations.read().unwrap().clone()
    }

    /// The most recent apply call
    pub fn last_apply(&self) -> Option<(ResourceRef, Value, ApplyParams)> {
        self.applies.read().unwrap().last().cloned()
    }

    fn check_failure(&self) -> Result<()> {
        match self.failure.read().unwrap().as_ref() {
            Some((code, message)) => Err(api_error(*code, message)),
            None => Ok(()),
        }
    }
}

fn api_error(code: u16, message: &str) -> KubeError {
    let reason = match code {
        404 => "NotFound",
        409 => "Conflict",
        422 => "Invalid",
        _ => "InternalError",
    };
    KubeError::Api(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: message.to_string(),
        reason: reason.to_string(),
        code,
    }))
}

fn not_found(resource: &ResourceRef) -> KubeError {
    api_error(
        404,
        &format!(
            "{}.{} \"{}\" not found",
            resource.plural, resource.group, resource.name
        ),
    )
}

#[async_trait]
impl DynamicClient for MockDynamicClient {
    async fn get(&self, resource: &ResourceRef) -> Result<Value> {
        self.operations.write().unwrap().gets += 1;
        self.check_failure()?;

        self.object(resource).ok_or_else(|| not_found(resource))
    }

    async fn apply(
        &self,
        resource: &ResourceRef,
        object: &Value,
        params: &ApplyParams,
    ) -> Result<Value> {
        self.operations.write().unwrap().applies += 1;
        self.applies
            .write()
            .unwrap()
            .push((resource.clone(), object.clone(), params.clone()));
        self.check_failure()?;

        let mut objects = self.objects.write().unwrap();
        let key = resource.url_path();
        let previous = objects.get(&key);
        let generation = previous
            .and_then(|p| p.pointer("/metadata/generation"))
            .and_then(Value::as_i64)
            .unwrap_or(0)
            + 1;

        let mut stored = object.clone();
        if let Some(status) = previous.and_then(|p| p.get("status")).cloned() {
            if let Some(obj) = stored.as_object_mut() {
                obj.insert("status".to_string(), status);
            }
        }
        if let Some(meta) = stored.get_mut("metadata").and_then(Value::as_object_mut) {
            meta.insert("uid".to_string(), json!(format!("uid-{}", resource.name)));
            meta.insert("generation".to_string(), json!(generation));
            meta.insert("resourceVersion".to_string(), json!(generation.to_string()));
        }

        objects.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete(&self, resource: &ResourceRef) -> Result<()> {
        self.operations.write().unwrap().deletes += 1;
        self.check_failure()?;

        self.objects
            .write()
            .unwrap()
            .remove(&resource.url_path())
            .map(|_| ())
            .ok_or_else(|| not_found(resource))
    }
}
