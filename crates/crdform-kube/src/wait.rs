//! Post-apply and post-delete wait conditions
//!
//! After a server-side apply the object may not be usable yet (a MiniCluster
//! still creating pods, a policy not yet ready). `wait_for_upsert` polls GET
//! until every JSONPath condition holds; `wait_for_delete` polls until the
//! object is gone.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crdform_core::JsonPath;
use crdform_core::jsonpath::render;

use crate::client::{DynamicClient, ResourceRef};
use crate::error::{KubeError, Result};

/// Wait until a JSONPath in the applied object equals a value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForUpsert {
    /// kubectl-style JSONPath, e.g. `.status.conditions[?(@.type=="Ready")].status`
    pub jsonpath: String,

    /// Expected value in its string rendering
    pub value: String,

    /// Give up after this long
    #[serde(default = "default_timeout")]
    #[serde(with = "duration_serde")]
    pub timeout: Duration,

    /// Delay between GETs
    #[serde(default = "default_poll_interval")]
    #[serde(with = "duration_serde")]
    pub poll_interval: Duration,
}

impl WaitForUpsert {
    pub fn new(jsonpath: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            jsonpath: jsonpath.into(),
            value: value.into(),
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

/// Wait until a deleted object is no longer returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitForDelete {
    #[serde(default = "default_timeout")]
    #[serde(with = "duration_serde")]
    pub timeout: Duration,

    #[serde(default = "default_poll_interval")]
    #[serde(with = "duration_serde")]
    pub poll_interval: Duration,
}

impl Default for WaitForDelete {
    fn default() -> Self {
        Self {
            timeout: default_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_timeout() -> Duration {
    Duration::seconds(30)
}

fn default_poll_interval() -> Duration {
    Duration::seconds(5)
}

fn deadline_after(timeout: Duration) -> Result<DateTime<Utc>> {
    Utc::now().checked_add_signed(timeout).ok_or_else(|| {
        KubeError::InvalidConfig(format!(
            "timeout of {} seconds is out of range",
            timeout.num_seconds()
        ))
    })
}

/// Block until every condition holds, polling concurrently
pub async fn wait_for_upsert(
    client: &dyn DynamicClient,
    resource: &ResourceRef,
    conditions: &[WaitForUpsert],
) -> Result<()> {
    let waits = conditions
        .iter()
        .map(|condition| wait_for_condition(client, resource, condition));
    futures::future::try_join_all(waits).await?;
    Ok(())
}

async fn wait_for_condition(
    client: &dyn DynamicClient,
    resource: &ResourceRef,
    condition: &WaitForUpsert,
) -> Result<()> {
    let path = JsonPath::parse(&condition.jsonpath)?;
    let deadline = deadline_after(condition.timeout)?;

    loop {
        let object = client.get(resource).await?;
        let current = path.find(&object).map(render);

        if current.as_deref() == Some(condition.value.as_str()) {
            debug!(
                resource = %resource.display_name(),
                jsonpath = %condition.jsonpath,
                "wait condition satisfied"
            );
            return Ok(());
        }

        if Utc::now() >= deadline {
            return Err(KubeError::Timeout(format!(
                "timed out waiting for {} to equal {}",
                condition.jsonpath, condition.value
            )));
        }

        debug!(
            resource = %resource.display_name(),
            jsonpath = %condition.jsonpath,
            current = ?current,
            expected = %condition.value,
            "waiting"
        );
        tokio::time::sleep(condition.poll_interval.to_std().unwrap_or_default()).await;
    }
}

/// Block until GET returns 404
pub async fn wait_for_delete(
    client: &dyn DynamicClient,
    resource: &ResourceRef,
    wait: &WaitForDelete,
) -> Result<()> {
    let deadline = deadline_after(wait.timeout)?;

    loop {
        match client.get(resource).await {
            Err(e) if e.is_not_found() => {
                debug!(resource = %resource.display_name(), "deletion complete");
                return Ok(());
            }
            Err(e) => return Err(e),
            Ok(_) => {}
        }

        if Utc::now() >= deadline {
            return Err(KubeError::Timeout(format!(
                "timed out waiting for {} to be deleted",
                resource.display_name()
            )));
        }

        tokio::time::sleep(wait.poll_interval.to_std().unwrap_or_default()).await;
    }
}

/// Serde support for chrono::Duration as whole seconds
mod duration_serde {
    use chrono::Duration;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.num_seconds().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = i64::deserialize(deserializer)?;
        Duration::try_seconds(seconds)
            .ok_or_else(|| D::Error::custom(format!("{} seconds is out of range", seconds)))
    }
}
