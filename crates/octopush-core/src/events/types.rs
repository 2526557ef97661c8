//! Event types emitted by the host after a resource write completes.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Kind of write that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceEventType {
    Created,
    Updated,
    Deleted,
}

impl ResourceEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceEventType::Created => "created",
            ResourceEventType::Updated => "updated",
            ResourceEventType::Deleted => "deleted",
        }
    }

    /// Returns the REST operation code that produced the event
    /// (`create`, `update`, `delete`).
    pub fn operation_code(&self) -> &'static str {
        match self {
            ResourceEventType::Created => "create",
            ResourceEventType::Updated => "update",
            ResourceEventType::Deleted => "delete",
        }
    }

    /// True for writes that carry a fresh resource snapshot.
    pub fn is_write(&self) -> bool {
        matches!(self, ResourceEventType::Created | ResourceEventType::Updated)
    }
}

impl std::fmt::Display for ResourceEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A committed write, as handed to hooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceEvent {
    pub event_type: ResourceEventType,
    pub resource_type: String,
    /// Logical id as the host knows it
    pub resource_id: String,
    #[serde(default)]
    pub version_id: Option<i64>,
    /// JSON snapshot after the write; `None` for deletions
    #[serde(default)]
    pub resource: Option<serde_json::Value>,
    /// Defaults to "now" when missing from a serialized event
    #[serde(with = "time::serde::rfc3339", default = "OffsetDateTime::now_utc")]
    pub timestamp: OffsetDateTime,
}

impl ResourceEvent {
    pub fn new(
        event_type: ResourceEventType,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        resource: Option<serde_json::Value>,
    ) -> Self {
        Self {
            event_type,
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            version_id: None,
            resource,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn created(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        resource: serde_json::Value,
    ) -> Self {
        Self::new(
            ResourceEventType::Created,
            resource_type,
            resource_id,
            Some(resource),
        )
    }

    pub fn updated(
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        resource: serde_json::Value,
    ) -> Self {
        Self::new(
            ResourceEventType::Updated,
            resource_type,
            resource_id,
            Some(resource),
        )
    }

    pub fn deleted(resource_type: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self::new(ResourceEventType::Deleted, resource_type, resource_id, None)
    }

    pub fn with_version(mut self, version_id: i64) -> Self {
        self.version_id = Some(version_id);
        self
    }
}
