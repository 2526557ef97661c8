use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;

/// One record version as returned by a [`RecordStore`](crate::RecordStore).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredResource {
    pub id: i64,
    pub version_id: String,
    /// Type the record was stored under
    pub resource_type: String,
    pub resource: Value,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
}

impl StoredResource {
    /// Stamps `last_updated` with the current time.
    pub fn new(
        id: i64,
        version_id: impl Into<String>,
        resource_type: impl Into<String>,
        resource: Value,
    ) -> Self {
        Self {
            id,
            version_id: version_id.into(),
            resource_type: resource_type.into(),
            resource,
            last_updated: OffsetDateTime::now_utc(),
        }
    }

    /// `resourceType` as declared in the JSON body.
    pub fn declared_type(&self) -> Option<&str> {
        self.resource.get("resourceType").and_then(Value::as_str)
    }
}
