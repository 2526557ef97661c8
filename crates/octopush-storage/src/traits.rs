//! The record store trait consumed by the notification pipeline.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::StoredResource;

/// Read access to stored FHIR records, keyed by resource type and numeric id.
///
/// Implementations must be thread-safe (`Send + Sync`); concurrent events are
/// resolved independently and the store is the only thing they share.
///
/// # Example
///
/// ```ignore
/// async fn get_org(store: &dyn RecordStore, id: i64) -> Result<StoredResource, StorageError> {
///     store
///         .read("Organization", id)
///         .await?
///         .ok_or_else(|| StorageError::internal(format!("Organization/{id} is gone")))
/// }
/// ```
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Reads a record by type and id.
    ///
    /// Returns `None` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing records.
    async fn read(
        &self,
        resource_type: &str,
        id: i64,
    ) -> Result<Option<StoredResource>, StorageError>;

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}
