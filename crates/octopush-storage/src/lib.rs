//! # octopush-storage
//!
//! Record store abstraction for the push notification pipeline.
//!
//! The pipeline never writes records. It only follows references from a
//! service request to organizations and endpoints, so the contract is a single
//! keyed read: [`RecordStore::read`] resolves a `(resource type, numeric id)`
//! pair to a [`StoredResource`] or `None`.
//!
//! ## Example
//!
//! ```ignore
//! use octopush_storage::{InMemoryStore, RecordStore};
//!
//! let store = InMemoryStore::new();
//! store.insert(serde_json::json!({
//!     "resourceType": "Organization",
//!     "id": "10",
//!     "name": "Central Clinic"
//! }))?;
//!
//! let org = store.read("Organization", 10).await?;
//! ```

mod error;
pub mod memory;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use memory::InMemoryStore;
pub use traits::RecordStore;
pub use types::StoredResource;
