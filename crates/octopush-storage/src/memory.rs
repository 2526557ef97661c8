//! In-memory record store backed by `dashmap`.
//!
//! Used by the replay binary (loaded from a JSON fixture) and by tests. Records
//! are keyed by `(resourceType, numeric id)`; writing the same key again
//! replaces the record and bumps `meta.versionId`.

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::Value;

use crate::error::StorageError;
use crate::traits::RecordStore;
use crate::types::StoredResource;

type StoreKey = (String, i64);

#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: DashMap<StoreKey, StoredResource>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a record.
    ///
    /// The JSON body must carry a `resourceType` and an integer `id` (either a
    /// JSON number or a numeric string).
    pub fn insert(&self, mut resource: Value) -> Result<StoredResource, StorageError> {
        let resource_type = resource
            .get("resourceType")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| StorageError::invalid_resource("missing resourceType"))?;

        let id = match resource.get("id") {
            Some(Value::String(s)) => s.trim().parse::<i64>().map_err(|_| {
                StorageError::invalid_resource(format!(
                    "{resource_type} id must be numeric, got {s:?}"
                ))
            })?,
            Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
                StorageError::invalid_resource(format!("{resource_type} id out of range: {n}"))
            })?,
            _ => {
                return Err(StorageError::invalid_resource(format!(
                    "{resource_type} is missing an id"
                )));
            }
        };

        // Holding the entry keeps the shard locked, so read-bump-write is atomic per key.
        let entry = self.records.entry((resource_type.clone(), id));
        let version = match &entry {
            Entry::Occupied(existing) => existing
                .get()
                .version_id
                .parse::<u64>()
                .map_or(1, |v| v + 1),
            Entry::Vacant(_) => 1,
        }
        .to_string();

        if let Some(obj) = resource.as_object_mut() {
            obj.insert("id".to_string(), Value::String(id.to_string()));
            let meta = obj
                .entry("meta")
                .or_insert_with(|| Value::Object(Default::default()));
            if let Some(meta) = meta.as_object_mut() {
                meta.insert("versionId".to_string(), Value::String(version.clone()));
            }
        }

        let stored = StoredResource::new(id, version, resource_type, resource);
        entry.insert(stored.clone());
        Ok(stored)
    }

    /// Loads every resource of a FHIR Bundle (`entry[].resource`) or of a plain
    /// JSON array. Returns how many records were inserted.
    pub fn load_bundle(&self, bundle: Value) -> Result<usize, StorageError> {
        let resources: Vec<Value> = match bundle {
            Value::Array(items) => items,
            Value::Object(mut obj)
                if obj.get("resourceType").and_then(Value::as_str) == Some("Bundle") =>
            {
                match obj.remove("entry") {
                    Some(Value::Array(entries)) => entries
                        .into_iter()
                        .filter_map(|mut entry| entry.get_mut("resource").map(Value::take))
                        .collect(),
                    Some(_) => {
                        return Err(StorageError::invalid_resource(
                            "Bundle.entry must be an array",
                        ));
                    }
                    None => Vec::new(),
                }
            }
            other @ Value::Object(_) => vec![other],
            _ => {
                return Err(StorageError::invalid_resource(
                    "expected a Bundle, a resource or an array of resources",
                ));
            }
        };

        let mut count = 0;
        for resource in resources {
            self.insert(resource)?;
            count += 1;
        }
        tracing::debug!(count, "Loaded records into in-memory store");
        Ok(count)
    }

    /// Removes a record, returning it if it was present.
    pub fn remove(&self, resource_type: &str, id: i64) -> Option<StoredResource> {
        self.records
            .remove(&(resource_type.to_string(), id))
            .map(|(_, stored)| stored)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn read(
        &self,
        resource_type: &str,
        id: i64,
    ) -> Result<Option<StoredResource>, StorageError> {
        Ok(self
            .records
            .get(&(resource_type.to_string(), id))
            .map(|entry| entry.value().clone()))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
