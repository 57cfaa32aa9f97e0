//! Persistence gateway: whole-collection load/save of the record list as a
//! JSON array under one fixed key of a [`BlobStore`].

use super::blob::BlobStore;
use crate::core::{Outcome, PolicyError, PolicyRecord, Result};
use tracing::{debug, info, warn};

pub trait PersistenceGateway {
    /// Never fails. An unreadable or corrupt blob yields an empty collection
    /// and a `PersistenceWarning`.
    fn load(&self) -> Outcome<Vec<PolicyRecord>>;

    /// Failures come back as `PersistenceWarning`; the caller keeps its
    /// in-memory state either way.
    fn save(&self, records: &[PolicyRecord]) -> Result<()>;
}

pub struct JsonGateway<S: BlobStore> {
    store: S,
    key: String,
}

impl<S: BlobStore> JsonGateway<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: BlobStore> PersistenceGateway for JsonGateway<S> {
    fn load(&self) -> Outcome<Vec<PolicyRecord>> {
        let bytes = match self.store.get(&self.key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!(key = %self.key, "no stored collection, starting empty");
                return Outcome::clean(Vec::new());
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "failed to read stored collection");
                return Outcome::with_warnings(
                    Vec::new(),
                    vec![PolicyError::PersistenceWarning(format!(
                        "failed to read '{}': {}",
                        self.key, e
                    ))],
                );
            }
        };

        let entries = match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(serde_json::Value::Array(entries)) => entries,
            Ok(_) | Err(_) => {
                warn!(key = %self.key, "stored collection is corrupt, starting empty");
                return Outcome::with_warnings(
                    Vec::new(),
                    vec![PolicyError::PersistenceWarning(format!(
                        "stored data under '{}' is not a record list; ignored",
                        self.key
                    ))],
                );
            }
        };

        let mut outcome = Outcome::clean(Vec::with_capacity(entries.len()));
        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<PolicyRecord>(entry) {
                Ok(record) => outcome.value.push(record),
                Err(e) => {
                    warn!(key = %self.key, index, error = %e, "skipping unreadable stored record");
                    outcome.push_warning(PolicyError::PersistenceWarning(format!(
                        "stored record #{} unreadable: {}",
                        index, e
                    )));
                }
            }
        }

        info!(key = %self.key, records = outcome.value.len(), "loaded collection");
        outcome
    }

    fn save(&self, records: &[PolicyRecord]) -> Result<()> {
        let bytes = serde_json::to_vec(records)
            .map_err(|e| PolicyError::PersistenceWarning(format!("failed to encode collection: {}", e)))?;
        self.store.put(&self.key, &bytes).map_err(|e| {
            warn!(key = %self.key, error = %e, "failed to save collection");
            PolicyError::PersistenceWarning(format!("failed to save '{}': {}", self.key, e))
        })?;
        debug!(key = %self.key, records = records.len(), bytes = bytes.len(), "saved collection");
        Ok(())
    }
}

/// Gateway that keeps nothing. Used when a store is purely in-memory.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullGateway;

impl PersistenceGateway for NullGateway {
    fn load(&self) -> Outcome<Vec<PolicyRecord>> {
        Outcome::clean(Vec::new())
    }

    fn save(&self, _records: &[PolicyRecord]) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;
    use serde_json::json;

    const KEY: &str = "insuranceData";

    fn stored_record(id: serde_json::Value) -> serde_json::Value {
        json!({
            "id": id,
            "timestamp": "2024-04-05T10:00:00Z",
            "custName": "วิชัย มั่งมี",
            "phone": "0856789012",
            "plate": "จฉ-9012",
            "model": "Mazda CX-5",
            "year": "2021",
            "insuranceType": "พรบ",
            "premiumPRB": 645.21,
            "totalAmount": 645.21
        })
    }

    #[test]
    fn test_load_empty_store() {
        let gateway = JsonGateway::new(MemoryBlobStore::new(), KEY);
        let outcome = gateway.load();
        assert!(outcome.value.is_empty());
        assert!(!outcome.has_warnings());
    }

    #[test]
    fn test_corrupt_blob_loads_empty_with_warning() {
        let blobs = MemoryBlobStore::new();
        blobs.put(KEY, b"{not json").unwrap();
        let gateway = JsonGateway::new(blobs, KEY);
        let outcome = gateway.load();
        assert!(outcome.value.is_empty());
        assert!(matches!(
            outcome.warnings.as_slice(),
            [PolicyError::PersistenceWarning(_)]
        ));
    }

    #[test]
    fn test_bad_entries_are_skipped() {
        let blobs = MemoryBlobStore::new();
        let blob = json!([stored_record(json!("a")), {"id": "b"}, stored_record(json!(17))]);
        blobs.put(KEY, blob.to_string().as_bytes()).unwrap();
        let outcome = JsonGateway::new(blobs, KEY).load();
        assert_eq!(outcome.value.len(), 2);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.value[1].id().as_str(), "17");
    }

    #[test]
    fn test_save_then_load() {
        let blobs = MemoryBlobStore::new();
        let gateway = JsonGateway::new(blobs.clone(), KEY);
        blobs
            .put(KEY, json!([stored_record(json!("a"))]).to_string().as_bytes())
            .unwrap();
        let records = gateway.load().into_value();
        gateway.save(&records).unwrap();
        let again = JsonGateway::new(blobs, KEY).load().into_value();
        assert_eq!(again, records);
    }

    #[test]
    fn test_save_failure_is_warning() {
        let blobs = MemoryBlobStore::new();
        blobs.set_fail_writes(true);
        let err = JsonGateway::new(blobs, KEY).save(&[]).unwrap_err();
        assert!(!err.is_fatal());
    }
}
