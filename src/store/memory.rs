//! In-memory document store used by tests and dry runs

use crate::error::{Error, Result};
use crate::store::{DocumentStore, QrRecord};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A process-local [`DocumentStore`] keyed by (collection, id).
///
/// Behaves like the remote store for allocation purposes: point existence
/// checks and append-only inserts, with insert refusing to overwrite.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<(String, String), QrRecord>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the map guard. Every operation on the map is a single atomic
    /// insert or lookup, so the contents stay consistent even if a previous
    /// holder panicked; recover the guard instead of propagating the poison.
    fn guard(&self) -> MutexGuard<'_, HashMap<(String, String), QrRecord>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed the store with existing identifiers, simulating prior batches.
    pub fn with_existing<I>(collection: &str, ids: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let store = Self::new();
        {
            let mut documents = store.guard();
            for id in ids {
                let record = QrRecord {
                    id: id.clone(),
                    is_active: false,
                    created_for: "seed".to_string(),
                    created_time: crate::store::ist_now(),
                    kind: None,
                    url: None,
                };
                documents.insert((collection.to_string(), id), record);
            }
        }
        store
    }

    /// Number of records held across all collections.
    pub fn len(&self) -> usize {
        self.guard().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch a stored record by collection and id, if present.
    pub fn get(&self, collection: &str, id: &str) -> Option<QrRecord> {
        self.guard()
            .get(&(collection.to_string(), id.to_string()))
            .cloned()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn exists(&self, collection: &str, id: &str) -> Result<bool> {
        let documents = self.guard();
        Ok(documents.contains_key(&(collection.to_string(), id.to_string())))
    }

    async fn insert(&self, collection: &str, id: &str, record: &QrRecord) -> Result<()> {
        let mut documents = self.guard();
        let key = (collection.to_string(), id.to_string());
        if documents.contains_key(&key) {
            return Err(Error::Store(format!(
                "Document '{}/{}' already exists",
                collection, id
            )));
        }
        documents.insert(key, record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ist_now;

    fn record(id: &str) -> QrRecord {
        QrRecord {
            id: id.to_string(),
            is_active: false,
            created_for: "carevego".to_string(),
            created_time: ist_now(),
            kind: None,
            url: None,
        }
    }

    #[tokio::test]
    async fn exists_reflects_inserts() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert!(!store.exists("qrs", "AB12cd34").await.unwrap());

        store.insert("qrs", "AB12cd34", &record("AB12cd34")).await.unwrap();
        assert!(!store.is_empty());
        assert!(store.exists("qrs", "AB12cd34").await.unwrap());
        // Same id under a different collection is a different key
        assert!(!store.exists("scan_qrs", "AB12cd34").await.unwrap());
    }

    #[tokio::test]
    async fn insert_refuses_overwrite() {
        let store = MemoryStore::new();
        store.insert("qrs", "AB12cd34", &record("AB12cd34")).await.unwrap();

        let err = store
            .insert("qrs", "AB12cd34", &record("AB12cd34"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn seeded_ids_report_existing() {
        let store = MemoryStore::with_existing("qrs", vec!["AB12cd34".to_string()]);
        assert!(store.exists("qrs", "AB12cd34").await.unwrap());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn poisoned_lock_is_recovered() {
        use std::sync::Arc;

        let store = Arc::new(MemoryStore::new());
        store.insert("qrs", "AB12cd34", &record("AB12cd34")).await.unwrap();

        // Poison the mutex by panicking while holding the guard.
        let poisoner = Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.documents.lock().unwrap();
            panic!("poisoning memory store lock");
        })
        .join();
        assert!(store.documents.is_poisoned());

        // Operations still serve the consistent map instead of panicking.
        assert!(store.exists("qrs", "AB12cd34").await.unwrap());
        store.insert("qrs", "Zz99Aa00", &record("Zz99Aa00")).await.unwrap();
        assert_eq!(store.len(), 2);
    }
}
