//! In-process document store.
//!
//! Collections keep insertion order so listings are deterministic. Reads and
//! writes can be made to fail per collection to exercise error paths.

use std::collections::{HashMap, HashSet};

use serde_json::Value;
use tokio::sync::RwLock;

use super::{CollectionPath, Document, DocumentStore, ListFilter, Record, StoreError, parse_seed};

#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    failing_reads: RwLock<HashSet<String>>,
    failing_writes: RwLock<HashSet<String>>,
}

impl MemoryDocumentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a seed of the form
    /// `{"<collection path>": {"<doc id>": {...}, ...}, ...}`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the seed, a collection, or a
    /// document body is not a JSON object.
    pub fn from_seed(seed: Value) -> Result<Self, StoreError> {
        let mut loaded: HashMap<String, Vec<Document>> = HashMap::new();
        for (path, document) in parse_seed(seed)? {
            loaded
                .entry(path.as_str().to_owned())
                .or_default()
                .push(document);
        }

        Ok(Self {
            collections: RwLock::new(loaded),
            ..Self::default()
        })
    }

    /// Insert or replace a document with a known id.
    pub async fn insert(&self, collection: &CollectionPath, id: &str, data: Record) {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.as_str().to_owned()).or_default();
        if let Some(existing) = docs.iter_mut().find(|doc| doc.id == id) {
            existing.data = data;
        } else {
            docs.push(Document {
                id: id.to_owned(),
                data,
            });
        }
    }

    /// Snapshot of a collection, in insertion order.
    pub async fn documents(&self, collection: &CollectionPath) -> Vec<Document> {
        self.collections
            .read()
            .await
            .get(collection.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Make every subsequent read of `collection` fail.
    pub async fn fail_reads(&self, collection: &CollectionPath) {
        self.failing_reads
            .write()
            .await
            .insert(collection.as_str().to_owned());
    }

    /// Make every subsequent write to `collection` fail.
    pub async fn fail_writes(&self, collection: &CollectionPath) {
        self.failing_writes
            .write()
            .await
            .insert(collection.as_str().to_owned());
    }

    async fn check(
        set: &RwLock<HashSet<String>>,
        collection: &CollectionPath,
    ) -> Result<(), StoreError> {
        if set.read().await.contains(collection.as_str()) {
            return Err(StoreError::Unavailable {
                collection: collection.to_string(),
                message: "permission denied".to_string(),
            });
        }
        Ok(())
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn list(
        &self,
        collection: &CollectionPath,
        filter: ListFilter,
    ) -> Result<Vec<Document>, StoreError> {
        Self::check(&self.failing_reads, collection).await?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter.matches(&doc.data))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<Document>, StoreError> {
        Self::check(&self.failing_reads, collection).await?;
        Ok(self
            .collections
            .read()
            .await
            .get(collection.as_str())
            .and_then(|docs| docs.iter().find(|doc| doc.id == id).cloned()))
    }

    async fn add(&self, collection: &CollectionPath, data: Record) -> Result<String, StoreError> {
        Self::check(&self.failing_writes, collection).await?;
        let id = uuid::Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection.as_str().to_owned())
            .or_default()
            .push(Document {
                id: id.clone(),
                data,
            });
        Ok(id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_add_then_get() {
        let store = MemoryDocumentStore::new();
        let path = CollectionPath::new("things");
        let id = store.add(&path, record(json!({"n": 1}))).await.unwrap();

        let doc = store.get(&path, &id).await.unwrap().unwrap();
        assert_eq!(doc.data.get("n"), Some(&json!(1)));
        assert!(store.get(&path, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order_and_filters() {
        let store = MemoryDocumentStore::new();
        let path = CollectionPath::new("inv");
        store.insert(&path, "b", record(json!({"stock": 0}))).await;
        store.insert(&path, "a", record(json!({"stock": 2}))).await;

        let all = store.list(&path, ListFilter::All).await.unwrap();
        let ids: Vec<_> = all.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);

        let in_stock = store
            .list(
                &path,
                ListFilter::AtLeast {
                    field: "stock",
                    min: 1.0,
                },
            )
            .await
            .unwrap();
        assert_eq!(in_stock.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryDocumentStore::new();
        let path = CollectionPath::new("orders");
        store.fail_writes(&path).await;
        assert!(matches!(
            store.add(&path, Record::new()).await,
            Err(StoreError::Unavailable { .. })
        ));

        store.fail_reads(&path).await;
        assert!(store.list(&path, ListFilter::All).await.is_err());
    }

    #[tokio::test]
    async fn test_from_seed() {
        let store = MemoryDocumentStore::from_seed(json!({
            "users/o/stores/s/inventory": {"d1": {"name": "iPhone 13"}}
        }))
        .unwrap();
        let docs = store
            .documents(&CollectionPath::new("users/o/stores/s/inventory"))
            .await;
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "d1");

        assert!(MemoryDocumentStore::from_seed(json!([1])).is_err());
    }
}
