//! In-memory record store
//!
//! Keeps one collection in insertion order behind an async `RwLock`.
//! Optional unique indexes reject commits that would duplicate a value held
//! by another record.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::filter::{lookup, FindQuery};
use super::record_store::RecordStore;
use crate::core::{document_id, Document, RecordResult, StoreError};

/// Record store backed by a `Vec` in memory
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    docs: RwLock<Vec<Document>>,
    unique: Vec<String>,
}

impl MemoryStore {
    /// Create an empty collection
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docs: RwLock::new(Vec::new()),
            unique: Vec::new(),
        }
    }

    /// Enforce uniqueness of a field across records
    pub fn with_unique_index(mut self, field: impl Into<String>) -> Self {
        self.unique.push(field.into());
        self
    }

    /// Collection name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// Snapshot of every stored record
    pub async fn all(&self) -> Vec<Document> {
        self.docs.read().await.clone()
    }

    fn check_unique(&self, docs: &[Document], doc: &Document, id: &str) -> Result<(), StoreError> {
        for field in &self.unique {
            let value = match lookup(doc, field) {
                Some(Value::Null) | None => continue,
                Some(value) => value,
            };

            let taken = docs
                .iter()
                .filter(|other| document_id(other).as_deref() != Some(id))
                .any(|other| lookup(other, field) == Some(value));

            if taken {
                return Err(StoreError::DuplicateKey {
                    field: field.clone(),
                    value: match value {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    },
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn fetch_many(&self, query: &FindQuery) -> RecordResult<Vec<Document>> {
        let docs = self.docs.read().await;
        let matched = docs
            .iter()
            .filter(|doc| query.filter.matches(doc))
            .cloned()
            .collect();
        Ok(query.shape(matched))
    }

    async fn fetch_one(&self, query: &FindQuery) -> RecordResult<Option<Document>> {
        let query = query.clone().limit(1);
        Ok(self.fetch_many(&query).await?.into_iter().next())
    }

    async fn commit(&self, doc: Document) -> RecordResult<()> {
        if !doc.is_object() {
            return Err(StoreError::InvalidDocument("record must be an object".into()).into());
        }
        let id = document_id(&doc)
            .ok_or_else(|| StoreError::InvalidDocument("record has no `_id`".into()))?;

        let mut docs = self.docs.write().await;
        self.check_unique(&docs, &doc, &id)?;

        match docs
            .iter()
            .position(|existing| document_id(existing).as_deref() == Some(id.as_str()))
        {
            Some(index) => docs[index] = doc,
            None => docs.push(doc),
        }

        tracing::debug!(collection = %self.name, record_id = %id, "[MemoryStore] Committed record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordError;
    use crate::store::{Filter, QueryExt};
    use serde_json::json;

    #[tokio::test]
    async fn test_commit_and_fetch() {
        let store = MemoryStore::new("users");
        store.commit(json!({"_id": "u1", "name": "ann"})).await.unwrap();
        store.commit(json!({"_id": "u2", "name": "bo"})).await.unwrap();

        let all = store.fetch_many(&FindQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let bo = store.find_by_id("u2").await.unwrap();
        assert_eq!(bo, Some(json!({"_id": "u2", "name": "bo"})));
        assert_eq!(store.find_by_id("u3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_commit_replaces_by_id() {
        let store = MemoryStore::new("users");
        store.commit(json!({"_id": "u1", "name": "ann"})).await.unwrap();
        store.commit(json!({"_id": "u1", "name": "anne"})).await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(
            store.find_by_id("u1").await.unwrap(),
            Some(json!({"_id": "u1", "name": "anne"}))
        );
    }

    #[tokio::test]
    async fn test_commit_rejects_invalid_documents() {
        let store = MemoryStore::new("users");

        let err = store.commit(json!(["not", "an", "object"])).await.unwrap_err();
        assert!(matches!(err, RecordError::Store(StoreError::InvalidDocument(_))));

        let err = store.commit(json!({"name": "no id"})).await.unwrap_err();
        assert!(matches!(err, RecordError::Store(StoreError::InvalidDocument(_))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_unique_index() {
        let store = MemoryStore::new("users").with_unique_index("email");
        store.commit(json!({"_id": "u1", "email": "a@x.com"})).await.unwrap();

        // Re-saving the same record with its own value is fine
        store
            .commit(json!({"_id": "u1", "email": "a@x.com", "name": "ann"}))
            .await
            .unwrap();

        let err = store
            .commit(json!({"_id": "u2", "email": "a@x.com"}))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::Store(StoreError::DuplicateKey {
                field: "email".into(),
                value: "a@x.com".into(),
            })
        );
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_deferred_query() {
        let store = MemoryStore::new("users");
        store.commit(json!({"_id": "u1", "status": "active"})).await.unwrap();
        store.commit(json!({"_id": "u2", "status": "inactive"})).await.unwrap();

        let query = store.find(Filter::new().eq("status", "active"));
        store.commit(json!({"_id": "u3", "status": "active"})).await.unwrap();

        // Built before u3 existed, executed after
        let out = query.exec().await.unwrap();
        assert_eq!(out.len(), 2);

        let count = store
            .find_one(Filter::by_id("u2"))
            .exec_with(|res| res.map(|r| r.len()))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
