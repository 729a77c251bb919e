//! Hook-threading store decorator

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{Document, RecordResult};
use crate::hooks::{HookRegistry, OperationKind, QueryResult};
use crate::store::{FindQuery, RecordStore};

/// A `RecordStore` whose reads run through hook chains
///
/// Deferred queries built with [`QueryExt`](crate::store::QueryExt) on a
/// `HookedStore` pick up the chains when they execute.
pub struct HookedStore<S: ?Sized> {
    inner: Arc<S>,
    registry: Arc<HookRegistry>,
}

impl<S> HookedStore<S>
where
    S: RecordStore + ?Sized,
{
    /// Wrap a store with a registry
    pub fn new(inner: Arc<S>, registry: Arc<HookRegistry>) -> Self {
        Self { inner, registry }
    }

    /// The undecorated store
    pub fn inner(&self) -> &Arc<S> {
        &self.inner
    }

    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }
}

impl<S: ?Sized> Clone for HookedStore<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            registry: self.registry.clone(),
        }
    }
}

#[async_trait]
impl<S> RecordStore for HookedStore<S>
where
    S: RecordStore + ?Sized,
{
    async fn fetch_many(&self, query: &FindQuery) -> RecordResult<Vec<Document>> {
        let kind = OperationKind::FetchMany;
        if !self.registry.has_hooks(kind) {
            return self.inner.fetch_many(query).await;
        }

        let outcome = self.inner.fetch_many(query).await.map(QueryResult::Many);
        Ok(self.registry.run(kind, outcome).await?.into_many()?)
    }

    async fn fetch_one(&self, query: &FindQuery) -> RecordResult<Option<Document>> {
        let kind = OperationKind::FetchOne;
        if !self.registry.has_hooks(kind) {
            return self.inner.fetch_one(query).await;
        }

        let outcome = self.inner.fetch_one(query).await.map(QueryResult::One);
        Ok(self.registry.run(kind, outcome).await?.into_one()?)
    }

    async fn commit(&self, doc: Document) -> RecordResult<()> {
        self.inner.commit(doc).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{HookError, RecordError};
    use crate::hooks::{hook_fn, hook_fn_with_proceed, ArcHook, HookConfig};
    use crate::store::{Filter, MemoryStore, QueryExt};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store whose reads always fail
    struct BrokenStore;

    #[async_trait]
    impl RecordStore for BrokenStore {
        async fn fetch_many(&self, _query: &FindQuery) -> RecordResult<Vec<Document>> {
            Err(RecordError::store("connection refused"))
        }

        async fn fetch_one(&self, _query: &FindQuery) -> RecordResult<Option<Document>> {
            Err(RecordError::store("connection refused"))
        }

        async fn commit(&self, _doc: Document) -> RecordResult<()> {
            Err(RecordError::store("connection refused"))
        }
    }

    fn uppercase() -> ArcHook {
        hook_fn(|data: QueryResult| async move {
            Ok(data.map_documents(|mut doc| {
                if let Some(name) = doc.get("name").and_then(Value::as_str) {
                    doc["name"] = json!(name.to_uppercase());
                }
                doc
            }))
        })
    }

    async fn seeded() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new("users"));
        store.commit(json!({"_id": "u1", "name": "ann"})).await.unwrap();
        store
    }

    fn hooked(store: Arc<MemoryStore>, config: HookConfig) -> HookedStore<MemoryStore> {
        HookedStore::new(store, Arc::new(HookRegistry::from_config(config)))
    }

    #[tokio::test]
    async fn test_fetch_many_uppercase() {
        let store = hooked(seeded().await, HookConfig::new().on("fetch-many", uppercase()));

        let docs = store.fetch_many(&FindQuery::default()).await.unwrap();
        assert_eq!(docs, vec![json!({"_id": "u1", "name": "ANN"})]);

        // fetch-one has no chain
        let doc = store.find_by_id("u1").await.unwrap();
        assert_eq!(doc, Some(json!({"_id": "u1", "name": "ann"})));
    }

    #[tokio::test]
    async fn test_empty_registry_matches_unwrapped_reads() {
        let inner = seeded().await;
        let store = hooked(inner.clone(), HookConfig::new());

        for query in [
            FindQuery::default(),
            FindQuery::new(Filter::by_id("u1")).project(["name"]),
            FindQuery::new(Filter::by_id("missing")),
        ] {
            assert_eq!(
                store.fetch_many(&query).await,
                inner.fetch_many(&query).await
            );
            assert_eq!(store.fetch_one(&query).await, inner.fetch_one(&query).await);
        }
    }

    #[tokio::test]
    async fn test_unrecognized_keys_leave_reads_untouched() {
        let inner = seeded().await;
        let store = hooked(
            inner.clone(),
            HookConfig::new()
                .on("find", uppercase())
                .on("findOne", vec![uppercase()]),
        );

        let query = FindQuery::default();
        assert_eq!(store.fetch_many(&query).await, inner.fetch_many(&query).await);
        assert_eq!(store.fetch_one(&query).await, inner.fetch_one(&query).await);
    }

    #[tokio::test]
    async fn test_hook_error_reaches_caller() {
        let step_b = hook_fn_with_proceed(|_data, proceed| proceed.fail("quota-exceeded"));
        let store = hooked(
            seeded().await,
            HookConfig::new().on("fetch-many", vec![uppercase(), step_b]),
        );

        let err = store.fetch_many(&FindQuery::default()).await.unwrap_err();
        assert_eq!(err, RecordError::Hook(HookError::Failed("quota-exceeded".into())));
    }

    #[tokio::test]
    async fn test_store_error_skips_hooks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let counting = hook_fn(move |data| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async move { Ok(data) }
        });

        let registry = HookRegistry::from_config(HookConfig::new().on("fetch-one", counting));
        let store = HookedStore::new(Arc::new(BrokenStore), Arc::new(registry));

        let err = store.find_by_id("u1").await.unwrap_err();
        assert_eq!(err, RecordError::store("connection refused"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_deferred_query_runs_chain_at_exec() {
        let inner = seeded().await;
        let store = hooked(inner.clone(), HookConfig::new().on("fetch-one", uppercase()));

        let query = store.find_one(Filter::by_id("u2"));
        inner.commit(json!({"_id": "u2", "name": "bo"})).await.unwrap();

        let out = query.exec().await.unwrap();
        assert_eq!(out, QueryResult::One(Some(json!({"_id": "u2", "name": "BO"}))));

        let names = store
            .find(Filter::new())
            .exec_with(|res| match res {
                Ok(QueryResult::Many(docs)) => docs.len(),
                _ => 0,
            })
            .await;
        assert_eq!(names, 2);
    }

    #[tokio::test]
    async fn test_works_behind_dyn_store() {
        let inner: Arc<dyn RecordStore> = seeded().await;
        let registry = HookRegistry::from_config(HookConfig::new().on("fetch-many", uppercase()));
        let store: Arc<dyn RecordStore> = Arc::new(HookedStore::new(inner, Arc::new(registry)));

        let out = store.find(Filter::new()).exec().await.unwrap();
        assert_eq!(out, QueryResult::Many(vec![json!({"_id": "u1", "name": "ANN"})]));
    }
}
