//! Hook chain execution
//!
//! A chain walks its hooks in order, handing each one the data the previous
//! hook produced. The first error, whether it came from the store or from a
//! hook, skips every remaining hook and is returned as-is.

use std::sync::Arc;

use super::registry::ArcHook;
use super::types::{OperationKind, QueryResult};
use crate::core::{HookError, RecordResult};

/// Ordered, immutable list of hooks for one operation
#[derive(Clone)]
pub struct HookChain {
    hooks: Arc<[ArcHook]>,
}

impl HookChain {
    /// Create a chain; order is preserved
    pub fn new(hooks: Vec<ArcHook>) -> Self {
        Self {
            hooks: hooks.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Thread a read outcome through every hook
    ///
    /// A hook that changes the result's shape fails the chain with
    /// `HookError::ShapeMismatch`.
    pub async fn run(
        &self,
        kind: OperationKind,
        outcome: RecordResult<QueryResult>,
    ) -> RecordResult<QueryResult> {
        let mut data = outcome?;

        for (index, hook) in self.hooks.iter().enumerate() {
            tracing::debug!(kind = %kind, index, "[HookChain] Running hook");

            data = match hook.call(data).await {
                Ok(next) if next.kind() == kind => next,
                Ok(_) => return Err(HookError::ShapeMismatch { kind }.into()),
                Err(err) => {
                    tracing::debug!(
                        kind = %kind,
                        index,
                        error = %err,
                        "[HookChain] Hook failed (remaining hooks skipped)"
                    );
                    return Err(err.into());
                }
            };
        }

        Ok(data)
    }
}

impl std::fmt::Debug for HookChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookChain")
            .field("len", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::RecordError;
    use crate::hooks::registry::hook_fn;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn uppercase_names() -> ArcHook {
        hook_fn(|data: QueryResult| async move {
            Ok(data.map_documents(|mut doc| {
                if let Some(name) = doc.get("name").and_then(Value::as_str) {
                    doc["name"] = json!(name.to_uppercase());
                }
                doc
            }))
        })
    }

    #[tokio::test]
    async fn test_uppercase_scenario() {
        let chain = HookChain::new(vec![uppercase_names()]);
        let out = chain
            .run(
                OperationKind::FetchMany,
                Ok(QueryResult::Many(vec![json!({"name": "ann"})])),
            )
            .await;
        assert_eq!(out, Ok(QueryResult::Many(vec![json!({"name": "ANN"})])));
    }

    #[tokio::test]
    async fn test_second_hook_sees_first_hook_output() {
        let seen = Arc::new(std::sync::Mutex::new(None));
        let seen_clone = seen.clone();

        let f = hook_fn(|_data| async move { Ok(QueryResult::One(Some(json!({"from": "f"})))) });
        let g = hook_fn(move |data: QueryResult| {
            let seen = seen_clone.clone();
            async move {
                *seen.lock().unwrap() = Some(data.clone());
                Ok(data)
            }
        });

        let chain = HookChain::new(vec![f, g]);
        let out = chain
            .run(OperationKind::FetchOne, Ok(QueryResult::One(None)))
            .await;

        let expected = QueryResult::One(Some(json!({"from": "f"})));
        assert_eq!(out, Ok(expected.clone()));
        assert_eq!(*seen.lock().unwrap(), Some(expected));
    }

    #[tokio::test]
    async fn test_error_skips_remaining_hooks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let f = hook_fn(|_data| async move { Err(HookError::Failed("boom".into())) });
        let g = hook_fn(move |data| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async move { Ok(data) }
        });

        let chain = HookChain::new(vec![f, g]);
        let out = chain
            .run(OperationKind::FetchMany, Ok(QueryResult::Many(vec![])))
            .await;

        assert_eq!(out, Err(RecordError::hook("boom")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_quota_exceeded_scenario() {
        let step_a = uppercase_names();
        let step_b = hook_fn(|_data| async move { Err(HookError::Failed("quota-exceeded".into())) });

        let chain = HookChain::new(vec![step_a, step_b]);
        let out = chain
            .run(
                OperationKind::FetchMany,
                Ok(QueryResult::Many(vec![json!({"name": "ann"})])),
            )
            .await;

        match out {
            Err(err) => assert_eq!(err.to_string(), "quota-exceeded"),
            Ok(data) => panic!("expected error, got {:?}", data),
        }
    }

    #[tokio::test]
    async fn test_store_error_short_circuits() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();
        let counting = hook_fn(move |data| {
            calls_clone.fetch_add(1, Ordering::SeqCst);
            async move { Ok(data) }
        });

        let chain = HookChain::new(vec![counting]);
        let out = chain
            .run(OperationKind::FetchMany, Err(RecordError::store("timeout")))
            .await;

        assert_eq!(out, Err(RecordError::store("timeout")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_shape_change_is_rejected() {
        let chain = HookChain::new(vec![hook_fn(|_data| async move {
            Ok(QueryResult::One(None))
        })]);
        let out = chain
            .run(OperationKind::FetchMany, Ok(QueryResult::Many(vec![])))
            .await;
        assert_eq!(
            out,
            Err(HookError::ShapeMismatch {
                kind: OperationKind::FetchMany
            }
            .into())
        );
    }
}
