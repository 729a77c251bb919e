//! Hook Registry
//!
//! Contains:
//! - `HookFunction` trait - for implementing hooks
//! - `hook_fn` / `hook_fn_with_proceed` - closure adapters
//! - `HookRegistry` - validates a `HookConfig` and holds one chain per operation

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::chain::HookChain;
use super::types::{HookConfig, OperationKind, QueryResult};
use crate::core::{HookError, RecordResult};

/// Trait for hook implementations
///
/// A hook receives the current result and either hands back a (possibly
/// replaced) result or fails, which stops the chain.
#[async_trait]
pub trait HookFunction: Send + Sync {
    /// Execute the hook on the given data
    async fn call(&self, data: QueryResult) -> Result<QueryResult, HookError>;
}

/// Type alias for stored hooks
pub type ArcHook = Arc<dyn HookFunction>;

struct FnHook<F>(F);

#[async_trait]
impl<F, Fut> HookFunction for FnHook<F>
where
    F: Fn(QueryResult) -> Fut + Send + Sync,
    Fut: Future<Output = Result<QueryResult, HookError>> + Send + 'static,
{
    async fn call(&self, data: QueryResult) -> Result<QueryResult, HookError> {
        (self.0)(data).await
    }
}

/// Wrap an async closure as a hook
///
/// ```ignore
/// let upper = hook_fn(|data| async move {
///     Ok(data.map_documents(|mut d| { /* ... */ d }))
/// });
/// ```
pub fn hook_fn<F, Fut>(f: F) -> ArcHook
where
    F: Fn(QueryResult) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<QueryResult, HookError>> + Send + 'static,
{
    Arc::new(FnHook(f))
}

/// Continuation handed to callback-style hooks
///
/// Consumed on use, so it can be called at most once. Dropping it without
/// calling fails the chain with `HookError::ProceedDropped`.
#[derive(Debug)]
pub struct Proceed {
    tx: oneshot::Sender<Result<QueryResult, HookError>>,
}

impl Proceed {
    /// Advance the chain with an outcome
    pub fn done(self, result: Result<QueryResult, HookError>) {
        // The receiver only goes away if the read itself was dropped.
        let _ = self.tx.send(result);
    }

    /// Advance the chain with data
    pub fn ok(self, data: QueryResult) {
        self.done(Ok(data));
    }

    /// Stop the chain with an error
    pub fn fail(self, msg: impl Into<String>) {
        self.done(Err(HookError::Failed(msg.into())));
    }
}

struct ProceedHook<F>(F);

#[async_trait]
impl<F> HookFunction for ProceedHook<F>
where
    F: Fn(QueryResult, Proceed) + Send + Sync,
{
    async fn call(&self, data: QueryResult) -> Result<QueryResult, HookError> {
        let (tx, rx) = oneshot::channel();
        (self.0)(data, Proceed { tx });
        rx.await.unwrap_or(Err(HookError::ProceedDropped))
    }
}

/// Wrap a `(data, proceed)` callback as a hook
///
/// The callback may call `proceed` synchronously or move it into a spawned
/// task and call it after asynchronous work.
pub fn hook_fn_with_proceed<F>(f: F) -> ArcHook
where
    F: Fn(QueryResult, Proceed) + Send + Sync + 'static,
{
    Arc::new(ProceedHook(f))
}

/// Central registry for all hook chains
///
/// Built once from a `HookConfig` and read-only afterwards, so it can be
/// shared between concurrent reads without locking.
///
/// # Example
///
/// ```ignore
/// let config = HookConfig::new()
///     .on("fetch-many", vec![strip_secrets, add_avatar])
///     .on("fetch-one", strip_secrets);
///
/// let registry = HookRegistry::from_config(config);
/// ```
#[derive(Clone, Default)]
pub struct HookRegistry {
    chains: HashMap<OperationKind, HookChain>,
    rejected: Vec<String>,
}

impl HookRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate a configuration and normalize it into one chain per operation
    ///
    /// Unrecognized keys are logged and skipped; recognized keys are still
    /// installed. A key configured twice keeps its last value.
    pub fn from_config(config: HookConfig) -> Self {
        let mut registry = Self::new();

        if config.is_empty() {
            tracing::warn!("[HookRegistry] No hook options passed; reads pass through unchanged");
            return registry;
        }

        for (key, spec) in config.into_entries() {
            let kind = match key.parse::<OperationKind>() {
                Ok(kind) => kind,
                Err(reason) => {
                    tracing::warn!("[HookRegistry] Ignoring hook configuration: {}", reason);
                    registry.rejected.push(key);
                    continue;
                }
            };

            let hooks = spec.into_hooks();
            tracing::info!(kind = %kind, hooks = hooks.len(), "[HookRegistry] Installing hook chain");

            if registry.chains.insert(kind, HookChain::new(hooks)).is_some() {
                tracing::debug!(kind = %kind, "[HookRegistry] Replaced earlier chain");
            }
        }

        registry
    }

    /// Get the chain for an operation, if any
    pub fn chain(&self, kind: OperationKind) -> Option<&HookChain> {
        self.chains.get(&kind).filter(|chain| !chain.is_empty())
    }

    /// Check if there are any hooks for an operation
    pub fn has_hooks(&self, kind: OperationKind) -> bool {
        self.chain(kind).is_some()
    }

    /// Get the number of hooks for an operation
    pub fn hook_count(&self, kind: OperationKind) -> usize {
        self.chain(kind).map(|c| c.len()).unwrap_or(0)
    }

    /// Keys that were rejected during configuration
    pub fn rejected_keys(&self) -> &[String] {
        &self.rejected
    }

    /// Thread a read outcome through the chain for `kind`
    ///
    /// Without a chain the outcome is returned untouched.
    pub async fn run(
        &self,
        kind: OperationKind,
        outcome: RecordResult<QueryResult>,
    ) -> RecordResult<QueryResult> {
        match self.chain(kind) {
            Some(chain) => chain.run(kind, outcome).await,
            None => outcome,
        }
    }
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (kind, chain) in &self.chains {
            map.entry(kind, &chain.len());
        }
        map.finish()
    }
}
