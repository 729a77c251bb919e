//! Write lifecycle engine
//!
//! `RecordLifecycle::save` runs one write end to end:
//!
//! 1. Assign an identifier if missing, stamp the owner, normalize identities
//! 2. Resolve the previous snapshot (given by the caller, or read once)
//! 3. Validate identity uniqueness; any collision aborts before commit
//! 4. Commit
//! 5. Deliver the audit entry and transition events, swallowing failures

use std::sync::Arc;

use serde_json::Value;

use super::config::LifecycleConfig;
use super::notifier::{AuditLog, ChangeNotifier, ChangeRecord};
use super::transitions::{Dispatcher, TransitionDispatcher, TransitionEvent};
use super::validator::IdentityValidator;
use crate::core::{document_id, new_record_id, Document, RecordResult, StoreError, ID_FIELD};
use crate::store::RecordStore;

/// Where the previous snapshot comes from
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PreviousSnapshot {
    /// Read it from the store by identifier
    #[default]
    Load,
    /// The caller already holds it (`None` = the record is new)
    Provided(Option<Document>),
}

/// Per-write context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteContext {
    /// Who is performing the write
    pub actor_id: Option<String>,
    pub previous: PreviousSnapshot,
}

impl WriteContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    /// Supply the previous snapshot instead of reading it from the store
    pub fn previous(mut self, previous: Option<Document>) -> Self {
        self.previous = PreviousSnapshot::Provided(previous);
        self
    }
}

/// What a successful save committed and emitted
#[derive(Debug, Clone, PartialEq)]
pub struct SaveReport {
    /// The committed document, after normalization
    pub document: Document,
    /// No previous snapshot existed
    pub created: bool,
    /// Audit entry handed to the audit log, if any
    pub audit: Option<ChangeRecord>,
    /// Events handed to the dispatcher
    pub transitions: Vec<TransitionEvent>,
}

/// Runs validation, commit and post-commit notifications for one record type
pub struct RecordLifecycle {
    store: Arc<dyn RecordStore>,
    audit_log: Arc<dyn AuditLog>,
    dispatcher: Arc<dyn Dispatcher>,
    config: Arc<LifecycleConfig>,
    validator: IdentityValidator,
    notifier: ChangeNotifier,
    transitions: TransitionDispatcher,
}

impl RecordLifecycle {
    /// Create an engine
    ///
    /// `store` should be the undecorated store: previous snapshots and
    /// uniqueness checks must see records as persisted, not as read hooks
    /// present them.
    pub fn new(
        store: Arc<dyn RecordStore>,
        audit_log: Arc<dyn AuditLog>,
        dispatcher: Arc<dyn Dispatcher>,
        config: LifecycleConfig,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            validator: IdentityValidator::new(store.clone(), config.clone()),
            notifier: ChangeNotifier::new(config.clone()),
            transitions: TransitionDispatcher::new(config.clone()),
            store,
            audit_log,
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Validate, commit and notify
    ///
    /// Returns the first validation or store error. Notification failures
    /// are logged and never returned.
    pub async fn save(&self, doc: Document, ctx: WriteContext) -> RecordResult<SaveReport> {
        let mut doc = doc;
        if !doc.is_object() {
            return Err(StoreError::InvalidDocument("record must be an object".into()).into());
        }

        let (id, assigned) = match document_id(&doc) {
            Some(id) => (id, false),
            None => {
                let id = new_record_id();
                doc[ID_FIELD] = Value::String(id.clone());
                (id, true)
            }
        };

        if let Some(owner) = &self.config.owner_field {
            doc[owner.as_str()] = Value::String(id.clone());
        }
        self.validator.normalize(&mut doc);

        let previous = match ctx.previous {
            PreviousSnapshot::Provided(previous) => previous,
            PreviousSnapshot::Load if assigned => None,
            PreviousSnapshot::Load => self.store.find_by_id(&id).await?,
        };

        if let Err(err) = self.validator.validate(&doc).await {
            tracing::info!(
                model = %self.config.model_name,
                record_id = %id,
                error = %err,
                "[RecordLifecycle] Write rejected"
            );
            return Err(err);
        }

        self.store.commit(doc.clone()).await?;
        tracing::info!(
            model = %self.config.model_name,
            record_id = %id,
            created = previous.is_none(),
            "[RecordLifecycle] Record committed"
        );

        let actor = ctx.actor_id.as_deref();
        let audit = self.notifier.change_record(previous.as_ref(), &doc, actor);
        let transitions = self.transitions.events(previous.as_ref(), &doc, actor, &id);

        let delivery = deliver(
            self.audit_log.clone(),
            self.dispatcher.clone(),
            audit.clone(),
            transitions.clone(),
        );
        if self.config.detach_notifications {
            tokio::spawn(delivery);
        } else {
            delivery.await;
        }

        Ok(SaveReport {
            document: doc,
            created: previous.is_none(),
            audit,
            transitions,
        })
    }
}

/// Hand the audit entry and events to their sinks concurrently
async fn deliver(
    audit_log: Arc<dyn AuditLog>,
    dispatcher: Arc<dyn Dispatcher>,
    audit: Option<ChangeRecord>,
    events: Vec<TransitionEvent>,
) {
    let write_audit = async move {
        if let Some(entry) = audit {
            let record_id = entry.record_id.clone();
            if let Err(err) = audit_log.write(entry).await {
                tracing::warn!(record_id = %record_id, error = %err, "[RecordLifecycle] Audit entry dropped");
            }
        }
    };

    let dispatch_events = async move {
        for event in events {
            let verb = event.verb;
            let record_id = event.record_id.clone();
            if let Err(err) = dispatcher.dispatch(event).await {
                tracing::warn!(
                    record_id = %record_id,
                    verb = %verb,
                    error = %err,
                    "[RecordLifecycle] Transition event dropped"
                );
            }
        }
    };

    futures::join!(write_audit, dispatch_events);
}
