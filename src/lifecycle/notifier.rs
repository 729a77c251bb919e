//! Change audit
//!
//! Builds an audit entry for every committed write: a full snapshot when the
//! record is new, a structural diff when it changed, nothing otherwise.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::LifecycleConfig;
use super::diff::diff;
use crate::core::{document_id, new_record_id, Document, NotificationError, ID_FIELD};
use crate::store::RecordStore;

/// Audit log entry for one write
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub record_id: String,
    pub model_name: String,
    pub severity_level: u8,
    pub actor_id: Option<String>,
    pub title: String,
    pub message: String,
    pub code: String,
    /// Full document on creation, list of changes on update
    pub payload: Value,
    pub created_at: DateTime<Utc>,
}

/// Destination for audit entries
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Persist one entry
    async fn write(&self, entry: ChangeRecord) -> Result<(), NotificationError>;
}

/// Audit log that stores each entry as a record
pub struct StoreAuditLog {
    store: Arc<dyn RecordStore>,
}

impl StoreAuditLog {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl AuditLog for StoreAuditLog {
    async fn write(&self, entry: ChangeRecord) -> Result<(), NotificationError> {
        let mut doc = serde_json::to_value(&entry)
            .map_err(|e| NotificationError::Audit(e.to_string()))?;
        doc[ID_FIELD] = Value::String(new_record_id());

        self.store
            .commit(doc)
            .await
            .map_err(|e| NotificationError::Audit(e.to_string()))
    }
}

/// Builds audit entries from previous and current snapshots
pub struct ChangeNotifier {
    config: Arc<LifecycleConfig>,
}

impl ChangeNotifier {
    pub fn new(config: Arc<LifecycleConfig>) -> Self {
        Self { config }
    }

    /// Audit entry for a write, or `None` when nothing changed
    pub fn change_record(
        &self,
        previous: Option<&Document>,
        current: &Document,
        actor_id: Option<&str>,
    ) -> Option<ChangeRecord> {
        let (verb, code, payload) = match previous {
            None => ("created", "create", current.clone()),
            Some(previous) => {
                let changes = diff(previous, current);
                if changes.is_empty() {
                    return None;
                }
                let payload = serde_json::to_value(changes).unwrap_or_default();
                ("changed", "change", payload)
            }
        };

        let name = self.config.display_name();
        let identity = current
            .get(&self.config.identity_field)
            .and_then(Value::as_str)
            .unwrap_or_default();

        Some(ChangeRecord {
            record_id: document_id(current).unwrap_or_default(),
            model_name: self.config.model_name.clone(),
            severity_level: self.config.severity_level,
            actor_id: actor_id.map(str::to_string),
            title: format!("{name} {verb}"),
            message: format!("{name} {verb} {identity}").trim_end().to_string(),
            code: format!("{}-{code}", self.config.model_name),
            payload,
            created_at: Utc::now(),
        })
    }
}
