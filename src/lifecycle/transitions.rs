//! Activity transitions
//!
//! A record is active unless its status equals the configured inactive
//! value. Status changes and soft-delete changes each produce an external
//! onboard/offboard event.
//!
//! The soft-delete mapping is the inverse of the status mapping: deleting a
//! record onboards it and restoring it offboards it.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc;

use super::config::LifecycleConfig;
use crate::core::{Document, NotificationError};

/// Notification verb
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionVerb {
    Onboard,
    Offboard,
}

impl std::fmt::Display for TransitionVerb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransitionVerb::Onboard => write!(f, "onboard"),
            TransitionVerb::Offboard => write!(f, "offboard"),
        }
    }
}

/// External notification for a lifecycle transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionEvent {
    pub domain: String,
    pub verb: TransitionVerb,
    pub actor_id: Option<String>,
    pub record_id: String,
}

/// Receiver of transition events
///
/// Delivery is fire-and-forget: errors are logged by the caller and never
/// reach the write that caused them.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, event: TransitionEvent) -> Result<(), NotificationError>;
}

/// Dispatcher that queues events on an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::UnboundedSender<TransitionEvent>,
}

impl ChannelDispatcher {
    /// Create a dispatcher and the receiving end of its queue
    pub fn unbounded() -> (Self, mpsc::UnboundedReceiver<TransitionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Dispatcher for ChannelDispatcher {
    async fn dispatch(&self, event: TransitionEvent) -> Result<(), NotificationError> {
        self.tx
            .send(event)
            .map_err(|e| NotificationError::Dispatch(format!("queue closed, dropped {:?}", e.0.verb)))
    }
}

/// Decides which transition events a write produces
pub struct TransitionDispatcher {
    config: Arc<LifecycleConfig>,
}

impl TransitionDispatcher {
    pub fn new(config: Arc<LifecycleConfig>) -> Self {
        Self { config }
    }

    /// Check if a record counts as active
    pub fn is_active(&self, doc: &Document) -> bool {
        doc.get(&self.config.status_field).and_then(Value::as_str)
            != Some(self.config.inactive_status.as_str())
    }

    fn is_deleted(&self, doc: &Document) -> bool {
        doc.get(&self.config.deleted_field)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Verbs produced by moving from `previous` to `current`, in order
    pub fn transitions(&self, previous: Option<&Document>, current: &Document) -> Vec<TransitionVerb> {
        let active = self.is_active(current);

        let Some(previous) = previous else {
            return if active {
                vec![TransitionVerb::Onboard]
            } else {
                Vec::new()
            };
        };

        let mut verbs = Vec::new();

        match (self.is_active(previous), active) {
            (true, false) => verbs.push(TransitionVerb::Offboard),
            (false, true) => verbs.push(TransitionVerb::Onboard),
            _ => {}
        }

        match (self.is_deleted(previous), self.is_deleted(current)) {
            (false, true) => verbs.push(TransitionVerb::Onboard),
            (true, false) => verbs.push(TransitionVerb::Offboard),
            _ => {}
        }

        verbs
    }

    /// Events for a write
    pub fn events(
        &self,
        previous: Option<&Document>,
        current: &Document,
        actor_id: Option<&str>,
        record_id: &str,
    ) -> Vec<TransitionEvent> {
        self.transitions(previous, current)
            .into_iter()
            .map(|verb| TransitionEvent {
                domain: self.config.domain().to_string(),
                verb,
                actor_id: actor_id.map(str::to_string),
                record_id: record_id.to_string(),
            })
            .collect()
    }
}
