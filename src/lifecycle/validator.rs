//! Identity uniqueness validation
//!
//! Before a record commits, every value of its repeatable identity field is
//! checked against the other records' singular and repeatable fields, and its
//! singular value against the other records' repeatable field.
//!
//! Checks for different values run concurrently; the field lookups for one
//! value run in order and stop at the first hit. This is a fast-path
//! rejection only: two concurrent writes with the same new value can both
//! pass before either commits, so a store-level unique index remains the
//! actual guarantee.

use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;

use super::config::LifecycleConfig;
use crate::core::{document_id, Document, RecordResult, ValidationError};
use crate::store::{Filter, FindQuery, RecordStore};

/// One value to look up in one or more fields of other records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquenessCheck {
    /// Candidate value
    pub value: String,
    /// Fields searched, in order
    pub fields: Vec<String>,
    /// Field marked invalid when the value is taken
    pub tag: String,
}

/// Validates the identity set of a record type
pub struct IdentityValidator {
    store: Arc<dyn RecordStore>,
    config: Arc<LifecycleConfig>,
}

impl IdentityValidator {
    pub fn new(store: Arc<dyn RecordStore>, config: Arc<LifecycleConfig>) -> Self {
        Self { store, config }
    }

    /// Normalize the identity set in place
    ///
    /// The singular value is trimmed and lowercased. Repeatable values that
    /// are not strings, or are blank, are discarded; the rest are trimmed.
    pub fn normalize(&self, doc: &mut Document) {
        let Some(obj) = doc.as_object_mut() else {
            return;
        };

        if let Some(Value::String(identity)) = obj.get_mut(&self.config.identity_field) {
            *identity = identity.trim().to_lowercase();
        }

        if let Some(Value::Array(values)) = obj.get_mut(&self.config.alternates_field) {
            let kept = values
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| Value::String(v.to_string()))
                .collect();
            *values = kept;
        }
    }

    /// Plan the checks for a (normalized) record
    pub fn plan(&self, doc: &Document) -> Vec<UniquenessCheck> {
        let identity = &self.config.identity_field;
        let alternates = &self.config.alternates_field;

        let mut checks: Vec<UniquenessCheck> = doc
            .get(alternates)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(|value| UniquenessCheck {
                value: value.to_string(),
                fields: vec![identity.clone(), alternates.clone()],
                tag: alternates.clone(),
            })
            .collect();

        if let Some(value) = doc.get(identity).and_then(Value::as_str) {
            if !value.is_empty() {
                checks.push(UniquenessCheck {
                    value: value.to_string(),
                    fields: vec![alternates.clone()],
                    tag: identity.clone(),
                });
            }
        }

        checks
    }

    /// Reject the record if any identity value belongs to another record
    pub async fn validate(&self, doc: &Document) -> RecordResult<()> {
        let checks = self.plan(doc);
        if checks.is_empty() {
            return Ok(());
        }

        let id = document_id(doc);
        tracing::debug!(
            record_id = ?id,
            checks = checks.len(),
            "[IdentityValidator] Checking identity values"
        );

        try_join_all(checks.iter().map(|check| self.run_check(id.as_deref(), check))).await?;
        Ok(())
    }

    async fn run_check(&self, id: Option<&str>, check: &UniquenessCheck) -> RecordResult<()> {
        for field in &check.fields {
            let mut filter = Filter::new().eq(field.as_str(), check.value.as_str());
            if let Some(id) = id {
                filter = filter.id_ne(id);
            }

            if let Some(other) = self.store.fetch_one(&FindQuery::new(filter)).await? {
                tracing::warn!(
                    record_id = ?id,
                    other_id = ?document_id(&other),
                    field = %field,
                    "[IdentityValidator] Identity value already in use"
                );
                return Err(ValidationError::new(
                    check.tag.clone(),
                    format!("`{}` is already in use by another record", check.value),
                )
                .into());
            }
        }
        Ok(())
    }
}
