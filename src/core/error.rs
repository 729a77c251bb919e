//! Error types

use thiserror::Error;

use crate::hooks::OperationKind;

/// Errors from the underlying record store
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// Backend read or write failed
    #[error("Store error: {0}")]
    Backend(String),

    /// A unique index rejected the write
    #[error("Duplicate key: {field} = {value}")]
    DuplicateKey { field: String, value: String },

    /// The document cannot be stored (not an object, missing identifier)
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
}

/// Errors raised while threading a result through a hook chain
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HookError {
    /// A hook signalled failure through `proceed`
    #[error("{0}")]
    Failed(String),

    /// A callback-style hook dropped its `proceed` handle without calling it
    #[error("Hook finished without calling proceed")]
    ProceedDropped,

    /// A hook returned a result of the wrong shape for the operation
    #[error("Hook returned a result of the wrong shape for {kind}")]
    ShapeMismatch { kind: OperationKind },
}

/// A field-tagged validation failure that aborts a write
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Validation failed for `{field}`: {message}")]
pub struct ValidationError {
    /// The field marked invalid
    pub field: String,
    /// Human-readable reason
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failure to deliver an audit entry or a transition event
///
/// Never surfaced to the caller of a write; only logged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotificationError {
    #[error("Audit log write failed: {0}")]
    Audit(String),

    #[error("Dispatch failed: {0}")]
    Dispatch(String),
}

/// Errors visible to read and write callers
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecordError {
    /// Underlying store failure, propagated unchanged
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A hook in the chain failed
    #[error(transparent)]
    Hook(#[from] HookError),

    /// A write was rejected before commit
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl RecordError {
    /// Create a hook failure from a message
    pub fn hook(msg: impl Into<String>) -> Self {
        RecordError::Hook(HookError::Failed(msg.into()))
    }

    /// Create a backend store failure from a message
    pub fn store(msg: impl Into<String>) -> Self {
        RecordError::Store(StoreError::Backend(msg.into()))
    }

    /// Field tagged by a validation failure, if this is one
    pub fn invalid_field(&self) -> Option<&str> {
        match self {
            RecordError::Validation(err) => Some(&err.field),
            _ => None,
        }
    }
}

/// Result type alias for read and write operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type alias for store backends
pub type StoreResult<T> = Result<T, StoreError>;
