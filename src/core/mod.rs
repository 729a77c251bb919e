//! Core types shared by every layer of the crate
//!
//! This module provides the fundamental types used throughout:
//! - `Document` - A record as stored and returned by reads
//! - `RecordError` - Top-level error type, plus the leaf errors it wraps

pub mod document;
pub mod error;

pub use document::{document_id, new_record_id, Document, ID_FIELD};
pub use error::{
    HookError, NotificationError, RecordError, RecordResult, StoreError, StoreResult,
    ValidationError,
};
