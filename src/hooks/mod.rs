//! Hooks Module
//!
//! Attach asynchronous post-processing steps to read operations.
//!
//! # Overview
//!
//! A hook chain is an ordered list of steps applied to a read result before
//! it reaches the caller. Each step may:
//! - Pass the data through unchanged
//! - Replace or transform it (e.g., strip secret fields, add computed fields)
//! - Fail, which skips every remaining step and returns the error
//!
//! # Example
//!
//! ```ignore
//! use record_hooks::hooks::{hook_fn, HookConfig, HookRegistry};
//!
//! let strip_password = hook_fn(|data| async move {
//!     Ok(data.map_documents(|mut doc| {
//!         if let Some(obj) = doc.as_object_mut() {
//!             obj.remove("password");
//!         }
//!         doc
//!     }))
//! });
//!
//! let registry = HookRegistry::from_config(
//!     HookConfig::new()
//!         .on("fetch-many", strip_password.clone())
//!         .on("fetch-one", vec![strip_password]),
//! );
//! ```
//!
//! # Configuration keys
//!
//! | Key | Operation |
//! |-----|-----------|
//! | `fetch-many` | Reads returning a list of records |
//! | `fetch-one` | Reads returning at most one record |
//!
//! Any other key is logged and ignored.

mod chain;
mod registry;
mod types;

pub use chain::HookChain;
pub use registry::{hook_fn, hook_fn_with_proceed, ArcHook, HookFunction, HookRegistry, Proceed};
pub use types::{HookConfig, HookSpec, OperationKind, QueryResult};
