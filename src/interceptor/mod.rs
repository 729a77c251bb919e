//! Query interception
//!
//! `HookedStore` decorates any `RecordStore` so reads are threaded through
//! the registry's hook chains before reaching the caller. Build it once and
//! hand it to every component that reads records; writes pass straight
//! through.

mod hooked_store;

pub use hooked_store::HookedStore;
