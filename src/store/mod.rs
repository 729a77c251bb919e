//! Record store abstraction
//!
//! - `RecordStore` - The read/commit interface every layer talks to
//! - `Filter` / `FindQuery` - Read requests
//! - `Query` / `QueryExt` - Build a read now, execute it later
//! - `MemoryStore` - In-memory implementation

mod filter;
mod memory;
mod record_store;

pub use filter::{lookup, Condition, Filter, FindOptions, FindQuery, SortOrder};
pub use memory::MemoryStore;
pub use record_store::{Query, QueryExt, RecordStore};
