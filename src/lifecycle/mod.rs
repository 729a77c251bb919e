//! Write lifecycle for a record type with an identity set
//!
//! - `IdentityValidator` - Rejects identity values owned by another record
//! - `ChangeNotifier` - Builds "created" / "changed" audit entries
//! - `TransitionDispatcher` - Derives onboard/offboard events
//! - `RecordLifecycle` - Runs the above around a commit
//!
//! Audit logs and dispatchers are passed in at construction.

pub mod config;
pub mod diff;
mod engine;
mod notifier;
mod transitions;
mod validator;

pub use config::LifecycleConfig;
pub use diff::{diff, Change, ChangeKind, PathSegment};
pub use engine::{PreviousSnapshot, RecordLifecycle, SaveReport, WriteContext};
pub use notifier::{AuditLog, ChangeNotifier, ChangeRecord, StoreAuditLog};
pub use transitions::{
    ChannelDispatcher, Dispatcher, TransitionDispatcher, TransitionEvent, TransitionVerb,
};
pub use validator::{IdentityValidator, UniquenessCheck};
