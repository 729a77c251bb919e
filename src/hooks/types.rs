//! Hook Types
//!
//! Core types for the hooks system:
//! - `OperationKind` - The read operation a chain is attached to
//! - `QueryResult` - The data threaded through a chain
//! - `HookSpec` / `HookConfig` - Caller-supplied hook configuration

use std::fmt;
use std::str::FromStr;

use crate::core::Document;
use crate::core::HookError;

use super::registry::ArcHook;

/// Read operations that can carry a hook chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Filter-based read returning any number of records
    FetchMany,
    /// Filter-based read returning at most one record
    FetchOne,
}

impl OperationKind {
    /// Configuration key for this operation
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::FetchMany => "fetch-many",
            OperationKind::FetchOne => "fetch-one",
        }
    }

    /// All recognized operations
    pub fn all() -> [OperationKind; 2] {
        [OperationKind::FetchMany, OperationKind::FetchOne]
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fetch-many" => Ok(OperationKind::FetchMany),
            "fetch-one" => Ok(OperationKind::FetchOne),
            other => Err(format!(
                "unrecognized hook key `{other}`; expected fetch-many|fetch-one"
            )),
        }
    }
}

/// The result of a read, passed by value through a hook chain
///
/// Each hook may replace it entirely, but must keep its shape: a fetch-many
/// chain carries `Many`, a fetch-one chain carries `One`.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Many(Vec<Document>),
    One(Option<Document>),
}

impl QueryResult {
    /// The operation this result shape belongs to
    pub fn kind(&self) -> OperationKind {
        match self {
            QueryResult::Many(_) => OperationKind::FetchMany,
            QueryResult::One(_) => OperationKind::FetchOne,
        }
    }

    /// Number of records carried
    pub fn len(&self) -> usize {
        match self {
            QueryResult::Many(docs) => docs.len(),
            QueryResult::One(doc) => usize::from(doc.is_some()),
        }
    }

    /// Check if no records are carried
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply `f` to every carried record, keeping the shape
    pub fn map_documents<F>(self, f: F) -> Self
    where
        F: FnMut(Document) -> Document,
    {
        match self {
            QueryResult::Many(docs) => QueryResult::Many(docs.into_iter().map(f).collect()),
            QueryResult::One(doc) => QueryResult::One(doc.map(f)),
        }
    }

    /// Unwrap a fetch-many result
    pub fn into_many(self) -> Result<Vec<Document>, HookError> {
        match self {
            QueryResult::Many(docs) => Ok(docs),
            QueryResult::One(_) => Err(HookError::ShapeMismatch {
                kind: OperationKind::FetchMany,
            }),
        }
    }

    /// Unwrap a fetch-one result
    pub fn into_one(self) -> Result<Option<Document>, HookError> {
        match self {
            QueryResult::One(doc) => Ok(doc),
            QueryResult::Many(_) => Err(HookError::ShapeMismatch {
                kind: OperationKind::FetchOne,
            }),
        }
    }
}

/// Hooks configured for one key: a single hook or an ordered list
#[derive(Clone)]
pub enum HookSpec {
    Single(ArcHook),
    Chain(Vec<ArcHook>),
}

impl HookSpec {
    /// Normalize to an ordered list
    pub fn into_hooks(self) -> Vec<ArcHook> {
        match self {
            HookSpec::Single(hook) => vec![hook],
            HookSpec::Chain(hooks) => hooks,
        }
    }
}

impl From<ArcHook> for HookSpec {
    fn from(hook: ArcHook) -> Self {
        HookSpec::Single(hook)
    }
}

impl From<Vec<ArcHook>> for HookSpec {
    fn from(hooks: Vec<ArcHook>) -> Self {
        HookSpec::Chain(hooks)
    }
}

impl fmt::Debug for HookSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookSpec::Single(_) => f.write_str("Single"),
            HookSpec::Chain(hooks) => write!(f, "Chain({})", hooks.len()),
        }
    }
}

/// Mapping from operation key to hooks, in insertion order
///
/// Keys are free-form strings; only `fetch-many` and `fetch-one` are
/// recognized when the registry is built.
#[derive(Debug, Clone, Default)]
pub struct HookConfig {
    entries: Vec<(String, HookSpec)>,
}

impl HookConfig {
    /// Create an empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach hooks to a key
    pub fn on(mut self, key: impl Into<String>, spec: impl Into<HookSpec>) -> Self {
        self.entries.push((key.into(), spec.into()));
        self
    }

    /// Configured keys, in insertion order
    pub fn keys(&self) -> Vec<&str> {
        self.entries.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Check if nothing is configured
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn into_entries(self) -> Vec<(String, HookSpec)> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_kind_keys() {
        assert_eq!("fetch-many".parse(), Ok(OperationKind::FetchMany));
        assert_eq!("fetch-one".parse(), Ok(OperationKind::FetchOne));
        assert!("find".parse::<OperationKind>().is_err());
        assert_eq!(OperationKind::FetchOne.to_string(), "fetch-one");
    }

    #[test]
    fn test_map_documents_keeps_shape() {
        let many = QueryResult::Many(vec![json!({"n": 1}), json!({"n": 2})]);
        let mapped = many.map_documents(|mut d| {
            d["seen"] = json!(true);
            d
        });
        assert_eq!(mapped.kind(), OperationKind::FetchMany);
        assert_eq!(mapped.len(), 2);

        let none = QueryResult::One(None).map_documents(|_| json!({"unreachable": true}));
        assert_eq!(none, QueryResult::One(None));
        assert!(none.is_empty());
    }

    #[test]
    fn test_shape_unwrap() {
        assert!(QueryResult::Many(vec![]).into_many().is_ok());
        assert_eq!(
            QueryResult::Many(vec![]).into_one(),
            Err(HookError::ShapeMismatch {
                kind: OperationKind::FetchOne
            })
        );
    }
}
