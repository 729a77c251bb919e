//! Structural diff between two document snapshots
//!
//! Produces the minimal list of leaf changes: nested objects are walked key
//! by key and arrays element by element, so an edit deep inside a record is
//! reported at its own path instead of replacing the parent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happened at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// Present only on the right-hand side
    New,
    /// Present only on the left-hand side
    Deleted,
    /// Present on both sides with different values
    Edited,
}

/// One step in a change path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// A single difference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lhs: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rhs: Option<Value>,
}

/// Compute the changes that turn `lhs` into `rhs`
///
/// Returns an empty list when the documents are equal.
pub fn diff(lhs: &Value, rhs: &Value) -> Vec<Change> {
    let mut changes = Vec::new();
    let mut path = Vec::new();
    walk(lhs, rhs, &mut path, &mut changes);
    changes
}

fn walk(lhs: &Value, rhs: &Value, path: &mut Vec<PathSegment>, out: &mut Vec<Change>) {
    match (lhs, rhs) {
        (Value::Object(left), Value::Object(right)) => {
            for (key, left_value) in left {
                path.push(PathSegment::Key(key.clone()));
                match right.get(key) {
                    Some(right_value) => walk(left_value, right_value, path, out),
                    None => out.push(change(ChangeKind::Deleted, path, Some(left_value), None)),
                }
                path.pop();
            }
            for (key, right_value) in right {
                if !left.contains_key(key) {
                    path.push(PathSegment::Key(key.clone()));
                    out.push(change(ChangeKind::New, path, None, Some(right_value)));
                    path.pop();
                }
            }
        }
        (Value::Array(left), Value::Array(right)) => {
            for index in 0..left.len().max(right.len()) {
                path.push(PathSegment::Index(index));
                match (left.get(index), right.get(index)) {
                    (Some(l), Some(r)) => walk(l, r, path, out),
                    (Some(l), None) => out.push(change(ChangeKind::Deleted, path, Some(l), None)),
                    (None, Some(r)) => out.push(change(ChangeKind::New, path, None, Some(r))),
                    (None, None) => {}
                }
                path.pop();
            }
        }
        _ if lhs == rhs => {}
        _ => out.push(change(ChangeKind::Edited, path, Some(lhs), Some(rhs))),
    }
}

fn change(
    kind: ChangeKind,
    path: &[PathSegment],
    lhs: Option<&Value>,
    rhs: Option<&Value>,
) -> Change {
    Change {
        kind,
        path: path.to_vec(),
        lhs: lhs.cloned(),
        rhs: rhs.cloned(),
    }
}
