//! Filters and find options
//!
//! Equality follows document-store semantics: a condition on a list-valued
//! field matches when the list contains the value.

use std::cmp::Ordering;

use serde_json::Value;

use crate::core::{document_id, Document, ID_FIELD};

/// One condition on a (possibly dotted) field path
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Field equals the value, or contains it if the field is a list
    Eq(String, Value),
    /// Negation of `Eq`
    Ne(String, Value),
    /// Record identifier equals, compared in `document_id` form
    IdEq(String),
    /// Record identifier differs, compared in `document_id` form
    IdNe(String),
}

impl Condition {
    fn matches(&self, doc: &Document) -> bool {
        match self {
            Condition::Eq(field, value) => field_matches(doc, field, value),
            Condition::Ne(field, value) => !field_matches(doc, field, value),
            Condition::IdEq(id) => document_id(doc).as_deref() == Some(id.as_str()),
            Condition::IdNe(id) => document_id(doc).as_deref() != Some(id.as_str()),
        }
    }
}

/// Conjunction of conditions; the empty filter matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match records whose `field` equals (or contains) `value`
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    /// Match records whose `field` neither equals nor contains `value`
    pub fn ne(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Ne(field.into(), value.into()));
        self
    }

    /// Match the record with this identifier
    ///
    /// `"42"` matches a stored `_id` of `42`.
    pub fn by_id(id: impl Into<String>) -> Self {
        Self::new().id_eq(id)
    }

    /// Keep only the record with this identifier
    pub fn id_eq(mut self, id: impl Into<String>) -> Self {
        self.conditions.push(Condition::IdEq(id.into()));
        self
    }

    /// Exclude the record with this identifier
    pub fn id_ne(mut self, id: impl Into<String>) -> Self {
        self.conditions.push(Condition::IdNe(id.into()));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|c| c.matches(doc))
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Paging and ordering for a read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub skip: usize,
    pub limit: Option<usize>,
    pub sort: Option<(String, SortOrder)>,
}

/// A complete read request: filter, optional projection and options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindQuery {
    pub filter: Filter,
    /// Fields to keep; `_id` is always kept. `None` keeps everything.
    pub projection: Option<Vec<String>>,
    pub options: FindOptions,
}

impl FindQuery {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn project<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.options.skip = skip;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.options.limit = Some(limit);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.options.sort = Some((field.into(), order));
        self
    }

    /// Apply sort, skip, limit and projection to already-filtered records
    pub fn shape(&self, mut docs: Vec<Document>) -> Vec<Document> {
        if let Some((field, order)) = &self.options.sort {
            docs.sort_by(|a, b| {
                let ord = compare_values(lookup(a, field), lookup(b, field));
                match order {
                    SortOrder::Ascending => ord,
                    SortOrder::Descending => ord.reverse(),
                }
            });
        }

        let docs = docs
            .into_iter()
            .skip(self.options.skip)
            .take(self.options.limit.unwrap_or(usize::MAX));

        match &self.projection {
            Some(fields) => docs.map(|doc| project(doc, fields)).collect(),
            None => docs.collect(),
        }
    }
}

impl From<Filter> for FindQuery {
    fn from(filter: Filter) -> Self {
        FindQuery::new(filter)
    }
}

/// Resolve a dotted path inside a document
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| current.get(segment))
}

fn field_matches(doc: &Document, field: &str, expected: &Value) -> bool {
    match lookup(doc, field) {
        Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
        Some(actual) => actual == expected,
        None => expected.is_null(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        // Missing sorts first
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn project(doc: Document, fields: &[String]) -> Document {
    match doc {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(key, _)| key == ID_FIELD || fields.iter().any(|f| f == key))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_eq_matches_scalar_and_list() {
        let doc = json!({"email": "a@x.com", "emails": ["b@x.com", "c@x.com"]});

        assert!(Filter::new().eq("email", "a@x.com").matches(&doc));
        assert!(Filter::new().eq("emails", "c@x.com").matches(&doc));
        assert!(!Filter::new().eq("emails", "a@x.com").matches(&doc));
        assert!(Filter::new().matches(&doc));
    }

    #[test]
    fn test_ne_and_dotted_paths() {
        let doc = json!({"_id": "u1", "profile": {"city": "Cape Town"}});

        assert!(Filter::new().ne("_id", "u2").matches(&doc));
        assert!(!Filter::new().ne("_id", "u1").matches(&doc));
        assert!(Filter::new().eq("profile.city", "Cape Town").matches(&doc));
        assert!(Filter::new().eq("missing", Value::Null).matches(&doc));
    }

    #[test]
    fn test_id_conditions_ignore_json_type() {
        let numeric = json!({"_id": 42, "name": "ann"});
        let text = json!({"_id": "42", "name": "bo"});

        assert!(Filter::by_id("42").matches(&numeric));
        assert!(Filter::by_id("42").matches(&text));
        assert!(!Filter::new().id_ne("42").matches(&numeric));
        assert!(Filter::new().id_ne("7").matches(&numeric));
        assert!(!Filter::by_id("42").matches(&json!({"name": "no id"})));
    }

    #[test]
    fn test_shape_sort_skip_limit_project() {
        let docs = vec![
            json!({"_id": "1", "name": "cy", "age": 30}),
            json!({"_id": "2", "name": "ann", "age": 20}),
            json!({"_id": "3", "name": "bo", "age": 25}),
        ];

        let query = FindQuery::new(Filter::new())
            .sort("age", SortOrder::Descending)
            .skip(1)
            .limit(1)
            .project(["name"]);

        assert_eq!(query.shape(docs), vec![json!({"_id": "3", "name": "bo"})]);
    }
}
