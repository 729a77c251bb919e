//! Record store trait and deferred queries
//!
//! The store is an external collaborator: anything that can answer
//! filter-based reads and commit records by identifier.

use async_trait::async_trait;

use super::filter::{Filter, FindQuery, SortOrder};
use crate::core::{Document, RecordResult};
use crate::hooks::{OperationKind, QueryResult};

/// Trait for record stores
///
/// Implementations hold a single collection of records, each carrying a
/// stable identifier under `_id`.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch every record matching the query
    async fn fetch_many(&self, query: &FindQuery) -> RecordResult<Vec<Document>>;

    /// Fetch the first record matching the query
    async fn fetch_one(&self, query: &FindQuery) -> RecordResult<Option<Document>>;

    /// Insert or replace a record by identifier
    async fn commit(&self, doc: Document) -> RecordResult<()>;

    /// Fetch a record by identifier
    async fn find_by_id(&self, id: &str) -> RecordResult<Option<Document>> {
        self.fetch_one(&FindQuery::new(Filter::by_id(id))).await
    }
}

/// A read built now and executed later
///
/// Created through [`QueryExt::find`] / [`QueryExt::find_one`]. Nothing
/// touches the store until [`Query::exec`] or [`Query::exec_with`] runs, so
/// any decoration on the store (hook chains) applies at execution time.
pub struct Query<'a, S: ?Sized> {
    store: &'a S,
    kind: OperationKind,
    spec: FindQuery,
}

impl<'a, S> Query<'a, S>
where
    S: RecordStore + ?Sized,
{
    pub fn new(store: &'a S, kind: OperationKind, filter: Filter) -> Self {
        Self {
            store,
            kind,
            spec: FindQuery::new(filter),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn spec(&self) -> &FindQuery {
        &self.spec
    }

    pub fn project<I, T>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.spec = self.spec.project(fields);
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.spec = self.spec.skip(skip);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.spec = self.spec.limit(limit);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.spec = self.spec.sort(field, order);
        self
    }

    /// Run the query
    pub async fn exec(self) -> RecordResult<QueryResult> {
        match self.kind {
            OperationKind::FetchMany => self.store.fetch_many(&self.spec).await.map(QueryResult::Many),
            OperationKind::FetchOne => self.store.fetch_one(&self.spec).await.map(QueryResult::One),
        }
    }

    /// Run the query and hand the outcome to a completion callback
    pub async fn exec_with<F, T>(self, callback: F) -> T
    where
        F: FnOnce(RecordResult<QueryResult>) -> T,
    {
        callback(self.exec().await)
    }
}

/// Deferred-query constructors for every store
pub trait QueryExt: RecordStore {
    /// Build a fetch-many query
    fn find(&self, filter: Filter) -> Query<'_, Self> {
        Query::new(self, OperationKind::FetchMany, filter)
    }

    /// Build a fetch-one query
    fn find_one(&self, filter: Filter) -> Query<'_, Self> {
        Query::new(self, OperationKind::FetchOne, filter)
    }
}

impl<T: RecordStore + ?Sized> QueryExt for T {}
