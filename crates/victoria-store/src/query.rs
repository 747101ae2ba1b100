use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;

/// A single predicate of a [`Query`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Filter {
    /// Document carries the given partition tag.
    Partition(String),
    /// Content field at a dot-separated path equals `value`.
    FieldEq { path: String, value: Value },
}

impl Filter {
    /// Returns `true` if the document satisfies this predicate.
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Filter::Partition(tag) => document.entity_type.as_deref() == Some(tag.as_str()),
            Filter::FieldEq { path, value } => document.field(path) == Some(value),
        }
    }
}

/// An immutable structured query.
///
/// Callers of the mapper pass queries through untouched; only a
/// [`QueryEngine`](crate::QueryEngine) interprets them. All filters must
/// match (conjunction).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Query {
    filters: Vec<Filter>,
    limit: Option<usize>,
}

impl Query {
    /// A query matching every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// A query matching every document tagged with `tag`.
    pub fn partition(tag: impl Into<String>) -> Self {
        Self::all().with(Filter::Partition(tag.into()))
    }

    /// Add a predicate.
    pub fn with(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add a field-equality predicate.
    pub fn field_eq(self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(Filter::FieldEq {
            path: path.into(),
            value: value.into(),
        })
    }

    /// Cap the number of returned documents.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Returns `true` if the document satisfies every filter.
    pub fn matches(&self, document: &Document) -> bool {
        self.filters.iter().all(|f| f.matches(document))
    }
}
