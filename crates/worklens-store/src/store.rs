//! The store seam
//!
//! [`RecordStore`] is the single trait the report pipeline depends on.
//! It is object-safe so the assembler can take `Arc<dyn RecordStore>`
//! and be driven against the REST backend, the in-memory double, or
//! anything else that can list filtered records.

use crate::error::StoreError;
use crate::filter::{FieldFilter, OrderBy};
use async_trait::async_trait;

/// The three record kinds the pipeline reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    /// Project snapshots.
    Project,
    /// Task records (tree-forming).
    Task,
    /// Comments referencing tasks.
    Comment,
}

impl RecordKind {
    /// Document-type name used by the backend.
    #[inline]
    #[must_use]
    pub fn doctype(&self) -> &'static str {
        match self {
            RecordKind::Project => "Project",
            RecordKind::Task => "Task",
            RecordKind::Comment => "Comment",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.doctype())
    }
}

/// A filtered, ordered, capped listing of one record kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// Record kind to list.
    pub kind: RecordKind,
    /// Fields to project into each returned record.
    pub fields: Vec<String>,
    /// ANDed predicates.
    pub filters: Vec<FieldFilter>,
    /// Optional result ordering.
    pub order_by: Option<OrderBy>,
    /// Service-imposed result cap.
    pub limit: usize,
}

impl ListQuery {
    /// Start a query for `kind` with the given projected fields.
    #[must_use]
    pub fn new(kind: RecordKind, fields: &[&str]) -> Self {
        Self {
            kind,
            fields: fields.iter().map(|f| (*f).to_string()).collect(),
            filters: Vec::new(),
            order_by: None,
            limit: 10_000,
        }
    }

    /// Add one predicate.
    #[inline]
    #[must_use]
    pub fn filter(mut self, filter: FieldFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add predicates in bulk.
    #[inline]
    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = FieldFilter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Request an ordering.
    #[inline]
    #[must_use]
    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Cap the result size.
    #[inline]
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// Generic "list records of type T matching filter F, paginated" seam.
///
/// # Contract
/// - Results are capped at `query.limit`; the caller chunks identifier
///   lists to stay within the backend's practical batch size.
/// - Reads are idempotent. Implementations may layer retries; the trait
///   itself performs none.
/// - Any error is terminal for the surrounding report request.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List records matching the query, as raw JSON rows.
    async fn list(&self, query: &ListQuery) -> Result<Vec<serde_json::Value>, StoreError>;
}
