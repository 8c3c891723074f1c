//! Batched record fetching
//!
//! Wraps the store seam with the three typed listings the pipeline
//! needs. Identifier-list filters are split into fixed-size chunks and
//! the chunks of one call are issued concurrently; later stages re-sort,
//! so cross-chunk order never matters. A record that fails to decode is
//! skipped with a warning — malformed fields are no-matches, not errors.

use crate::error::ReportError;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use worklens_model::{Comment, Project, Task};
use worklens_store::{FieldFilter, ListQuery, OrderBy, RecordKind, RecordStore};

/// Projected fields per record kind.
pub(crate) const PROJECT_FIELDS: &[&str] =
    &["name", "project_name", "status", "company", "percent_complete"];
pub(crate) const TASK_FIELDS: &[&str] = &[
    "name",
    "subject",
    "status",
    "progress",
    "priority",
    "is_group",
    "project",
    "parent_task",
    "lft",
    "rgt",
    "_assign",
];
pub(crate) const COMMENT_FIELDS: &[&str] =
    &["name", "creation", "owner", "comment_type", "content", "reference_name"];

/// Store field holding the serialized assignee list.
pub(crate) const ASSIGN_FIELD: &str = "_assign";

/// Batch sizes and the service-imposed result cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchLimits {
    /// Per-call result cap (the backend enforces one; reproduce it).
    pub max_records: usize,
    /// Chunk size for project-id lists when fetching tasks.
    pub project_batch: usize,
    /// Chunk size for generic identifier lists.
    pub id_batch: usize,
    /// Chunk size for task-id lists when fetching comments.
    pub comment_batch: usize,
}

impl Default for FetchLimits {
    fn default() -> Self {
        Self {
            max_records: 10_000,
            project_batch: 50,
            id_batch: 200,
            comment_batch: 400,
        }
    }
}

impl FetchLimits {
    /// Override the per-call result cap.
    #[inline]
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }
}

/// Typed, chunking fetch layer over a [`RecordStore`].
#[derive(Clone)]
pub struct RecordFetcher {
    store: Arc<dyn RecordStore>,
    limits: FetchLimits,
}

impl std::fmt::Debug for RecordFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordFetcher")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl RecordFetcher {
    /// Create a fetcher with default limits.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            limits: FetchLimits::default(),
        }
    }

    /// Replace the batch limits.
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: FetchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Current batch limits.
    #[inline]
    #[must_use]
    pub fn limits(&self) -> FetchLimits {
        self.limits
    }

    /// List projects under the given predicates, in store order.
    pub async fn projects(
        &self,
        filters: Vec<FieldFilter>,
        order_by: Option<OrderBy>,
    ) -> Result<Vec<Project>, ReportError> {
        let mut query = ListQuery::new(RecordKind::Project, PROJECT_FIELDS)
            .filters(filters)
            .limit(self.limits.max_records);
        if let Some(order) = order_by {
            query = query.order_by(order);
        }
        self.list_decoded(query).await
    }

    /// Fetch specific projects by id, chunked.
    pub async fn projects_by_ids(&self, ids: &[String]) -> Result<Vec<Project>, ReportError> {
        self.chunked(ids, self.limits.id_batch, |chunk| {
            ListQuery::new(RecordKind::Project, PROJECT_FIELDS)
                .filter(FieldFilter::in_list("name", chunk))
                .limit(self.limits.max_records)
        })
        .await
    }

    /// Fetch every task of the given projects, chunked by project id.
    pub async fn tasks_by_projects(
        &self,
        project_ids: &[String],
    ) -> Result<Vec<Task>, ReportError> {
        self.chunked(project_ids, self.limits.project_batch, |chunk| {
            ListQuery::new(RecordKind::Task, TASK_FIELDS)
                .filter(FieldFilter::in_list("project", chunk))
                .limit(self.limits.max_records)
        })
        .await
    }

    /// Fetch specific tasks by id, chunked.
    pub async fn tasks_by_ids(&self, ids: &[String]) -> Result<Vec<Task>, ReportError> {
        self.chunked(ids, self.limits.id_batch, |chunk| {
            ListQuery::new(RecordKind::Task, TASK_FIELDS)
                .filter(FieldFilter::in_list("name", chunk))
                .limit(self.limits.max_records)
        })
        .await
    }

    /// Fetch tasks assigned to an identity, optionally restricted to a
    /// project set. The store-side `like` on the serialized list is a
    /// pre-filter; callers still apply exact parsed containment.
    pub async fn tasks_assigned(
        &self,
        project_ids: &[String],
        identity: &str,
    ) -> Result<Vec<Task>, ReportError> {
        let like = FieldFilter::like(ASSIGN_FIELD, format!("%{identity}%"));
        if project_ids.is_empty() {
            let query = ListQuery::new(RecordKind::Task, TASK_FIELDS)
                .filter(like)
                .limit(self.limits.max_records);
            return self.list_decoded(query).await;
        }
        self.chunked(project_ids, self.limits.project_batch, |chunk| {
            ListQuery::new(RecordKind::Task, TASK_FIELDS)
                .filter(FieldFilter::in_list("project", chunk))
                .filter(like.clone())
                .limit(self.limits.max_records)
        })
        .await
    }

    /// Fetch plain comments for the given tasks, chunked by task id.
    ///
    /// Each chunk is ordered ascending by creation; the latest-only
    /// collapse depends on that scan order for its tie-break.
    pub async fn comments_for_tasks(
        &self,
        task_ids: &[String],
        extra: Vec<FieldFilter>,
    ) -> Result<Vec<Comment>, ReportError> {
        self.chunked(task_ids, self.limits.comment_batch, |chunk| {
            ListQuery::new(RecordKind::Comment, COMMENT_FIELDS)
                .filter(FieldFilter::eq("reference_doctype", "Task"))
                .filter(FieldFilter::in_list("reference_name", chunk))
                .filter(FieldFilter::eq("comment_type", "Comment"))
                .filters(extra.iter().cloned())
                .order_by(OrderBy::asc("creation"))
                .limit(self.limits.max_records)
        })
        .await
    }

    /// Fetch plain task comments matching the given predicates
    /// (comment-driven resolution entry).
    pub async fn comments_filtered(
        &self,
        extra: Vec<FieldFilter>,
    ) -> Result<Vec<Comment>, ReportError> {
        let query = ListQuery::new(RecordKind::Comment, COMMENT_FIELDS)
            .filter(FieldFilter::eq("reference_doctype", "Task"))
            .filter(FieldFilter::eq("comment_type", "Comment"))
            .filters(extra)
            .order_by(OrderBy::asc("creation"))
            .limit(self.limits.max_records);
        self.list_decoded(query).await
    }

    /// Distinct non-empty company names across all projects, sorted.
    pub async fn company_names(&self) -> Result<Vec<String>, ReportError> {
        let query = ListQuery::new(RecordKind::Project, &["company"])
            .limit(self.limits.max_records);
        let rows = self.store.list(&query).await?;
        let mut names: Vec<String> = rows
            .iter()
            .filter_map(|row| row.get("company").and_then(serde_json::Value::as_str))
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect();
        names.sort();
        names.dedup();
        Ok(names)
    }

    /// Project id/name pairs for pickers, optionally company-scoped.
    pub async fn project_summaries(
        &self,
        company: Option<&str>,
    ) -> Result<Vec<worklens_model::ProjectSummary>, ReportError> {
        let mut query = ListQuery::new(RecordKind::Project, &["name", "project_name"])
            .order_by(OrderBy::asc("project_name"))
            .limit(self.limits.max_records);
        if let Some(company) = company {
            query = query.filter(FieldFilter::eq("company", company));
        }
        self.list_decoded(query).await
    }

    /// Run one query per id-chunk concurrently and concatenate.
    async fn chunked<T: DeserializeOwned>(
        &self,
        ids: &[String],
        chunk_size: usize,
        build: impl Fn(Vec<String>) -> ListQuery,
    ) -> Result<Vec<T>, ReportError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let queries: Vec<ListQuery> = ids
            .chunks(chunk_size.max(1))
            .map(|chunk| build(chunk.to_vec()))
            .collect();
        tracing::debug!(
            kind = %queries[0].kind,
            chunks = queries.len(),
            ids = ids.len(),
            "issuing chunked listing"
        );
        let batches =
            futures::future::try_join_all(queries.into_iter().map(|q| self.list_decoded::<T>(q)))
                .await?;
        Ok(batches.into_iter().flatten().collect())
    }

    /// Run one listing and decode rows, skipping any that do not decode.
    async fn list_decoded<T: DeserializeOwned>(
        &self,
        query: ListQuery,
    ) -> Result<Vec<T>, ReportError> {
        let kind = query.kind;
        let rows = self.store.list(&query).await?;
        let mut decoded = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_value::<T>(row) {
                Ok(record) => decoded.push(record),
                Err(error) => {
                    tracing::warn!(%kind, %error, "skipping undecodable record");
                }
            }
        }
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use worklens_store::{MemoryStore, StoreError};

    /// Store wrapper that records how many listings were issued and the
    /// largest identifier chunk seen.
    struct CountingStore {
        inner: MemoryStore,
        calls: AtomicUsize,
        largest_chunk: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RecordStore for CountingStore {
        async fn list(&self, query: &ListQuery) -> Result<Vec<serde_json::Value>, StoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            for filter in &query.filters {
                if let worklens_store::FilterValue::List(ids) = &filter.value {
                    self.largest_chunk.fetch_max(ids.len(), Ordering::SeqCst);
                }
            }
            self.inner.list(query).await
        }
    }

    fn task_row(id: usize) -> serde_json::Value {
        json!({ "name": format!("TASK-{id}"), "subject": "s", "project": "PROJ-1" })
    }

    #[tokio::test]
    async fn chunk_sizes_respect_limits() {
        let counting = Arc::new(CountingStore {
            inner: MemoryStore::new(),
            calls: AtomicUsize::new(0),
            largest_chunk: AtomicUsize::new(0),
        });
        counting
            .inner
            .seed(RecordKind::Task, (0..10).map(task_row).collect());

        let ids: Vec<String> = (0..10).map(|i| format!("TASK-{i}")).collect();
        let fetcher = RecordFetcher::new(counting.clone()).with_limits(FetchLimits {
            id_batch: 3,
            ..FetchLimits::default()
        });
        let tasks = fetcher.tasks_by_ids(&ids).await.unwrap();

        assert_eq!(tasks.len(), 10);
        assert_eq!(counting.calls.load(Ordering::SeqCst), 4); // ceil(10 / 3)
        assert_eq!(counting.largest_chunk.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_id_list_issues_no_calls() {
        let counting = Arc::new(CountingStore {
            inner: MemoryStore::new(),
            calls: AtomicUsize::new(0),
            largest_chunk: AtomicUsize::new(0),
        });
        let fetcher = RecordFetcher::new(counting.clone());
        let tasks = fetcher.tasks_by_ids(&[]).await.unwrap();
        assert!(tasks.is_empty());
        assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn undecodable_rows_are_skipped() {
        let store = MemoryStore::new();
        store.seed(
            RecordKind::Task,
            vec![
                json!({ "name": "TASK-0", "lft": "not a number" }),
                task_row(1),
            ],
        );
        let fetcher = RecordFetcher::new(Arc::new(store));
        let tasks = fetcher
            .tasks_by_ids(&["TASK-0".to_string(), "TASK-1".to_string()])
            .await
            .unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "TASK-1");
    }
}
