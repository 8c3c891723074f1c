//! Report assembly
//!
//! Orchestrates filter resolution, batched fetching, and tree building
//! into the final ordered list of project report nodes. Two resolution
//! strategies sit behind one interface, selected by configuration:
//!
//! - [`Strategy::TopDown`] (primary): Project scope first, then tasks,
//!   then comments. Strictly consistent; personal scoping is one more
//!   filter dimension, not a separate code path.
//! - [`Strategy::BottomUp`] (legacy, kept for compatibility testing):
//!   comment-driven resolution, plus the personal-report variant when a
//!   responsible identity is supplied.
//!
//! The stages every strategy shares (keyword filtering, latest-only
//! collapse, comment grouping, tree building, node emission) are
//! factored out so the variants cannot diverge on them.

use crate::error::ReportError;
use crate::fetch::{FetchLimits, RecordFetcher};
use crate::query::{ReportQuery, ResolvedFilter};
use crate::tree::build_forest;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::Arc;
use worklens_model::{has_assignee, strip_html, Comment, Project, ReportNode, Task};
use worklens_store::{FieldFilter, OrderBy, RecordStore};

/// Scope-resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Project -> Task -> Comment. Primary.
    #[default]
    TopDown,
    /// Comment-driven legacy resolution (personal variant included).
    BottomUp,
}

impl std::str::FromStr for Strategy {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "top-down" | "topdown" | "top_down" => Ok(Strategy::TopDown),
            "bottom-up" | "bottomup" | "bottom_up" => Ok(Strategy::BottomUp),
            other => Err(ReportError::InvalidQuery(format!(
                "unknown strategy: {other}"
            ))),
        }
    }
}

/// Assembles progress reports against an injected record store.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    fetcher: RecordFetcher,
    strategy: Strategy,
}

impl ReportAssembler {
    /// Create an assembler with default limits and the primary strategy.
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            fetcher: RecordFetcher::new(store),
            strategy: Strategy::default(),
        }
    }

    /// Replace the fetch limits.
    #[inline]
    #[must_use]
    pub fn with_limits(mut self, limits: FetchLimits) -> Self {
        self.fetcher = self.fetcher.with_limits(limits);
        self
    }

    /// Select the resolution strategy.
    #[inline]
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Selected strategy.
    #[inline]
    #[must_use]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Assemble the report for `query`.
    ///
    /// Zero matching projects or tasks is a valid outcome and yields an
    /// empty list. Any store failure aborts the whole request.
    pub async fn assemble(&self, query: &ReportQuery) -> Result<Vec<ReportNode>, ReportError> {
        let filter = query.resolve()?;
        match (self.strategy, filter.assignee.as_deref()) {
            (Strategy::TopDown, _) => self.top_down(&filter).await,
            (Strategy::BottomUp, Some(_)) => self.personal(&filter).await,
            (Strategy::BottomUp, None) => self.bottom_up(&filter).await,
        }
    }

    /// Distinct non-empty company names across all projects, sorted.
    pub async fn companies(&self) -> Result<Vec<String>, ReportError> {
        self.fetcher.company_names().await
    }

    /// Project id/name pairs, optionally restricted to a company.
    pub async fn project_summaries(
        &self,
        company: Option<&str>,
    ) -> Result<Vec<worklens_model::ProjectSummary>, ReportError> {
        self.fetcher.project_summaries(company).await
    }

    /// Primary resolution: Project -> Task -> Comment.
    async fn top_down(&self, filter: &ResolvedFilter) -> Result<Vec<ReportNode>, ReportError> {
        // 1) Target projects. The fetch is ordered by display name and
        // the output retains fetch order (project-driven resolution).
        let mut project_filters = Vec::new();
        if let Some(company) = &filter.company {
            project_filters.push(FieldFilter::eq("company", company.clone()));
        }
        if let Some(project) = &filter.project {
            project_filters.push(FieldFilter::eq("name", project.clone()));
        }
        if !filter.project_statuses.is_empty() {
            project_filters.push(FieldFilter::in_list(
                "status",
                filter.project_statuses.clone(),
            ));
        }
        let projects = self
            .fetcher
            .projects(project_filters, Some(OrderBy::asc("project_name")))
            .await?;
        if projects.is_empty() {
            tracing::info!("no projects in scope, report is empty");
            return Ok(Vec::new());
        }
        let project_index: IndexMap<String, Project> = projects
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();

        // 2) Tasks of those projects, filtered in place.
        let project_ids: Vec<String> = project_index.keys().cloned().collect();
        let mut tasks = self.fetcher.tasks_by_projects(&project_ids).await?;
        retain_status_and_leaf(filter, &mut tasks);
        if let Some(assignee) = &filter.assignee {
            tasks.retain(|t| has_assignee(t.assigned_to.as_deref(), assignee));
        }
        tracing::info!(projects = project_index.len(), tasks = tasks.len(), "scope resolved");

        // 3) Comments of those tasks.
        let task_ids = unique_ids(tasks.iter().map(|t| t.id.clone()));
        let mut comment_filters = filter.date_range_filters();
        if let Some(assignee) = &filter.assignee {
            comment_filters.push(FieldFilter::eq("owner", assignee.clone()));
        }
        let mut comments = self
            .fetcher
            .comments_for_tasks(&task_ids, comment_filters)
            .await?;
        comments.retain(|c| c.is_plain_comment() && c.reference_task.is_some());

        // 4) + 5) Post-fetch comment filters.
        apply_keyword(filter, &mut comments);
        if filter.latest_only {
            comments = collapse_latest(comments);
        }
        tracing::info!(comments = comments.len(), "comments resolved");

        // 6) + 7) Trees, in project-fetch order.
        let mut comments_by_task = group_comments(comments);
        let mut tasks_by_project = group_tasks(tasks);
        let mut nodes = Vec::new();
        for (project_id, project) in &project_index {
            let project_tasks = tasks_by_project.remove(project_id).unwrap_or_default();
            let forest = build_forest(&project_tasks, &mut comments_by_task);
            match &filter.assignee {
                Some(assignee) => {
                    if !forest.is_empty() {
                        nodes.push(
                            ReportNode::from_project(project, forest)
                                .with_responsible(assignee.clone()),
                        );
                    }
                }
                None => nodes.push(ReportNode::from_project(project, forest)),
            }
        }
        Ok(nodes)
    }

    /// Legacy comment-driven resolution.
    async fn bottom_up(&self, filter: &ResolvedFilter) -> Result<Vec<ReportNode>, ReportError> {
        // 1) Comments first, date-ranged.
        let mut comments = self
            .fetcher
            .comments_filtered(filter.date_range_filters())
            .await?;
        comments.retain(|c| c.is_plain_comment() && c.reference_task.is_some());

        // 2) Owning tasks of those comments.
        let comment_task_ids =
            unique_ids(comments.iter().filter_map(|c| c.reference_task.clone()));
        let commented_tasks = self.fetcher.tasks_by_ids(&comment_task_ids).await?;
        let task_map: HashMap<String, Task> = commented_tasks
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        comments.retain(|c| {
            c.reference_task
                .as_ref()
                .is_some_and(|id| task_map.contains_key(id))
        });

        // 3) Target projects: explicit filter, company scope, and any
        // project implied by a qualifying comment's task.
        let mut targets: IndexSet<String> = IndexSet::new();
        let mut project_map: HashMap<String, Project> = HashMap::new();
        if let Some(project) = &filter.project {
            targets.insert(project.clone());
        }
        if let Some(company) = &filter.company {
            let company_projects = self
                .fetcher
                .projects(vec![FieldFilter::eq("company", company.clone())], None)
                .await?;
            for project in company_projects {
                targets.insert(project.id.clone());
                project_map.insert(project.id.clone(), project);
            }
        }
        for comment in &comments {
            let project = comment
                .reference_task
                .as_ref()
                .and_then(|id| task_map.get(id))
                .and_then(|t| t.project.clone());
            if let Some(project) = project {
                targets.insert(project);
            }
        }
        if targets.is_empty() {
            tracing::info!("no target projects, report is empty");
            return Ok(Vec::new());
        }

        let missing: Vec<String> = targets
            .iter()
            .filter(|id| !project_map.contains_key(*id))
            .cloned()
            .collect();
        for project in self.fetcher.projects_by_ids(&missing).await? {
            project_map.insert(project.id.clone(), project);
        }

        comments.retain(|c| {
            c.reference_task
                .as_ref()
                .and_then(|id| task_map.get(id))
                .and_then(|t| t.project.as_ref())
                .is_some_and(|pid| targets.contains(pid))
        });

        // 4) ALL tasks of the target projects complete the trees: a task
        // with zero qualifying comments still appears.
        let target_ids: Vec<String> = targets.iter().cloned().collect();
        let mut all_tasks = self.fetcher.tasks_by_projects(&target_ids).await?;
        retain_status_and_leaf(filter, &mut all_tasks);
        tracing::info!(
            projects = targets.len(),
            tasks = all_tasks.len(),
            comments = comments.len(),
            "scope resolved"
        );

        // 5) Post-fetch comment filters.
        apply_keyword(filter, &mut comments);
        if filter.latest_only {
            comments = collapse_latest(comments);
        }

        // 6) Trees for every target project, lexicographic order. An
        // empty forest is still emitted here, unlike the personal path.
        let mut comments_by_task = group_comments(comments);
        let mut tasks_by_project = group_tasks(all_tasks);
        let mut ordered: Vec<&Project> = targets
            .iter()
            .filter_map(|id| project_map.get(id))
            .collect();
        sort_projects(&mut ordered);
        let mut nodes = Vec::new();
        for project in ordered {
            let project_tasks = tasks_by_project.remove(&project.id).unwrap_or_default();
            let forest = build_forest(&project_tasks, &mut comments_by_task);
            nodes.push(ReportNode::from_project(project, forest));
        }
        Ok(nodes)
    }

    /// Legacy personal-report variant: tasks the identity is responsible
    /// for, comments the identity authored.
    async fn personal(&self, filter: &ResolvedFilter) -> Result<Vec<ReportNode>, ReportError> {
        let assignee = filter
            .assignee
            .as_deref()
            .ok_or_else(|| ReportError::InvalidQuery("personal report without identity".into()))?;

        // 1) Explicit project scope only (no comment-implied projects).
        let mut targets: IndexSet<String> = IndexSet::new();
        let mut project_map: HashMap<String, Project> = HashMap::new();
        if let Some(project) = &filter.project {
            targets.insert(project.clone());
        }
        if let Some(company) = &filter.company {
            let company_projects = self
                .fetcher
                .projects(vec![FieldFilter::eq("company", company.clone())], None)
                .await?;
            for project in company_projects {
                targets.insert(project.id.clone());
                project_map.insert(project.id.clone(), project);
            }
        }

        // 2) Tasks the identity is responsible for. The store-side
        // substring match over-approximates; exact parsed containment
        // decides.
        let target_ids: Vec<String> = targets.iter().cloned().collect();
        let mut tasks = self.fetcher.tasks_assigned(&target_ids, assignee).await?;
        tasks.retain(|t| has_assignee(t.assigned_to.as_deref(), assignee));
        retain_status_and_leaf(filter, &mut tasks);
        if tasks.is_empty() {
            tracing::info!(%assignee, "no assigned tasks, report is empty");
            return Ok(Vec::new());
        }

        // 3) Resolve the projects behind the surviving tasks.
        let task_project_ids = unique_ids(tasks.iter().filter_map(|t| t.project.clone()));
        let missing: Vec<String> = task_project_ids
            .iter()
            .filter(|id| !project_map.contains_key(*id))
            .cloned()
            .collect();
        for project in self.fetcher.projects_by_ids(&missing).await? {
            project_map.insert(project.id.clone(), project);
        }
        if let Some(company) = &filter.company {
            tasks.retain(|t| {
                t.project
                    .as_ref()
                    .and_then(|id| project_map.get(id))
                    .and_then(|p| p.company.as_deref())
                    .is_some_and(|c| c == company)
            });
        }

        // 4) Only comments the identity authored on those tasks.
        let task_ids = unique_ids(tasks.iter().map(|t| t.id.clone()));
        let mut comment_filters = filter.date_range_filters();
        comment_filters.push(FieldFilter::eq("owner", assignee.to_string()));
        let mut comments = self
            .fetcher
            .comments_for_tasks(&task_ids, comment_filters)
            .await?;
        comments.retain(|c| c.is_plain_comment() && c.reference_task.is_some());
        apply_keyword(filter, &mut comments);
        if filter.latest_only {
            comments = collapse_latest(comments);
        }
        tracing::info!(tasks = tasks.len(), comments = comments.len(), %assignee, "personal scope resolved");

        // 5) Trees; projects with nothing assigned are dropped.
        let mut comments_by_task = group_comments(comments);
        let tasks_by_project = group_tasks(tasks);
        let mut ordered: Vec<&Project> = tasks_by_project
            .keys()
            .filter_map(|id| project_map.get(id))
            .collect();
        sort_projects(&mut ordered);
        let mut nodes = Vec::new();
        for project in ordered {
            let project_tasks = &tasks_by_project[&project.id];
            let forest = build_forest(project_tasks, &mut comments_by_task);
            if !forest.is_empty() {
                nodes.push(
                    ReportNode::from_project(project, forest).with_responsible(assignee),
                );
            }
        }
        Ok(nodes)
    }
}

/// Apply the task-status set and leaf-only filters in place.
fn retain_status_and_leaf(filter: &ResolvedFilter, tasks: &mut Vec<Task>) {
    if !filter.task_status_set.is_empty() {
        tasks.retain(|t| t.status_in(&filter.task_status_set));
    }
    if filter.leaf_only {
        tasks.retain(|t| !t.is_group);
    }
}

/// Keep only comments whose stripped text contains the keyword.
fn apply_keyword(filter: &ResolvedFilter, comments: &mut Vec<Comment>) {
    if let Some(keyword) = &filter.keyword {
        comments.retain(|c| strip_html(c.content_text()).to_lowercase().contains(keyword));
    }
}

/// Collapse to the most recent comment per task. Replacement is
/// strictly-greater, so the first comment encountered wins a timestamp
/// tie; chunks arrive ordered ascending by creation.
fn collapse_latest(comments: Vec<Comment>) -> Vec<Comment> {
    let mut latest: IndexMap<String, Comment> = IndexMap::new();
    for comment in comments {
        let Some(task_id) = comment.reference_task.clone() else {
            continue;
        };
        let newer = latest
            .get(&task_id)
            .map_or(true, |existing| comment.creation > existing.creation);
        if newer {
            latest.insert(task_id, comment);
        }
    }
    latest.into_values().collect()
}

/// Group comments by owning task id.
fn group_comments(comments: Vec<Comment>) -> HashMap<String, Vec<Comment>> {
    let mut grouped: HashMap<String, Vec<Comment>> = HashMap::new();
    for comment in comments {
        if let Some(task_id) = comment.reference_task.clone() {
            grouped.entry(task_id).or_default().push(comment);
        }
    }
    grouped
}

/// Group tasks by owning project id; tasks without one cannot render.
fn group_tasks(tasks: Vec<Task>) -> HashMap<String, Vec<Task>> {
    let mut grouped: HashMap<String, Vec<Task>> = HashMap::new();
    for task in tasks {
        let Some(project_id) = task.project.clone() else {
            continue;
        };
        grouped.entry(project_id).or_default().push(task);
    }
    grouped
}

/// Lexicographic project order: display name, id as tie-break.
fn sort_projects(projects: &mut [&Project]) {
    projects.sort_by(|a, b| {
        a.display_name()
            .cmp(b.display_name())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Deduplicate ids preserving first-seen order.
fn unique_ids(ids: impl IntoIterator<Item = String>) -> Vec<String> {
    let set: IndexSet<String> = ids.into_iter().collect();
    set.into_iter().collect()
}
