//! Filter resolution
//!
//! Turns raw report parameters into the normalized predicates each
//! record kind is filtered by. Resolution is pure: no store access
//! happens here, and nothing here can fail except date handling.

use crate::error::ReportError;
use chrono::{Days, NaiveDate};
use std::collections::HashSet;
use worklens_model::DEFAULT_TASK_STATUSES;

/// Raw report parameters as accepted by the entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportQuery {
    /// Inclusive start date for comment creation.
    pub from_date: Option<NaiveDate>,
    /// Exclusive end date (whole calendar day included).
    pub to_date: Option<NaiveDate>,
    /// Restrict to one project id.
    pub project: Option<String>,
    /// Restrict to one company.
    pub company: Option<String>,
    /// Responsible-person identity; triggers personal-report mode on the
    /// legacy strategy.
    pub assignee: Option<String>,
    /// Case-insensitive substring match on stripped comment text.
    pub keyword: Option<String>,
    /// Task statuses to keep. Empty means no restriction.
    pub task_statuses: Vec<String>,
    /// Project statuses to keep. Empty means no restriction.
    pub project_statuses: Vec<String>,
    /// Keep only non-group tasks.
    pub leaf_only: bool,
    /// Keep only the most recent comment per task.
    pub latest_only: bool,
}

impl Default for ReportQuery {
    fn default() -> Self {
        Self {
            from_date: None,
            to_date: None,
            project: None,
            company: None,
            assignee: None,
            keyword: None,
            task_statuses: DEFAULT_TASK_STATUSES.iter().map(ToString::to_string).collect(),
            project_statuses: Vec::new(),
            leaf_only: false,
            latest_only: false,
        }
    }
}

impl ReportQuery {
    /// Fresh query with the default task-status set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a company.
    #[inline]
    #[must_use]
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Restrict to a project id.
    #[inline]
    #[must_use]
    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Scope to a responsible-person identity.
    #[inline]
    #[must_use]
    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Filter comment text by keyword.
    #[inline]
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    /// Restrict the comment date range. `to` is inclusive as a calendar
    /// day: resolution converts it to before-start-of-next-day.
    #[inline]
    #[must_use]
    pub fn with_dates(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.from_date = from;
        self.to_date = to;
        self
    }

    /// Replace the task-status set.
    #[inline]
    #[must_use]
    pub fn with_task_statuses(mut self, statuses: Vec<String>) -> Self {
        self.task_statuses = statuses;
        self
    }

    /// Replace the project-status set.
    #[inline]
    #[must_use]
    pub fn with_project_statuses(mut self, statuses: Vec<String>) -> Self {
        self.project_statuses = statuses;
        self
    }

    /// Keep only non-group tasks.
    #[inline]
    #[must_use]
    pub fn leaf_only(mut self) -> Self {
        self.leaf_only = true;
        self
    }

    /// Keep only the latest comment per task.
    #[inline]
    #[must_use]
    pub fn latest_only(mut self) -> Self {
        self.latest_only = true;
        self
    }

    /// Parse entry-point parameters.
    ///
    /// Accepted names and aliases: `from_date`/`from`, `to_date`/`to`,
    /// `company`, `project`, `comment_owner`/`owner`/`email`,
    /// `keyword`/`kw`, `task_status`/`status` (comma-separated),
    /// `project_status` (comma-separated), `leaf` and `latest`
    /// (presence-only). The first occurrence of a parameter wins;
    /// unknown names and empty values are ignored.
    ///
    /// # Errors
    /// `ReportError::InvalidQuery` for dates not in `YYYY-MM-DD` form.
    pub fn from_pairs<K, V>(pairs: &[(K, V)]) -> Result<Self, ReportError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut query = Self::new();
        let mut statuses_seen = false;
        for (key, value) in pairs {
            let value = value.as_ref().trim();
            match key.as_ref() {
                "leaf" => query.leaf_only = true,
                "latest" => query.latest_only = true,
                _ if value.is_empty() => {}
                "from_date" | "from" if query.from_date.is_none() => {
                    query.from_date = Some(parse_date(value)?);
                }
                "to_date" | "to" if query.to_date.is_none() => {
                    query.to_date = Some(parse_date(value)?);
                }
                "company" if query.company.is_none() => query.company = Some(value.to_string()),
                "project" if query.project.is_none() => query.project = Some(value.to_string()),
                "comment_owner" | "owner" | "email" if query.assignee.is_none() => {
                    query.assignee = Some(value.to_string());
                }
                "keyword" | "kw" if query.keyword.is_none() => {
                    query.keyword = Some(value.to_string());
                }
                "task_status" | "status" if !statuses_seen => {
                    statuses_seen = true;
                    query.task_statuses = split_list(value);
                }
                "project_status" if query.project_statuses.is_empty() => {
                    query.project_statuses = split_list(value);
                }
                _ => {}
            }
        }
        Ok(query)
    }

    /// Normalize into the concrete predicates the pipeline applies.
    ///
    /// # Errors
    /// `ReportError::InvalidQuery` when the exclusive end day cannot be
    /// represented.
    pub fn resolve(&self) -> Result<ResolvedFilter, ReportError> {
        let to_exclusive = match self.to_date {
            Some(to) => Some(
                to.checked_add_days(Days::new(1))
                    .ok_or_else(|| {
                        ReportError::InvalidQuery(format!("to_date out of range: {to}"))
                    })?
                    .format("%Y-%m-%d 00:00:00")
                    .to_string(),
            ),
            None => None,
        };
        Ok(ResolvedFilter {
            from_ts: self.from_date.map(|d| d.format("%Y-%m-%d").to_string()),
            to_exclusive,
            project: trimmed(self.project.as_deref()),
            company: trimmed(self.company.as_deref()),
            assignee: trimmed(self.assignee.as_deref()),
            keyword: trimmed(self.keyword.as_deref()).map(|k| k.to_lowercase()),
            task_status_set: self
                .task_statuses
                .iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            project_statuses: self
                .project_statuses
                .iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            leaf_only: self.leaf_only,
            latest_only: self.latest_only,
        })
    }
}

/// Normalized filter predicates, ready to apply per record kind.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFilter {
    /// Comment creation lower bound (`YYYY-MM-DD`, inclusive).
    pub from_ts: Option<String>,
    /// Comment creation upper bound (`YYYY-MM-DD 00:00:00` of the day
    /// after `to_date`, exclusive).
    pub to_exclusive: Option<String>,
    /// Project id restriction.
    pub project: Option<String>,
    /// Company restriction.
    pub company: Option<String>,
    /// Responsible identity, trimmed; compared case-insensitively.
    pub assignee: Option<String>,
    /// Lowercased keyword for stripped-text matching.
    pub keyword: Option<String>,
    /// Lowercased task statuses. Empty set means no restriction.
    pub task_status_set: HashSet<String>,
    /// Project statuses as given (store-side filter). Empty means none.
    pub project_statuses: Vec<String>,
    /// Keep only non-group tasks.
    pub leaf_only: bool,
    /// Keep only the latest comment per task.
    pub latest_only: bool,
}

impl ResolvedFilter {
    /// Comment date-range predicates for a store query.
    #[must_use]
    pub fn date_range_filters(&self) -> Vec<worklens_store::FieldFilter> {
        let mut filters = Vec::new();
        if let Some(from) = &self.from_ts {
            filters.push(worklens_store::FieldFilter::gte("creation", from.clone()));
        }
        if let Some(to) = &self.to_exclusive {
            filters.push(worklens_store::FieldFilter::lt("creation", to.clone()));
        }
        filters
    }
}

fn parse_date(value: &str) -> Result<NaiveDate, ReportError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ReportError::InvalidQuery(format!("invalid date: {value}")))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_task_statuses_apply() {
        let query = ReportQuery::new();
        assert_eq!(query.task_statuses.len(), 5);
        assert!(query.task_statuses.iter().any(|s| s == "Pending Review"));
    }

    #[test]
    fn pairs_accept_aliases() {
        let query = ReportQuery::from_pairs(&[
            ("from", "2024-03-01"),
            ("to", "2024-03-31"),
            ("owner", "a@x.com"),
            ("kw", "blocked"),
            ("status", "Open, Working"),
            ("leaf", ""),
            ("latest", "1"),
            ("unknown", "ignored"),
        ])
        .unwrap();
        assert_eq!(query.from_date, Some(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()));
        assert_eq!(query.assignee.as_deref(), Some("a@x.com"));
        assert_eq!(query.keyword.as_deref(), Some("blocked"));
        assert_eq!(query.task_statuses, vec!["Open", "Working"]);
        assert!(query.leaf_only);
        assert!(query.latest_only);
    }

    #[test]
    fn first_occurrence_wins() {
        let query =
            ReportQuery::from_pairs(&[("company", "Acme"), ("company", "Globex")]).unwrap();
        assert_eq!(query.company.as_deref(), Some("Acme"));
    }

    #[test]
    fn invalid_date_is_rejected() {
        let err = ReportQuery::from_pairs(&[("from_date", "03/01/2024")]).unwrap_err();
        assert!(matches!(err, ReportError::InvalidQuery(_)));
    }

    #[test]
    fn to_date_resolves_to_next_day_midnight() {
        let filter = ReportQuery::new()
            .with_dates(
                NaiveDate::from_ymd_opt(2024, 3, 1),
                NaiveDate::from_ymd_opt(2024, 3, 31),
            )
            .resolve()
            .unwrap();
        assert_eq!(filter.from_ts.as_deref(), Some("2024-03-01"));
        assert_eq!(filter.to_exclusive.as_deref(), Some("2024-04-01 00:00:00"));
    }

    #[test]
    fn statuses_normalize_lowercase() {
        let filter = ReportQuery::new()
            .with_task_statuses(vec![" Open ".to_string(), "WORKING".to_string()])
            .resolve()
            .unwrap();
        assert!(filter.task_status_set.contains("open"));
        assert!(filter.task_status_set.contains("working"));
    }

    #[test]
    fn empty_status_list_means_unrestricted() {
        let query = ReportQuery::from_pairs(&[("status", ",,")]).unwrap();
        assert!(query.task_statuses.is_empty());
        let filter = query.resolve().unwrap();
        assert!(filter.task_status_set.is_empty());
    }

    #[test]
    fn assignee_is_trimmed_not_lowercased() {
        let filter = ReportQuery::new()
            .with_assignee("  A@X.com ")
            .resolve()
            .unwrap();
        assert_eq!(filter.assignee.as_deref(), Some("A@X.com"));
    }
}
