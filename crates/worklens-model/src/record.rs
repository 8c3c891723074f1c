//! Record types fetched from the document store
//!
//! Field names mirror the store's wire format, so these decode straight
//! from `serde_json::Value` rows. Decoding is deliberately lenient:
//! every field the pipeline can live without is optional and defaulted,
//! and store-side integer flags (`is_group`) decode from 0/1 or bool.

use serde::{Deserialize, Deserializer, Serialize};

/// Task statuses included in a report when the caller gives none.
pub const DEFAULT_TASK_STATUSES: [&str; 5] =
    ["Open", "Working", "Completed", "Overdue", "Pending Review"];

/// A project snapshot. Read-only: reports never mutate store records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Store identifier (unique).
    #[serde(rename = "name")]
    pub id: String,
    /// Display name shown in reports.
    #[serde(default)]
    pub project_name: Option<String>,
    /// Project status as stored.
    #[serde(default)]
    pub status: Option<String>,
    /// Owning company.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub company: Option<String>,
    /// Completion percentage.
    #[serde(default)]
    pub percent_complete: Option<f64>,
}

impl Project {
    /// Display name with the id as fallback for ordering and rendering.
    #[inline]
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.project_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.id,
        }
    }
}

/// A task record, possibly part of a tree via `parent_task`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Store identifier (unique).
    #[serde(rename = "name")]
    pub id: String,
    /// Subject text.
    #[serde(default)]
    pub subject: Option<String>,
    /// Task status as stored.
    #[serde(default)]
    pub status: Option<String>,
    /// Numeric progress.
    #[serde(default)]
    pub progress: Option<f64>,
    /// Priority label.
    #[serde(default)]
    pub priority: Option<String>,
    /// Grouping node: organizes children, carries no comments of its own.
    #[serde(default, deserialize_with = "flag_from_any")]
    pub is_group: bool,
    /// Owning project id.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub project: Option<String>,
    /// Parent task id. Empty string in the store means no parent.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub parent_task: Option<String>,
    /// Nested-set left bound, when the store maintains one.
    #[serde(default)]
    pub lft: Option<i64>,
    /// Nested-set right bound.
    #[serde(default)]
    pub rgt: Option<i64>,
    /// Serialized JSON list of assignee identities.
    #[serde(default, rename = "_assign")]
    pub assigned_to: Option<String>,
}

impl Task {
    /// Subject text, empty when the record carries none.
    #[inline]
    #[must_use]
    pub fn subject_text(&self) -> &str {
        self.subject.as_deref().unwrap_or("")
    }

    /// Case-insensitive status match against a lowercased set.
    #[must_use]
    pub fn status_in(&self, lowercased: &std::collections::HashSet<String>) -> bool {
        lowercased.contains(&self.status.as_deref().unwrap_or("").to_lowercase())
    }
}

/// A comment attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Store identifier.
    #[serde(rename = "name")]
    pub id: String,
    /// Creation timestamp, sortable ISO-like string (`YYYY-MM-DD HH:MM:SS`).
    #[serde(default)]
    pub creation: String,
    /// Author identity.
    #[serde(default)]
    pub owner: String,
    /// Comment kind tag; only `Comment` is in scope for reports.
    #[serde(default)]
    pub comment_type: Option<String>,
    /// Free-text/HTML body.
    #[serde(default)]
    pub content: Option<String>,
    /// Id of the task this comment belongs to.
    #[serde(default, rename = "reference_name", deserialize_with = "empty_as_none")]
    pub reference_task: Option<String>,
}

impl Comment {
    /// Whether this record is a plain comment (not an activity/log entry).
    #[inline]
    #[must_use]
    pub fn is_plain_comment(&self) -> bool {
        self.comment_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("comment"))
    }

    /// Body text, empty when the record carries none.
    #[inline]
    #[must_use]
    pub fn content_text(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

/// Decode a store flag that may arrive as bool, integer, or numeric string.
fn flag_from_any<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().unwrap_or(0.0) != 0.0,
        serde_json::Value::String(s) => matches!(s.trim(), "1" | "true" | "True"),
        _ => false,
    })
}

/// Decode an optional string, mapping the store's empty string to `None`.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn task_decodes_integer_group_flag() {
        let task: Task = serde_json::from_value(json!({
            "name": "TASK-1",
            "subject": "Setup",
            "is_group": 1
        }))
        .unwrap();
        assert!(task.is_group);

        let task: Task = serde_json::from_value(json!({
            "name": "TASK-2",
            "is_group": 0
        }))
        .unwrap();
        assert!(!task.is_group);
    }

    #[test]
    fn task_decodes_missing_fields() {
        let task: Task = serde_json::from_value(json!({ "name": "TASK-3" })).unwrap();
        assert!(!task.is_group);
        assert_eq!(task.parent_task, None);
        assert_eq!(task.lft, None);
        assert_eq!(task.subject_text(), "");
    }

    #[test]
    fn task_empty_parent_is_none() {
        let task: Task = serde_json::from_value(json!({
            "name": "TASK-4",
            "parent_task": "",
            "project": ""
        }))
        .unwrap();
        assert_eq!(task.parent_task, None);
        assert_eq!(task.project, None);
    }

    #[test]
    fn project_display_name_falls_back_to_id() {
        let project: Project = serde_json::from_value(json!({ "name": "PROJ-1" })).unwrap();
        assert_eq!(project.display_name(), "PROJ-1");

        let project: Project = serde_json::from_value(json!({
            "name": "PROJ-2",
            "project_name": "Alpha"
        }))
        .unwrap();
        assert_eq!(project.display_name(), "Alpha");
    }

    #[test]
    fn comment_kind_is_case_insensitive() {
        let comment: Comment = serde_json::from_value(json!({
            "name": "CMT-1",
            "comment_type": "comment"
        }))
        .unwrap();
        assert!(comment.is_plain_comment());

        let comment: Comment = serde_json::from_value(json!({
            "name": "CMT-2",
            "comment_type": "Like"
        }))
        .unwrap();
        assert!(!comment.is_plain_comment());
    }
}
