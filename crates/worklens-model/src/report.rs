//! Report output types
//!
//! The shapes emitted to report consumers: an ordered list of
//! [`ReportNode`]s, each carrying the project snapshot plus an ordered
//! forest of [`TaskNode`]s with their attached comments.

use crate::record::Project;
use serde::{Deserialize, Serialize};

/// A project report: project fields plus its assembled task forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportNode {
    /// Store identifier, repeated under the consumer-facing key.
    pub project_id: String,
    /// Store identifier (projection of the raw project record).
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub project_name: Option<String>,
    /// Project status.
    #[serde(default)]
    pub status: Option<String>,
    /// Owning company.
    #[serde(default)]
    pub company: Option<String>,
    /// Completion percentage.
    #[serde(default)]
    pub percent_complete: Option<f64>,
    /// Responsible identity this report was scoped to, personal mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub responsible_email: Option<String>,
    /// Ordered task forest.
    pub tasks: Vec<TaskNode>,
}

impl ReportNode {
    /// Build a report node from a project record and its task forest.
    #[must_use]
    pub fn from_project(project: &Project, tasks: Vec<TaskNode>) -> Self {
        Self {
            project_id: project.id.clone(),
            name: project.id.clone(),
            project_name: project.project_name.clone(),
            status: project.status.clone(),
            company: project.company.clone(),
            percent_complete: project.percent_complete,
            responsible_email: None,
            tasks,
        }
    }

    /// Tag the node with the responsible identity (personal reports).
    #[inline]
    #[must_use]
    pub fn with_responsible(mut self, email: impl Into<String>) -> Self {
        self.responsible_email = Some(email.into());
        self
    }
}

/// One task in a report forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskNode {
    /// Task identifier.
    pub task_id: String,
    /// Subject text.
    pub task_subject: String,
    /// Task status.
    #[serde(default)]
    pub task_status: Option<String>,
    /// Grouping node flag. Group nodes never carry comments of their own.
    pub is_group: bool,
    /// Attached comments, most recent first. Always empty for group nodes.
    pub comments: Vec<CommentView>,
    /// Ordered child tasks.
    pub children: Vec<TaskNode>,
}

/// A comment reduced to the fields consumers render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentView {
    /// Creation timestamp as stored (sortable string).
    pub comment_time: String,
    /// Author identity.
    pub comment_owner: String,
    /// Sanitized HTML body.
    pub comment_html: String,
}

/// A project id/name pair for pickers and scoping (convenience listing).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    /// Store identifier.
    pub name: String,
    /// Display name.
    #[serde(default)]
    pub project_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project() -> Project {
        Project {
            id: "PROJ-1".to_string(),
            project_name: Some("Alpha".to_string()),
            status: Some("Open".to_string()),
            company: Some("Acme".to_string()),
            percent_complete: Some(40.0),
        }
    }

    #[test]
    fn report_node_projects_fields() {
        let node = ReportNode::from_project(&project(), Vec::new());
        assert_eq!(node.project_id, "PROJ-1");
        assert_eq!(node.name, "PROJ-1");
        assert_eq!(node.project_name.as_deref(), Some("Alpha"));
        assert!(node.responsible_email.is_none());
    }

    #[test]
    fn responsible_email_serializes_only_when_set() {
        let node = ReportNode::from_project(&project(), Vec::new());
        let json = serde_json::to_value(&node).unwrap();
        assert!(json.get("responsible_email").is_none());

        let tagged = ReportNode::from_project(&project(), Vec::new())
            .with_responsible("a@x.com");
        let json = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["responsible_email"], "a@x.com");
    }
}
