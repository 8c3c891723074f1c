//! Testing utilities for the Worklens workspace
//!
//! Row builders and the shared scenario store the strategy tests run
//! both resolution variants against.

#![allow(missing_docs)]

use serde_json::{json, Value};
use worklens_store::{MemoryStore, RecordKind};

/// Build a project row.
#[must_use]
pub fn project_row(id: &str, name: &str, company: &str) -> Value {
    json!({
        "name": id,
        "project_name": name,
        "status": "Open",
        "company": company,
        "percent_complete": 0.0,
    })
}

/// Task row builder.
#[derive(Debug, Clone)]
pub struct TaskRow {
    id: String,
    project: String,
    subject: String,
    status: String,
    is_group: bool,
    parent: Option<String>,
    lft: Option<i64>,
    rgt: Option<i64>,
    assigned: Option<Vec<String>>,
}

impl TaskRow {
    #[must_use]
    pub fn new(id: &str, project: &str, subject: &str) -> Self {
        Self {
            id: id.to_string(),
            project: project.to_string(),
            subject: subject.to_string(),
            status: "Open".to_string(),
            is_group: false,
            parent: None,
            lft: None,
            rgt: None,
            assigned: None,
        }
    }

    #[must_use]
    pub fn status(mut self, status: &str) -> Self {
        self.status = status.to_string();
        self
    }

    #[must_use]
    pub fn group(mut self) -> Self {
        self.is_group = true;
        self
    }

    #[must_use]
    pub fn parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    #[must_use]
    pub fn nested(mut self, lft: i64, rgt: i64) -> Self {
        self.lft = Some(lft);
        self.rgt = Some(rgt);
        self
    }

    #[must_use]
    pub fn assigned(mut self, identities: &[&str]) -> Self {
        self.assigned = Some(identities.iter().map(ToString::to_string).collect());
        self
    }

    #[must_use]
    pub fn row(&self) -> Value {
        json!({
            "name": self.id,
            "subject": self.subject,
            "status": self.status,
            "progress": 0.0,
            "priority": "Medium",
            "is_group": i32::from(self.is_group),
            "project": self.project,
            "parent_task": self.parent.clone().unwrap_or_default(),
            "lft": self.lft,
            "rgt": self.rgt,
            "_assign": self
                .assigned
                .as_ref()
                .map(|a| serde_json::to_string(a).expect("assignee list serializes")),
        })
    }
}

/// Comment row builder.
#[derive(Debug, Clone)]
pub struct CommentRow {
    id: String,
    task: String,
    owner: String,
    creation: String,
    content: String,
    comment_type: String,
}

impl CommentRow {
    #[must_use]
    pub fn new(id: &str, task: &str, owner: &str, creation: &str) -> Self {
        Self {
            id: id.to_string(),
            task: task.to_string(),
            owner: owner.to_string(),
            creation: creation.to_string(),
            content: "<p>done</p>".to_string(),
            comment_type: "Comment".to_string(),
        }
    }

    #[must_use]
    pub fn content(mut self, content: &str) -> Self {
        self.content = content.to_string();
        self
    }

    #[must_use]
    pub fn kind(mut self, comment_type: &str) -> Self {
        self.comment_type = comment_type.to_string();
        self
    }

    #[must_use]
    pub fn row(&self) -> Value {
        json!({
            "name": self.id,
            "creation": self.creation,
            "owner": self.owner,
            "comment_type": self.comment_type,
            "content": self.content,
            "reference_doctype": "Task",
            "reference_name": self.task,
        })
    }
}

/// The shared scenario:
///
/// - company `Acme`: `P1` ("Alpha") and `P2` ("Beta", no tasks);
///   company `Globex`: `P3` ("Gamma").
/// - `P1`: group `G1` ("Phase 1") holding `T1` ("Setup", Open, assigned
///   `a@x.com`) and `T2` ("Deploy", Completed); `T3` ("Docs", Working,
///   root, no nested-set hints).
/// - `P3`: `T4` ("Audit", Open, assigned `b@y.com`).
/// - comments: `C1` (T1, a@x.com, 2024-03-01), `C2` (T1, b@y.com,
///   2024-03-05, "blocked on infra"), `C3` (T3, a@x.com, 2024-03-10),
///   `C4` (T4, b@y.com, 2024-03-02), `C5` (T2, a@x.com, 2024-02-01),
///   and `C6`, a non-Comment kind record on `T1`.
#[must_use]
pub fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(
        RecordKind::Project,
        vec![
            project_row("P1", "Alpha", "Acme"),
            project_row("P2", "Beta", "Acme"),
            project_row("P3", "Gamma", "Globex"),
        ],
    );
    store.seed(
        RecordKind::Task,
        vec![
            TaskRow::new("G1", "P1", "Phase 1").group().nested(1, 6).row(),
            TaskRow::new("T1", "P1", "Setup")
                .parent("G1")
                .nested(2, 3)
                .assigned(&["a@x.com"])
                .row(),
            TaskRow::new("T2", "P1", "Deploy")
                .parent("G1")
                .nested(4, 5)
                .status("Completed")
                .row(),
            TaskRow::new("T3", "P1", "Docs").status("Working").row(),
            TaskRow::new("T4", "P3", "Audit").assigned(&["b@y.com"]).row(),
        ],
    );
    store.seed(
        RecordKind::Comment,
        vec![
            CommentRow::new("C1", "T1", "a@x.com", "2024-03-01 09:00:00").row(),
            CommentRow::new("C2", "T1", "b@y.com", "2024-03-05 10:00:00")
                .content("blocked on <b>infra</b>")
                .row(),
            CommentRow::new("C3", "T3", "a@x.com", "2024-03-10 11:00:00")
                .content("writing docs")
                .row(),
            CommentRow::new("C4", "T4", "b@y.com", "2024-03-02 12:00:00")
                .content("audit started")
                .row(),
            CommentRow::new("C5", "T2", "a@x.com", "2024-02-01 08:00:00").row(),
            CommentRow::new("C6", "T1", "a@x.com", "2024-03-06 09:00:00")
                .kind("Like")
                .row(),
        ],
    );
    store
}
