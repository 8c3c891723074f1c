//! Shared data model for the Worklens workspace
//!
//! Defines the three record kinds fetched from the document store
//! (projects, tasks, comments), the report-node types emitted to
//! consumers, and the small pure utilities the pipeline needs:
//! assignee-list parsing and HTML stripping/sanitizing.

pub mod assignees;
pub mod html;
pub mod record;
pub mod report;

pub use assignees::{has_assignee, parse_assignees};
pub use html::{sanitize_html, strip_html};
pub use record::{Comment, Project, Task, DEFAULT_TASK_STATUSES};
pub use report::{CommentView, ProjectSummary, ReportNode, TaskNode};
