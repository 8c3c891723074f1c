//! Task-forest reconstruction
//!
//! Rebuilds one project's task tree from the flat task list using keyed
//! indices built once per call (id to index, parent to child list) —
//! no re-scanning of the flat list during reconstruction. O(n log n)
//! in task count, independent of input order.
//!
//! Ordering rules:
//! - siblings sort by nested-set `lft` when any sibling carries one,
//!   otherwise lexicographically by subject;
//! - comments sort descending by creation timestamp;
//! - a task roots the forest when it has no parent, its parent is not
//!   in the set, or it names itself as parent.

use std::collections::HashMap;
use worklens_model::{sanitize_html, Comment, CommentView, Task, TaskNode};

/// Build the ordered forest for a single project's tasks.
///
/// `comments_by_task` maps task id to that task's attached comments;
/// entries are consumed as they are attached. Comments keyed to group
/// tasks stay unconsumed: group nodes organize children and never carry
/// comments of their own.
#[must_use]
pub fn build_forest(
    tasks: &[Task],
    comments_by_task: &mut HashMap<String, Vec<Comment>>,
) -> Vec<TaskNode> {
    let index: HashMap<&str, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| (task.id.as_str(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); tasks.len()];
    let mut roots: Vec<usize> = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        let parent = task
            .parent_task
            .as_deref()
            .filter(|p| *p != task.id)
            .and_then(|p| index.get(p).copied());
        match parent {
            Some(parent_idx) => children[parent_idx].push(i),
            None => roots.push(i),
        }
    }

    sort_siblings(tasks, &mut roots);
    for group in &mut children {
        sort_siblings(tasks, group);
    }

    roots
        .iter()
        .map(|&root| make_node(tasks, &children, comments_by_task, root))
        .collect()
}

/// Order a sibling group in place per the sibling-order invariant.
fn sort_siblings(tasks: &[Task], siblings: &mut [usize]) {
    let has_tree_order = siblings.iter().any(|&i| tasks[i].lft.is_some());
    if has_tree_order {
        siblings.sort_by_key(|&i| tasks[i].lft.unwrap_or(0));
    } else {
        siblings.sort_by(|&a, &b| tasks[a].subject_text().cmp(tasks[b].subject_text()));
    }
}

fn make_node(
    tasks: &[Task],
    children: &[Vec<usize>],
    comments_by_task: &mut HashMap<String, Vec<Comment>>,
    idx: usize,
) -> TaskNode {
    let task = &tasks[idx];
    let comments = if task.is_group {
        Vec::new()
    } else {
        let mut attached = comments_by_task.remove(&task.id).unwrap_or_default();
        attached.sort_by(|a, b| b.creation.cmp(&a.creation));
        attached
            .iter()
            .map(|c| CommentView {
                comment_time: c.creation.clone(),
                comment_owner: c.owner.clone(),
                comment_html: sanitize_html(c.content_text()),
            })
            .collect()
    };
    TaskNode {
        task_id: task.id.clone(),
        task_subject: task.subject_text().to_string(),
        task_status: task.status.clone(),
        is_group: task.is_group,
        comments,
        children: children[idx]
            .iter()
            .map(|&child| make_node(tasks, children, comments_by_task, child))
            .collect(),
    }
}
