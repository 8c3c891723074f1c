//! Strategy behavior over the shared scenario store
//!
//! Runs both resolution strategies against the same fixtures and pins
//! down where the contract requires them to agree and where the legacy
//! strategy intentionally diverges.

use pretty_assertions::assert_eq;
use std::sync::Arc;
use worklens_report::{ReportAssembler, ReportQuery, Strategy};
use worklens_test_utils::seeded_store;

fn assembler(strategy: Strategy) -> ReportAssembler {
    ReportAssembler::new(Arc::new(seeded_store())).with_strategy(strategy)
}

fn project_ids(nodes: &[worklens_model::ReportNode]) -> Vec<&str> {
    nodes.iter().map(|n| n.project_id.as_str()).collect()
}

#[tokio::test]
async fn top_down_company_report_orders_projects_by_name() {
    let report = assembler(Strategy::TopDown)
        .assemble(&ReportQuery::new().with_company("Acme"))
        .await
        .unwrap();

    // "Alpha" before "Beta"; the empty project is still emitted.
    assert_eq!(project_ids(&report), vec!["P1", "P2"]);
    assert!(report[1].tasks.is_empty());
}

#[tokio::test]
async fn top_down_builds_nested_forest_with_comments() {
    let report = assembler(Strategy::TopDown)
        .assemble(&ReportQuery::new().with_company("Acme"))
        .await
        .unwrap();
    let alpha = &report[0];

    // Roots sort by lft with missing values as zero: Docs (none) then
    // the Phase 1 group (lft 1).
    let roots: Vec<&str> = alpha.tasks.iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(roots, vec!["T3", "G1"]);

    let group = &alpha.tasks[1];
    assert!(group.is_group);
    assert!(group.comments.is_empty());
    let children: Vec<&str> = group.children.iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(children, vec!["T1", "T2"]);

    // Comments most recent first, bodies sanitized but not stripped.
    let setup = &group.children[0];
    let times: Vec<&str> = setup.comments.iter().map(|c| c.comment_time.as_str()).collect();
    assert_eq!(times, vec!["2024-03-05 10:00:00", "2024-03-01 09:00:00"]);
    assert_eq!(setup.comments[0].comment_html, "blocked on <b>infra</b>");
}

#[tokio::test]
async fn top_down_excludes_non_comment_kinds() {
    let report = assembler(Strategy::TopDown)
        .assemble(&ReportQuery::new().with_company("Acme"))
        .await
        .unwrap();
    let setup = &report[0].tasks[1].children[0];
    // C6 is a "Like" record on the same task; only the two plain
    // comments survive.
    assert_eq!(setup.comments.len(), 2);
}

#[tokio::test]
async fn date_range_is_inclusive_start_exclusive_end_day() {
    let query = ReportQuery::new().with_company("Acme").with_dates(
        chrono::NaiveDate::from_ymd_opt(2024, 3, 1),
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5),
    );
    let report = assembler(Strategy::TopDown).assemble(&query).await.unwrap();

    let setup = &report[0].tasks[1].children[0];
    // C2 is created on the to-date itself and stays in range.
    assert_eq!(setup.comments.len(), 2);

    // Deploy's only comment (2024-02-01) is out of range.
    let deploy = &report[0].tasks[1].children[1];
    assert!(deploy.comments.is_empty());

    // Docs' comment (2024-03-10) is past the exclusive end.
    let docs = &report[0].tasks[0];
    assert!(docs.comments.is_empty());
}

#[tokio::test]
async fn latest_only_keeps_single_max_timestamp_comment() {
    let report = assembler(Strategy::TopDown)
        .assemble(&ReportQuery::new().with_company("Acme").latest_only())
        .await
        .unwrap();

    for node in &report {
        for task in flatten(&node.tasks) {
            assert!(task.comments.len() <= 1, "task {} kept extra comments", task.task_id);
        }
    }
    let setup = &report[0].tasks[1].children[0];
    assert_eq!(setup.comments[0].comment_time, "2024-03-05 10:00:00");
}

#[tokio::test]
async fn keyword_matches_stripped_text_case_insensitively() {
    let report = assembler(Strategy::TopDown)
        .assemble(&ReportQuery::new().with_company("Acme").with_keyword("INFRA"))
        .await
        .unwrap();

    let all_comments: Vec<&str> = flatten(&report[0].tasks)
        .iter()
        .flat_map(|t| t.comments.iter().map(|c| c.comment_html.as_str()))
        .collect();
    assert_eq!(all_comments, vec!["blocked on <b>infra</b>"]);
}

#[tokio::test]
async fn leaf_and_status_filters_promote_orphaned_children() {
    let query = ReportQuery::new()
        .with_company("Acme")
        .with_task_statuses(vec!["Open".to_string()])
        .leaf_only();
    let report = assembler(Strategy::TopDown).assemble(&query).await.unwrap();

    // Only Setup survives (Open, non-group); its group parent is gone,
    // so it roots the forest.
    let alpha = &report[0];
    let roots: Vec<&str> = alpha.tasks.iter().map(|t| t.task_id.as_str()).collect();
    assert_eq!(roots, vec!["T1"]);
    assert!(alpha.tasks[0].children.is_empty());
    for task in flatten(&alpha.tasks) {
        assert!(!task.is_group);
    }
}

#[tokio::test]
async fn status_filter_without_leaf_keeps_group_with_empty_children() {
    // The group task itself is Open and stays; only children with a
    // matching status hang under it.
    let query = ReportQuery::new()
        .with_company("Acme")
        .with_task_statuses(vec!["Open".to_string()]);
    let report = assembler(Strategy::TopDown).assemble(&query).await.unwrap();

    let alpha = &report[0];
    let group = alpha.tasks.iter().find(|t| t.task_id == "G1").unwrap();
    let children: Vec<&str> = group.children.iter().map(|t| t.task_id.as_str()).collect();
    // Deploy (Completed) is gone, Setup (Open) remains.
    assert_eq!(children, vec!["T1"]);
}

#[tokio::test]
async fn top_down_assignee_drops_empty_projects_and_tags() {
    let report = assembler(Strategy::TopDown)
        .assemble(&ReportQuery::new().with_company("Acme").with_assignee("a@x.com"))
        .await
        .unwrap();

    assert_eq!(project_ids(&report), vec!["P1"]);
    assert_eq!(report[0].responsible_email.as_deref(), Some("a@x.com"));
    let tasks = flatten(&report[0].tasks);
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].task_id, "T1");
    for comment in &tasks[0].comments {
        assert_eq!(comment.comment_owner, "a@x.com");
    }
}

#[tokio::test]
async fn personal_report_matches_assignment_case_insensitively() {
    let report = assembler(Strategy::BottomUp)
        .assemble(&ReportQuery::new().with_assignee("A@X.COM"))
        .await
        .unwrap();

    assert_eq!(project_ids(&report), vec!["P1"]);
    assert!(!report[0].tasks.is_empty());
}

#[tokio::test]
async fn personal_report_keeps_only_own_comments() {
    let report = assembler(Strategy::BottomUp)
        .assemble(&ReportQuery::new().with_assignee("a@x.com"))
        .await
        .unwrap();

    assert_eq!(project_ids(&report), vec!["P1"]);
    assert_eq!(report[0].responsible_email.as_deref(), Some("a@x.com"));
    for task in flatten(&report[0].tasks) {
        for comment in &task.comments {
            assert_eq!(comment.comment_owner, "a@x.com");
        }
    }
    // T1 carries b@y.com's comment too; it must not appear.
    let setup = flatten(&report[0].tasks)
        .into_iter()
        .find(|t| t.task_id == "T1")
        .unwrap();
    assert_eq!(setup.comments.len(), 1);
    assert_eq!(setup.comments[0].comment_time, "2024-03-01 09:00:00");
}

#[tokio::test]
async fn bottom_up_includes_comment_implied_projects() {
    // Legacy divergence: a qualifying comment on a Globex task pulls
    // P3 into an Acme-scoped report.
    let bottom_up = assembler(Strategy::BottomUp)
        .assemble(&ReportQuery::new().with_company("Acme"))
        .await
        .unwrap();
    assert_eq!(project_ids(&bottom_up), vec!["P1", "P2", "P3"]);

    let top_down = assembler(Strategy::TopDown)
        .assemble(&ReportQuery::new().with_company("Acme"))
        .await
        .unwrap();
    assert_eq!(project_ids(&top_down), vec!["P1", "P2"]);
}

#[tokio::test]
async fn bottom_up_emits_empty_forest_projects() {
    let report = assembler(Strategy::BottomUp)
        .assemble(&ReportQuery::new().with_company("Acme"))
        .await
        .unwrap();
    let beta = report.iter().find(|n| n.project_id == "P2").unwrap();
    assert!(beta.tasks.is_empty());
}

#[tokio::test]
async fn strategies_agree_on_single_project_scope() {
    let query = ReportQuery::new().with_project("P1");
    let top_down = assembler(Strategy::TopDown).assemble(&query).await.unwrap();
    let bottom_up = assembler(Strategy::BottomUp).assemble(&query).await.unwrap();

    // Same forest for the explicitly scoped project.
    let td = top_down.iter().find(|n| n.project_id == "P1").unwrap();
    let bu = bottom_up.iter().find(|n| n.project_id == "P1").unwrap();
    assert_eq!(td.tasks, bu.tasks);
}

#[tokio::test]
async fn project_company_disagreement_is_strategy_specific() {
    // P3 is not under Acme. Top-down ANDs the constraints: empty.
    let query = ReportQuery::new().with_company("Acme").with_project("P3");
    let top_down = assembler(Strategy::TopDown).assemble(&query).await.unwrap();
    assert!(top_down.is_empty());

    // The legacy strategy unions the scopes: P3 appears alongside the
    // company's projects.
    let bottom_up = assembler(Strategy::BottomUp).assemble(&query).await.unwrap();
    assert!(bottom_up.iter().any(|n| n.project_id == "P3"));
}

#[tokio::test]
async fn project_status_restricts_top_down_scope() {
    let query = ReportQuery::new()
        .with_company("Acme")
        .with_project_statuses(vec!["Completed".to_string()]);
    let report = assembler(Strategy::TopDown).assemble(&query).await.unwrap();
    assert!(report.is_empty());
}

#[tokio::test]
async fn unknown_company_yields_empty_report_not_error() {
    for strategy in [Strategy::TopDown, Strategy::BottomUp] {
        let report = assembler(strategy)
            .assemble(&ReportQuery::new().with_company("Nonexistent").with_dates(
                chrono::NaiveDate::from_ymd_opt(2030, 1, 1),
                chrono::NaiveDate::from_ymd_opt(2030, 1, 2),
            ))
            .await
            .unwrap();
        assert!(report.is_empty());
    }
}

#[tokio::test]
async fn repeated_runs_are_byte_identical() {
    for strategy in [Strategy::TopDown, Strategy::BottomUp] {
        let query = ReportQuery::new().with_company("Acme").latest_only();
        let first = assembler(strategy).assemble(&query).await.unwrap();
        let second = assembler(strategy).assemble(&query).await.unwrap();
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}

#[tokio::test]
async fn convenience_listings_cover_companies_and_projects() {
    let assembler = assembler(Strategy::TopDown);
    assert_eq!(assembler.companies().await.unwrap(), vec!["Acme", "Globex"]);

    let summaries = assembler.project_summaries(Some("Acme")).await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(ids, vec!["P1", "P2"]);
}

/// Depth-first flatten of a forest.
fn flatten(nodes: &[worklens_model::TaskNode]) -> Vec<&worklens_model::TaskNode> {
    let mut out = Vec::new();
    let mut stack: Vec<&worklens_model::TaskNode> = nodes.iter().rev().collect();
    while let Some(node) = stack.pop() {
        out.push(node);
        stack.extend(node.children.iter().rev());
    }
    out
}
