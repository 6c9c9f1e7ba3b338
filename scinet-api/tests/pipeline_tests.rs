//! Submission pipeline tests
//!
//! Exercises the controller and endpoint under concurrent load:
//! group counters must reflect every accepted submission exactly once.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Request, StatusCode},
};
use serde_json::json;
use tempfile::TempDir;
use tokio::task::JoinSet;
use tower::util::ServiceExt;

use scinet_api::controller::SubmissionController;
use scinet_api::hash_index::{HashIndex, LookupError, Precheck};
use scinet_api::{build_router, AppState};
use scinet_common::config::{RootFolder, TomlConfig};
use scinet_common::db::{groups, submissions, Group};
use scinet_common::uuid_utils;

async fn setup_state() -> (TempDir, AppState) {
    let dir = TempDir::new().expect("Should create temp dir");
    let root = RootFolder::new(dir.path().to_path_buf(), &TomlConfig::default());
    let state = AppState::open(&root).await.expect("Should open storage");
    (dir, state)
}

async fn seed_group(state: &AppState, id: &str, submissions: i64) {
    groups::create_group(
        &state.db,
        &Group {
            id: id.to_string(),
            name: format!("Group {}", id),
            submissions,
        },
    )
    .await
    .unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_submissions_increment_group_exactly_n_times() {
    const N: usize = 25;
    let (_dir, state) = setup_state().await;
    seed_group(&state, "G", 3).await;

    let mut tasks = JoinSet::new();
    for i in 0..N {
        let app = build_router(state.clone());
        tasks.spawn(async move {
            let payload = json!({"hash": format!("h{}", i), "groups": ["G"]});
            let request = Request::builder()
                .method("POST")
                .uri("/raw")
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap();
            app.oneshot(request).await.unwrap().status()
        });
    }

    while let Some(status) = tasks.join_next().await {
        assert_eq!(status.unwrap(), StatusCode::CREATED);
    }

    let group = groups::load_group(&state.db, "G").await.unwrap().unwrap();
    assert_eq!(group.submissions, 3 + N as i64);
    assert_eq!(submissions::count_submissions(&state.db).await.unwrap(), N as i64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_controller_commits_across_groups() {
    let (_dir, state) = setup_state().await;
    seed_group(&state, "A", 0).await;
    seed_group(&state, "B", 10).await;

    let controller = SubmissionController::new(state.db.clone());
    let mut tasks = JoinSet::new();
    for i in 0..30 {
        let controller = controller.clone();
        tasks.spawn(async move {
            let groups = if i % 3 == 0 { json!(["A", "B"]) } else { json!(["A"]) };
            controller
                .submit(json!({"groups": groups}), uuid_utils::generate())
                .await
        });
    }

    while let Some(result) = tasks.join_next().await {
        result.unwrap().expect("commit should succeed");
    }

    assert_eq!(groups::load_group(&state.db, "A").await.unwrap().unwrap().submissions, 30);
    assert_eq!(groups::load_group(&state.db, "B").await.unwrap().unwrap().submissions, 20);
}

#[tokio::test]
async fn test_controller_result_carries_id_and_counted_groups() {
    let (_dir, state) = setup_state().await;
    seed_group(&state, "G", 0).await;

    let id = uuid_utils::generate();
    let accepted = state
        .controller
        .submit(json!({"group": "G", "groups": ["G", "ghost"]}), id)
        .await
        .unwrap();

    assert_eq!(accepted.id, id);
    assert_eq!(accepted.counted_groups, vec!["G".to_string()]);
    assert_eq!(groups::load_group(&state.db, "G").await.unwrap().unwrap().submissions, 1);

    let record = submissions::load_submission(&state.db, id).await.unwrap().unwrap();
    assert_eq!(record.groups, vec!["G", "ghost"]);
}

#[tokio::test]
async fn test_failed_commit_leaves_no_counter_effect() {
    let (_dir, state) = setup_state().await;
    seed_group(&state, "G", 5).await;

    let id = uuid_utils::generate();
    state
        .controller
        .submit(json!({"groups": ["G"]}), id)
        .await
        .unwrap();

    // Same id again: the insert violates the primary key, so the whole
    // transaction rolls back and the counter is unchanged.
    let failure = state
        .controller
        .submit(json!({"groups": ["G"]}), id)
        .await
        .unwrap_err();
    assert_eq!(failure.id, id);

    assert_eq!(groups::load_group(&state.db, "G").await.unwrap().unwrap().submissions, 6);
}

#[tokio::test]
async fn test_hash_index_reflects_commits() {
    let (_dir, state) = setup_state().await;
    let index = HashIndex::new(state.db.clone());

    assert_eq!(index.precheck("fp-1").await.unwrap(), Precheck::Unknown);
    assert!(matches!(
        index.exists("").await,
        Err(LookupError::EmptyFingerprint)
    ));

    state
        .controller
        .submit(json!({"hash": "fp-1"}), uuid_utils::generate())
        .await
        .unwrap();

    assert_eq!(index.precheck("fp-1").await.unwrap(), Precheck::Known);
    assert!(!index.exists("fp-2").await.unwrap());
}
