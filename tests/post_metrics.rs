mod common;

use std::collections::HashSet;

use axum::http::StatusCode;
use common::TestApp;
use metrics_util::debugging::DebuggingRecorder;
use sqlx::SqlitePool;
use yatube::application::posts::{
    METRIC_POST_EDITS_REFUSED, METRIC_POSTS_CREATED, METRIC_POSTS_UPDATED,
};

#[sqlx::test(migrations = "./migrations")]
async fn post_writes_emit_expected_metric_keys(pool: SqlitePool) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    recorder
        .install()
        .expect("debug metrics recorder should install in this test process");

    let app = TestApp::new(pool);
    app.user("auth").await;
    app.user("intruder").await;

    let created = app
        .post_form("/create/", Some("auth"), &[("text", "Counted")])
        .await;
    assert_eq!(created.status, StatusCode::FOUND);

    let post_id: i64 = sqlx::query_scalar("SELECT id FROM posts")
        .fetch_one(app.repos.pool())
        .await
        .expect("post should exist");
    let edit_uri = format!("/posts/{post_id}/edit/");

    let updated = app
        .post_form(&edit_uri, Some("auth"), &[("text", "Recounted")])
        .await;
    assert_eq!(updated.status, StatusCode::FOUND);

    let refused = app
        .post_form(&edit_uri, Some("intruder"), &[("text", "Nope")])
        .await;
    assert_eq!(refused.status, StatusCode::FOUND);

    let names: HashSet<String> = snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .map(|(composite_key, _, _, _)| composite_key.key().name().to_string())
        .collect();

    for metric in [
        METRIC_POSTS_CREATED,
        METRIC_POSTS_UPDATED,
        METRIC_POST_EDITS_REFUSED,
    ] {
        assert!(names.contains(metric), "missing metric: {metric}");
    }
}
