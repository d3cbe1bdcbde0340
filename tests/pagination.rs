mod common;

use axum::http::StatusCode;
use common::TestApp;
use sqlx::SqlitePool;

const TOTAL_POSTS: usize = 13;

#[sqlx::test(migrations = "./migrations")]
async fn feeds_split_into_pages_of_ten(pool: SqlitePool) {
    let app = TestApp::new(pool);
    let author = app.user("auth").await;
    let group = app.group("Test group", "test-slug").await;
    for n in 0..TOTAL_POSTS {
        app.post(&author, &format!("Post number {n}"), Some(&group)).await;
    }

    for base in ["/", "/group/test-slug/", "/profile/auth/"] {
        let first = app.get(base, None).await;
        assert_eq!(first.status, StatusCode::OK, "GET {base}");
        assert_eq!(first.post_cards(), 10, "first page of {base}");
        assert!(first.body.contains("Page 1 of 2"), "GET {base}");

        let second = app.get(&format!("{base}?page=2"), None).await;
        assert_eq!(second.post_cards(), 3, "second page of {base}");
        assert!(second.body.contains("Page 2 of 2"), "GET {base}?page=2");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn newest_post_leads_the_first_page(pool: SqlitePool) {
    let app = TestApp::new(pool);
    let author = app.user("auth").await;
    for n in 0..TOTAL_POSTS {
        app.post(&author, &format!("Post number {n}"), None).await;
    }

    let first = app.get("/", None).await;
    let newest = first
        .body
        .find("Post number 12")
        .expect("newest post on first page");
    let older = first
        .body
        .find("Post number 11")
        .expect("second newest post on first page");
    assert!(newest < older);
    assert!(!first.body.contains("Post number 0<"));

    let second = app.get("/?page=2", None).await;
    assert!(second.body.contains("Post number 0<"));
}

#[sqlx::test(migrations = "./migrations")]
async fn out_of_range_pages_clamp(pool: SqlitePool) {
    let app = TestApp::new(pool);
    let author = app.user("auth").await;
    for n in 0..TOTAL_POSTS {
        app.post(&author, &format!("Post number {n}"), None).await;
    }

    let past_end = app.get("/?page=99", None).await;
    assert_eq!(past_end.status, StatusCode::OK);
    assert_eq!(past_end.post_cards(), 3);

    let garbled = app.get("/?page=last", None).await;
    assert_eq!(garbled.status, StatusCode::OK);
    assert_eq!(garbled.post_cards(), 10);

    for below in ["/?page=0", "/?page=-3"] {
        let response = app.get(below, None).await;
        assert_eq!(response.status, StatusCode::OK, "GET {below}");
        assert_eq!(response.post_cards(), 3, "GET {below}");
        assert!(response.body.contains("Page 2 of 2"), "GET {below}");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn group_feed_excludes_other_groups(pool: SqlitePool) {
    let app = TestApp::new(pool);
    let author = app.user("auth").await;
    let cats = app.group("Cats", "cats").await;
    app.group("Dogs", "dogs").await;
    app.post(&author, "About cats", Some(&cats)).await;
    app.post(&author, "Ungrouped", None).await;

    let dogs_page = app.get("/group/dogs/", None).await;
    assert_eq!(dogs_page.status, StatusCode::OK);
    assert_eq!(dogs_page.post_cards(), 0);
    assert!(dogs_page.body.contains("This group has no posts yet."));

    let cats_page = app.get("/group/cats/", None).await;
    assert_eq!(cats_page.post_cards(), 1);
    assert!(!cats_page.body.contains("Ungrouped"));
}

#[sqlx::test(migrations = "./migrations")]
async fn profile_reports_author_post_count(pool: SqlitePool) {
    let app = TestApp::new(pool);
    let author = app.user("auth").await;
    let other = app.user("other").await;
    for n in 0..TOTAL_POSTS {
        app.post(&author, &format!("Post number {n}"), None).await;
    }
    app.post(&other, "Someone else", None).await;

    let profile = app.get("/profile/auth/", None).await;
    assert!(profile.body.contains("<strong>13</strong>"));
    assert!(!profile.body.contains("Someone else"));
}
