#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;
use yatube::{
    application::repos::{
        CreateGroupParams, CreatePostParams, GroupsWriteRepo, PostsWriteRepo, UsersWriteRepo,
    },
    config::AuthSettings,
    domain::entities::{GroupRecord, PostRecord, UserRecord},
    infra::{
        db::SqliteRepositories,
        http::{HttpState, build_router},
    },
};

pub const USER_HEADER: &str = "x-remote-user";

pub struct TestApp {
    router: Router,
    pub repos: Arc<SqliteRepositories>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn post_cards(&self) -> usize {
        self.body.matches("class=\"post-card\"").count()
    }
}

impl TestApp {
    pub fn new(pool: SqlitePool) -> Self {
        let repos = Arc::new(SqliteRepositories::new(pool));
        let router = build_router(HttpState::from_repositories(
            repos.clone(),
            AuthSettings::default(),
        ));
        Self { router, repos }
    }

    pub async fn user(&self, username: &str) -> UserRecord {
        self.repos
            .create_user(username)
            .await
            .expect("seed user should insert")
    }

    pub async fn group(&self, title: &str, slug: &str) -> GroupRecord {
        self.repos
            .create_group(CreateGroupParams {
                title: title.to_string(),
                slug: slug.to_string(),
                description: format!("About {title}"),
            })
            .await
            .expect("seed group should insert")
    }

    pub async fn post(&self, author: &UserRecord, text: &str, group: Option<&GroupRecord>) -> PostRecord {
        self.repos
            .create_post(CreatePostParams {
                text: text.to_string(),
                author_id: author.id,
                group_id: group.map(|g| g.id),
            })
            .await
            .expect("seed post should insert")
    }

    pub async fn get(&self, uri: &str, username: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(username) = username {
            builder = builder.header(USER_HEADER, username);
        }
        let request = builder.body(Body::empty()).expect("request should build");
        self.send(request).await
    }

    pub async fn post_form(&self, uri: &str, username: Option<&str>, fields: &[(&str, &str)]) -> TestResponse {
        let body: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        self.post_body(uri, username, body).await
    }

    /// Send an already-encoded form body, well-formed or not.
    pub async fn post_body(&self, uri: &str, username: Option<&str>, body: impl Into<String>) -> TestResponse {
        let body = body.into();
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(username) = username {
            builder = builder.header(USER_HEADER, username);
        }
        let request = builder.body(Body::from(body)).expect("request should build");
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router should respond");
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("body should collect")
            .to_bytes();

        TestResponse {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub async fn post_count(&self) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM posts")
            .fetch_one(self.repos.pool())
            .await
            .expect("count should run")
    }
}
