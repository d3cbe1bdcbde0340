use std::sync::Arc;

use axum::{
    Router,
    extract::{Form, Path, Query, State, rejection::FormRejection},
    http::{StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    application::{
        error::HttpError,
        feed::FeedService,
        pagination::PageNumber,
        posts::{CreateOutcome, EditOutcome, FormContext, PostForm, PostService},
        repos::{GroupsRepo, PostsRepo, PostsWriteRepo, UsersRepo},
    },
    config::AuthSettings,
    infra::db::SqliteRepositories,
    presentation::views::{
        FeedView, GroupPageView, GroupTemplate, IndexTemplate, IndexView, LayoutChrome,
        LayoutContext, PostDetailTemplate, PostDetailView, PostFormTemplate, PostFormView,
        ProfileTemplate, ProfileView, post_href, profile_href, render_not_found_response,
        render_template_response,
    },
};

use super::{
    auth::{Viewer, found, login_redirect, resolve_viewer},
    db_health_response,
    middleware::{log_responses, set_request_context},
};

#[derive(Clone)]
pub struct HttpState {
    pub feed: Arc<FeedService>,
    pub posts: Arc<PostService>,
    pub users: Arc<dyn UsersRepo>,
    pub db: Arc<SqliteRepositories>,
    pub auth: Arc<AuthSettings>,
}

impl HttpState {
    /// Wire the feed and post services over a single SQLite pool.
    pub fn from_repositories(db: Arc<SqliteRepositories>, auth: AuthSettings) -> Self {
        let posts_repo: Arc<dyn PostsRepo> = db.clone();
        let posts_write_repo: Arc<dyn PostsWriteRepo> = db.clone();
        let groups_repo: Arc<dyn GroupsRepo> = db.clone();
        let users: Arc<dyn UsersRepo> = db.clone();

        let feed = Arc::new(FeedService::new(
            posts_repo.clone(),
            groups_repo.clone(),
            users.clone(),
        ));
        let posts = Arc::new(PostService::new(posts_repo, posts_write_repo, groups_repo));

        Self {
            feed,
            posts,
            users,
            db,
            auth: Arc::new(auth),
        }
    }

    fn chrome(&self, viewer: &Viewer) -> LayoutChrome {
        LayoutChrome::new(viewer.username(), &self.auth.login_url)
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
        .route("/posts/{post_id}/", get(post_detail))
        .route("/create/", get(post_create_form).post(post_create))
        .route("/posts/{post_id}/edit/", get(post_edit_form).post(post_edit))
        .route("/_health/db", get(public_health))
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_viewer))
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    fn number(&self) -> PageNumber {
        PageNumber::parse(self.page.as_deref())
    }
}

/// Post ids arrive as raw path text; anything non-numeric is simply not found.
fn parse_post_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id > 0)
}

async fn index(
    State(state): State<HttpState>,
    viewer: Viewer,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = state.chrome(&viewer);

    match state.feed.index(query.number()).await {
        Ok(page) => {
            let content = IndexView {
                feed: FeedView::new("/", page),
            };
            let view = LayoutContext::new(chrome, content);
            render_template_response(IndexTemplate { view }, StatusCode::OK)
        }
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn group_posts(
    State(state): State<HttpState>,
    viewer: Viewer,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = state.chrome(&viewer);

    match state.feed.group_feed(&slug, query.number()).await {
        Ok(Some(feed)) => {
            let view = LayoutContext::new(chrome, GroupPageView::from(feed));
            render_template_response(GroupTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn profile(
    State(state): State<HttpState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Response {
    let chrome = state.chrome(&viewer);

    match state.feed.profile_feed(&username, query.number()).await {
        Ok(Some(profile)) => {
            let view = LayoutContext::new(chrome, ProfileView::from(profile));
            render_template_response(ProfileTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_detail(
    State(state): State<HttpState>,
    viewer: Viewer,
    Path(raw_id): Path<String>,
) -> Response {
    let chrome = state.chrome(&viewer);
    let Some(id) = parse_post_id(&raw_id) else {
        return render_not_found_response(chrome);
    };

    match state.feed.post_detail(id).await {
        Ok(Some(detail)) => {
            let content = PostDetailView::new(detail, viewer.user().map(|user| user.id));
            let view = LayoutContext::new(chrome, content);
            render_template_response(PostDetailTemplate { view }, StatusCode::OK)
        }
        Ok(None) => render_not_found_response(chrome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_create_form(State(state): State<HttpState>, viewer: Viewer, uri: Uri) -> Response {
    if viewer.user().is_none() {
        return login_redirect(&state.auth.login_url, &uri);
    }

    match state.posts.new_post_form().await {
        Ok(context) => render_post_form(state.chrome(&viewer), context),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_create(
    State(state): State<HttpState>,
    viewer: Viewer,
    uri: Uri,
    form: Result<Form<PostForm>, FormRejection>,
) -> Response {
    let Some(author) = viewer.user() else {
        return login_redirect(&state.auth.login_url, &uri);
    };

    match state.posts.create_post(author, bind_form(form)).await {
        Ok(CreateOutcome::Created(_)) => found(profile_href(&author.username)),
        Ok(CreateOutcome::Invalid(context)) => render_post_form(state.chrome(&viewer), context),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_edit_form(
    State(state): State<HttpState>,
    viewer: Viewer,
    uri: Uri,
    Path(raw_id): Path<String>,
) -> Response {
    let Some(editor) = viewer.user() else {
        return login_redirect(&state.auth.login_url, &uri);
    };
    let Some(id) = parse_post_id(&raw_id) else {
        return render_not_found_response(state.chrome(&viewer));
    };

    match state.posts.edit_post_form(editor, id).await {
        Ok(outcome) => edit_outcome_response(&state, &viewer, id, outcome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

async fn post_edit(
    State(state): State<HttpState>,
    viewer: Viewer,
    uri: Uri,
    Path(raw_id): Path<String>,
    form: Result<Form<PostForm>, FormRejection>,
) -> Response {
    let Some(editor) = viewer.user() else {
        return login_redirect(&state.auth.login_url, &uri);
    };
    let Some(id) = parse_post_id(&raw_id) else {
        return render_not_found_response(state.chrome(&viewer));
    };

    // Authorship is checked by the service before the form is looked at.
    match state.posts.update_post(editor, id, bind_form(form)).await {
        Ok(outcome) => edit_outcome_response(&state, &viewer, id, outcome),
        Err(err) => HttpError::from(err).into_response(),
    }
}

fn edit_outcome_response(
    state: &HttpState,
    viewer: &Viewer,
    id: i64,
    outcome: EditOutcome,
) -> Response {
    match outcome {
        EditOutcome::NotFound => render_not_found_response(state.chrome(viewer)),
        EditOutcome::NotAuthor => found(post_href(id)),
        EditOutcome::Form(context) => render_post_form(state.chrome(viewer), context),
        EditOutcome::Updated(post) => found(post_href(post.id)),
    }
}

fn render_post_form(chrome: LayoutChrome, context: FormContext) -> Response {
    let view = LayoutContext::new(chrome, PostFormView::from(context));
    render_template_response(PostFormTemplate { view }, StatusCode::OK)
}

/// A body that cannot be decoded binds as an empty form, so it fails validation
/// like any other blank submission.
fn bind_form(form: Result<Form<PostForm>, FormRejection>) -> PostForm {
    match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            debug!(
                target = "yatube::posts",
                error = %rejection,
                "unreadable post form body"
            );
            PostForm::default()
        }
    }
}

async fn public_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

async fn not_found(State(state): State<HttpState>, viewer: Viewer) -> Response {
    render_not_found_response(state.chrome(&viewer))
}
