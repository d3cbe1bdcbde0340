//! Viewer resolution from the trusted authentication header.

use std::convert::Infallible;

use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{
        Request, StatusCode, Uri,
        header::LOCATION,
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::application::error::repo_error_to_http;
use crate::domain::entities::UserRecord;

use super::public::HttpState;

/// The requester: a known user or anonymous.
#[derive(Debug, Clone, Default)]
pub enum Viewer {
    #[default]
    Anonymous,
    User(UserRecord),
}

impl Viewer {
    pub fn user(&self) -> Option<&UserRecord> {
        match self {
            Self::Anonymous => None,
            Self::User(user) => Some(user),
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.user().map(|user| user.username.as_str())
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Viewer>().cloned().unwrap_or_default())
    }
}

/// Resolve the username in `auth.user_header` to a stored user.
///
/// Unknown names and malformed header values leave the request anonymous.
pub async fn resolve_viewer(
    State(state): State<HttpState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let username = request
        .headers()
        .get(&state.auth.user_header)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let viewer = match username {
        None => Viewer::Anonymous,
        Some(username) => match state.users.find_by_username(&username).await {
            Ok(Some(user)) => Viewer::User(user),
            Ok(None) => {
                debug!(
                    target = "yatube::http::auth",
                    username = %username,
                    "unknown user in auth header"
                );
                Viewer::Anonymous
            }
            Err(err) => {
                return repo_error_to_http("infra::http::auth::resolve_viewer", err)
                    .into_response();
            }
        },
    };

    request.extensions_mut().insert(viewer);
    next.run(request).await
}

/// `302 Found` pointing at `location`.
pub fn found(location: impl Into<String>) -> Response {
    (StatusCode::FOUND, [(LOCATION, location.into())]).into_response()
}

/// Send an anonymous writer to the login page, remembering where they were going.
pub fn login_redirect(login_url: &str, uri: &Uri) -> Response {
    found(login_location(login_url, uri))
}

fn login_location(login_url: &str, uri: &Uri) -> String {
    let target = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let next: String = url::form_urlencoded::byte_serialize(target.as_bytes())
        .collect::<String>()
        .replace("%2F", "/");
    let separator = if login_url.contains('?') { '&' } else { '?' };
    format!("{login_url}{separator}next={next}")
}
