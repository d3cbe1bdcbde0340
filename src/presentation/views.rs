use crate::application::error::{ErrorReport, HttpError};
use crate::application::feed::{GroupFeed, PostDetail, ProfileFeed};
use crate::application::pagination::Page;
use crate::application::posts::FormContext;
use crate::domain::entities::PostView;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339, macros::format_description};

const SITE_TITLE: &str = "Yatube";
const TITLE_PREVIEW_CHARS: usize = 30;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_not_found_response(chrome: LayoutChrome) -> Response {
    let view = LayoutContext::new(chrome, ErrorPageView::not_found());
    let mut response = render_template_response(ErrorTemplate { view }, StatusCode::NOT_FOUND);
    ErrorReport::from_message(
        "presentation::views::render_not_found_response",
        StatusCode::NOT_FOUND,
        "Resource not found",
    )
    .attach(&mut response);
    response
}

/// Link to the signed-in viewer's own profile.
#[derive(Clone)]
pub struct ViewerLink {
    pub username: String,
    pub href: String,
}

/// Header state shared by every page: who is looking and where to log in.
#[derive(Clone)]
pub struct LayoutChrome {
    pub site_title: String,
    pub viewer: Option<ViewerLink>,
    pub login_href: String,
}

impl LayoutChrome {
    pub fn new(viewer: Option<&str>, login_url: &str) -> Self {
        Self {
            site_title: SITE_TITLE.to_string(),
            viewer: viewer.map(|username| ViewerLink {
                username: username.to_string(),
                href: profile_href(username),
            }),
            login_href: login_url.to_string(),
        }
    }
}

pub struct LayoutContext<T> {
    pub site_title: String,
    pub page_title: String,
    pub viewer: Option<ViewerLink>,
    pub login_href: String,
    pub content: T,
}

impl<T: PageTitle> LayoutContext<T> {
    pub fn new(chrome: LayoutChrome, content: T) -> Self {
        Self {
            page_title: content.page_title(),
            site_title: chrome.site_title,
            viewer: chrome.viewer,
            login_href: chrome.login_href,
            content,
        }
    }
}

/// The `<title>` text of a page body.
pub trait PageTitle {
    fn page_title(&self) -> String;
}

#[derive(Clone)]
pub struct GroupLink {
    pub title: String,
    pub href: String,
}

#[derive(Clone)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub author: String,
    pub author_href: String,
    pub detail_href: String,
    pub iso_date: String,
    pub published: String,
    pub group: Option<GroupLink>,
}

impl From<PostView> for PostCard {
    fn from(post: PostView) -> Self {
        Self {
            id: post.id,
            author_href: profile_href(&post.author.username),
            detail_href: post_href(post.id),
            iso_date: iso_date(post.pub_date),
            published: human_date(post.pub_date),
            group: post.group.map(|group| GroupLink {
                href: group_href(&group.slug),
                title: group.title,
            }),
            author: post.author.username,
            text: post.text,
        }
    }
}

/// Links to the first, previous, next and last pages of a listing.
#[derive(Clone)]
pub struct PageNav {
    pub number: u32,
    pub num_pages: u32,
    pub first_href: Option<String>,
    pub previous_href: Option<String>,
    pub next_href: Option<String>,
    pub last_href: Option<String>,
}

impl PageNav {
    pub fn new<T>(base: &str, page: &Page<T>) -> Self {
        let link = |number: u32| format!("{base}?page={number}");
        Self {
            number: page.number,
            num_pages: page.num_pages,
            first_href: page.has_previous().then(|| link(1)),
            previous_href: page.previous_number().map(link),
            next_href: page.next_number().map(link),
            last_href: page.has_next().then(|| link(page.num_pages)),
        }
    }

    pub fn is_paginated(&self) -> bool {
        self.num_pages > 1
    }
}

#[derive(Clone)]
pub struct FeedView {
    pub cards: Vec<PostCard>,
    pub nav: PageNav,
}

impl FeedView {
    pub fn new(base: &str, page: Page<PostView>) -> Self {
        let nav = PageNav::new(base, &page);
        Self {
            cards: page.items.into_iter().map(PostCard::from).collect(),
            nav,
        }
    }
}

pub struct IndexView {
    pub feed: FeedView,
}

impl PageTitle for IndexView {
    fn page_title(&self) -> String {
        "Latest updates".to_string()
    }
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: LayoutContext<IndexView>,
}

pub struct GroupPageView {
    pub title: String,
    pub description: String,
    pub feed: FeedView,
}

impl From<GroupFeed> for GroupPageView {
    fn from(feed: GroupFeed) -> Self {
        Self {
            feed: FeedView::new(&group_href(&feed.group.slug), feed.page),
            title: feed.group.title,
            description: feed.group.description,
        }
    }
}

impl PageTitle for GroupPageView {
    fn page_title(&self) -> String {
        format!("Posts in {}", self.title)
    }
}

#[derive(Template)]
#[template(path = "group_list.html")]
pub struct GroupTemplate {
    pub view: LayoutContext<GroupPageView>,
}

pub struct ProfileView {
    pub username: String,
    pub joined: String,
    pub post_count: u64,
    pub feed: FeedView,
}

impl From<ProfileFeed> for ProfileView {
    fn from(profile: ProfileFeed) -> Self {
        Self {
            post_count: profile.page.total,
            feed: FeedView::new(&profile_href(&profile.author.username), profile.page),
            joined: human_date(profile.author.created_at),
            username: profile.author.username,
        }
    }
}

impl PageTitle for ProfileView {
    fn page_title(&self) -> String {
        format!("Profile of {}", self.username)
    }
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub view: LayoutContext<ProfileView>,
}

pub struct PostDetailView {
    pub card: PostCard,
    pub author_post_count: u64,
    pub edit_href: Option<String>,
}

impl PostDetailView {
    /// `viewer_id` decides whether the edit link is offered.
    pub fn new(detail: PostDetail, viewer_id: Option<i64>) -> Self {
        let edit_href =
            (viewer_id == Some(detail.post.author.id)).then(|| post_edit_href(detail.post.id));
        Self {
            card: PostCard::from(detail.post),
            author_post_count: detail.author_post_count,
            edit_href,
        }
    }
}

impl PageTitle for PostDetailView {
    fn page_title(&self) -> String {
        format!("Post {}", truncate_chars(&self.card.text, TITLE_PREVIEW_CHARS))
    }
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate {
    pub view: LayoutContext<PostDetailView>,
}

#[derive(Clone)]
pub struct GroupOption {
    pub id: i64,
    pub title: String,
    pub selected: bool,
}

pub struct PostFormView {
    pub is_edit: bool,
    pub action: String,
    pub text: String,
    pub no_group_selected: bool,
    pub groups: Vec<GroupOption>,
    pub text_errors: Vec<&'static str>,
    pub group_errors: Vec<&'static str>,
}

impl From<FormContext> for PostFormView {
    fn from(context: FormContext) -> Self {
        let selected = context.form.group;
        let action = match context.post_id {
            Some(id) => post_edit_href(id),
            None => "/create/".to_string(),
        };
        Self {
            is_edit: context.is_edit(),
            action,
            no_group_selected: selected.is_none(),
            groups: context
                .groups
                .into_iter()
                .map(|group| GroupOption {
                    selected: Some(group.id) == selected,
                    id: group.id,
                    title: group.title,
                })
                .collect(),
            text: context.form.text,
            text_errors: context.form.errors.text,
            group_errors: context.form.errors.group,
        }
    }
}

impl PageTitle for PostFormView {
    fn page_title(&self) -> String {
        if self.is_edit {
            "Edit post".to_string()
        } else {
            "New post".to_string()
        }
    }
}

#[derive(Template)]
#[template(path = "post_create.html")]
pub struct PostFormTemplate {
    pub view: LayoutContext<PostFormView>,
}

pub struct ErrorAction {
    pub href: String,
    pub label: String,
}

impl ErrorAction {
    pub fn home() -> Self {
        Self {
            href: "/".to_string(),
            label: "Back to home".to_string(),
        }
    }
}

pub struct ErrorPageView {
    pub status: u16,
    pub title: String,
    pub message: String,
    pub primary_action: Option<ErrorAction>,
}

impl ErrorPageView {
    pub fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND.as_u16(),
            title: "Page not found".to_string(),
            message: "The page you requested does not exist.".to_string(),
            primary_action: Some(ErrorAction::home()),
        }
    }
}

impl PageTitle for ErrorPageView {
    fn page_title(&self) -> String {
        self.title.clone()
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub view: LayoutContext<ErrorPageView>,
}

pub fn profile_href(username: &str) -> String {
    format!("/profile/{}/", encode_segment(username))
}

pub fn group_href(slug: &str) -> String {
    format!("/group/{}/", encode_segment(slug))
}

pub fn post_href(id: i64) -> String {
    format!("/posts/{id}/")
}

pub fn post_edit_href(id: i64) -> String {
    format!("/posts/{id}/edit/")
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

fn iso_date(value: OffsetDateTime) -> String {
    value.format(&Rfc3339).unwrap_or_default()
}

fn human_date(value: OffsetDateTime) -> String {
    value
        .format(format_description!("[day] [month repr:short] [year] [hour]:[minute]"))
        .unwrap_or_default()
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit.saturating_sub(1)).collect();
    truncated.push('…');
    truncated
}
