//! Write side: creating and editing posts.

pub mod form;
mod service;

pub use form::{BoundPostForm, FieldErrors, PostForm};
pub use service::{
    CreateOutcome, EditOutcome, FormContext, METRIC_POST_EDITS_REFUSED, METRIC_POSTS_CREATED,
    METRIC_POSTS_UPDATED, PostService, PostServiceError,
};
