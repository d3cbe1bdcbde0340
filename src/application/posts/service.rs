use std::sync::Arc;

use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::repos::{
    CreatePostParams, GroupsRepo, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
};
use crate::domain::entities::{GroupRecord, PostRecord, UserRecord};

use super::form::{BoundPostForm, PostForm, PostFormOutcome};

pub const METRIC_POSTS_CREATED: &str = "yatube_posts_created_total";
pub const METRIC_POSTS_UPDATED: &str = "yatube_posts_updated_total";
pub const METRIC_POST_EDITS_REFUSED: &str = "yatube_post_edits_refused_total";

#[derive(Debug, Error)]
pub enum PostServiceError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Everything the create/edit page needs to render a form.
#[derive(Debug, Clone)]
pub struct FormContext {
    pub form: BoundPostForm,
    pub groups: Vec<GroupRecord>,
    /// Set when the form edits an existing post.
    pub post_id: Option<i64>,
}

impl FormContext {
    pub fn is_edit(&self) -> bool {
        self.post_id.is_some()
    }
}

#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(PostRecord),
    Invalid(FormContext),
}

#[derive(Debug, Clone)]
pub enum EditOutcome {
    NotFound,
    NotAuthor,
    Form(FormContext),
    Updated(PostRecord),
}

#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostsRepo>,
    writer: Arc<dyn PostsWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        writer: Arc<dyn PostsWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
    ) -> Self {
        Self {
            posts,
            writer,
            groups,
        }
    }

    pub async fn new_post_form(&self) -> Result<FormContext, PostServiceError> {
        self.context(BoundPostForm::blank(), None).await
    }

    /// Validate `form` and persist it with `author` as the post's author.
    pub async fn create_post(
        &self,
        author: &UserRecord,
        form: PostForm,
    ) -> Result<CreateOutcome, PostServiceError> {
        let valid = match form.validate(self.groups.as_ref()).await? {
            PostFormOutcome::Valid(valid) => valid,
            PostFormOutcome::Invalid(bound) => {
                return Ok(CreateOutcome::Invalid(self.context(bound, None).await?));
            }
        };

        let post = self
            .writer
            .create_post(CreatePostParams {
                text: valid.text,
                author_id: author.id,
                group_id: valid.group_id,
            })
            .await?;

        counter!(METRIC_POSTS_CREATED).increment(1);
        info!(
            target = "yatube::posts",
            post_id = post.id,
            author = %author.username,
            group_id = ?post.group_id,
            "post created"
        );

        Ok(CreateOutcome::Created(post))
    }

    /// The edit form pre-filled from the stored post.
    pub async fn edit_post_form(
        &self,
        viewer: &UserRecord,
        id: i64,
    ) -> Result<EditOutcome, PostServiceError> {
        let Some(post) = self.posts.find_post(id).await? else {
            return Ok(EditOutcome::NotFound);
        };
        if !post.is_authored_by(viewer) {
            refuse_edit(viewer, id);
            return Ok(EditOutcome::NotAuthor);
        }

        let context = self
            .context(BoundPostForm::from_post(&post), Some(post.id))
            .await?;
        Ok(EditOutcome::Form(context))
    }

    /// Apply `form` to post `id`. Only the author may edit; the author never changes.
    pub async fn update_post(
        &self,
        viewer: &UserRecord,
        id: i64,
        form: PostForm,
    ) -> Result<EditOutcome, PostServiceError> {
        let Some(post) = self.posts.find_post(id).await? else {
            return Ok(EditOutcome::NotFound);
        };
        if !post.is_authored_by(viewer) {
            refuse_edit(viewer, id);
            return Ok(EditOutcome::NotAuthor);
        }

        let valid = match form.validate(self.groups.as_ref()).await? {
            PostFormOutcome::Valid(valid) => valid,
            PostFormOutcome::Invalid(bound) => {
                return Ok(EditOutcome::Form(self.context(bound, Some(post.id)).await?));
            }
        };

        let updated = match self
            .writer
            .update_post(UpdatePostParams {
                id: post.id,
                text: valid.text,
                group_id: valid.group_id,
            })
            .await
        {
            Ok(updated) => updated,
            Err(RepoError::NotFound) => return Ok(EditOutcome::NotFound),
            Err(err) => return Err(err.into()),
        };

        counter!(METRIC_POSTS_UPDATED).increment(1);
        info!(
            target = "yatube::posts",
            post_id = updated.id,
            author = %viewer.username,
            group_id = ?updated.group_id,
            "post updated"
        );

        Ok(EditOutcome::Updated(updated))
    }

    async fn context(
        &self,
        form: BoundPostForm,
        post_id: Option<i64>,
    ) -> Result<FormContext, PostServiceError> {
        let groups = self.groups.list_groups().await?;
        Ok(FormContext {
            form,
            groups,
            post_id,
        })
    }
}

fn refuse_edit(viewer: &UserRecord, post_id: i64) {
    counter!(METRIC_POST_EDITS_REFUSED).increment(1);
    warn!(
        target = "yatube::posts",
        post_id,
        viewer = %viewer.username,
        "edit refused for non-author"
    );
}
