//! Read side: paginated listings and single-post lookups.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::pagination::{Page, PageNumber, Paginator};
use crate::application::repos::{GroupsRepo, PostFilter, PostsRepo, RepoError, UsersRepo};
use crate::domain::entities::{GroupRecord, PostView, UserRecord};

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct GroupFeed {
    pub group: GroupRecord,
    pub page: Page<PostView>,
}

#[derive(Debug, Clone)]
pub struct ProfileFeed {
    pub author: UserRecord,
    pub page: Page<PostView>,
}

#[derive(Debug, Clone)]
pub struct PostDetail {
    pub post: PostView,
    pub author_post_count: u64,
}

#[derive(Clone)]
pub struct FeedService {
    posts: Arc<dyn PostsRepo>,
    groups: Arc<dyn GroupsRepo>,
    users: Arc<dyn UsersRepo>,
}

impl FeedService {
    pub fn new(
        posts: Arc<dyn PostsRepo>,
        groups: Arc<dyn GroupsRepo>,
        users: Arc<dyn UsersRepo>,
    ) -> Self {
        Self {
            posts,
            groups,
            users,
        }
    }

    /// Every post, newest first.
    pub async fn index(&self, page: PageNumber) -> Result<Page<PostView>, FeedError> {
        self.load_page(PostFilter::All, page).await
    }

    /// Posts filed under the group with `slug`, or `None` when no such group exists.
    pub async fn group_feed(
        &self,
        slug: &str,
        page: PageNumber,
    ) -> Result<Option<GroupFeed>, FeedError> {
        let Some(group) = self.groups.find_by_slug(slug).await? else {
            debug!(target = "yatube::feed", slug, "unknown group slug");
            return Ok(None);
        };

        let page = self.load_page(PostFilter::Group(group.id), page).await?;
        Ok(Some(GroupFeed { group, page }))
    }

    /// Posts written by `username`, or `None` when no such user exists.
    pub async fn profile_feed(
        &self,
        username: &str,
        page: PageNumber,
    ) -> Result<Option<ProfileFeed>, FeedError> {
        let Some(author) = self.users.find_by_username(username).await? else {
            debug!(target = "yatube::feed", username, "unknown profile");
            return Ok(None);
        };

        let page = self.load_page(PostFilter::Author(author.id), page).await?;
        Ok(Some(ProfileFeed { author, page }))
    }

    pub async fn post_detail(&self, id: i64) -> Result<Option<PostDetail>, FeedError> {
        let Some(post) = self.posts.find_post(id).await? else {
            return Ok(None);
        };

        let author_post_count = self
            .posts
            .count_posts(PostFilter::Author(post.author.id))
            .await?;

        Ok(Some(PostDetail {
            post,
            author_post_count,
        }))
    }

    async fn load_page(
        &self,
        filter: PostFilter,
        requested: PageNumber,
    ) -> Result<Page<PostView>, FeedError> {
        let total = self.posts.count_posts(filter).await?;
        let paginator = Paginator::for_posts(total);
        let window = paginator.window(requested);
        let items = self.posts.list_posts(filter, window).await?;
        Ok(paginator.page(window, items))
    }
}
