//! In-memory repository doubles shared by the service unit tests.

use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::pagination::PageWindow;
use crate::application::repos::{
    CreateGroupParams, CreatePostParams, GroupsRepo, GroupsWriteRepo, PostFilter, PostsRepo,
    PostsWriteRepo, RepoError, UpdatePostParams, UsersRepo, UsersWriteRepo,
};
use crate::domain::entities::{AuthorRef, GroupRecord, GroupRef, PostRecord, PostView, UserRecord};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    groups: Vec<GroupRecord>,
    posts: Vec<PostRecord>,
}

#[derive(Default)]
pub(crate) struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("in-memory store lock")
    }

    pub(crate) fn add_user(&self, username: &str) -> UserRecord {
        let mut tables = self.tables();
        let user = UserRecord {
            id: tables.users.len() as i64 + 1,
            username: username.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        tables.users.push(user.clone());
        user
    }

    pub(crate) fn add_group(&self, title: &str, slug: &str) -> GroupRecord {
        let mut tables = self.tables();
        let group = GroupRecord {
            id: tables.groups.len() as i64 + 1,
            title: title.to_string(),
            slug: slug.to_string(),
            description: String::new(),
        };
        tables.groups.push(group.clone());
        group
    }

    pub(crate) fn add_post(&self, text: &str, author_id: i64, group_id: Option<i64>) -> PostRecord {
        let mut tables = self.tables();
        let post = PostRecord {
            id: tables.posts.len() as i64 + 1,
            text: text.to_string(),
            pub_date: OffsetDateTime::now_utc(),
            author_id,
            group_id,
        };
        tables.posts.push(post.clone());
        post
    }

    pub(crate) fn post(&self, id: i64) -> Option<PostRecord> {
        self.tables().posts.iter().find(|p| p.id == id).cloned()
    }

    pub(crate) fn post_count(&self) -> usize {
        self.tables().posts.len()
    }
}

fn matches(filter: PostFilter, post: &PostRecord) -> bool {
    match filter {
        PostFilter::All => true,
        PostFilter::Group(id) => post.group_id == Some(id),
        PostFilter::Author(id) => post.author_id == id,
    }
}

fn view(tables: &Tables, post: &PostRecord) -> PostView {
    let author = tables
        .users
        .iter()
        .find(|u| u.id == post.author_id)
        .map(|u| AuthorRef {
            id: u.id,
            username: u.username.clone(),
        })
        .expect("post author exists");
    let group = post.group_id.and_then(|gid| {
        tables.groups.iter().find(|g| g.id == gid).map(|g| GroupRef {
            id: g.id,
            title: g.title.clone(),
            slug: g.slug.clone(),
        })
    });

    PostView {
        id: post.id,
        text: post.text.clone(),
        pub_date: post.pub_date,
        author,
        group,
    }
}

#[async_trait]
impl PostsRepo for InMemoryStore {
    async fn list_posts(
        &self,
        filter: PostFilter,
        window: PageWindow,
    ) -> Result<Vec<PostView>, RepoError> {
        let tables = self.tables();
        Ok(tables
            .posts
            .iter()
            .rev()
            .filter(|post| matches(filter, post))
            .skip(window.offset as usize)
            .take(window.limit as usize)
            .map(|post| view(&tables, post))
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let tables = self.tables();
        Ok(tables.posts.iter().filter(|p| matches(filter, p)).count() as u64)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostView>, RepoError> {
        let tables = self.tables();
        Ok(tables
            .posts
            .iter()
            .find(|p| p.id == id)
            .map(|post| view(&tables, post)))
    }
}

#[async_trait]
impl PostsWriteRepo for InMemoryStore {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        Ok(self.add_post(&params.text, params.author_id, params.group_id))
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let mut tables = self.tables();
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == params.id)
            .ok_or(RepoError::NotFound)?;
        post.text = params.text;
        post.group_id = params.group_id;
        Ok(post.clone())
    }
}

#[async_trait]
impl GroupsRepo for InMemoryStore {
    async fn list_groups(&self) -> Result<Vec<GroupRecord>, RepoError> {
        Ok(self.tables().groups.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self.tables().groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<GroupRecord>, RepoError> {
        Ok(self.tables().groups.iter().find(|g| g.slug == slug).cloned())
    }
}

#[async_trait]
impl GroupsWriteRepo for InMemoryStore {
    async fn create_group(&self, params: CreateGroupParams) -> Result<GroupRecord, RepoError> {
        if self.tables().groups.iter().any(|g| g.slug == params.slug) {
            return Err(RepoError::Duplicate {
                constraint: "groups.slug".to_string(),
            });
        }
        let mut group = self.add_group(&params.title, &params.slug);
        group.description = params.description;
        if let Some(stored) = self.tables().groups.iter_mut().find(|g| g.id == group.id) {
            stored.description = group.description.clone();
        }
        Ok(group)
    }
}

#[async_trait]
impl UsersRepo for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, RepoError> {
        Ok(self
            .tables()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }
}

#[async_trait]
impl UsersWriteRepo for InMemoryStore {
    async fn create_user(&self, username: &str) -> Result<UserRecord, RepoError> {
        if self.tables().users.iter().any(|u| u.username == username) {
            return Err(RepoError::Duplicate {
                constraint: "users.username".to_string(),
            });
        }
        Ok(self.add_user(username))
    }
}
