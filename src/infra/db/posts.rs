use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite};
use time::OffsetDateTime;

use crate::{
    application::pagination::PageWindow,
    application::repos::{
        CreatePostParams, PostFilter, PostsRepo, PostsWriteRepo, RepoError, UpdatePostParams,
    },
    domain::entities::{AuthorRef, GroupRef, PostRecord, PostView},
};

use super::{SqliteRepositories, map_sqlx_error};

const POST_VIEW_COLUMNS: &str = "p.id, p.text, p.pub_date, \
    p.author_id, u.username AS author_username, \
    p.group_id, g.title AS group_title, g.slug AS group_slug";

const POST_VIEW_FROM: &str = " FROM posts p \
    INNER JOIN users u ON u.id = p.author_id \
    LEFT JOIN \"groups\" g ON g.id = p.group_id";

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    text: String,
    pub_date: OffsetDateTime,
    author_id: i64,
    group_id: Option<i64>,
}

impl From<PostRow> for PostRecord {
    fn from(row: PostRow) -> Self {
        Self {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author_id: row.author_id,
            group_id: row.group_id,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PostViewRow {
    id: i64,
    text: String,
    pub_date: OffsetDateTime,
    author_id: i64,
    author_username: String,
    group_id: Option<i64>,
    group_title: Option<String>,
    group_slug: Option<String>,
}

impl From<PostViewRow> for PostView {
    fn from(row: PostViewRow) -> Self {
        let group = match (row.group_id, row.group_title, row.group_slug) {
            (Some(id), Some(title), Some(slug)) => Some(GroupRef { id, title, slug }),
            _ => None,
        };

        Self {
            id: row.id,
            text: row.text,
            pub_date: row.pub_date,
            author: AuthorRef {
                id: row.author_id,
                username: row.author_username,
            },
            group,
        }
    }
}

impl SqliteRepositories {
    fn apply_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: PostFilter) {
        match filter {
            PostFilter::All => {}
            PostFilter::Group(group_id) => {
                qb.push(" WHERE p.group_id = ");
                qb.push_bind(group_id);
            }
            PostFilter::Author(author_id) => {
                qb.push(" WHERE p.author_id = ");
                qb.push_bind(author_id);
            }
        }
    }
}

#[async_trait]
impl PostsRepo for SqliteRepositories {
    async fn list_posts(
        &self,
        filter: PostFilter,
        window: PageWindow,
    ) -> Result<Vec<PostView>, RepoError> {
        let offset = i64::try_from(window.offset)
            .map_err(|_| RepoError::from_persistence("page offset exceeds supported range"))?;

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT ");
        qb.push(POST_VIEW_COLUMNS);
        qb.push(POST_VIEW_FROM);
        Self::apply_filter(&mut qb, filter);
        qb.push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ");
        qb.push_bind(i64::from(window.limit));
        qb.push(" OFFSET ");
        qb.push_bind(offset);

        let rows = qb
            .build_query_as::<PostViewRow>()
            .fetch_all(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(rows.into_iter().map(PostView::from).collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
        Self::apply_filter(&mut qb, filter);

        let count: i64 = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Self::convert_count(count)
    }

    async fn find_post(&self, id: i64) -> Result<Option<PostView>, RepoError> {
        let sql = format!("SELECT {POST_VIEW_COLUMNS}{POST_VIEW_FROM} WHERE p.id = ?");
        let row = sqlx::query_as::<_, PostViewRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool())
            .await
            .map_err(RepoError::from_persistence)?;

        Ok(row.map(PostView::from))
    }
}

#[async_trait]
impl PostsWriteRepo for SqliteRepositories {
    async fn create_post(&self, params: CreatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (text, author_id, group_id)
            VALUES (?, ?, ?)
            RETURNING id, text, pub_date, author_id, group_id
            "#,
        )
        .bind(params.text)
        .bind(params.author_id)
        .bind(params.group_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.into())
    }

    async fn update_post(&self, params: UpdatePostParams) -> Result<PostRecord, RepoError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET text = ?, group_id = ?
            WHERE id = ?
            RETURNING id, text, pub_date, author_id, group_id
            "#,
        )
        .bind(params.text)
        .bind(params.group_id)
        .bind(params.id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        row.map(PostRecord::from).ok_or(RepoError::NotFound)
    }
}
