//! Administrative account management behind the `users` and `groups` commands.

use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::application::repos::{
    CreateGroupParams, GroupsRepo, GroupsWriteRepo, RepoError, UsersRepo, UsersWriteRepo,
};
use crate::domain::entities::{GroupRecord, UserRecord};
use crate::domain::error::DomainError;
use crate::domain::slug::{SlugAsyncError, SlugError, generate_unique_slug_async, validate_slug};

const MAX_USERNAME_LEN: usize = 150;
const MAX_GROUP_TITLE_LEN: usize = 200;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("{kind} `{value}` already exists")]
    Duplicate { kind: &'static str, value: String },
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct CreateGroupCommand {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
}

#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UsersRepo>,
    users_writer: Arc<dyn UsersWriteRepo>,
    groups: Arc<dyn GroupsRepo>,
    groups_writer: Arc<dyn GroupsWriteRepo>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UsersRepo>,
        users_writer: Arc<dyn UsersWriteRepo>,
        groups: Arc<dyn GroupsRepo>,
        groups_writer: Arc<dyn GroupsWriteRepo>,
    ) -> Self {
        Self {
            users,
            users_writer,
            groups,
            groups_writer,
        }
    }

    pub async fn create_user(&self, username: &str) -> Result<UserRecord, AccountError> {
        let username = normalize_username(username)?;

        if self.users.find_by_username(username).await?.is_some() {
            return Err(duplicate("user", username));
        }

        let user = match self.users_writer.create_user(username).await {
            Ok(user) => user,
            Err(RepoError::Duplicate { .. }) => return Err(duplicate("user", username)),
            Err(err) => return Err(err.into()),
        };

        info!(
            target = "yatube::accounts",
            user_id = user.id,
            username = %user.username,
            "user created"
        );
        Ok(user)
    }

    /// Create a group. Without an explicit slug one is derived from the title
    /// and suffixed until unique.
    pub async fn create_group(
        &self,
        command: CreateGroupCommand,
    ) -> Result<GroupRecord, AccountError> {
        let title = command.title.trim();
        if title.is_empty() {
            return Err(DomainError::validation("title", "must not be empty").into());
        }
        if title.chars().count() > MAX_GROUP_TITLE_LEN {
            return Err(DomainError::validation(
                "title",
                format!("must be at most {MAX_GROUP_TITLE_LEN} characters"),
            )
            .into());
        }

        let slug = match command.slug.as_deref() {
            Some(raw) => {
                let slug = validate_slug(raw)?;
                if self.groups.find_by_slug(slug).await?.is_some() {
                    return Err(duplicate("group slug", slug));
                }
                slug.to_string()
            }
            None => self.unique_slug(title).await?,
        };

        let params = CreateGroupParams {
            title: title.to_string(),
            slug: slug.clone(),
            description: command.description.trim().to_string(),
        };

        let group = match self.groups_writer.create_group(params).await {
            Ok(group) => group,
            Err(RepoError::Duplicate { .. }) => return Err(duplicate("group slug", &slug)),
            Err(err) => return Err(err.into()),
        };

        info!(
            target = "yatube::accounts",
            group_id = group.id,
            slug = %group.slug,
            "group created"
        );
        Ok(group)
    }

    async fn unique_slug(&self, title: &str) -> Result<String, AccountError> {
        let groups = self.groups.clone();
        generate_unique_slug_async(title, move |candidate| {
            let groups = groups.clone();
            let candidate = candidate.to_string();
            async move {
                groups
                    .find_by_slug(&candidate)
                    .await
                    .map(|existing| existing.is_none())
            }
        })
        .await
        .map_err(|err| match err {
            SlugAsyncError::Slug(err) => AccountError::Slug(err),
            SlugAsyncError::Predicate(err) => AccountError::Repo(err),
        })
    }
}

fn duplicate(kind: &'static str, value: &str) -> AccountError {
    AccountError::Duplicate {
        kind,
        value: value.to_string(),
    }
}

fn normalize_username(raw: &str) -> Result<&str, DomainError> {
    let username = raw.trim();
    if username.is_empty() {
        return Err(DomainError::validation("username", "must not be empty"));
    }
    if username.chars().count() > MAX_USERNAME_LEN {
        return Err(DomainError::validation(
            "username",
            format!("must be at most {MAX_USERNAME_LEN} characters"),
        ));
    }
    if !username
        .chars()
        .all(|ch| ch.is_alphanumeric() || matches!(ch, '@' | '.' | '+' | '-' | '_'))
    {
        return Err(DomainError::validation(
            "username",
            "may contain only letters, digits and @/./+/-/_",
        ));
    }
    Ok(username)
}
