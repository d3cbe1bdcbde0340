//! The post form: two named fields, validated explicitly.

use serde::Deserialize;

use crate::application::repos::{GroupsRepo, RepoError};
use crate::domain::entities::PostView;

pub const REQUIRED_MESSAGE: &str = "This field is required.";
pub const INVALID_CHOICE_MESSAGE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// Raw `application/x-www-form-urlencoded` submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostForm {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
}

/// Field-level messages; empty vectors mean the field is clean.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub text: Vec<&'static str>,
    pub group: Vec<&'static str>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.group.is_empty()
    }
}

/// A form ready for rendering: the values to echo back plus any errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundPostForm {
    pub text: String,
    pub group: Option<i64>,
    pub errors: FieldErrors,
}

impl BoundPostForm {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn from_post(post: &PostView) -> Self {
        Self {
            text: post.text.clone(),
            group: post.group.as_ref().map(|g| g.id),
            errors: FieldErrors::default(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Cleaned values. The author is not part of the form; callers attach it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidPost {
    pub text: String,
    pub group_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostFormOutcome {
    Valid(ValidPost),
    Invalid(BoundPostForm),
}

enum GroupChoice {
    Empty,
    Id(i64),
    Malformed,
}

fn parse_group(raw: Option<&str>) -> GroupChoice {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => GroupChoice::Empty,
        Some(value) => value
            .parse::<i64>()
            .map(GroupChoice::Id)
            .unwrap_or(GroupChoice::Malformed),
    }
}

impl PostForm {
    /// Check both fields; the group must reference an existing row.
    pub async fn validate(self, groups: &dyn GroupsRepo) -> Result<PostFormOutcome, RepoError> {
        let text = self.text.trim().to_string();
        let mut errors = FieldErrors::default();

        if text.is_empty() {
            errors.text.push(REQUIRED_MESSAGE);
        }

        let group_id = match parse_group(self.group.as_deref()) {
            GroupChoice::Empty => None,
            GroupChoice::Id(id) => {
                if groups.find_by_id(id).await?.is_none() {
                    errors.group.push(INVALID_CHOICE_MESSAGE);
                }
                Some(id)
            }
            GroupChoice::Malformed => {
                errors.group.push(INVALID_CHOICE_MESSAGE);
                None
            }
        };

        if errors.is_empty() {
            return Ok(PostFormOutcome::Valid(ValidPost { text, group_id }));
        }

        Ok(PostFormOutcome::Invalid(BoundPostForm {
            text: self.text,
            group: group_id,
            errors,
        }))
    }
}
