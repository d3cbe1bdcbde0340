//! Slug helpers for group identifiers.
//!
//! Group slugs appear verbatim in `/group/{slug}/`, so they are restricted to
//! ASCII letters, digits, hyphens and underscores. Titles in any script are
//! transliterated by the `slug` crate before slugification.

use std::future::Future;

use slug::slugify;
use thiserror::Error;

const MAX_SUFFIX_ATTEMPTS: usize = 32;
pub const MAX_SLUG_LEN: usize = 50;

/// Errors that can occur while generating or validating a slug.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug source text is empty")]
    EmptyInput,
    #[error("failed to derive slug from `{input}`")]
    Unrepresentable { input: String },
    #[error("`{input}` is not a valid slug")]
    Malformed { input: String },
    #[error("exhausted attempts to find a unique slug for `{base}`")]
    Exhausted { base: String },
}

/// Errors that can occur while generating a slug via an async uniqueness check.
#[derive(Debug, Error)]
pub enum SlugAsyncError<E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error(transparent)]
    Predicate(E),
}

/// Derive a base slug from the provided human-readable text.
pub fn derive_slug(input: &str) -> Result<String, SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let mut candidate = slugify(input);
    if candidate.len() > MAX_SLUG_LEN {
        candidate.truncate(MAX_SLUG_LEN);
        while candidate.ends_with('-') {
            candidate.pop();
        }
    }

    if candidate.is_empty() {
        return Err(SlugError::Unrepresentable {
            input: input.to_string(),
        });
    }

    Ok(candidate)
}

/// Check an operator-supplied slug without rewriting it.
pub fn validate_slug(input: &str) -> Result<&str, SlugError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(SlugError::EmptyInput);
    }

    let well_formed = trimmed.len() <= MAX_SLUG_LEN
        && trimmed
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_');

    if !well_formed {
        return Err(SlugError::Malformed {
            input: input.to_string(),
        });
    }

    Ok(trimmed)
}

/// Produce a slug that does not collide according to the supplied async predicate.
///
/// The predicate must return `true` when the candidate is free. Collisions are
/// retried with a monotonic counter suffix (`-2`, `-3`, …).
pub async fn generate_unique_slug_async<F, Fut, E>(
    input: &str,
    mut is_unique: F,
) -> Result<String, SlugAsyncError<E>>
where
    F: FnMut(&str) -> Fut,
    Fut: Future<Output = Result<bool, E>>,
    E: std::error::Error + Send + Sync + 'static,
{
    let base = derive_slug(input)?;

    if is_unique(&base).await.map_err(SlugAsyncError::Predicate)? {
        return Ok(base);
    }

    for attempt in 2..=MAX_SUFFIX_ATTEMPTS + 1 {
        let candidate = format!("{base}-{attempt}");
        if is_unique(&candidate)
            .await
            .map_err(SlugAsyncError::Predicate)?
        {
            return Ok(candidate);
        }
    }

    Err(SlugAsyncError::Slug(SlugError::Exhausted { base }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derive_slug_lowercases_and_hyphenates() {
        let slug = derive_slug("Leo Tolstoy & Friends").expect("slug");
        assert_eq!(slug, "leo-tolstoy-friends");
    }

    #[test]
    fn derive_slug_rejects_blank_titles() {
        assert_eq!(derive_slug("   "), Err(SlugError::EmptyInput));
    }

    #[test]
    fn derive_slug_caps_length() {
        let title = "word ".repeat(40);
        let slug = derive_slug(&title).expect("slug");
        assert!(slug.len() <= MAX_SLUG_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn validate_slug_accepts_url_safe_values() {
        assert_eq!(validate_slug(" test-slug_2 "), Ok("test-slug_2"));
    }

    #[test]
    fn validate_slug_rejects_path_characters() {
        let err = validate_slug("bad/slug").expect_err("slash rejected");
        assert!(matches!(err, SlugError::Malformed { .. }));
    }

    #[tokio::test]
    async fn generate_unique_slug_async_appends_counter() {
        use std::sync::{Arc, Mutex};

        let existing = Arc::new(Mutex::new(vec!["cats".to_string()]));

        let slug = generate_unique_slug_async("Cats", |candidate| {
            let existing = existing.clone();
            let candidate = candidate.to_string();
            async move {
                let mut guard = existing.lock().expect("slug registry lock");
                if guard.contains(&candidate) {
                    Ok::<bool, std::convert::Infallible>(false)
                } else {
                    guard.push(candidate);
                    Ok::<bool, std::convert::Infallible>(true)
                }
            }
        })
        .await
        .expect("unique slug");

        assert_eq!(slug, "cats-2");
    }

    #[tokio::test]
    async fn generate_unique_slug_async_exhausts() {
        let result = generate_unique_slug_async("Example", |_| async {
            Ok::<bool, std::convert::Infallible>(false)
        })
        .await;

        assert!(matches!(
            result,
            Err(SlugAsyncError::Slug(SlugError::Exhausted { .. }))
        ));
    }
}
