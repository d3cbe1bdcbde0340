use sqlx::error::ErrorKind;

use crate::application::repos::RepoError;

/// Translate a driver error into the repository vocabulary.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => match db.kind() {
            ErrorKind::UniqueViolation => RepoError::Duplicate {
                constraint: unique_constraint(db.message()),
            },
            ErrorKind::ForeignKeyViolation => RepoError::InvalidInput {
                message: db.message().to_string(),
            },
            ErrorKind::CheckViolation | ErrorKind::NotNullViolation => RepoError::Integrity {
                message: db.message().to_string(),
            },
            _ if db.message().contains("database is locked") => RepoError::Timeout,
            _ => RepoError::from_persistence(db.message()),
        },
        other => RepoError::from_persistence(other),
    }
}

/// SQLite reports `UNIQUE constraint failed: table.column`; keep the column list.
fn unique_constraint(message: &str) -> String {
    message
        .split_once("failed:")
        .map(|(_, columns)| columns.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
