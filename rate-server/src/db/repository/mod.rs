//! Repository Module
//!
//! CRUD operations over the SQLite tables. Repositories are free
//! functions on `&SqlitePool`; the `*_tx` variants take a live
//! connection so callers can compose them inside one transaction.

pub mod admin_user;
pub mod country;
pub mod country_zone;
pub mod quote_lang;
pub mod rate;
pub mod ratecard_file;

use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err
            && db.is_unique_violation()
        {
            return RepoError::Duplicate(db.message().to_string());
        }
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;
