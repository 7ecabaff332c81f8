//! Shared database types for the chatbot
//!
//! This module provides common database-related types used by domain repositories.

use crate::error::Error;
use thiserror::Error;

/// PostgreSQL SQLSTATE for `foreign_key_violation`
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Database-specific error types
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Referenced record does not exist: {0}")]
    ForeignKey(String),

    #[error("Database connection error: {0}")]
    Connection(sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        let is_fk_violation = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == FOREIGN_KEY_VIOLATION);

        if is_fk_violation {
            RepositoryError::ForeignKey(err.to_string())
        } else {
            RepositoryError::Connection(err)
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => Error::NotFound(what),
            RepositoryError::ForeignKey(what) => Error::NotFound(what),
            RepositoryError::Connection(e) => Error::Database(e),
        }
    }
}
