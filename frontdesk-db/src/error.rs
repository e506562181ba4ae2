//! Error types for frontdesk-db
//!
//! Constraint violations (duplicate username, duplicate department name,
//! missing foreign key, duplicate bill link) are expected outcomes: they
//! surface as `Conflict` with a human-readable message, never a panic.
//! Connectivity failures stay in the `Sqlx` variant.

use thiserror::Error;

use crate::models::ValidationError;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown username and wrong password are deliberately
    /// indistinguishable to the caller.
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("password hash error: {0}")]
    Password(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DbError {
    pub fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

/// True when the underlying store reported a UNIQUE constraint violation.
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}

/// True when the underlying store reported a FOREIGN KEY violation.
pub(crate) fn is_fk_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_foreign_key_violation())
}
