//! User persistence.
//!
//! [`UserRepository`] is the only way services touch stored users. Two
//! implementations exist:
//!
//! - [`PgUserRepository`]: hand-written SQL over a `sqlx` PostgreSQL pool
//! - [`InMemoryUserRepository`]: a lock-guarded map for tests and local runs
//!
//! Both enforce username uniqueness at insert time, so a registration that
//! races past [`UserRepository::exists_by_username`] still fails with
//! [`RepositoryError::DuplicateUsername`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use axum::http::StatusCode;
use thiserror::Error;
use uuid::Uuid;
use zendriver_core::AppError;
use zendriver_models::User;

pub use memory::InMemoryUserRepository;
pub use postgres::PgUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("user {0} not found")]
    NotFound(Uuid),

    /// The store could not be reached (connection, pool or TLS failure).
    #[error("database unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl RepositoryError {
    pub fn is_io(&self) -> bool {
        matches!(self, RepositoryError::Unavailable(_))
    }
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => RepositoryError::Unavailable(err),
            other => RepositoryError::Database(other),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateUsername(username) => {
                AppError::conflict(format!("Username '{}' is already taken", username))
            }
            RepositoryError::NotFound(id) => AppError::not_found(format!("User {} not found", id)),
            err @ RepositoryError::Unavailable(_) => {
                AppError::internal(err).with_status(StatusCode::SERVICE_UNAVAILABLE)
            }
            err @ RepositoryError::Database(_) => AppError::internal(err),
        }
    }
}

/// Persistence gateway for [`User`] records.
///
/// The unit of work is a single call: every mutation is committed before the
/// method returns.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All users, in no particular order.
    async fn list(&self) -> Result<Vec<User>, RepositoryError>;

    /// Inserts a new user. Fails with `DuplicateUsername` if the username is
    /// taken, even when a preceding existence check passed.
    async fn add(&self, user: &User) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepositoryError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError>;

    async fn exists_by_username(&self, username: &str) -> Result<bool, RepositoryError>;

    /// Persists the mutable fields of `user` (names, password hash, role).
    /// The username is never rewritten.
    async fn update(&self, user: &User) -> Result<(), RepositoryError>;

    async fn remove(&self, user: &User) -> Result<(), RepositoryError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use zendriver_core::ErrorKind;

    #[test]
    fn test_pool_timeout_is_io() {
        let err = RepositoryError::from(sqlx::Error::PoolTimedOut);
        assert!(err.is_io());

        let app_err = AppError::from(err);
        assert_eq!(app_err.kind, ErrorKind::Internal);
        assert_eq!(app_err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn test_row_not_found_is_not_io() {
        let err = RepositoryError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_io());
    }

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err = AppError::from(RepositoryError::DuplicateUsername("alice".to_string()));
        assert_eq!(err.kind, ErrorKind::Conflict);
        assert!(err.public_message().contains("alice"));
    }

    #[test]
    fn test_not_found_maps_to_not_found() {
        let err = AppError::from(RepositoryError::NotFound(Uuid::new_v4()));
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
