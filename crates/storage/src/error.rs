use thiserror::Error;

use crate::services::BalancingError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Balancing error: {0}")]
    Balancing(#[from] BalancingError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Maps unique/foreign-key violations to `ConstraintViolation` with the given message.
    pub(crate) fn with_constraint_message(self, message: &str) -> Self {
        if self.is_unique_violation() || self.is_foreign_key_violation() {
            StorageError::ConstraintViolation(message.to_string())
        } else {
            self
        }
    }
}
