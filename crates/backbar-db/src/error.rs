//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (apps/server) ← HTTP status + JSON body                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use backbar_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate code, invoice number, ...).
    #[error("{entity} '{value}' already exists")]
    Duplicate { entity: String, value: String },

    /// Could not open or connect to the database.
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failure on startup.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Business rule violation surfaced from backbar-core.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Any other sqlx error.
    #[error("Database error: {0}")]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        // Surface UNIQUE violations as Duplicate so the API can answer 409.
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.message().contains("UNIQUE constraint failed") {
                return DbError::Duplicate {
                    entity: "record".to_string(),
                    value: db_err.message().to_string(),
                };
            }
        }
        DbError::Sqlx(err)
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl DbError {
    /// Shorthand for a not-found error.
    pub fn not_found(entity: &str, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.to_string(),
            id: id.into(),
        }
    }

    /// Shorthand for a duplicate-value error with proper context.
    pub fn duplicate(entity: &str, value: impl Into<String>) -> Self {
        DbError::Duplicate {
            entity: entity.to_string(),
            value: value.into(),
        }
    }
}

/// Convenience type alias for Results with DbError.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = DbError::not_found("Store", "S042");
        assert_eq!(err.to_string(), "Store not found: S042");
    }

    #[test]
    fn test_duplicate_message() {
        let err = DbError::duplicate("Item", "IT001");
        assert_eq!(err.to_string(), "Item 'IT001' already exists");
    }
}
