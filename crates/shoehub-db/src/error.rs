//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)      CoreError / ValidationError           │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  DbError (this module) ← classified by constraint / lock message       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError::kind() → ErrorKind                                           │
//! │    Validation │ NotFound │ Conflict │ Integrity │ Internal              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Presentation layer picks the message / status to show                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use shoehub_core::{CoreError, ValidationError};
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Order references a customer or product id that doesn't exist
    /// - Update/delete of a missing row (`rows_affected() == 0`)
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Duplicate customer email or category name
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A concurrent writer won; the operation may succeed if retried.
    ///
    /// ## When This Occurs
    /// - Two orders raced for the same order number
    /// - SQLite reported the database as busy/locked
    /// - A second sale for an order that already has one
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The operation would orphan or destroy dependent data.
    ///
    /// ## When This Occurs
    /// - Restrict-mode delete of a customer that has orders
    /// - Deleting a product referenced by order items
    /// - Deleting a category that still has products
    #[error("Integrity violation: {0}")]
    Integrity(String),

    /// Foreign key constraint violation reported by SQLite.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Input failed a field-level rule.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A domain rule other than validation failed.
    #[error("{0}")]
    Core(CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Coarse error category for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    Integrity,
    Internal,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Maps this error onto the error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DbError::Validation(_) => ErrorKind::Validation,
            DbError::Core(CoreError::Validation(_)) => ErrorKind::Validation,
            DbError::Core(CoreError::InvalidTransition { .. }) => ErrorKind::Validation,
            DbError::Core(CoreError::InvalidOrderNumber(_)) => ErrorKind::Validation,
            DbError::Core(_) => ErrorKind::Internal,
            DbError::NotFound { .. } => ErrorKind::NotFound,
            DbError::UniqueViolation { .. } | DbError::Conflict(_) => ErrorKind::Conflict,
            DbError::Integrity(_) | DbError::ForeignKeyViolation { .. } => ErrorKind::Integrity,
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the same operation may succeed if simply run again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DbError::Conflict(_))
    }

    /// Returns the validation error carried by this error, if any.
    pub fn validation(&self) -> Option<&ValidationError> {
        match self {
            DbError::Validation(v) | DbError::Core(CoreError::Validation(v)) => Some(v),
            _ => None,
        }
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => DbError::Validation(v),
            other => DbError::Core(other),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → by message:
///     "UNIQUE constraint failed: t.c"    → UniqueViolation { field: "t.c" }
///     "FOREIGN KEY constraint failed"    → ForeignKeyViolation
///     "database is locked" / busy        → Conflict
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked")
                    || msg.contains("database table is locked")
                    || msg.contains("busy")
                {
                    DbError::Conflict(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Internal(format!("column {} could not be decoded: {}", index, source))
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Internal(format!("JSON column: {}", err))
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
