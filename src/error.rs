use crate::database::DatabaseError;
use sqlx::Error as SqlxError;
use thiserror::Error;
use uuid::Uuid;

/// Application-level error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed input, rejected before any store access
    #[error("Validation error: {0}")]
    Validation(String),

    /// Referenced user or wallet does not exist
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Debit would drive the balance negative; atomic scope aborted
    #[error("Insufficient funds: balance {balance}, requested debit {requested}")]
    InsufficientFunds { balance: i64, requested: i64 },

    /// A record with the same unique key already exists
    #[error("Uniqueness violation: {0}")]
    Duplicate(String),

    /// Wallet creation failed after the user row was created; the
    /// compensating delete succeeded and no partial state remains.
    /// Carries the original wallet-creation failure.
    #[error("Provisioning failed for user {user_id}, rolled back: {source}")]
    Provisioning {
        user_id: Uuid,
        #[source]
        source: RepositoryError,
    },

    /// Wallet creation failed and the compensating delete also failed.
    /// The user row is orphaned and requires operator intervention;
    /// not recoverable automatically.
    #[error(
        "Provisioning rollback failed for user {user_id}: user row is orphaned \
         (wallet error: {wallet_error}; delete error: {source})"
    )]
    UnrecoverableProvisioning {
        user_id: Uuid,
        wallet_error: String,
        #[source]
        source: RepositoryError,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Check if error is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound(_))
    }

    /// True for the terminal saga failure that left an orphaned user row;
    /// callers must not map this to an ordinary client rejection.
    pub fn is_unrecoverable(&self) -> bool {
        matches!(self, AppError::UnrecoverableProvisioning { .. })
    }

    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::NotFound(_) => 404,
            AppError::Validation(_) => 400,
            AppError::InsufficientFunds { .. } => 400,
            AppError::Duplicate(_) => 409,
            AppError::Provisioning { .. } => 502,
            _ => 500,
        }
    }
}

/// Store-level error types shared by the user and ledger stores
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database query error
    #[error("Query error: {0}")]
    Query(SqlxError),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Duplicate record
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Store rejected the operation (used by in-memory fakes to inject
    /// provisioning failures)
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(msg) => AppError::NotFound(msg),
            RepositoryError::Duplicate(msg) => AppError::Duplicate(msg),
            RepositoryError::ConstraintViolation(msg) => AppError::Validation(msg),
            RepositoryError::Query(e) => AppError::Database(DatabaseError::QueryError(e)),
            RepositoryError::Unavailable(msg) => AppError::Config(msg),
        }
    }
}

impl From<SqlxError> for RepositoryError {
    fn from(err: SqlxError) -> Self {
        match &err {
            SqlxError::RowNotFound => RepositoryError::NotFound("Record not found".to_string()),
            SqlxError::Database(db_err) => {
                // Decode common PostgreSQL error codes
                let code = db_err.code().map(|c| c.to_string());
                if code.as_deref() == Some("23505") {
                    // Unique violation
                    RepositoryError::Duplicate(db_err.message().to_string())
                } else if code.as_deref() == Some("23503") || code.as_deref() == Some("23514") {
                    // Foreign key / check constraint violation
                    RepositoryError::ConstraintViolation(db_err.message().to_string())
                } else {
                    RepositoryError::Query(err)
                }
            }
            _ => RepositoryError::Query(err),
        }
    }
}
