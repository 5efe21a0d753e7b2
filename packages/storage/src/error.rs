// ABOUTME: Storage error type shared by the store, schema and row mappers
// ABOUTME: Wraps sqlx and IO failures and recognises uniqueness violations

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Database schema version {found} is newer than supported version {supported}")]
    UnsupportedSchemaVersion { found: i64, supported: i64 },
}

impl StorageError {
    /// True when the failure is a UNIQUE constraint violation
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Sqlx(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
