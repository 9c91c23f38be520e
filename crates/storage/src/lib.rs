//! Storage Layer
//!
//! Provides SQLite persistence for posture records with repository pattern.

mod repository;
mod schema;

pub use repository::{NewPostureRecord, PostureRecord, PostureStore, StoreConfig};

use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
                StorageError::Connection(err.to_string())
            }
            other => StorageError::DatabaseError(other.to_string()),
        }
    }
}
