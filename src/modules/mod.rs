//! Modules layer - Infrastructure components for external integrations
//!
//! Contains the two halves of the remote store client: the object store
//! holding uploaded blobs and the relational table holding their metadata.

pub mod storage;
pub mod table;

use thiserror::Error;

/// Failure reported by a remote store call
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Table error: {0}")]
    Table(String),
}

impl StoreError {
    /// Message without the layer prefix, for user-facing error text
    pub fn detail(&self) -> String {
        match self {
            StoreError::Storage(msg) | StoreError::Table(msg) => msg.clone(),
            StoreError::Database(e) => e.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
