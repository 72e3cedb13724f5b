//! Error types for vibe-store

use thiserror::Error;

use crate::storage_traits::ConversationStatus;

/// Errors surfaced by [`crate::CouncilStore`] implementations.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Schema setup failed: {0}")]
    SchemaSetup(String),

    #[error("conversation not found: {id}")]
    ConversationNotFound { id: String },

    #[error("conversation {id} is {current}; cannot move to {requested}")]
    InvalidStatusTransition {
        id: String,
        current: ConversationStatus,
        requested: ConversationStatus,
    },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<surrealdb::Error> for StorageError {
    fn from(err: surrealdb::Error) -> Self {
        StorageError::Backend(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
