//! Storage trait for council conversations.
//!
//! The pipeline treats the store as a write sink: it creates a conversation,
//! appends one record per stage and finally sets the status. The read
//! methods exist for callers that inspect a finished run.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Unique identifier of one pipeline invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        ConversationId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversation lifecycle: `processing` until the pipeline finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    Processing,
    Completed,
    Failed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Processing => "processing",
            ConversationStatus::Completed => "completed",
            ConversationStatus::Failed => "failed",
        }
    }

    /// `processing -> completed | failed`; terminal statuses are final.
    pub fn can_become(self, next: ConversationStatus) -> bool {
        self == ConversationStatus::Processing && next != ConversationStatus::Processing
    }
}

impl fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationStatus {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(ConversationStatus::Processing),
            "completed" => Ok(ConversationStatus::Completed),
            "failed" => Ok(ConversationStatus::Failed),
            other => Err(StorageError::Backend(format!(
                "unknown conversation status: {other}"
            ))),
        }
    }
}

/// Which pipeline stage a persisted result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Stage1,
    Stage2,
    Stage3,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Stage1 => "stage1",
            Stage::Stage2 => "stage2",
            Stage::Stage3 => "stage3",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "stage1" => Ok(Stage::Stage1),
            "stage2" => Ok(Stage::Stage2),
            "stage3" => Ok(Stage::Stage3),
            other => Err(StorageError::Backend(format!("unknown stage: {other}"))),
        }
    }
}

/// A conversation as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: ConversationId,
    pub intent: String,
    pub status: ConversationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One persisted `{conversationId, stage, results}` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    pub conversation_id: ConversationId,
    pub stage: Stage,
    pub results: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Append-only sink for council runs.
#[async_trait]
pub trait CouncilStore: Send + Sync {
    /// Create a conversation in `processing` status.
    async fn create_conversation(&self, intent: &str) -> StorageResult<ConversationId>;

    /// Append the results of one stage.
    async fn insert_stage(
        &self,
        id: &ConversationId,
        stage: Stage,
        results: serde_json::Value,
    ) -> StorageResult<()>;

    /// Move a `processing` conversation to a terminal status.
    async fn set_status(&self, id: &ConversationId, status: ConversationStatus)
        -> StorageResult<()>;

    async fn get_conversation(&self, id: &ConversationId) -> StorageResult<ConversationRecord>;

    /// Stage rows for a conversation, in stage order.
    async fn list_stages(&self, id: &ConversationId) -> StorageResult<Vec<StageRecord>>;
}
