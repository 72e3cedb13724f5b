//! Row shapes for the SurrealDB backend.
//!
//! Converted to and from the [`crate::storage_traits`] types at the store
//! boundary so the trait surface stays backend-agnostic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage_traits::{
    ConversationId, ConversationRecord, ConversationStatus, Stage, StageRecord, StorageResult,
};

/// chrono `DateTime<Utc>` <-> SurrealDB datetime
mod surreal_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};
    use surrealdb::sql::Datetime as SurrealDatetime;

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serde::Serialize::serialize(&SurrealDatetime::from(*date), serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let sd = SurrealDatetime::deserialize(deserializer)?;
        Ok(DateTime::from(sd))
    }
}

/// Row in `conversations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationRow {
    pub conversation_id: String,
    pub intent: String,
    /// "processing" | "completed" | "failed"
    pub status: String,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "surreal_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl ConversationRow {
    pub fn new(conversation_id: String, intent: String) -> Self {
        let now = Utc::now();
        Self {
            conversation_id,
            intent,
            status: ConversationStatus::Processing.as_str().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn into_record(self) -> StorageResult<ConversationRecord> {
        Ok(ConversationRecord {
            id: ConversationId(self.conversation_id),
            intent: self.intent,
            status: self.status.parse()?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row in `conversation_stages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRow {
    pub conversation_id: String,
    pub stage: String,
    /// 1, 2 or 3; used for ordering.
    pub seq: u8,
    pub results: serde_json::Value,
    #[serde(with = "surreal_datetime")]
    pub created_at: DateTime<Utc>,
}

impl StageRow {
    pub fn new(conversation_id: String, stage: Stage, results: serde_json::Value) -> Self {
        Self {
            conversation_id,
            stage: stage.as_str().to_string(),
            seq: match stage {
                Stage::Stage1 => 1,
                Stage::Stage2 => 2,
                Stage::Stage3 => 3,
            },
            results,
            created_at: Utc::now(),
        }
    }

    pub fn into_record(self) -> StorageResult<StageRecord> {
        let stage: Stage = self.stage.parse()?;
        Ok(StageRecord {
            conversation_id: ConversationId(self.conversation_id),
            stage,
            results: self.results,
            created_at: self.created_at,
        })
    }
}
