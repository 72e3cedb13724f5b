//! SurrealDB-backed [`CouncilStore`].

use async_trait::async_trait;
use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::migrations;
use crate::schema::{ConversationRow, StageRow};
use crate::storage_traits::{
    ConversationId, ConversationRecord, ConversationStatus, CouncilStore, Stage, StageRecord,
    StorageResult,
};

const NAMESPACE: &str = "vibe";
const DATABASE: &str = "council";

pub struct SurrealCouncilStore {
    db: Surreal<Any>,
}

impl SurrealCouncilStore {
    /// In-memory instance (`mem://`), schema initialised.
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect("mem://").await
    }

    /// Connect to any SurrealDB endpoint (`mem://`, `surrealkv://path`,
    /// `ws://host:port`, ...).
    pub async fn connect(url: &str) -> StorageResult<Self> {
        let db = surrealdb::engine::any::connect(url)
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to connect to {url}: {e}")))?;

        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| StorageError::Connection(e.to_string()))?;

        migrations::init_schema(&db).await?;
        info!(url, "SurrealCouncilStore connected");
        Ok(Self { db })
    }

    /// `SURREALDB_URL` if set, in-memory otherwise.
    pub async fn from_env() -> StorageResult<Self> {
        match std::env::var("SURREALDB_URL") {
            Ok(url) if !url.trim().is_empty() => Self::connect(url.trim()).await,
            _ => Self::in_memory().await,
        }
    }

    async fn fetch_conversation(&self, id: &ConversationId) -> StorageResult<ConversationRow> {
        let mut res = self
            .db
            .query("SELECT * FROM conversations WHERE conversation_id = $cid")
            .bind(("cid", id.0.clone()))
            .await?;

        let rows: Vec<ConversationRow> = res.take(0)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StorageError::ConversationNotFound { id: id.0.clone() })
    }
}

#[async_trait]
impl CouncilStore for SurrealCouncilStore {
    async fn create_conversation(&self, intent: &str) -> StorageResult<ConversationId> {
        let id = ConversationId::new();
        debug!(conversation_id = %id, "creating conversation");

        let _created: Option<ConversationRow> = self
            .db
            .create("conversations")
            .content(ConversationRow::new(id.0.clone(), intent.to_string()))
            .await?;

        Ok(id)
    }

    async fn insert_stage(
        &self,
        id: &ConversationId,
        stage: Stage,
        results: serde_json::Value,
    ) -> StorageResult<()> {
        self.fetch_conversation(id).await?;

        let _created: Option<StageRow> = self
            .db
            .create("conversation_stages")
            .content(StageRow::new(id.0.clone(), stage, results))
            .await?;

        debug!(conversation_id = %id, %stage, "stage persisted");
        Ok(())
    }

    async fn set_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> StorageResult<()> {
        let row = self.fetch_conversation(id).await?;
        let current: ConversationStatus = row.status.parse()?;
        if !current.can_become(status) {
            return Err(StorageError::InvalidStatusTransition {
                id: id.0.clone(),
                current,
                requested: status,
            });
        }

        self.db
            .query(
                "UPDATE conversations SET status = $status, updated_at = time::now() \
                 WHERE conversation_id = $cid",
            )
            .bind(("status", status.as_str().to_string()))
            .bind(("cid", id.0.clone()))
            .await?;

        Ok(())
    }

    async fn get_conversation(&self, id: &ConversationId) -> StorageResult<ConversationRecord> {
        self.fetch_conversation(id).await?.into_record()
    }

    async fn list_stages(&self, id: &ConversationId) -> StorageResult<Vec<StageRecord>> {
        self.fetch_conversation(id).await?;

        let mut res = self
            .db
            .query("SELECT * FROM conversation_stages WHERE conversation_id = $cid ORDER BY seq ASC")
            .bind(("cid", id.0.clone()))
            .await?;

        let rows: Vec<StageRow> = res.take(0)?;
        rows.into_iter().map(StageRow::into_record).collect()
    }
}
