//! In-memory fake for [`CouncilStore`] (testing only)

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StorageError;
use crate::storage_traits::*;

#[derive(Debug, Default)]
struct Inner {
    conversations: HashMap<String, ConversationRecord>,
    stages: Vec<StageRecord>,
}

/// In-memory store. Can be told to fail stage inserts to exercise the
/// pipeline's tolerance of persistence errors.
#[derive(Debug, Default)]
pub struct MemoryCouncilStore {
    inner: Mutex<Inner>,
    fail_inserts: bool,
}

impl MemoryCouncilStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `insert_stage` always fails with a backend error.
    pub fn failing_inserts() -> Self {
        Self {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn conversation_count(&self) -> usize {
        self.inner.lock().unwrap().conversations.len()
    }
}

#[async_trait]
impl CouncilStore for MemoryCouncilStore {
    async fn create_conversation(&self, intent: &str) -> StorageResult<ConversationId> {
        let id = ConversationId::new();
        let now = Utc::now();
        let record = ConversationRecord {
            id: id.clone(),
            intent: intent.to_string(),
            status: ConversationStatus::Processing,
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.conversations.insert(id.0.clone(), record);
        Ok(id)
    }

    async fn insert_stage(
        &self,
        id: &ConversationId,
        stage: Stage,
        results: serde_json::Value,
    ) -> StorageResult<()> {
        if self.fail_inserts {
            return Err(StorageError::Backend("insert rejected".to_string()));
        }
        let mut inner = self.inner.lock().unwrap();
        if !inner.conversations.contains_key(id.as_str()) {
            return Err(StorageError::ConversationNotFound { id: id.0.clone() });
        }
        inner.stages.push(StageRecord {
            conversation_id: id.clone(),
            stage,
            results,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn set_status(
        &self,
        id: &ConversationId,
        status: ConversationStatus,
    ) -> StorageResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .conversations
            .get_mut(id.as_str())
            .ok_or_else(|| StorageError::ConversationNotFound { id: id.0.clone() })?;
        if !record.status.can_become(status) {
            return Err(StorageError::InvalidStatusTransition {
                id: id.0.clone(),
                current: record.status,
                requested: status,
            });
        }
        record.status = status;
        record.updated_at = Utc::now();
        Ok(())
    }

    async fn get_conversation(&self, id: &ConversationId) -> StorageResult<ConversationRecord> {
        let inner = self.inner.lock().unwrap();
        inner
            .conversations
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StorageError::ConversationNotFound { id: id.0.clone() })
    }

    async fn list_stages(&self, id: &ConversationId) -> StorageResult<Vec<StageRecord>> {
        let inner = self.inner.lock().unwrap();
        if !inner.conversations.contains_key(id.as_str()) {
            return Err(StorageError::ConversationNotFound { id: id.0.clone() });
        }
        let mut rows: Vec<StageRecord> = inner
            .stages
            .iter()
            .filter(|row| &row.conversation_id == id)
            .cloned()
            .collect();
        rows.sort_by_key(|row| row.stage);
        Ok(rows)
    }
}
