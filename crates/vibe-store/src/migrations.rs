//! SurrealDB schema initialization. Idempotent.

use surrealdb::engine::any::Any;
use surrealdb::Surreal;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::storage_traits::StorageResult;

pub async fn init_schema(db: &Surreal<Any>) -> StorageResult<()> {
    info!("Initializing vibe council schema");
    init_conversations_table(db).await?;
    init_stages_table(db).await?;
    Ok(())
}

/// ```text
/// TABLE conversations {
///   conversation_id: STRING (unique)
///   intent:          STRING
///   status:          STRING (processing | completed | failed)
///   created_at:      DATETIME
///   updated_at:      DATETIME
/// }
/// ```
async fn init_conversations_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing conversations table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS conversations AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update FULL
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_conversation_id ON TABLE conversations COLUMNS conversation_id UNIQUE;
        DEFINE INDEX IF NOT EXISTS idx_status ON TABLE conversations COLUMNS status;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StorageError::SchemaSetup(e.to_string()))?;
    Ok(())
}

/// Append-only: stage rows are never updated or deleted.
///
/// ```text
/// TABLE conversation_stages {
///   conversation_id: STRING
///   stage:           STRING (stage1 | stage2 | stage3)
///   seq:             INT
///   results:         OBJECT | ARRAY
///   created_at:      DATETIME
/// }
/// ```
async fn init_stages_table(db: &Surreal<Any>) -> StorageResult<()> {
    debug!("Initializing conversation_stages table");

    let sql = r#"
        DEFINE TABLE IF NOT EXISTS conversation_stages AS
            SCHEMALESS
            PERMISSIONS
                FOR create FULL
                FOR read FULL
                FOR update NONE
                FOR delete NONE;

        DEFINE INDEX IF NOT EXISTS idx_stage_conversation ON TABLE conversation_stages COLUMNS conversation_id, seq;
    "#;

    db.query(sql)
        .await
        .map_err(|e| StorageError::SchemaSetup(e.to_string()))?;
    Ok(())
}
