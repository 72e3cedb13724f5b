//! vibe-store: persistence for council conversations
//!
//! ## Layer 0 - Data/Persistence
//!
//! A write sink for pipeline runs: one conversation row per run with a
//! `processing -> completed | failed` status, and one row per stage result.
//!
//! ## Key Components
//!
//! - [`CouncilStore`]: async, backend-agnostic trait
//! - [`SurrealCouncilStore`]: SurrealDB implementation (`mem://` or remote)
//! - [`fakes::MemoryCouncilStore`]: in-memory fake for tests

mod error;
pub mod fakes;
mod migrations;
mod schema;
pub mod storage_traits;
mod surreal_store;

pub use error::StorageError;
pub use schema::{ConversationRow, StageRow};
pub use storage_traits::{
    ConversationId, ConversationRecord, ConversationStatus, CouncilStore, Stage, StageRecord,
    StorageResult,
};
pub use surreal_store::SurrealCouncilStore;
