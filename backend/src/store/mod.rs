//! Persistent store for score history
//!
//! The recorder only talks to the [`ScoreStore`] trait. Production uses
//! [`PgScoreStore`]; tests and local tooling use [`MemoryScoreStore`].

pub mod memory;
pub mod postgres;

pub use memory::MemoryScoreStore;
pub use postgres::PgScoreStore;

use shared::{FarmerAggregate, FarmerId, ScoreSnapshot};
use thiserror::Error;

/// Failure reported by a store backend
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Sort order for snapshot queries, by `recorded_at` then insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotOrder {
    OldestFirst,
    NewestFirst,
}

/// Storage operations needed by the score history recorder
#[axum::async_trait]
pub trait ScoreStore: Send + Sync {
    /// Append one snapshot. Snapshots are never updated afterwards.
    async fn insert_snapshot(&self, snapshot: &ScoreSnapshot) -> Result<(), StoreError>;

    /// Create or overwrite the farmer aggregate, returning the stored row
    async fn upsert_aggregate(
        &self,
        aggregate: &FarmerAggregate,
    ) -> Result<FarmerAggregate, StoreError>;

    async fn find_aggregate(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Option<FarmerAggregate>, StoreError>;

    /// Up to `limit` snapshots of one farmer in the given order
    async fn list_snapshots(
        &self,
        farmer_id: &FarmerId,
        order: SnapshotOrder,
        limit: u32,
    ) -> Result<Vec<ScoreSnapshot>, StoreError>;
}
