//! Score history recording
//!
//! Every scoring run is appended as an immutable [`ScoreSnapshot`] and the
//! farmer aggregate is rewritten to mirror it. Snapshots of one farmer are
//! totally ordered by `recorded_at`; a clock that moves backwards never
//! produces an out-of-order snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shared::{FarmSummary, FarmerAggregate, FarmerId, HistoryWindow, ScoreCard, ScoreSnapshot};

use crate::error::AppResult;
use crate::store::{ScoreStore, SnapshotOrder};

/// Source of "now" for snapshot timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Records scoring results and serves them back for trends
#[derive(Clone)]
pub struct ScoreHistoryService {
    store: Arc<dyn ScoreStore>,
    clock: Arc<dyn Clock>,
}

impl ScoreHistoryService {
    /// Create a recorder using the wall clock
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn ScoreStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Append a snapshot for the farmer and make the aggregate mirror it.
    ///
    /// The snapshot is written first. If the aggregate write then fails the
    /// snapshot stays and the error is returned.
    pub async fn record_evaluation(
        &self,
        farmer_id: &FarmerId,
        farm: &FarmSummary,
        scores: ScoreCard,
    ) -> AppResult<ScoreSnapshot> {
        let recorded_at = self.next_timestamp(farmer_id).await?;
        let snapshot = ScoreSnapshot::new(farmer_id.clone(), recorded_at, scores);

        self.store.insert_snapshot(&snapshot).await?;

        let aggregate = FarmerAggregate::from_snapshot(&snapshot, farm);
        if let Err(err) = self.store.upsert_aggregate(&aggregate).await {
            tracing::warn!(
                farmer_id = %farmer_id,
                snapshot_id = %snapshot.id,
                "Snapshot stored but farmer aggregate update failed: {}",
                err
            );
            return Err(err.into());
        }

        tracing::info!(
            farmer_id = %farmer_id,
            composite_score = snapshot.composite_score,
            "Recorded score snapshot"
        );

        Ok(snapshot)
    }

    /// Most recent snapshot, `None` for a farmer never evaluated
    pub async fn get_latest_score(&self, farmer_id: &FarmerId) -> AppResult<Option<ScoreSnapshot>> {
        let mut latest = self
            .store
            .list_snapshots(farmer_id, SnapshotOrder::NewestFirst, 1)
            .await?;
        Ok(latest.pop())
    }

    /// The most recent `window.limit` snapshots, oldest first
    pub async fn get_score_history(
        &self,
        farmer_id: &FarmerId,
        window: HistoryWindow,
    ) -> AppResult<Vec<ScoreSnapshot>> {
        if window.is_empty() {
            return Ok(Vec::new());
        }
        let mut history = self
            .store
            .list_snapshots(farmer_id, SnapshotOrder::NewestFirst, window.limit)
            .await?;
        history.reverse();
        Ok(history)
    }

    pub async fn get_aggregate(&self, farmer_id: &FarmerId) -> AppResult<Option<FarmerAggregate>> {
        Ok(self.store.find_aggregate(farmer_id).await?)
    }

    /// `now`, pushed forward to the latest stored timestamp if the clock lags
    async fn next_timestamp(&self, farmer_id: &FarmerId) -> AppResult<DateTime<Utc>> {
        let now = self.clock.now();
        let latest = self
            .store
            .list_snapshots(farmer_id, SnapshotOrder::NewestFirst, 1)
            .await?;

        Ok(match latest.first() {
            Some(previous) if previous.recorded_at > now => previous.recorded_at,
            _ => now,
        })
    }
}
