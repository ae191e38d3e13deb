//! In-memory score store

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use shared::{FarmerAggregate, FarmerId, ScoreSnapshot};
use tokio::sync::RwLock;

use super::{ScoreStore, SnapshotOrder, StoreError};

/// Score store kept in process memory.
///
/// Writes can be made to fail on demand so callers can observe how partial
/// failures surface.
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    snapshots: RwLock<HashMap<FarmerId, Vec<ScoreSnapshot>>>,
    aggregates: RwLock<HashMap<FarmerId, FarmerAggregate>>,
    fail_snapshot_writes: AtomicBool,
    fail_aggregate_writes: AtomicBool,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_snapshot_writes(&self, fail: bool) {
        self.fail_snapshot_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_aggregate_writes(&self, fail: bool) {
        self.fail_aggregate_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of snapshots stored for a farmer
    pub async fn snapshot_count(&self, farmer_id: &FarmerId) -> usize {
        self.snapshots
            .read()
            .await
            .get(farmer_id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[axum::async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn insert_snapshot(&self, snapshot: &ScoreSnapshot) -> Result<(), StoreError> {
        if self.fail_snapshot_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("snapshot writes disabled".into()));
        }

        self.snapshots
            .write()
            .await
            .entry(snapshot.farmer_id.clone())
            .or_default()
            .push(snapshot.clone());
        Ok(())
    }

    async fn upsert_aggregate(
        &self,
        aggregate: &FarmerAggregate,
    ) -> Result<FarmerAggregate, StoreError> {
        if self.fail_aggregate_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("aggregate writes disabled".into()));
        }

        self.aggregates
            .write()
            .await
            .insert(aggregate.farmer_id.clone(), aggregate.clone());
        Ok(aggregate.clone())
    }

    async fn find_aggregate(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Option<FarmerAggregate>, StoreError> {
        Ok(self.aggregates.read().await.get(farmer_id).cloned())
    }

    async fn list_snapshots(
        &self,
        farmer_id: &FarmerId,
        order: SnapshotOrder,
        limit: u32,
    ) -> Result<Vec<ScoreSnapshot>, StoreError> {
        let mut snapshots = self
            .snapshots
            .read()
            .await
            .get(farmer_id)
            .cloned()
            .unwrap_or_default();

        // Stable sort keeps insertion order among equal timestamps
        snapshots.sort_by_key(|s| s.recorded_at);
        if order == SnapshotOrder::NewestFirst {
            snapshots.reverse();
        }
        snapshots.truncate(limit as usize);
        Ok(snapshots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use shared::ScoreCard;

    fn card(composite: i32) -> ScoreCard {
        ScoreCard {
            composite_score: composite,
            soil_health_score: 50,
            weather_risk_score: 50,
            past_yields_score: 50,
        }
    }

    #[tokio::test]
    async fn test_list_orders_by_recorded_at() {
        let store = MemoryScoreStore::new();
        let farmer = FarmerId::new("farmer-a");
        let base = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();

        // Inserted out of order
        for (offset, score) in [(2, 30), (0, 10), (1, 20)] {
            let snapshot =
                ScoreSnapshot::new(farmer.clone(), base + Duration::hours(offset), card(score));
            store.insert_snapshot(&snapshot).await.unwrap();
        }

        let oldest = store
            .list_snapshots(&farmer, SnapshotOrder::OldestFirst, 10)
            .await
            .unwrap();
        let scores: Vec<i32> = oldest.iter().map(|s| s.composite_score).collect();
        assert_eq!(scores, vec![10, 20, 30]);

        let newest = store
            .list_snapshots(&farmer, SnapshotOrder::NewestFirst, 2)
            .await
            .unwrap();
        let scores: Vec<i32> = newest.iter().map(|s| s.composite_score).collect();
        assert_eq!(scores, vec![30, 20]);
    }

    #[tokio::test]
    async fn test_farmers_are_isolated() {
        let store = MemoryScoreStore::new();
        let a = FarmerId::new("farmer-a");
        let b = FarmerId::new("farmer-b");
        store
            .insert_snapshot(&ScoreSnapshot::new(a.clone(), Utc::now(), card(70)))
            .await
            .unwrap();

        assert_eq!(store.snapshot_count(&a).await, 1);
        assert!(store
            .list_snapshots(&b, SnapshotOrder::OldestFirst, 12)
            .await
            .unwrap()
            .is_empty());
        assert!(store.find_aggregate(&b).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemoryScoreStore::new();
        store.set_fail_snapshot_writes(true);
        let snapshot = ScoreSnapshot::new(FarmerId::new("farmer-a"), Utc::now(), card(1));
        assert!(matches!(
            store.insert_snapshot(&snapshot).await,
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.snapshot_count(&snapshot.farmer_id).await, 0);
    }
}
