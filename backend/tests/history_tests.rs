//! Score history integration tests
//!
//! Exercises the recorder against the in-memory store:
//! - snapshots are ordered by recording time
//! - the farmer aggregate mirrors the newest snapshot
//! - storage failures surface to the caller

use std::sync::{Arc, Mutex};

use agriscore_backend::error::AppError;
use agriscore_backend::services::{Clock, EvaluationService, ScoreHistoryService};
use agriscore_backend::store::{MemoryScoreStore, ScoreStore};
use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;
use shared::{EvaluationForm, FarmSummary, FarmerId, HistoryWindow, Region, ScoreCard};

/// Clock the test moves by hand
struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn starting_at(start: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(start),
        })
    }

    fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap() = at;
    }

    fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn card(composite: i32) -> ScoreCard {
    ScoreCard {
        composite_score: composite,
        soil_health_score: 90,
        weather_risk_score: 60,
        past_yields_score: 45,
    }
}

fn farm() -> FarmSummary {
    FarmSummary {
        farm_size_acres: Decimal::from(40),
        region: Region::South,
    }
}

fn recorder(store: Arc<MemoryScoreStore>, clock: Arc<ManualClock>) -> ScoreHistoryService {
    ScoreHistoryService::with_clock(store, clock)
}

// ============================================================================
// Ordering
// ============================================================================

#[tokio::test]
async fn test_history_is_oldest_first() {
    let store = Arc::new(MemoryScoreStore::new());
    let clock = ManualClock::starting_at(start());
    let history = recorder(store, clock.clone());
    let farmer = FarmerId::new("farmer-1");

    for score in [40, 55, 70] {
        history.record_evaluation(&farmer, &farm(), card(score)).await.unwrap();
        clock.advance(Duration::days(30));
    }

    let snapshots = history
        .get_score_history(&farmer, HistoryWindow::default())
        .await
        .unwrap();
    let scores: Vec<i32> = snapshots.iter().map(|s| s.composite_score).collect();
    assert_eq!(scores, vec![40, 55, 70]);
    assert!(snapshots.windows(2).all(|w| w[0].recorded_at < w[1].recorded_at));

    let latest = history.get_latest_score(&farmer).await.unwrap().unwrap();
    assert_eq!(latest.composite_score, 70);
}

#[tokio::test]
async fn test_history_window_keeps_most_recent() {
    let store = Arc::new(MemoryScoreStore::new());
    let clock = ManualClock::starting_at(start());
    let history = recorder(store, clock.clone());
    let farmer = FarmerId::new("farmer-1");

    for score in 1..=15 {
        history.record_evaluation(&farmer, &farm(), card(score)).await.unwrap();
        clock.advance(Duration::hours(1));
    }

    let snapshots = history
        .get_score_history(&farmer, HistoryWindow::new(12))
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 12);
    assert_eq!(snapshots.first().map(|s| s.composite_score), Some(4));
    assert_eq!(snapshots.last().map(|s| s.composite_score), Some(15));
}

#[tokio::test]
async fn test_history_zero_limit_is_empty() {
    let store = Arc::new(MemoryScoreStore::new());
    let history = recorder(store, ManualClock::starting_at(start()));
    let farmer = FarmerId::new("farmer-1");

    history.record_evaluation(&farmer, &farm(), card(40)).await.unwrap();

    let snapshots = history
        .get_score_history(&farmer, HistoryWindow::new(0))
        .await
        .unwrap();
    assert!(snapshots.is_empty());
}

#[tokio::test]
async fn test_clock_going_backwards_keeps_order() {
    let store = Arc::new(MemoryScoreStore::new());
    let clock = ManualClock::starting_at(start());
    let history = recorder(store, clock.clone());
    let farmer = FarmerId::new("farmer-1");

    let first = history.record_evaluation(&farmer, &farm(), card(50)).await.unwrap();
    clock.set(start() - Duration::minutes(5));
    let second = history.record_evaluation(&farmer, &farm(), card(65)).await.unwrap();

    assert!(second.recorded_at >= first.recorded_at);
    let latest = history.get_latest_score(&farmer).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
}

#[tokio::test]
async fn test_same_instant_keeps_submission_order() {
    let store = Arc::new(MemoryScoreStore::new());
    let clock = ManualClock::starting_at(start());
    let history = recorder(store, clock);
    let farmer = FarmerId::new("farmer-1");

    history.record_evaluation(&farmer, &farm(), card(20)).await.unwrap();
    let second = history.record_evaluation(&farmer, &farm(), card(30)).await.unwrap();

    let latest = history.get_latest_score(&farmer).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    let scores: Vec<i32> = history
        .get_score_history(&farmer, HistoryWindow::default())
        .await
        .unwrap()
        .iter()
        .map(|s| s.composite_score)
        .collect();
    assert_eq!(scores, vec![20, 30]);
}

// ============================================================================
// Aggregate
// ============================================================================

#[tokio::test]
async fn test_aggregate_mirrors_latest_snapshot() {
    let store = Arc::new(MemoryScoreStore::new());
    let clock = ManualClock::starting_at(start());
    let history = recorder(store.clone(), clock.clone());
    let farmer = FarmerId::new("farmer-1");

    history.record_evaluation(&farmer, &farm(), card(35)).await.unwrap();
    clock.advance(Duration::days(1));
    let newer_farm = FarmSummary {
        farm_size_acres: Decimal::from(55),
        region: Region::West,
    };
    let snapshot = history
        .record_evaluation(&farmer, &newer_farm, card(62))
        .await
        .unwrap();

    let aggregate = store.find_aggregate(&farmer).await.unwrap().unwrap();
    assert!(aggregate.matches(&snapshot));
    assert_eq!(aggregate.region, Region::West);
    assert_eq!(aggregate.farm_size_acres, Decimal::from(55));
    assert_eq!(aggregate.updated_at, snapshot.recorded_at);
}

#[tokio::test]
async fn test_farmers_do_not_see_each_other() {
    let store = Arc::new(MemoryScoreStore::new());
    let history = recorder(store, ManualClock::starting_at(start()));
    let a = FarmerId::new("farmer-a");
    let b = FarmerId::new("farmer-b");

    history.record_evaluation(&a, &farm(), card(80)).await.unwrap();

    assert!(history.get_latest_score(&b).await.unwrap().is_none());
    assert!(history
        .get_score_history(&b, HistoryWindow::default())
        .await
        .unwrap()
        .is_empty());
    assert!(history.get_aggregate(&b).await.unwrap().is_none());
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_snapshot_failure_writes_nothing() {
    let store = Arc::new(MemoryScoreStore::new());
    store.set_fail_snapshot_writes(true);
    let history = recorder(store.clone(), ManualClock::starting_at(start()));
    let farmer = FarmerId::new("farmer-1");

    let err = history
        .record_evaluation(&farmer, &farm(), card(50))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(store.snapshot_count(&farmer).await, 0);
    assert!(store.find_aggregate(&farmer).await.unwrap().is_none());
}

#[tokio::test]
async fn test_aggregate_failure_is_reported_and_snapshot_kept() {
    let store = Arc::new(MemoryScoreStore::new());
    store.set_fail_aggregate_writes(true);
    let history = recorder(store.clone(), ManualClock::starting_at(start()));
    let farmer = FarmerId::new("farmer-1");

    let err = history
        .record_evaluation(&farmer, &farm(), card(50))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Persistence(_)));
    assert_eq!(store.snapshot_count(&farmer).await, 1);
    assert!(store.find_aggregate(&farmer).await.unwrap().is_none());
}

// ============================================================================
// Evaluation submission
// ============================================================================

#[tokio::test]
async fn test_invalid_form_is_not_recorded() {
    let store = Arc::new(MemoryScoreStore::new());
    let service = EvaluationService::new(recorder(store.clone(), ManualClock::starting_at(start())));
    let farmer = FarmerId::new("farmer-1");

    let form: EvaluationForm = serde_json::from_value(json!({
        "farmSize": 20,
        "region": "north",
        "cropType": "rice",
        "soilType": "clay",
        "soilPh": 15,
        "annualRainfall": 900,
        "temperature": 26,
        "lastYearYield": 3,
        "averageYield": 3
    }))
    .unwrap();

    let err = service.submit(&farmer, &form).await.unwrap_err();
    match err {
        AppError::Validation { field, .. } => assert_eq!(field, "soilPh"),
        other => panic!("unexpected error: {:?}", other),
    }
    assert_eq!(store.snapshot_count(&farmer).await, 0);
}

#[tokio::test]
async fn test_submitted_evaluation_is_recorded() {
    let store = Arc::new(MemoryScoreStore::new());
    let service = EvaluationService::new(recorder(store.clone(), ManualClock::starting_at(start())));
    let farmer = FarmerId::new("farmer-1");

    let form: EvaluationForm = serde_json::from_value(json!({
        "farmSize": "50",
        "region": "North",
        "cropType": "wheat",
        "soilType": "loamy",
        "soilPh": "6.5",
        "annualRainfall": "800",
        "temperature": "28",
        "lastYearYield": "4",
        "averageYield": "4"
    }))
    .unwrap();

    let snapshot = service.submit(&farmer, &form).await.unwrap();
    assert_eq!(snapshot.composite_score, 60);
    assert_eq!(snapshot.soil_health_score, 98);
    assert_eq!(snapshot.recorded_at, start());

    let aggregate = store.find_aggregate(&farmer).await.unwrap().unwrap();
    assert_eq!(aggregate.credit_score, 60);
    assert_eq!(aggregate.region, Region::North);
    assert_eq!(aggregate.farm_size_acres, Decimal::from(50));
}
