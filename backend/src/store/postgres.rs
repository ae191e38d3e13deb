//! PostgreSQL score store

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shared::{FarmerAggregate, FarmerId, Region, ScoreSnapshot};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ScoreStore, SnapshotOrder, StoreError};

/// Score store backed by the `score_snapshots` and `farmers` tables
#[derive(Clone)]
pub struct PgScoreStore {
    db: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct SnapshotRow {
    id: Uuid,
    farmer_id: String,
    recorded_at: DateTime<Utc>,
    composite_score: i32,
    soil_health_score: i32,
    weather_risk_score: i32,
    past_yields_score: i32,
}

impl From<SnapshotRow> for ScoreSnapshot {
    fn from(row: SnapshotRow) -> Self {
        ScoreSnapshot {
            id: row.id,
            farmer_id: FarmerId::new(row.farmer_id),
            recorded_at: row.recorded_at,
            composite_score: row.composite_score,
            soil_health_score: row.soil_health_score,
            weather_risk_score: row.weather_risk_score,
            past_yields_score: row.past_yields_score,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AggregateRow {
    farmer_id: String,
    credit_score: i32,
    farm_size_acres: Decimal,
    region: String,
    soil_health_score: i32,
    weather_risk_score: i32,
    past_yields_score: i32,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AggregateRow> for FarmerAggregate {
    type Error = StoreError;

    fn try_from(row: AggregateRow) -> Result<Self, Self::Error> {
        let region = row.region.parse::<Region>().map_err(|_| {
            StoreError::Corrupt(format!(
                "farmer {} has unknown region '{}'",
                row.farmer_id, row.region
            ))
        })?;

        Ok(FarmerAggregate {
            farmer_id: FarmerId::new(row.farmer_id),
            credit_score: row.credit_score,
            farm_size_acres: row.farm_size_acres,
            region,
            soil_health_score: row.soil_health_score,
            weather_risk_score: row.weather_risk_score,
            past_yields_score: row.past_yields_score,
            updated_at: row.updated_at,
        })
    }
}

impl PgScoreStore {
    /// Create a new PgScoreStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[axum::async_trait]
impl ScoreStore for PgScoreStore {
    async fn insert_snapshot(&self, snapshot: &ScoreSnapshot) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO score_snapshots (
                id, farmer_id, recorded_at, composite_score,
                soil_health_score, weather_risk_score, past_yields_score
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(snapshot.id)
        .bind(snapshot.farmer_id.as_str())
        .bind(snapshot.recorded_at)
        .bind(snapshot.composite_score)
        .bind(snapshot.soil_health_score)
        .bind(snapshot.weather_risk_score)
        .bind(snapshot.past_yields_score)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn upsert_aggregate(
        &self,
        aggregate: &FarmerAggregate,
    ) -> Result<FarmerAggregate, StoreError> {
        let row = sqlx::query_as::<_, AggregateRow>(
            r#"
            INSERT INTO farmers (
                farmer_id, credit_score, farm_size_acres, region,
                soil_health_score, weather_risk_score, past_yields_score, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (farmer_id) DO UPDATE SET
                credit_score = EXCLUDED.credit_score,
                farm_size_acres = EXCLUDED.farm_size_acres,
                region = EXCLUDED.region,
                soil_health_score = EXCLUDED.soil_health_score,
                weather_risk_score = EXCLUDED.weather_risk_score,
                past_yields_score = EXCLUDED.past_yields_score,
                updated_at = EXCLUDED.updated_at
            RETURNING farmer_id, credit_score, farm_size_acres, region,
                      soil_health_score, weather_risk_score, past_yields_score, updated_at
            "#,
        )
        .bind(aggregate.farmer_id.as_str())
        .bind(aggregate.credit_score)
        .bind(aggregate.farm_size_acres)
        .bind(aggregate.region.as_str())
        .bind(aggregate.soil_health_score)
        .bind(aggregate.weather_risk_score)
        .bind(aggregate.past_yields_score)
        .bind(aggregate.updated_at)
        .fetch_one(&self.db)
        .await?;

        row.try_into()
    }

    async fn find_aggregate(
        &self,
        farmer_id: &FarmerId,
    ) -> Result<Option<FarmerAggregate>, StoreError> {
        let row = sqlx::query_as::<_, AggregateRow>(
            r#"
            SELECT farmer_id, credit_score, farm_size_acres, region,
                   soil_health_score, weather_risk_score, past_yields_score, updated_at
            FROM farmers
            WHERE farmer_id = $1
            "#,
        )
        .bind(farmer_id.as_str())
        .fetch_optional(&self.db)
        .await?;

        row.map(FarmerAggregate::try_from).transpose()
    }

    async fn list_snapshots(
        &self,
        farmer_id: &FarmerId,
        order: SnapshotOrder,
        limit: u32,
    ) -> Result<Vec<ScoreSnapshot>, StoreError> {
        // `seq` breaks ties between equal timestamps in insertion order
        let query = match order {
            SnapshotOrder::OldestFirst => {
                r#"
                SELECT id, farmer_id, recorded_at, composite_score,
                       soil_health_score, weather_risk_score, past_yields_score
                FROM score_snapshots
                WHERE farmer_id = $1
                ORDER BY recorded_at ASC, seq ASC
                LIMIT $2
                "#
            }
            SnapshotOrder::NewestFirst => {
                r#"
                SELECT id, farmer_id, recorded_at, composite_score,
                       soil_health_score, weather_risk_score, past_yields_score
                FROM score_snapshots
                WHERE farmer_id = $1
                ORDER BY recorded_at DESC, seq DESC
                LIMIT $2
                "#
            }
        };

        let rows = sqlx::query_as::<_, SnapshotRow>(query)
            .bind(farmer_id.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(ScoreSnapshot::from).collect())
    }
}
