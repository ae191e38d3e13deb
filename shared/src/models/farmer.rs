//! Farmer records

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{EvaluationInput, ScoreCard, ScoreSnapshot};
use crate::types::{FarmerId, Region};

/// Farm facts carried from an evaluation into the farmer aggregate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmSummary {
    pub farm_size_acres: Decimal,
    pub region: Region,
}

impl From<&EvaluationInput> for FarmSummary {
    fn from(input: &EvaluationInput) -> Self {
        Self {
            farm_size_acres: input.farm_size_acres,
            region: input.region,
        }
    }
}

/// Denormalised view of a farmer's latest known scores, used by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerAggregate {
    pub farmer_id: FarmerId,
    pub credit_score: i32,
    pub farm_size_acres: Decimal,
    pub region: Region,
    pub soil_health_score: i32,
    pub weather_risk_score: i32,
    pub past_yields_score: i32,
    pub updated_at: DateTime<Utc>,
}

impl FarmerAggregate {
    /// Aggregate mirroring a freshly recorded snapshot
    pub fn from_snapshot(snapshot: &ScoreSnapshot, farm: &FarmSummary) -> Self {
        Self {
            farmer_id: snapshot.farmer_id.clone(),
            credit_score: snapshot.composite_score,
            farm_size_acres: farm.farm_size_acres,
            region: farm.region,
            soil_health_score: snapshot.soil_health_score,
            weather_risk_score: snapshot.weather_risk_score,
            past_yields_score: snapshot.past_yields_score,
            updated_at: snapshot.recorded_at,
        }
    }

    pub fn scores(&self) -> ScoreCard {
        ScoreCard {
            composite_score: self.credit_score,
            soil_health_score: self.soil_health_score,
            weather_risk_score: self.weather_risk_score,
            past_yields_score: self.past_yields_score,
        }
    }

    /// True when the score fields equal those of `snapshot`
    pub fn matches(&self, snapshot: &ScoreSnapshot) -> bool {
        self.farmer_id == snapshot.farmer_id
            && self.credit_score == snapshot.composite_score
            && self.soil_health_score == snapshot.soil_health_score
            && self.weather_risk_score == snapshot.weather_risk_score
            && self.past_yields_score == snapshot.past_yields_score
    }
}

/// Farmer profile maintained from the profile screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub farmer_id: FarmerId,
    pub first_name: String,
    pub last_name: String,
    pub farm_name: Option<String>,
    pub farm_size_acres: Option<Decimal>,
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FarmerProfile {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}
