//! Credit score records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::FarmerId;

/// The four scores produced by one scoring run, each in `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub composite_score: i32,
    pub soil_health_score: i32,
    pub weather_risk_score: i32,
    pub past_yields_score: i32,
}

/// Immutable, timestamped scoring result. Append-only history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub id: Uuid,
    pub farmer_id: FarmerId,
    pub recorded_at: DateTime<Utc>,
    pub composite_score: i32,
    pub soil_health_score: i32,
    pub weather_risk_score: i32,
    pub past_yields_score: i32,
}

impl ScoreSnapshot {
    pub fn new(farmer_id: FarmerId, recorded_at: DateTime<Utc>, scores: ScoreCard) -> Self {
        Self {
            id: Uuid::new_v4(),
            farmer_id,
            recorded_at,
            composite_score: scores.composite_score,
            soil_health_score: scores.soil_health_score,
            weather_risk_score: scores.weather_risk_score,
            past_yields_score: scores.past_yields_score,
        }
    }

    pub fn scores(&self) -> ScoreCard {
        ScoreCard {
            composite_score: self.composite_score,
            soil_health_score: self.soil_health_score,
            weather_risk_score: self.weather_risk_score,
            past_yields_score: self.past_yields_score,
        }
    }
}

/// Factors shown on the dashboard score breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreFactor {
    SoilHealth,
    Weather,
    PastYields,
    /// Not computed anywhere yet
    GisData,
    /// Not computed anywhere yet
    MarketTrends,
}

impl ScoreFactor {
    pub const ALL: [ScoreFactor; 5] = [
        ScoreFactor::SoilHealth,
        ScoreFactor::Weather,
        ScoreFactor::PastYields,
        ScoreFactor::GisData,
        ScoreFactor::MarketTrends,
    ];

    /// Display weight in percent. Illustrative only: the composite score
    /// uses its own farm-size/soil/yield/weather weighting.
    pub fn display_weight(&self) -> u32 {
        match self {
            ScoreFactor::SoilHealth => 30,
            ScoreFactor::Weather => 25,
            ScoreFactor::PastYields => 20,
            ScoreFactor::GisData => 15,
            ScoreFactor::MarketTrends => 10,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreFactor::SoilHealth => "Soil Health",
            ScoreFactor::Weather => "Weather",
            ScoreFactor::PastYields => "Past Yields",
            ScoreFactor::GisData => "GIS Data",
            ScoreFactor::MarketTrends => "Market Trends",
        }
    }
}

/// One row of the score breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub factor: ScoreFactor,
    pub label: String,
    pub display_weight: u32,
    /// `None` when the factor is not implemented or no evaluation exists
    pub score: Option<i32>,
}

/// Build the dashboard breakdown from the latest score card, if any.
pub fn score_breakdown(latest: Option<&ScoreCard>) -> Vec<BreakdownEntry> {
    ScoreFactor::ALL
        .iter()
        .map(|factor| {
            let score = latest.and_then(|card| match factor {
                ScoreFactor::SoilHealth => Some(card.soil_health_score),
                ScoreFactor::Weather => Some(card.weather_risk_score),
                ScoreFactor::PastYields => Some(card.past_yields_score),
                ScoreFactor::GisData | ScoreFactor::MarketTrends => None,
            });
            BreakdownEntry {
                factor: *factor,
                label: factor.label().to_string(),
                display_weight: factor.display_weight(),
                score,
            }
        })
        .collect()
}
