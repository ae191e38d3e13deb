//! Farmer dashboard assembly

use serde::Serialize;
use shared::{
    score_breakdown, BreakdownEntry, FarmerAggregate, FarmerId, HistoryWindow, RegionalWeather,
    ScoreSnapshot,
};

use crate::error::AppResult;
use crate::services::history::ScoreHistoryService;
use crate::services::weather::WeatherService;

/// Everything the dashboard screen shows
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    /// `None` until the farmer's first evaluation
    pub farmer: Option<FarmerAggregate>,
    /// Oldest first
    pub score_history: Vec<ScoreSnapshot>,
    pub breakdown: Vec<BreakdownEntry>,
    /// `None` when no region is known or the provider failed
    pub weather: Option<RegionalWeather>,
}

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    history: ScoreHistoryService,
    weather: WeatherService,
    window: HistoryWindow,
}

impl DashboardService {
    pub fn new(history: ScoreHistoryService, weather: WeatherService, window: HistoryWindow) -> Self {
        Self {
            history,
            weather,
            window,
        }
    }

    /// Build the dashboard. Weather failures are logged and leave `weather` empty.
    pub async fn get_dashboard(&self, farmer_id: &FarmerId) -> AppResult<Dashboard> {
        let farmer = self.history.get_aggregate(farmer_id).await?;
        let score_history = self.history.get_score_history(farmer_id, self.window).await?;

        let breakdown = score_breakdown(farmer.as_ref().map(|f| f.scores()).as_ref());

        let weather = match (&farmer, self.weather.is_configured()) {
            (Some(aggregate), true) => {
                match self.weather.get_regional_weather(aggregate.region.as_str()).await {
                    Ok(weather) => Some(weather),
                    Err(e) => {
                        tracing::warn!(farmer_id = %farmer_id, "Dashboard weather unavailable: {}", e);
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(Dashboard {
            farmer,
            score_history,
            breakdown,
            weather,
        })
    }
}
