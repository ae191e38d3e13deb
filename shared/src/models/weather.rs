//! Weather data models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Number of forecast entries shown on the dashboard
pub const DASHBOARD_FORECAST_LEN: usize = 5;

/// Current conditions plus a short forecast for a region's city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionalWeather {
    pub city: String,
    pub temperature_celsius: Decimal,
    /// Rain over the last 3 hours, 0 when the provider reports none
    pub rainfall_mm: Decimal,
    pub forecast: Vec<ForecastPoint>,
}

/// One forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub temperature_celsius: Decimal,
    pub rainfall_mm: Decimal,
}
