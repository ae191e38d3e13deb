//! Weather API client
//!
//! Queries the OpenWeatherMap 5 day / 3 hour forecast by city name. The first
//! forecast entry stands in for current conditions.

use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use shared::{ForecastPoint, RegionalWeather, DASHBOARD_FORECAST_LEN};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Weather API client
#[derive(Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
}

/// OpenWeatherMap API response for forecast
#[derive(Debug, Deserialize)]
struct OWMForecastResponse {
    list: Vec<OWMForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OWMForecastItem {
    dt: i64,
    main: OWMMain,
    rain: Option<OWMForecastRain>,
}

#[derive(Debug, Deserialize)]
struct OWMMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OWMForecastRain {
    #[serde(rename = "3h")]
    three_hour: Option<f64>,
}

impl WeatherClient {
    /// Create a new WeatherClient against the given API base URL
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Current conditions and a short forecast for a city such as `Delhi,IN`
    pub async fn fetch_current(&self, city: &str) -> AppResult<RegionalWeather> {
        let url = format!("{}/forecast", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(city, "Weather API request failed: {}", e);
                AppError::WeatherServiceUnavailable
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(city, "Weather API error: {} - {}", status, body);
            return Err(AppError::WeatherServiceUnavailable);
        }

        let data: OWMForecastResponse = response.json().await.map_err(|e| {
            tracing::warn!(city, "Failed to parse forecast response: {}", e);
            AppError::WeatherServiceUnavailable
        })?;

        convert_forecast_response(city, data)
    }
}

/// Convert an OpenWeatherMap forecast response to our format
fn convert_forecast_response(city: &str, data: OWMForecastResponse) -> AppResult<RegionalWeather> {
    let forecast: Vec<ForecastPoint> = data
        .list
        .into_iter()
        .take(DASHBOARD_FORECAST_LEN)
        .map(|item| ForecastPoint {
            timestamp: DateTime::from_timestamp(item.dt, 0).unwrap_or_else(Utc::now),
            temperature_celsius: to_decimal(item.main.temp),
            rainfall_mm: item
                .rain
                .and_then(|r| r.three_hour)
                .map(to_decimal)
                .unwrap_or_default(),
        })
        .collect();

    let (temperature_celsius, rainfall_mm) = forecast
        .first()
        .map(|current| (current.temperature_celsius, current.rainfall_mm))
        .ok_or_else(|| {
            tracing::warn!(city, "Weather API returned an empty forecast");
            AppError::WeatherServiceUnavailable
        })?;

    Ok(RegionalWeather {
        city: city.to_string(),
        temperature_celsius,
        rainfall_mm,
        forecast,
    })
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}
