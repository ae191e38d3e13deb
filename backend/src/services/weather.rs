//! Regional weather lookups

use shared::{weather_city_for, RegionalWeather};

use crate::error::{AppError, AppResult};
use crate::external::WeatherClient;

/// Weather service resolving regions to provider cities
#[derive(Clone)]
pub struct WeatherService {
    client: Option<WeatherClient>,
}

impl WeatherService {
    /// `client` is `None` when no API key is configured
    pub fn new(client: Option<WeatherClient>) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    /// Weather for a region name. Unknown regions use the fallback city.
    pub async fn get_regional_weather(&self, region: &str) -> AppResult<RegionalWeather> {
        let client = self.client.as_ref().ok_or_else(|| {
            AppError::Configuration("Weather API client not configured".to_string())
        })?;

        let city = weather_city_for(region);
        tracing::debug!(region, city, "Fetching regional weather");
        client.fetch_current(city).await
    }
}
