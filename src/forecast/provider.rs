use super::openweather::OpenWeatherError;
use super::types::{CurrentWeatherResponse, ForecastResponse, LocationQuery, Units};
use async_trait::async_trait;

/// Source of current conditions and the 3-hour forecast.
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    async fn current(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<CurrentWeatherResponse, OpenWeatherError>;

    async fn forecast(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<ForecastResponse, OpenWeatherError>;
}
