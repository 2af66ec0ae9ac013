use super::provider::WeatherProvider;
use super::types::*;
use crate::config::Config;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("Rate limited, retry after: {0}s")]
    RateLimited(u64),
    #[error("Not found")]
    NotFound,
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid coordinates")]
    InvalidCoordinates,
}

pub struct OpenWeatherClient {
    client: Client,
    config: Config,
    max_retries: u32,
    retry_delay: Duration,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("WeatherAssistant/1.0")
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            config,
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        })
    }

    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub async fn get_current(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<CurrentWeatherResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_current_path
        );

        let response = self.request(&url, location, units).await?;
        let current: CurrentWeatherResponse = serde_json::from_value(response)?;
        Ok(current)
    }

    pub async fn get_forecast(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<ForecastResponse, OpenWeatherError> {
        let url = format!(
            "{}{}",
            self.config.openweather_base_url, self.config.openweather_forecast_path
        );

        let response = self.request(&url, location, units).await?;
        let forecast: ForecastResponse = serde_json::from_value(response)?;
        Ok(forecast)
    }

    async fn request(
        &self,
        url: &str,
        location: &LocationQuery,
        units: Units,
    ) -> Result<Value, OpenWeatherError> {
        if let LocationQuery::Coordinates { lat, lon } = location {
            if !self.is_valid_coordinates(*lat, *lon) {
                return Err(OpenWeatherError::InvalidCoordinates);
            }
        }

        let mut params = location.query_params();
        params.push(("units", units.as_query().to_string()));
        params.push(("appid", self.config.openweather_api_key.clone()));

        self.make_request_with_retry(url, &params).await
    }

    /// Retries only on 429. A 404 becomes `NotFound` so callers can tell an
    /// unknown location from an upstream failure.
    async fn make_request_with_retry(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Value, OpenWeatherError> {
        let mut retry_count = 0;
        let mut delay = self.retry_delay;

        loop {
            let response = self.client.get(url).query(params).send().await?;

            match response.status() {
                reqwest::StatusCode::OK => {
                    let json: Value = response.json().await?;
                    return Ok(json);
                }
                reqwest::StatusCode::NOT_FOUND => {
                    return Err(OpenWeatherError::NotFound);
                }
                reqwest::StatusCode::TOO_MANY_REQUESTS => {
                    if retry_count >= self.max_retries {
                        return Err(OpenWeatherError::RateLimited(delay.as_secs()));
                    }

                    tracing::warn!(
                        "Rate limited by OpenWeather API, retrying in {}ms",
                        delay.as_millis()
                    );

                    sleep(delay).await;
                    delay = delay.mul_f32(2.0 + fastrand::f32() * 0.5); // Exponential backoff with jitter
                    retry_count += 1;
                }
                status => {
                    let error_text = response.text().await.unwrap_or_default();
                    return Err(OpenWeatherError::ApiError(format!(
                        "HTTP {}: {}",
                        status, error_text
                    )));
                }
            }
        }
    }

    fn is_valid_coordinates(&self, lat: f64, lon: f64) -> bool {
        crate::utils::validate_coordinates(lat, lon).is_ok()
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherClient {
    async fn current(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<CurrentWeatherResponse, OpenWeatherError> {
        self.get_current(location, units).await
    }

    async fn forecast(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<ForecastResponse, OpenWeatherError> {
        self.get_forecast(location, units).await
    }
}
