use crate::forecast::types::Units;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub openweather_api_key: String,
    pub openweather_base_url: String,
    pub openweather_current_path: String,
    pub openweather_forecast_path: String,
    pub app_timezone: String,
    pub city_catalog_source: Option<String>,
    pub default_units: Units,
    pub use_mock_provider: bool,
    pub bind_addr: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let use_mock_provider = env::var("WEATHER_MOCK")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let openweather_api_key = match env::var("OPENWEATHER_API_KEY") {
            Ok(key) => key,
            Err(_) if use_mock_provider => String::new(),
            Err(_) => return Err(anyhow::anyhow!("OPENWEATHER_API_KEY not set")),
        };

        let default_units = env::var("DEFAULT_UNITS")
            .unwrap_or_else(|_| "metric".to_string())
            .parse::<Units>()
            .map_err(|e| anyhow::anyhow!(e))?;

        let config = Config {
            openweather_api_key,
            openweather_base_url: env::var("OPENWEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.openweathermap.org".to_string()),
            openweather_current_path: env::var("OPENWEATHER_CURRENT_PATH")
                .unwrap_or_else(|_| "/data/2.5/weather".to_string()),
            openweather_forecast_path: env::var("OPENWEATHER_FORECAST_PATH")
                .unwrap_or_else(|_| "/data/2.5/forecast".to_string()),
            app_timezone: env::var("APP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string()),
            city_catalog_source: env::var("CITY_CATALOG_SOURCE")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            default_units,
            use_mock_provider,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
        };

        // Fail at startup rather than on the first forecast.
        config.display_timezone()?;

        Ok(config)
    }

    pub fn display_timezone(&self) -> anyhow::Result<chrono_tz::Tz> {
        crate::utils::parse_timezone(&self.app_timezone).map_err(|e| anyhow::anyhow!(e))
    }
}

#[cfg(test)]
impl Config {
    pub fn for_tests(base_url: &str) -> Self {
        Config {
            openweather_api_key: "test-key".to_string(),
            openweather_base_url: base_url.to_string(),
            openweather_current_path: "/data/2.5/weather".to_string(),
            openweather_forecast_path: "/data/2.5/forecast".to_string(),
            app_timezone: "UTC".to_string(),
            city_catalog_source: None,
            default_units: Units::Metric,
            use_mock_provider: false,
            bind_addr: "127.0.0.1:0".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_timezone_parses_named_zone() {
        let mut config = Config::for_tests("http://localhost");
        config.app_timezone = "Europe/London".to_string();
        assert_eq!(config.display_timezone().unwrap(), chrono_tz::Europe::London);
    }

    #[test]
    fn test_display_timezone_rejects_garbage() {
        let mut config = Config::for_tests("http://localhost");
        config.app_timezone = "Mars/Olympus_Mons".to_string();
        assert!(config.display_timezone().is_err());
    }
}
