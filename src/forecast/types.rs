use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unit system passed to the provider as `units=`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Self::Metric => Self::Imperial,
            Self::Imperial => Self::Metric,
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Self::Metric => "C",
            Self::Imperial => "F",
        }
    }

    pub fn wind_speed_unit(&self) -> &'static str {
        match self {
            Self::Metric => "m/s",
            Self::Imperial => "mph",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "metric" | "c" | "celsius" => Ok(Self::Metric),
            "imperial" | "f" | "fahrenheit" => Ok(Self::Imperial),
            other => Err(format!("Unknown unit system: {}", other)),
        }
    }
}

/// How a fetch identifies its place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LocationQuery {
    City { name: String },
    Coordinates { lat: f64, lon: f64 },
}

impl LocationQuery {
    pub fn city(name: impl Into<String>) -> Self {
        Self::City { name: name.into() }
    }

    pub fn query_params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::City { name } => vec![("q", name.clone())],
            Self::Coordinates { lat, lon } => {
                vec![("lat", lat.to_string()), ("lon", lon.to_string())]
            }
        }
    }

    pub fn not_found_message(&self) -> &'static str {
        match self {
            Self::City { .. } => "City not found",
            Self::Coordinates { .. } => "Location not found",
        }
    }
}

// OpenWeather payloads. Only the fields the dashboard reads are required.

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherDescriptor {
    #[serde(default)]
    pub id: i32,
    pub main: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentWeatherResponse {
    pub name: String,
    #[serde(default)]
    pub sys: CurrentSys,
    pub main: CurrentMain,
    #[serde(default)]
    pub weather: Vec<WeatherDescriptor>,
    #[serde(default)]
    pub wind: Wind,
    pub timezone: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentSys {
    pub country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentMain {
    pub temp: f64,
    #[serde(default)]
    pub feels_like: Option<f64>,
    #[serde(default)]
    pub humidity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Wind {
    #[serde(default)]
    pub speed: f64,
    pub deg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    #[serde(default)]
    pub cnt: Option<i32>,
    pub list: Vec<ForecastItem>,
    pub city: Option<ForecastCity>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastItem {
    pub dt: i64,
    pub main: ForecastMain,
    #[serde(default)]
    pub weather: Vec<WeatherDescriptor>,
    pub dt_txt: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
    pub country: Option<String>,
    pub timezone: Option<i32>,
}

// Derived values handed to the presentation layer.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSample {
    pub timestamp: i64,
    pub temperature: f64,
    pub condition: String,
    pub description: String,
}

impl From<&ForecastItem> for ForecastSample {
    fn from(item: &ForecastItem) -> Self {
        let (condition, description) = item
            .weather
            .first()
            .map(|w| (w.main.clone(), w.description.clone()))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        Self {
            timestamp: item.dt,
            temperature: item.main.temp,
            condition,
            description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
    pub day: String,
    pub condition: String,
    pub min: i64,
    pub max: i64,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temperature: i64,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Advice {
    pub message: String,
    pub tip: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub city: String,
    pub country: Option<String>,
    pub label: String,
    pub temperature: f64,
    pub temperature_rounded: i64,
    pub humidity: f64,
    pub condition: String,
    pub description: String,
    pub wind_speed: f64,
    pub utc_offset_seconds: Option<i32>,
    pub icon: String,
    pub background: String,
    pub advice: Advice,
}

/// Everything one successful fetch produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub current: CurrentConditions,
    pub daily: Vec<DaySummary>,
    pub hourly: Vec<HourlyPoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_toggle_and_parse() {
        assert_eq!(Units::Metric.toggled(), Units::Imperial);
        assert_eq!(Units::Imperial.toggled(), Units::Metric);
        assert_eq!("Imperial".parse::<Units>().unwrap(), Units::Imperial);
        assert_eq!("c".parse::<Units>().unwrap(), Units::Metric);
        assert!("kelvin".parse::<Units>().is_err());
    }

    #[test]
    fn test_location_query_params() {
        let by_name = LocationQuery::city("London");
        assert_eq!(by_name.query_params(), vec![("q", "London".to_string())]);
        assert_eq!(by_name.not_found_message(), "City not found");

        let by_coords = LocationQuery::Coordinates { lat: 51.5, lon: -0.12 };
        assert_eq!(
            by_coords.query_params(),
            vec![("lat", "51.5".to_string()), ("lon", "-0.12".to_string())]
        );
        assert_eq!(by_coords.not_found_message(), "Location not found");
    }

    #[test]
    fn test_forecast_sample_from_item() {
        let item: ForecastItem = serde_json::from_value(serde_json::json!({
            "dt": 1700000000,
            "main": { "temp": 11.4, "humidity": 80 },
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain", "icon": "10d" }],
            "dt_txt": "2023-11-14 22:13:20"
        }))
        .unwrap();

        let sample = ForecastSample::from(&item);
        assert_eq!(sample.timestamp, 1700000000);
        assert_eq!(sample.condition, "Rain");
        assert_eq!(sample.description, "light rain");
    }

    #[test]
    fn test_forecast_sample_without_weather_is_unknown() {
        let item: ForecastItem = serde_json::from_value(serde_json::json!({
            "dt": 0,
            "main": { "temp": 1.0 }
        }))
        .unwrap();

        assert_eq!(ForecastSample::from(&item).condition, "Unknown");
    }
}
