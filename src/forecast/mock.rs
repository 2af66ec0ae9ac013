use super::openweather::OpenWeatherError;
use super::provider::WeatherProvider;
use super::types::*;
use crate::utils::{celsius_to_fahrenheit, ms_to_mph};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const STEP_SECONDS: i64 = 3 * 3600;

/// Offline provider with a fixed, repeatable forecast.
pub struct MockWeatherClient {
    start: i64,
    unknown_cities: Vec<String>,
}

impl MockWeatherClient {
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self::starting_at(now - now.rem_euclid(STEP_SECONDS))
    }

    pub fn starting_at(start: i64) -> Self {
        Self {
            start,
            unknown_cities: vec!["Atlantis".to_string()],
        }
    }

    fn check_known(&self, location: &LocationQuery) -> Result<String, OpenWeatherError> {
        match location {
            LocationQuery::City { name } => {
                let name = name.trim();
                if self.unknown_cities.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                    return Err(OpenWeatherError::NotFound);
                }
                Ok(name.to_string())
            }
            LocationQuery::Coordinates { lat, lon } => {
                crate::utils::validate_coordinates(*lat, *lon)
                    .map_err(|_| OpenWeatherError::InvalidCoordinates)?;
                Ok(format!("Mock {:.2},{:.2}", lat, lon))
            }
        }
    }

    fn temperature(celsius: f64, units: Units) -> f64 {
        match units {
            Units::Metric => celsius,
            Units::Imperial => celsius_to_fahrenheit(celsius),
        }
    }
}

impl Default for MockWeatherClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherClient {
    async fn current(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<CurrentWeatherResponse, OpenWeatherError> {
        let name = self.check_known(location)?;
        let wind_ms = 3.5;

        Ok(CurrentWeatherResponse {
            name,
            sys: CurrentSys {
                country: Some("XX".to_string()),
            },
            main: CurrentMain {
                temp: Self::temperature(18.0, units),
                feels_like: Some(Self::temperature(17.0, units)),
                humidity: 62.0,
            },
            weather: vec![WeatherDescriptor {
                id: 801,
                main: "Clouds".to_string(),
                description: "few clouds".to_string(),
                icon: "02d".to_string(),
            }],
            wind: Wind {
                speed: match units {
                    Units::Metric => wind_ms,
                    Units::Imperial => ms_to_mph(wind_ms),
                },
                deg: Some(210.0),
            },
            timezone: Some(0),
        })
    }

    async fn forecast(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<ForecastResponse, OpenWeatherError> {
        let name = self.check_known(location)?;

        // 5 days of 3-hour data (40 items)
        let list: Vec<ForecastItem> = (0..40)
            .map(|i| {
                let dt = self.start + i * STEP_SECONDS;
                let hours_ahead = (i * 3) as f64;
                let base_temp = 14.0 + 6.0 * (hours_ahead * 0.26).sin(); // Diurnal temperature variation
                let rainy = i % 8 == 0;

                let (main, description, icon) = if rainy {
                    ("Rain", "light rain", "10d")
                } else {
                    ("Clear", "clear sky", "01d")
                };

                ForecastItem {
                    dt,
                    main: ForecastMain {
                        temp: Self::temperature(base_temp, units),
                    },
                    weather: vec![WeatherDescriptor {
                        id: if rainy { 500 } else { 800 },
                        main: main.to_string(),
                        description: description.to_string(),
                        icon: icon.to_string(),
                    }],
                    dt_txt: DateTime::from_timestamp(dt, 0)
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
                }
            })
            .collect();

        Ok(ForecastResponse {
            cnt: Some(list.len() as i32),
            list,
            city: Some(ForecastCity {
                name,
                country: Some("XX".to_string()),
                timezone: Some(0),
            }),
        })
    }
}
