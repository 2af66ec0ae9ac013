use crate::advice::advise;
use crate::autocomplete::MatchPolicy;
use crate::catalog::CatalogLoader;
use crate::forecast::provider::WeatherProvider;
use crate::forecast::shape_forecast;
use crate::forecast::types::{CurrentConditions, CurrentWeatherResponse, LocationQuery, Units, WeatherReport};
use crate::forecast::visuals;
use crate::session::{FetchError, RequestToken, SessionHandle, SessionView};
use crate::utils::{fahrenheit_to_celsius, round_half_up};
use chrono_tz::Tz;
use std::sync::Arc;

/// Result of the browser's geolocation prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeolocationOutcome {
    Acquired { lat: f64, lon: f64 },
    Denied,
}

/// Runs user events against a session.
///
/// The session lock is held only while a transition is applied, never while
/// waiting on the provider.
pub struct WeatherController {
    provider: Arc<dyn WeatherProvider>,
    catalog: Arc<CatalogLoader>,
    zone: Tz,
}

impl WeatherController {
    pub fn new(provider: Arc<dyn WeatherProvider>, catalog: Arc<CatalogLoader>, zone: Tz) -> Self {
        Self {
            provider,
            catalog,
            zone,
        }
    }

    pub async fn search(&self, session: &SessionHandle, city: &str) -> SessionView {
        let city = city.trim();
        if city.is_empty() {
            return session.lock().await.view();
        }

        self.run(session, LocationQuery::city(city)).await
    }

    pub async fn locate(&self, session: &SessionHandle, outcome: GeolocationOutcome) -> SessionView {
        match outcome {
            GeolocationOutcome::Acquired { lat, lon } => {
                self.run(session, LocationQuery::Coordinates { lat, lon }).await
            }
            GeolocationOutcome::Denied => {
                tracing::info!("Geolocation denied by user");
                let mut guard = session.lock().await;
                let state = std::mem::take(&mut *guard);
                *guard = state.deny_location();
                guard.view()
            }
        }
    }

    pub async fn toggle_units(&self, session: &SessionHandle) -> SessionView {
        let (reissue, units) = {
            let mut guard = session.lock().await;
            let state = std::mem::take(&mut *guard);
            let (next, reissue) = state.toggle_units();
            let units = next.units();
            *guard = next;
            (reissue, units)
        };

        match reissue {
            Some((location, token)) => self.fetch_and_apply(session, location, token, units).await,
            None => session.lock().await.view(),
        }
    }

    pub async fn suggest(&self, session: &SessionHandle, query: &str) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let catalog = self.catalog.get().await;
        let history = session.lock().await.history().as_slice().to_vec();
        MatchPolicy::select(&catalog, &history).suggest(query)
    }

    async fn run(&self, session: &SessionHandle, location: LocationQuery) -> SessionView {
        let (token, units) = {
            let mut guard = session.lock().await;
            let state = std::mem::take(&mut *guard);
            let (next, token) = state.begin(location.clone());
            let units = next.units();
            *guard = next;
            (token, units)
        };

        self.fetch_and_apply(session, location, token, units).await
    }

    async fn fetch_and_apply(
        &self,
        session: &SessionHandle,
        location: LocationQuery,
        token: RequestToken,
        units: Units,
    ) -> SessionView {
        let result = self.fetch_report(&location, units).await;

        let mut guard = session.lock().await;
        if !guard.is_latest(token) {
            tracing::debug!("Discarding superseded fetch for {:?}", location);
            return guard.view();
        }

        let state = std::mem::take(&mut *guard);
        *guard = match result {
            Ok(report) => {
                tracing::info!(
                    "Fetched weather for {} ({} days, {} hourly points)",
                    report.current.label,
                    report.daily.len(),
                    report.hourly.len()
                );
                state.complete(token, location, report)
            }
            Err(err) => {
                tracing::warn!("Weather fetch failed for {:?}: {}", location, err);
                state.fail(token, &err)
            }
        };
        guard.view()
    }

    /// Current conditions first, then the forecast, like the dashboard does.
    pub async fn fetch_report(
        &self,
        location: &LocationQuery,
        units: Units,
    ) -> Result<WeatherReport, FetchError> {
        let current = self
            .provider
            .current(location, units)
            .await
            .map_err(|e| FetchError::from_provider(e, location))?;

        let forecast = self
            .provider
            .forecast(location, units)
            .await
            .map_err(|e| FetchError::from_provider(e, location))?;

        let (daily, hourly) = shape_forecast(&forecast, &self.zone);

        Ok(WeatherReport {
            current: current_conditions(&current, units),
            daily,
            hourly,
        })
    }
}

fn current_conditions(response: &CurrentWeatherResponse, units: Units) -> CurrentConditions {
    let (condition, description) = response
        .weather
        .first()
        .map(|w| (w.main.clone(), w.description.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

    let label = match response.sys.country.as_deref() {
        Some(country) if !country.is_empty() => format!("{}, {}", response.name, country),
        _ => response.name.clone(),
    };

    let temp_c = match units {
        Units::Metric => response.main.temp,
        Units::Imperial => fahrenheit_to_celsius(response.main.temp),
    };

    let visual = visuals::lookup(&condition);

    CurrentConditions {
        city: response.name.clone(),
        country: response.sys.country.clone(),
        label,
        temperature: response.main.temp,
        temperature_rounded: round_half_up(response.main.temp),
        humidity: response.main.humidity,
        advice: advise(round_half_up(temp_c), &description),
        condition,
        description,
        wind_speed: response.wind.speed,
        utc_offset_seconds: response.timezone,
        icon: visual.icon.to_string(),
        background: visual.background.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::mock::MockWeatherClient;
    use crate::forecast::openweather::OpenWeatherError;
    use crate::forecast::types::ForecastResponse;
    use crate::session::{Phase, SessionState};
    use async_trait::async_trait;
    use tokio::sync::{Mutex, Notify};

    // 2024-01-15 00:00:00 UTC, a Monday.
    const START: i64 = 1_705_276_800;

    fn session() -> SessionHandle {
        Arc::new(Mutex::new(SessionState::new(Units::Metric)))
    }

    fn controller_with(provider: Arc<dyn WeatherProvider>) -> WeatherController {
        WeatherController::new(provider, Arc::new(CatalogLoader::disabled()), chrono_tz::UTC)
    }

    fn mock_controller() -> WeatherController {
        controller_with(Arc::new(MockWeatherClient::starting_at(START)))
    }

    /// Current conditions succeed, the forecast always fails.
    struct BrokenForecast(MockWeatherClient);

    #[async_trait]
    impl WeatherProvider for BrokenForecast {
        async fn current(
            &self,
            location: &LocationQuery,
            units: Units,
        ) -> Result<CurrentWeatherResponse, OpenWeatherError> {
            self.0.current(location, units).await
        }

        async fn forecast(
            &self,
            _location: &LocationQuery,
            _units: Units,
        ) -> Result<ForecastResponse, OpenWeatherError> {
            Err(OpenWeatherError::ApiError("HTTP 502 Bad Gateway: upstream".to_string()))
        }
    }

    /// Holds requests for `slow_city` in `slow_units` until released.
    struct GatedProvider {
        inner: MockWeatherClient,
        slow_city: String,
        slow_units: Units,
        entered: Notify,
        release: Notify,
    }

    impl GatedProvider {
        fn new(slow_city: &str) -> Self {
            Self {
                inner: MockWeatherClient::starting_at(START),
                slow_city: slow_city.to_string(),
                slow_units: Units::Metric,
                entered: Notify::new(),
                release: Notify::new(),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for GatedProvider {
        async fn current(
            &self,
            location: &LocationQuery,
            units: Units,
        ) -> Result<CurrentWeatherResponse, OpenWeatherError> {
            if *location == LocationQuery::city(self.slow_city.as_str()) && units == self.slow_units {
                self.entered.notify_one();
                self.release.notified().await;
            }
            self.inner.current(location, units).await
        }

        async fn forecast(
            &self,
            location: &LocationQuery,
            units: Units,
        ) -> Result<ForecastResponse, OpenWeatherError> {
            self.inner.forecast(location, units).await
        }
    }

    #[tokio::test]
    async fn test_search_populates_report_and_history() {
        let controller = mock_controller();
        let session = session();

        let view = controller.search(&session, "  Paris ").await;

        assert_eq!(view.phase, Phase::Ready);
        assert!(view.error.is_none());
        assert_eq!(view.daily.len(), 5);
        assert_eq!(view.hourly.len(), 12);
        assert_eq!(view.hourly[0].time, "00:00");
        assert_eq!(view.daily[0].day, "Mon");
        assert_eq!(view.daily[0].condition, "Rain");
        let current = view.current.unwrap();
        assert_eq!(current.label, "Paris, XX");
        assert_eq!(current.icon, "cloudy.svg");
        assert_eq!(view.history, vec!["Paris".to_string()]);
    }

    #[tokio::test]
    async fn test_blank_search_is_ignored() {
        let controller = mock_controller();
        let session = session();

        let view = controller.search(&session, "   ").await;
        assert_eq!(view.phase, Phase::Idle);
    }

    #[tokio::test]
    async fn test_history_after_repeated_searches() {
        let controller = mock_controller();
        let session = session();

        for city in ["Paris", "London", "Paris"] {
            controller.search(&session, city).await;
        }

        let view = session.lock().await.view();
        assert_eq!(view.history, vec!["Paris".to_string(), "London".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_city_fails_and_clears() {
        let controller = mock_controller();
        let session = session();

        controller.search(&session, "Paris").await;
        let view = controller.search(&session, "Atlantis").await;

        assert_eq!(view.phase, Phase::Failed);
        assert_eq!(view.error.as_deref(), Some("City not found"));
        assert!(view.current.is_none());
        assert!(view.daily.is_empty());
        assert!(view.hourly.is_empty());
        assert_eq!(view.history, vec!["Paris".to_string()]);
    }

    #[tokio::test]
    async fn test_forecast_failure_surfaces_message_without_history() {
        let controller = controller_with(Arc::new(BrokenForecast(MockWeatherClient::starting_at(START))));
        let session = session();

        let view = controller.search(&session, "Paris").await;

        assert_eq!(view.phase, Phase::Failed);
        assert!(view.error.unwrap().contains("502"));
        assert!(view.current.is_none());
        assert!(view.history.is_empty());
    }

    #[tokio::test]
    async fn test_location_acquired_and_denied() {
        let controller = mock_controller();
        let session = session();

        let view = controller
            .locate(&session, GeolocationOutcome::Acquired { lat: 51.5, lon: -0.12 })
            .await;
        assert_eq!(view.phase, Phase::Ready);
        assert_eq!(view.current.unwrap().city, "Mock 51.50,-0.12");

        let view = controller.locate(&session, GeolocationOutcome::Denied).await;
        assert_eq!(view.phase, Phase::Failed);
        assert_eq!(view.error.as_deref(), Some("Location access denied"));
        assert!(view.current.is_none());
        assert!(view.daily.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_refetches_in_other_units() {
        let controller = mock_controller();
        let session = session();

        let view = controller.toggle_units(&session).await;
        assert_eq!(view.units, Units::Imperial);
        assert_eq!(view.phase, Phase::Idle);

        controller.search(&session, "Paris").await;
        let view = controller.toggle_units(&session).await;
        assert_eq!(view.units, Units::Metric);
        assert_eq!(view.phase, Phase::Ready);

        let view = controller.toggle_units(&session).await;
        assert_eq!(view.units, Units::Imperial);
        let current = view.current.unwrap();
        assert!((current.temperature - 64.4).abs() < 0.01);
        assert_eq!(current.temperature_rounded, 64);
        // 64.4F is 18C: advice thresholds apply to Celsius.
        assert_eq!(current.advice.tip, "Comfortable weather for a walk.");
    }

    #[tokio::test]
    async fn test_superseded_fetch_does_not_overwrite_newer_result() {
        let provider = Arc::new(GatedProvider::new("Slowtown"));
        let controller = Arc::new(controller_with(provider.clone()));
        let session = session();

        let slow = {
            let controller = controller.clone();
            let session = session.clone();
            tokio::spawn(async move { controller.search(&session, "Slowtown").await })
        };
        provider.entered.notified().await;

        let fast_view = controller.search(&session, "Paris").await;
        assert_eq!(fast_view.phase, Phase::Ready);

        provider.release.notify_one();
        let slow_view = slow.await.unwrap();

        assert_eq!(slow_view.current.unwrap().city, "Paris");
        let view = session.lock().await.view();
        assert_eq!(view.current.unwrap().city, "Paris");
        assert_eq!(view.history, vec!["Paris".to_string()]);
    }

    #[tokio::test]
    async fn test_toggle_during_first_fetch_shows_new_units() {
        let provider = Arc::new(GatedProvider::new("Paris"));
        let controller = Arc::new(controller_with(provider.clone()));
        let session = session();

        let metric = {
            let controller = controller.clone();
            let session = session.clone();
            tokio::spawn(async move { controller.search(&session, "Paris").await })
        };
        provider.entered.notified().await;

        let view = controller.toggle_units(&session).await;
        assert_eq!(view.units, Units::Imperial);
        assert_eq!(view.phase, Phase::Ready);

        provider.release.notify_one();
        metric.await.unwrap();

        let view = session.lock().await.view();
        assert_eq!(view.units, Units::Imperial);
        assert_eq!(view.temperature_symbol, "F");
        let current = view.current.unwrap();
        assert!((current.temperature - 64.4).abs() < 0.01);
        assert_eq!(view.history, vec!["Paris".to_string()]);
    }

    fn reading(temp: f64, description: &str) -> CurrentWeatherResponse {
        serde_json::from_value(serde_json::json!({
            "name": "Testville",
            "main": { "temp": temp, "humidity": 40.0 },
            "weather": [{ "main": "Clear", "description": description }],
            "timezone": 0
        }))
        .unwrap()
    }

    #[test]
    fn test_advice_uses_rounded_temperature() {
        let warm = current_conditions(&reading(25.3, "clear sky"), Units::Metric);
        assert_eq!(warm.advice.tip, "A light jacket should be enough.");

        let chilly = current_conditions(&reading(4.6, "broken clouds"), Units::Metric);
        assert_eq!(chilly.advice.tip, "Bring a sweater.");

        let cold = current_conditions(&reading(4.4, "broken clouds"), Units::Metric);
        assert_eq!(cold.advice.tip, "Bundle up, it's cold!");
    }

    #[tokio::test]
    async fn test_suggest_falls_back_to_history() {
        let controller = mock_controller();
        let session = session();

        controller.search(&session, "London").await;
        controller.search(&session, "Paris").await;

        assert_eq!(controller.suggest(&session, "on").await, vec!["London".to_string()]);
        assert!(controller.suggest(&session, "").await.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_prefers_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("cities.csv");
        std::fs::write(&file, "city,country,state\nLondon,GB,\nLondon,CA,Ontario\nParis,FR,\n").unwrap();

        let controller = WeatherController::new(
            Arc::new(MockWeatherClient::starting_at(START)),
            Arc::new(CatalogLoader::new(Some(file.to_string_lossy().into_owned()))),
            chrono_tz::UTC,
        );
        let session = session();
        controller.search(&session, "Lonely").await;

        assert_eq!(
            controller.suggest(&session, "lon").await,
            vec!["London, GB".to_string(), "London, Ontario, CA".to_string()]
        );
    }
}
