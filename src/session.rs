//! Per-browser session state and its transitions.
//!
//! A session moves Idle -> Loading -> Ready | Failed, and back to Loading on
//! the next request. Transitions consume the current [`SessionState`] and
//! return the next one, so each can be tested on its own. Every request gets
//! a [`RequestToken`]; a completion whose token is no longer the latest is
//! ignored, so an older fetch that finishes late cannot overwrite a newer one.

use crate::forecast::openweather::OpenWeatherError;
use crate::forecast::types::{CurrentConditions, DaySummary, HourlyPoint, LocationQuery, Units, WeatherReport};
use moka::future::Cache;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

pub const HISTORY_LIMIT: usize = 5;

pub type SessionHandle = Arc<Mutex<SessionState>>;
pub type SessionStore = Cache<Uuid, SessionHandle>;

pub fn init_store() -> SessionStore {
    Cache::builder()
        .max_capacity(10_000)
        .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes
        .build()
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Network(String),
    #[error("Location access denied")]
    PermissionDenied,
}

impl FetchError {
    pub fn from_provider(err: OpenWeatherError, location: &LocationQuery) -> Self {
        match err {
            OpenWeatherError::NotFound | OpenWeatherError::InvalidCoordinates => {
                Self::NotFound(location.not_found_message().to_string())
            }
            other => Self::Network(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// Recently searched city names, newest first, no duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchHistory {
    names: Vec<String>,
}

impl SearchHistory {
    pub fn push(&mut self, name: &str) {
        self.names.retain(|n| n != name);
        self.names.insert(0, name.to_string());
        self.names.truncate(HISTORY_LIMIT);
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionState {
    phase: Phase,
    units: Units,
    error: Option<String>,
    report: Option<WeatherReport>,
    history: SearchHistory,
    pending: Option<LocationQuery>,
    last_request: Option<LocationQuery>,
    latest_token: u64,
}

impl SessionState {
    pub fn new(units: Units) -> Self {
        Self {
            units,
            ..Self::default()
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn report(&self) -> Option<&WeatherReport> {
        self.report.as_ref()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn is_latest(&self, token: RequestToken) -> bool {
        token.0 == self.latest_token
    }

    fn issue_token(&mut self) -> RequestToken {
        self.latest_token += 1;
        RequestToken(self.latest_token)
    }

    /// Start a fetch for `location`. The previous report stays visible while
    /// loading.
    pub fn begin(mut self, location: LocationQuery) -> (Self, RequestToken) {
        let token = self.issue_token();
        self.phase = Phase::Loading;
        self.error = None;
        self.pending = Some(location);
        (self, token)
    }

    /// Apply a successful fetch, unless a newer request has been issued.
    pub fn complete(mut self, token: RequestToken, location: LocationQuery, report: WeatherReport) -> Self {
        if !self.is_latest(token) {
            return self;
        }

        self.history.push(&report.current.city);
        self.pending = None;
        self.phase = Phase::Ready;
        self.error = None;
        self.report = Some(report);
        self.last_request = Some(location);
        self
    }

    /// Apply a failed fetch, unless a newer request has been issued.
    pub fn fail(mut self, token: RequestToken, error: &FetchError) -> Self {
        if !self.is_latest(token) {
            return self;
        }

        self.settle_failed(error);
        self
    }

    /// The browser refused geolocation. This supersedes any fetch in flight.
    pub fn deny_location(mut self) -> Self {
        self.issue_token();
        self.settle_failed(&FetchError::PermissionDenied);
        self
    }

    /// Flip the unit system. Returns the request to re-issue: the one in
    /// flight while loading, otherwise the last successful one.
    ///
    /// Re-issuing supersedes any fetch still running in the old units.
    pub fn toggle_units(mut self) -> (Self, Option<(LocationQuery, RequestToken)>) {
        self.units = self.units.toggled();

        let location = match self.phase {
            Phase::Loading => self.pending.clone(),
            _ => self.last_request.clone(),
        };

        match location {
            Some(location) => {
                let (next, token) = self.begin(location.clone());
                (next, Some((location, token)))
            }
            None => (self, None),
        }
    }

    fn settle_failed(&mut self, error: &FetchError) {
        self.pending = None;
        self.phase = Phase::Failed;
        self.error = Some(error.to_string());
        self.report = None;
    }

    pub fn view(&self) -> SessionView {
        let report = self.report();
        SessionView {
            phase: self.phase(),
            loading: self.phase() == Phase::Loading,
            units: self.units,
            temperature_symbol: self.units.temperature_symbol(),
            wind_speed_unit: self.units.wind_speed_unit(),
            error: self.error().map(str::to_string),
            current: report.map(|r| r.current.clone()),
            daily: report.map(|r| r.daily.clone()).unwrap_or_default(),
            hourly: report.map(|r| r.hourly.clone()).unwrap_or_default(),
            history: self.history.as_slice().to_vec(),
        }
    }
}

/// What the presentation layer renders.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub phase: Phase,
    pub loading: bool,
    pub units: Units,
    pub temperature_symbol: &'static str,
    pub wind_speed_unit: &'static str,
    pub error: Option<String>,
    pub current: Option<CurrentConditions>,
    pub daily: Vec<DaySummary>,
    pub hourly: Vec<HourlyPoint>,
    pub history: Vec<String>,
}
