use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    config::Config,
    controller::{GeolocationOutcome, WeatherController},
    session::{SessionHandle, SessionState, SessionStore, SessionView},
    utils::{sanitize_string, validate_coordinates, ErrorResponse},
};

const MAX_CITY_LENGTH: usize = 100;

// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub controller: Arc<WeatherController>,
    pub sessions: SessionStore,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: &str, code: &str) -> ApiError {
    (status, Json(ErrorResponse::new(error, code)))
}

// Request/Response types
#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub city: String,
}

#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    #[serde(default)]
    pub denied: bool,
}

impl LocationRequest {
    fn outcome(&self) -> Result<GeolocationOutcome, String> {
        if self.denied {
            return Ok(GeolocationOutcome::Denied);
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => {
                validate_coordinates(lat, lon)?;
                Ok(GeolocationOutcome::Acquired { lat, lon })
            }
            _ => Err("Provide lat and lon, or denied: true".to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session_id: Uuid,
    pub session: SessionView,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<String>,
}

async fn find_session(state: &AppState, id: Uuid) -> Result<SessionHandle, ApiError> {
    state.sessions.get(&id).await.ok_or_else(|| {
        api_error(StatusCode::NOT_FOUND, "Session not found", "SESSION_NOT_FOUND")
    })
}

// Route handlers
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

pub async fn create_session(State(state): State<AppState>) -> (StatusCode, Json<SessionCreated>) {
    let id = Uuid::new_v4();
    let session = SessionState::new(state.config.default_units);
    let view = session.view();
    state
        .sessions
        .insert(id, Arc::new(tokio::sync::Mutex::new(session)))
        .await;

    tracing::debug!("Created session {}", id);
    (
        StatusCode::CREATED,
        Json(SessionCreated {
            session_id: id,
            session: view,
        }),
    )
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    let view = session.lock().await.view();
    Ok(Json(view))
}

pub async fn search(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    let city = sanitize_string(&request.city, MAX_CITY_LENGTH);
    Ok(Json(state.controller.search(&session, &city).await))
}

pub async fn locate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<LocationRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    let outcome = request
        .outcome()
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, &e, "INVALID_LOCATION"))?;
    Ok(Json(state.controller.locate(&session, outcome).await))
}

pub async fn toggle_units(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    let session = find_session(&state, id).await?;
    Ok(Json(state.controller.toggle_units(&session).await))
}

pub async fn suggestions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<SuggestionQuery>,
) -> Result<Json<SuggestionsResponse>, ApiError> {
    let session = find_session(&state, id).await?;
    let query = params.q.unwrap_or_default();
    let suggestions = state.controller.suggest(&session, &query).await;
    Ok(Json(SuggestionsResponse { suggestions }))
}

// Create the router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(create_session))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/search", post(search))
        .route("/sessions/:id/location", post(locate))
        .route("/sessions/:id/units/toggle", post(toggle_units))
        .route("/sessions/:id/suggestions", get(suggestions))
        .with_state(state)
}
