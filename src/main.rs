use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod advice;
mod autocomplete;
mod catalog;
mod config;
mod controller;
mod forecast;
mod routes;
mod session;
mod utils;

use catalog::CatalogLoader;
use config::Config;
use controller::WeatherController;
use forecast::mock::MockWeatherClient;
use forecast::openweather::OpenWeatherClient;
use forecast::provider::WeatherProvider;
use routes::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weather_assistant_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let zone = config.display_timezone()?;

    // Initialize weather provider
    let provider: Arc<dyn WeatherProvider> = if config.use_mock_provider {
        tracing::warn!("WEATHER_MOCK is set, serving generated weather data");
        Arc::new(MockWeatherClient::new())
    } else {
        Arc::new(OpenWeatherClient::new(config.clone())?)
    };

    let catalog = match config.city_catalog_source.clone() {
        Some(source) => Arc::new(CatalogLoader::new(Some(source))),
        None => {
            tracing::info!("CITY_CATALOG_SOURCE not set, suggestions come from search history");
            Arc::new(CatalogLoader::disabled())
        }
    };
    let controller = Arc::new(WeatherController::new(provider, catalog, zone));

    let config = Arc::new(config);

    // Create application state
    let state = AppState {
        config: config.clone(),
        controller,
        sessions: session::init_store(),
    };

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!(
        "Server starting on http://{} (display timezone {})",
        config.bind_addr,
        zone
    );

    axum::serve(listener, app).await?;

    Ok(())
}
