mod handlers;
mod routes;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{routing::get, Json, Router};
use log::{info, warn};
use serde_json::{json, Value};
use sqlx::{Pool, Sqlite};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};

use crate::config::Settings;
use crate::services::currency_client::{ExchangeRateHostClient, RateSource};

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Sqlite>,
    pub settings: Arc<Settings>,
    pub rates: Arc<dyn RateSource>,
}

impl AppState {
    pub fn new(db: Pool<Sqlite>, settings: Settings, rates: Arc<dyn RateSource>) -> Self {
        Self {
            db,
            settings: Arc::new(settings),
            rates,
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) if o != "*" => Some(v),
            _ => {
                warn!("ignoring invalid CORS origin {o:?}");
                None
            }
        })
        .collect();

    // Credentials rule out wildcard methods/headers, so mirror the preflight instead.
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.cors_origins);

    Router::new()
        .route("/health", get(health))
        .merge(routes::api_routes())
        .layer(cors)
        .with_state(state)
}

pub async fn run_server(pool: Pool<Sqlite>, settings: Settings) -> anyhow::Result<()> {
    let rates = ExchangeRateHostClient::from_settings(&settings)?;
    info!(
        "base currency {}, FX endpoint {} (/{})",
        settings.base_currency,
        settings.exchange_api_base,
        if settings.exchange_api_key.is_some() { "live" } else { "latest" }
    );

    let addr = settings.server_addr;
    let state = AppState::new(pool, settings, Arc::new(rates));
    let app = app(state);

    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
