// SPDX-License-Identifier: MIT
//
// OData Destination Proxy
// https://github.com/yourusername/odata-destination-proxy

//! OData Destination Gateway - HTTP front of the proxy
//!
//! Maps incoming paths to OData entity sets, validates them against the
//! fixed allow-list, and relays the JSON returned by the backing OData
//! service. Every data request runs the full chain: OAuth token exchange,
//! destination lookup, entity fetch.
//!
//! # Routes
//!
//! - `GET /` - static status text, no upstream calls
//! - `GET /products` - relay the "Products" entity set
//! - `GET /odata/:entity` - relay any allow-listed entity set
//! - `GET /{EntitySet}` - one fixed route per allow-listed entity set

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use clap::Parser;
use odp_core::{
    config::{GatewayConfig, ServiceCredentials},
    entities,
    fetcher::EntityFetcher,
    Error, ENTITY_SETS,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "odp-gateway")]
#[command(about = "OData Destination Gateway - Relays OData entity sets via a managed destination", long_about = None)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    fetcher: EntityFetcher,
}

/// Per-request error translated at the router boundary
///
/// Upstream status and body go to the server log only; response bodies carry
/// a short generic message.
struct AppError(Error);

impl From<Error> for AppError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.0 {
            Error::InvalidEntity(name) => {
                let body = format!(
                    "Invalid entity set '{}'. Allowed entity sets: {}",
                    name,
                    entities::allowed_list()
                );
                (StatusCode::BAD_REQUEST, body).into_response()
            }
            err => {
                error!(
                    upstream_status = ?err.upstream_status(),
                    "Request failed: {}", err
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fetch data from the destination service",
                )
                    .into_response()
            }
        }
    }
}

/// GET / - Static status text
async fn index() -> &'static str {
    "OData destination proxy is up. Try /products or /odata/{EntitySet}."
}

/// GET /products - Relay the Products entity set
async fn serve_products(State(state): State<AppState>) -> std::result::Result<Response, AppError> {
    relay(&state, "Products").await
}

/// GET /odata/:entity - Relay an allow-listed entity set
async fn serve_odata(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> std::result::Result<Response, AppError> {
    if !entities::is_allowed(&entity) {
        return Err(AppError(Error::InvalidEntity(entity)));
    }
    relay(&state, &entity).await
}

/// Run the fetch chain for one entity set and wrap the body as JSON
async fn relay(state: &AppState, entity: &str) -> std::result::Result<Response, AppError> {
    let body = state.fetcher.fetch_entity(entity).await?;
    Ok(Json(body).into_response())
}

/// Build the router
///
/// The eight fixed entity routes are registered from the allow-list table,
/// so the set of routes and the set of valid `/odata/:entity` values can
/// never drift apart.
fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/", get(index))
        .route("/products", get(serve_products))
        .route("/odata/:entity", get(serve_odata));

    for name in ENTITY_SETS {
        router = router.route(
            &format!("/{}", name),
            get(move |State(state): State<AppState>| async move { relay(&state, name).await }),
        );
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = args
        .log_level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    info!("OData Destination Gateway v{}", env!("CARGO_PKG_VERSION"));

    // Missing service binding is fatal before any port is bound
    let credentials = ServiceCredentials::from_env()
        .context("Failed to load destination service binding")?;

    let config = GatewayConfig::from_env().context("Failed to load gateway settings")?;

    info!("Destination name: {}", config.destination_name);
    info!("Entity sets: {}", entities::allowed_list());

    let fetcher = EntityFetcher::new(credentials, config.destination_name.clone())
        .context("Failed to initialize entity fetcher")?;

    let app = build_router(AppState { fetcher });

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
