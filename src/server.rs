use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, Method},
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    handlers::{self, AppState},
    metrics,
    signals::setup_signal_handlers,
};

/// Pricing documents are small; anything bigger is a client error
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Start the calculator API server
///
/// This function:
/// 1. Initializes metrics (when enabled)
/// 2. Builds the pricing store from the storage config
/// 3. Sets up signal handlers for graceful shutdown and config reload
/// 4. Binds to the configured address and serves until shutdown
pub async fn start_server(config: Config, config_path: PathBuf) -> Result<()> {
    let metrics_handle = if config.metrics.enabled {
        info!("Initializing Prometheus metrics...");
        Some(Arc::new(metrics::init_metrics()?))
    } else {
        None
    };

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let state = AppState::from_config(config)?;
    log_storage_mode(&state);

    // SIGTERM, SIGINT for shutdown; SIGHUP for reload
    let (shutdown_tx, signal_handle) = setup_signal_handlers(state.clone(), config_path)?;
    let mut shutdown_rx = shutdown_tx.subscribe();

    let app = create_router(state, metrics_handle);

    info!("Starting BIM cost calculator on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.recv().await;
            info!("Shutdown signal received, draining connections...");
        })
        .await?;

    signal_handle.await?;
    info!("Server stopped gracefully");

    Ok(())
}

fn log_storage_mode(state: &AppState) {
    let store = state.store();
    match store.remote_source() {
        Some(source) => info!(
            remote = %source,
            fallback = %store.static_path().display(),
            "Pricing store configured"
        ),
        None => info!(
            fallback = %store.static_path().display(),
            "No remote store configured, running in static read-only mode"
        ),
    }
}

/// Create the Axum router with all routes and middleware
pub fn create_router(state: AppState, metrics_handle: Option<Arc<PrometheusHandle>>) -> Router {
    let metrics_endpoint = state.config.load().metrics.endpoint.clone();

    let api = Router::new()
        .route(
            "/auth",
            post(handlers::auth::handle_auth).options(handlers::preflight),
        )
        .route(
            "/pricing",
            get(handlers::pricing::get_pricing)
                .post(handlers::pricing::save_pricing)
                .options(handlers::preflight),
        )
        .route(
            "/quote",
            post(handlers::quote::handle_quote).options(handlers::preflight),
        )
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .with_state(state);

    let app = match metrics_handle {
        Some(handle) => api.merge(
            Router::new()
                .route(&metrics_endpoint, get(handlers::metrics_handler::metrics))
                .with_state(handle),
        ),
        None => api,
    };

    app.layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

/// Any origin may call the API; the admin page and calculator are static files
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
