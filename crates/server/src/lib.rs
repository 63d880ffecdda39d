//! crossborder-server library crate
//!
//! Exposes `build_app`, `AppState` and the MPI sync service for integration
//! tests. The binary entrypoint is in `main.rs`.

pub mod config;
pub mod db;
pub mod error;
pub mod gateway;
mod middleware;
mod routes;
pub mod sync;

use axum::{Router, middleware as axum_mw, routing::get};
use crossborder_core::{InMemoryAttributeTypes, PatientConverter};
use deadpool_postgres::Pool;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use error::StartupError;
use gateway::HttpGateway;
use sync::MpiSyncService;

pub use middleware::REQUEST_ID_HEADER;

/// Path under which the cross-border facade is served
pub const FACADE_PREFIX: &str = "/rest/v1/kemrcrossborder";

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub patients: Arc<MpiSyncService>,
    pub pool: Pool,
    pub legacy_null_responses: bool,
}

impl AppState {
    /// Assemble the MPI sync service and host database pool from configuration
    pub fn from_config(config: &Config) -> Result<Self, StartupError> {
        let attribute_types = InMemoryAttributeTypes::new(config.person_attribute_types.clone());
        let converter = PatientConverter::new(Arc::new(attribute_types));
        let gateway = HttpGateway::new(&config.mpi)?;

        Ok(Self {
            patients: Arc::new(MpiSyncService::new(gateway, converter)),
            pool: db::create_pool(&config.database_url)?,
            legacy_null_responses: config.legacy_null_responses,
        })
    }
}

/// Build the full application router with all routes and middleware.
///
/// Extracted from `main()` so integration tests can construct the app
/// without binding to a TCP port.
pub fn build_app(state: AppState, config: &Config) -> Router {
    // Install Prometheus metrics recorder.
    // Use build_recorder() + set_global_recorder() so that repeated calls
    // (e.g. in integration tests) don't panic; the second install is
    // silently ignored and we still get a valid handle for /metrics.
    let recorder = metrics_exporter_prometheus::PrometheusBuilder::new().build_recorder();
    let prometheus_handle = recorder.handle();
    let _ = metrics::set_global_recorder(recorder);

    let public_routes = Router::new()
        .route("/health", get(routes::health::check))
        .route("/metrics", get(routes::metrics::get))
        .layer(axum::Extension(prometheus_handle));

    let cors = if config.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(public_routes)
        .nest(FACADE_PREFIX, routes::crossborder_routes())
        .with_state(state)
        .layer(axum_mw::from_fn(middleware::audit_middleware))
        .layer(axum_mw::from_fn(middleware::request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum_mw::from_fn(middleware::metrics_middleware))
}
