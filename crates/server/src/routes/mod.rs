pub mod encounter;
pub mod health;
pub mod metrics;
mod patient;

use axum::{Router, routing::get};

use crate::AppState;

/// Build the cross-border facade routes
pub fn crossborder_routes() -> Router<AppState> {
    Router::new()
        .route("/searchpatient", get(patient::search))
        .route("/createpatient", get(patient::create))
        .route("/cbencounter", get(encounter::list))
}
