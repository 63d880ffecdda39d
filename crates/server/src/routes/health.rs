//! Health check endpoint

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// GET /health - Check host database connectivity
pub async fn check(State(state): State<AppState>) -> impl IntoResponse {
    let reason = match state.pool.get().await {
        Ok(client) => match client.query_one("SELECT 1", &[]).await {
            Ok(_) => None,
            Err(e) => {
                tracing::error!(error = %e, "Health check query failed");
                Some(format!("Database query failed: {}", e))
            }
        },
        Err(e) => {
            tracing::error!(error = %e, "Health check pool error");
            Some(format!("Database connection failed: {}", e))
        }
    };

    match reason {
        None => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                reason: None,
            }),
        ),
        Some(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unhealthy".to_string(),
                reason: Some(reason),
            }),
        ),
    }
}
