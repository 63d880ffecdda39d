//! Patient facade handlers

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crossborder_core::LocalPatient;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::AppState;
use crate::error::AppError;
use crate::sync::PatientSearch;

/// Query parameters for patient creation
#[derive(Debug, Deserialize)]
pub struct CreateParams {
    /// JSON-encoded local patient
    pub patient: Option<String>,
}

/// GET /searchpatient - Search the MPI by identifiers, name, and gender
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<PatientSearch>,
) -> Response {
    tracing::info!("MPI patient search");

    let result = state
        .patients
        .search_by_params(&params)
        .await
        .map_err(AppError::from);

    respond(state.legacy_null_responses, result)
}

/// GET /createpatient - Register a local patient with the MPI
pub async fn create(
    State(state): State<AppState>,
    Query(params): Query<CreateParams>,
) -> Response {
    let result = create_patient(&state, params).await;
    respond(state.legacy_null_responses, result)
}

async fn create_patient(state: &AppState, params: CreateParams) -> Result<LocalPatient, AppError> {
    let encoded = params
        .patient
        .ok_or_else(|| AppError::BadRequest("Missing required parameter: patient".to_string()))?;

    let patient: LocalPatient = serde_json::from_str(&encoded)
        .map_err(|e| AppError::BadRequest(format!("Invalid patient: {}", e)))?;

    let created = state.patients.create(&patient).await?;
    tracing::info!(
        cross_border_id = created.cross_border_id().unwrap_or("none"),
        "Patient registered with MPI"
    );
    Ok(created)
}

/// Render a facade result.
///
/// In legacy mode every failure collapses to a `null` body with status 200,
/// which existing facade clients expect.
fn respond<T: Serialize>(legacy_null_responses: bool, result: Result<T, AppError>) -> Response {
    match result {
        Ok(body) => Json(body).into_response(),
        Err(e) if legacy_null_responses => {
            tracing::warn!(error = ?e, "Facade request failed, answering null");
            (StatusCode::OK, Json(JsonValue::Null)).into_response()
        }
        Err(e) => e.into_response(),
    }
}
