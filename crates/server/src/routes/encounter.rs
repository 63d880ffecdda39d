//! Cross-border encounter listing

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::AppState;
use crate::db::EncounterRepository;
use crate::error::AppError;

const DATE_FORMAT_MESSAGE: &str = "Invalid date format. Please use 'yyyy-MM-dd'.";

/// Query parameters for encounter listing
#[derive(Debug, Deserialize, Default)]
pub struct EncounterParams {
    pub fromdate: Option<String>,
    pub todate: Option<String>,
}

/// GET /cbencounter - List referral and screening encounters
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<EncounterParams>,
) -> Result<impl IntoResponse, AppError> {
    let from = parse_date(params.fromdate.as_deref())?;
    let to = parse_date(params.todate.as_deref())?;

    let repo = EncounterRepository::new(state.pool);
    let encounters = repo.list(from, to).await?;

    tracing::debug!(count = encounters.len(), "Listed cross-border encounters");
    Ok(Json(encounters))
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d")
                .map_err(|_| AppError::BadRequest(DATE_FORMAT_MESSAGE.to_string()))
        })
        .transpose()
}
