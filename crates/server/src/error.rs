//! Application error handling

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use crossborder_core::{IssueType, OperationOutcome};

use crate::sync::SyncError;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    /// The patient cannot be represented as a FHIR resource
    Unprocessable(String),
    /// The MPI could not be reached or answered with something unreadable
    BadGateway(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, outcome) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, OperationOutcome::invalid(&msg)),
            AppError::Unprocessable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                OperationOutcome::error(IssueType::Required, &msg),
            ),
            AppError::BadGateway(msg) => (
                StatusCode::BAD_GATEWAY,
                OperationOutcome::error(IssueType::Transient, &msg),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                OperationOutcome::error(IssueType::Exception, &msg),
            ),
        };

        (status, Json(outcome)).into_response()
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Conversion(e) => AppError::Unprocessable(e.to_string()),
            SyncError::WireFormat(e) => AppError::BadGateway(e.to_string()),
            SyncError::Transport(e) => AppError::BadGateway(e.to_string()),
            SyncError::Serialize(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<deadpool_postgres::PoolError> for AppError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        AppError::Internal(format!("Database pool error: {}", err))
    }
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        AppError::Internal(format!("Database error: {}", err))
    }
}

/// Failure to assemble the application at start-up
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] deadpool_postgres::CreatePoolError),

    #[error("Failed to create MPI gateway: {0}")]
    Gateway(#[from] crate::gateway::TransportError),
}
