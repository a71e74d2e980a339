use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::usecases::{coupons::CouponError, subscriptions::SubscriptionError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Forbidden")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            _ => AppError::BadRequest(message),
        }
    }
}

impl From<CouponError> for AppError {
    fn from(err: CouponError) -> Self {
        match err {
            CouponError::Internal(inner) => AppError::Internal(inner),
            other => AppError::from_status(other.status_code(), other.to_string()),
        }
    }
}

impl From<SubscriptionError> for AppError {
    fn from(err: SubscriptionError) -> Self {
        match err {
            SubscriptionError::Internal(inner) => AppError::Internal(inner),
            other => AppError::from_status(other.status_code(), other.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(
            status = rejection.status().as_u16(),
            reason = %rejection.body_text(),
            "http: request body rejected"
        );
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        warn!(
            status = rejection.status().as_u16(),
            reason = %rejection.body_text(),
            "http: path parameter rejected"
        );
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(err) => {
                // Logged here, never sent to the client.
                error!(error = ?err, "http: internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
