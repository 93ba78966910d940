use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::services::payment_service::GatewayError;
use crate::services::storage_service::StorageError;

/// Error surface for the JSON API endpoints. Every variant maps to one
/// status code and a `{"error": "..."}` body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("registration not found")]
    NotFound,

    #[error("registration store unavailable, try again later")]
    StoreUnavailable,

    #[error(
        "payment gateway authentication failed, check RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET"
    )]
    GatewayAuth,

    #[error("failed to create order")]
    Gateway(#[source] GatewayError),

    #[error("failed to store payment screenshot")]
    Storage(#[from] StorageError),

    #[error("failed to save registration")]
    Database(#[from] sqlx::Error),
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        match e {
            GatewayError::Auth => ApiError::GatewayAuth,
            other => ApiError::Gateway(other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::GatewayAuth
            | ApiError::Gateway(_)
            | ApiError::Storage(_)
            | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self {
                ApiError::Gateway(e) => error!("Gateway error: {e}"),
                ApiError::Storage(e) => error!("Storage error: {e}"),
                ApiError::Database(e) => error!("Database error: {e}"),
                _ => error!("{self}"),
            }
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
