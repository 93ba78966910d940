use axum::{extract::Multipart, extract::State, Json};
use serde_json::{json, Value};
use tracing::warn;

use crate::database::registration_repo;
use crate::error::ApiError;
use crate::services::registration_service::{self, RegistrationInput};
use crate::services::storage_service;
use crate::state::AppState;

struct UploadedScreenshot {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Screenshot-flow registration: multipart form fields plus the
/// `paymentScreenshot` file. The record lands as `pending` until an admin
/// decides on it.
pub async fn register_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    // Fail fast when the store is down instead of accepting an upload we
    // cannot persist.
    if let Err(e) = registration_repo::ping(&state.pool).await {
        warn!("Registration store unavailable: {e}");
        return Err(ApiError::StoreUnavailable);
    }

    let mut input = RegistrationInput::default();
    let mut transaction_id: Option<String> = None;
    let mut screenshot: Option<UploadedScreenshot> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "paymentScreenshot" => {
                let filename = field.file_name().unwrap_or("screenshot").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?;
                screenshot = Some(UploadedScreenshot {
                    filename,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            other => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {e}")))?;
                match other {
                    "name" => input.name = value,
                    "age" => input.age = value,
                    "unit" => input.unit = value,
                    "sector" => input.sector = value,
                    "phoneNumber" => input.phone_number = value,
                    "transactionId" => {
                        let v = value.trim().to_string();
                        if !v.is_empty() {
                            transaction_id = Some(v);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    let form = registration_service::validate_registration(&input).map_err(ApiError::BadRequest)?;

    let Some(screenshot) = screenshot else {
        return Err(ApiError::BadRequest(
            "Payment screenshot is required".to_string(),
        ));
    };
    storage_service::validate_screenshot(&screenshot.content_type, screenshot.bytes.len())
        .map_err(ApiError::BadRequest)?;

    let screenshot_ref = state
        .storage
        .store(
            &screenshot.filename,
            &screenshot.content_type,
            &screenshot.bytes,
        )
        .await?;

    let registration_id = registration_service::create_pending_registration(
        &state.pool,
        &form,
        &screenshot_ref,
        transaction_id.as_deref(),
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration received, payment pending verification",
        "registrationId": registration_id,
    })))
}
