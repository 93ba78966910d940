use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::models::registration::REGISTRATION_FEE_SUBUNITS;
use crate::services::registration_service::{self, RegistrationInput};
use crate::state::AppState;

/// The form JS submits age as a string; other clients may send a number.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AgeField {
    Number(i64),
    Text(String),
}

impl Default for AgeField {
    fn default() -> Self {
        AgeField::Text(String::new())
    }
}

impl AgeField {
    fn into_string(self) -> String {
        match self {
            AgeField::Number(n) => n.to_string(),
            AgeField::Text(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: AgeField,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: String,
}

pub async fn create_order_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<Json<Value>, ApiError> {
    let input = RegistrationInput {
        name: payload.name,
        age: payload.age.into_string(),
        unit: payload.unit,
        sector: payload.sector,
        phone_number: payload.phone_number,
    };
    let form = registration_service::validate_registration(&input).map_err(ApiError::BadRequest)?;

    let receipt = format!("receipt_{}", Utc::now().timestamp_millis());
    let order = state
        .gateway
        .create_order(
            REGISTRATION_FEE_SUBUNITS,
            &receipt,
            json!({
                "name": form.name,
                "age": form.age,
                "unit": form.unit,
                "sector": form.sector,
                "phoneNumber": form.phone_number,
            }),
        )
        .await?;

    Ok(Json(json!({
        "success": true,
        "orderId": order.id,
        "amount": order.amount,
        "currency": order.currency,
        "key": state.gateway.key_id(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub razorpay_payment_id: String,
    #[serde(default)]
    pub razorpay_order_id: String,
    #[serde(default)]
    pub razorpay_signature: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub age: AgeField,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub sector: String,
    #[serde(default, rename = "phoneNumber")]
    pub phone_number: String,
}

pub async fn verify_payment_handler(
    State(state): State<AppState>,
    Json(payload): Json<VerifyPaymentRequest>,
) -> Result<Json<Value>, ApiError> {
    if payload.razorpay_payment_id.is_empty()
        || payload.razorpay_order_id.is_empty()
        || payload.razorpay_signature.is_empty()
    {
        return Err(ApiError::BadRequest(
            "Missing payment callback fields".to_string(),
        ));
    }

    // Never trust client-supplied callback values without checking the
    // gateway signature.
    if !state.gateway.verify_signature(
        &payload.razorpay_order_id,
        &payload.razorpay_payment_id,
        &payload.razorpay_signature,
    ) {
        warn!(
            "Signature mismatch for order {} / payment {}",
            payload.razorpay_order_id, payload.razorpay_payment_id
        );
        return Err(ApiError::BadRequest(
            "Payment signature verification failed".to_string(),
        ));
    }

    let input = RegistrationInput {
        name: payload.name,
        age: payload.age.into_string(),
        unit: payload.unit,
        sector: payload.sector,
        phone_number: payload.phone_number,
    };
    let form = registration_service::validate_registration(&input).map_err(ApiError::BadRequest)?;

    let registration_id = registration_service::create_completed_registration(
        &state.pool,
        &form,
        &payload.razorpay_payment_id,
        &payload.razorpay_order_id,
    )
    .await?;

    Ok(Json(json!({
        "success": true,
        "message": "Registration successful!",
        "registrationId": registration_id,
    })))
}
