use hmac::{Hmac, Mac};
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use thiserror::Error;

use crate::config::Config;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway rejected the API credentials")]
    Auth,
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("gateway returned status {0}")]
    Status(u16),
}

#[derive(Debug, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Thin client for the payment gateway's order API. Built once at startup,
/// cloned into handlers with the rest of the state.
#[derive(Clone)]
pub struct PaymentGateway {
    client: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl PaymentGateway {
    pub fn new(config: &Config) -> Self {
        PaymentGateway {
            client: reqwest::Client::new(),
            base_url: config.razorpay_base_url.trim_end_matches('/').to_string(),
            key_id: config.razorpay_key_id.clone(),
            key_secret: config.razorpay_key_secret.clone(),
        }
    }

    /// The checkout key the browser script needs.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create a provider-side order for `amount` subunits. The form fields
    /// travel along as order notes so the payment can be traced back to the
    /// submission from the gateway dashboard.
    pub async fn create_order(
        &self,
        amount: i64,
        receipt: &str,
        notes: serde_json::Value,
    ) -> Result<GatewayOrder, GatewayError> {
        let url = format!("{}/v1/orders", self.base_url);
        let resp = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount,
                "currency": "INR",
                "receipt": receipt,
                "notes": notes,
            }))
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 401 {
            return Err(GatewayError::Auth);
        }
        if !status.is_success() {
            return Err(GatewayError::Status(status.as_u16()));
        }

        Ok(resp.json::<GatewayOrder>().await?)
    }

    /// Check the checkout callback signature: HMAC-SHA256 over
    /// `"{order_id}|{payment_id}"` keyed with the API secret, hex-encoded.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        expected_signature(&self.key_secret, order_id, payment_id) == signature.to_lowercase()
    }
}

fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
