//! Payment gateway client and signature verification.
//!
//! The gateway contract is small: opening an order posts
//! `{amount, currency, receipt}` (amount in integer minor units) and returns
//! the gateway's order id; confirming a payment means recomputing
//! `hex(HMAC-SHA256(secret, orderId + "|" + paymentId))` and comparing it
//! case-insensitively against the signature the checkout page handed to the
//! client.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use sha2::Sha256;
use std::sync::Arc;
use templatehub_common::{AppError, AppResult, config::PaymentConfig};

/// A gateway-side order for a pending charge.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayOrder {
    /// Gateway order id, echoed back during signature verification.
    pub id: String,
}

/// Trait for opening orders with the payment gateway.
///
/// This keeps the order workflow independent of the HTTP client, and lets
/// tests substitute a canned gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a gateway order for `amount_minor` minor units.
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder>;
}

/// Type alias for a shared payment gateway.
pub type PaymentService = Arc<dyn PaymentGateway>;

/// HTTP payment gateway client (basic-auth JSON API).
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    api_url: String,
    key_id: String,
    key_secret: String,
}

impl HttpPaymentGateway {
    /// Create a new gateway client from configuration.
    #[must_use]
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder> {
        let response = self
            .client
            .post(format!("{}/orders", self.api_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_minor,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Payment order creation failed: {e}")))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalService(format!(
                "Payment order creation failed: gateway returned {}",
                response.status()
            )));
        }

        response
            .json::<GatewayOrder>()
            .await
            .map_err(|e| AppError::ExternalService(format!("Payment order creation failed: {e}")))
    }
}

/// Compute the expected payment signature for a gateway order/payment pair.
///
/// Lowercase hex of `HMAC-SHA256(secret, orderId + "|" + paymentId)`.
#[must_use]
#[allow(clippy::expect_used)] // HMAC accepts any key size, this cannot fail
pub fn payment_signature(secret: &str, gateway_order_id: &str, payment_id: &str) -> String {
    use hmac::{Hmac, Mac};

    type HmacSha256 = Hmac<Sha256>;

    let payload = format!("{gateway_order_id}|{payment_id}");
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(payload.as_bytes());

    hex::encode(mac.finalize().into_bytes())
}

/// Compare a client-supplied signature against the expected one,
/// case-insensitively.
#[must_use]
pub fn signature_matches(expected: &str, supplied: &str) -> bool {
    expected.eq_ignore_ascii_case(supplied)
}
