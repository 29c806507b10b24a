//! HTTP client for the payment gateway's order and subscription APIs.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        CreateOrderRequest, CreateSubscriptionRequest, GatewayOrder, GatewaySubscription,
        PaymentGatewayPort,
    },
};

#[derive(Clone)]
pub struct GatewayClient {
    client: Client,
    base_url: String,
    key_id: String,
    key_secret: String,
}

impl GatewayClient {
    pub fn new(base_url: String, key_id: String, key_secret: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            key_id,
            key_secret,
        }
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.key_id, self.key_secret));
        format!("Basic {}", encoded)
    }

    async fn post_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> AppResult<T> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("Gateway request failed: {}", e)))?;

        self.handle_response(response).await
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to read gateway response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Payment gateway API error");

            if let Ok(error) = serde_json::from_str::<GatewayErrorResponse>(&body) {
                return Err(AppError::Gateway(format!(
                    "Gateway error: {}",
                    error.error.description.unwrap_or(error.error.code)
                )));
            }

            return Err(AppError::Gateway(format!(
                "Gateway API error: {} - {}",
                status, body
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse gateway response");
            AppError::Gateway(format!("Failed to parse gateway response: {}", e))
        })
    }
}

#[async_trait]
impl PaymentGatewayPort for GatewayClient {
    async fn create_order(&self, req: &CreateOrderRequest) -> AppResult<GatewayOrder> {
        let body = serde_json::json!({
            "amount": req.amount_cents,
            "currency": req.currency,
            "receipt": req.receipt,
            "notes": req.notes,
        });
        let order: OrderResponse = self.post_json("/orders", &body).await?;
        Ok(GatewayOrder {
            id: order.id,
            amount_cents: order.amount,
            currency: order.currency,
            status: order.status,
        })
    }

    async fn create_subscription(
        &self,
        req: &CreateSubscriptionRequest,
    ) -> AppResult<GatewaySubscription> {
        let body = serde_json::json!({
            "plan_id": req.plan_code,
            "notes": req.notes,
        });
        let sub: SubscriptionResponse = self.post_json("/subscriptions", &body).await?;
        Ok(GatewaySubscription {
            id: sub.id,
            status: sub.status,
            short_url: sub.short_url,
        })
    }
}

// ============================================================================
// Gateway wire types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OrderResponse {
    id: String,
    amount: i64,
    currency: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct SubscriptionResponse {
    id: String,
    status: String,
    short_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorResponse {
    error: GatewayErrorBody,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    code: String,
    description: Option<String>,
}
