//! Port for the external payment gateway.
//!
//! The gateway is a black box that creates orders and subscriptions and
//! later notifies us through signed webhooks. Only the operations
//! reconciliation needs are modeled here; everything else the gateway can
//! do is out of scope.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::app_error::AppResult;

/// Request to create a one-time order on the gateway.
///
/// `notes` is the opaque metadata map the gateway echoes back verbatim in
/// webhook payloads. It must carry every fact reconciliation needs later,
/// because webhook handlers trust nothing but gateway-echoed notes plus
/// the verified signature.
#[derive(Debug, Clone)]
pub struct CreateOrderRequest {
    pub amount_cents: i64,
    pub currency: String,
    pub receipt: String,
    pub notes: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub status: String,
}

/// Request to create a recurring subscription on the gateway.
#[derive(Debug, Clone)]
pub struct CreateSubscriptionRequest {
    /// Gateway-side plan identifier (we pass our catalog plan id plus the
    /// cycle, e.g. "pro-monthly").
    pub plan_code: String,
    pub notes: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct GatewaySubscription {
    pub id: String,
    pub status: String,
    /// Hosted checkout URL for the client to complete payment, when the
    /// gateway provides one.
    pub short_url: Option<String>,
}

#[async_trait]
pub trait PaymentGatewayPort: Send + Sync {
    async fn create_order(&self, req: &CreateOrderRequest) -> AppResult<GatewayOrder>;

    async fn create_subscription(
        &self,
        req: &CreateSubscriptionRequest,
    ) -> AppResult<GatewaySubscription>;
}
