use serde::{Deserialize, Serialize};

/// Whether an intent buys a recurring subscription or a one-time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "intent_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Subscription,
    Order,
}

impl IntentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Subscription => "subscription",
            IntentKind::Order => "order",
        }
    }
}

/// Status of a payment intent. Intents start `created`; reconciliation
/// moves them to `confirmed` or `failed` when the gateway reports the
/// terminal outcome. Rows are kept forever for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "intent_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    Created,
    Confirmed,
    Failed,
}

impl IntentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::Created => "created",
            IntentStatus::Confirmed => "confirmed",
            IntentStatus::Failed => "failed",
        }
    }
}
