use serde::{Deserialize, Serialize};

/// Why a signed credit delta was applied to a user's ledger.
///
/// The pair `(reference_id, tx_type)` is unique in storage, so the same
/// external event can never be applied twice under the same type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "credit_tx_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    SubscriptionCreated,
    SubscriptionActivated,
    CreditPurchase,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::SubscriptionCreated => "subscription_created",
            TransactionType::SubscriptionActivated => "subscription_activated",
            TransactionType::CreditPurchase => "credit_purchase",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
