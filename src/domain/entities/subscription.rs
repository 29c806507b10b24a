use serde::{Deserialize, Serialize};

/// Lifecycle of a user's subscription.
///
/// Legal transitions: `created -> active`, `active -> canceled`.
/// `canceled` is terminal for cancellation purposes, but an `activate`
/// delivered by the gateway is always honored as an idempotent
/// re-activation, since duplicate "activated" webhooks are expected
/// under retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "subscription_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Created,
    Active,
    Canceled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Created => "created",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Canceled => "canceled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => SubscriptionStatus::Active,
            "canceled" | "cancelled" => SubscriptionStatus::Canceled,
            _ => SubscriptionStatus::Created,
        }
    }

    /// Whether the user currently has access to plan features.
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_str_accepts_both_cancel_spellings() {
        assert_eq!(
            SubscriptionStatus::from_str("cancelled"),
            SubscriptionStatus::Canceled
        );
        assert_eq!(
            SubscriptionStatus::from_str("canceled"),
            SubscriptionStatus::Canceled
        );
    }

    #[test]
    fn unknown_status_defaults_to_created() {
        assert_eq!(
            SubscriptionStatus::from_str("halted"),
            SubscriptionStatus::Created
        );
    }

    #[test]
    fn only_active_grants_access() {
        assert!(SubscriptionStatus::Active.is_active());
        assert!(!SubscriptionStatus::Created.is_active());
        assert!(!SubscriptionStatus::Canceled.is_active());
    }

    #[test]
    fn display_matches_as_str() {
        for s in [
            SubscriptionStatus::Created,
            SubscriptionStatus::Active,
            SubscriptionStatus::Canceled,
        ] {
            assert_eq!(format!("{}", s), s.as_str());
        }
    }
}
