//! Reconciliation: converting verified webhook events into exactly-once
//! ledger and subscription effects.
//!
//! Handlers read nothing but the gateway-echoed payload (the `notes`
//! attached at intent-creation time) plus the catalog. Identifiers from
//! the original client request are never consulted.

use chrono::{DateTime, NaiveDateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::AppResult,
    application::use_cases::billing::{
        ActivateSubscriptionInput, CreditLedgerRepo, GrantCreditsInput, GrantOutcome,
        PaymentIntentRepo, SubscriptionRepo,
    },
    application::use_cases::catalog::Catalog,
    domain::entities::{
        catalog::CatalogKind, credit_transaction::TransactionType, payment_intent::IntentStatus,
    },
};

/// Convert a Unix timestamp to NaiveDateTime
fn timestamp_to_naive(secs: i64) -> Option<NaiveDateTime> {
    DateTime::<Utc>::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}

/// Terminal outcome of processing one verified event.
///
/// `Duplicate` and `Ignored` are success paths: the delivery is acked so
/// the gateway does not retry. Only a returned error (classified
/// retryable by the route) produces a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventOutcome {
    Applied,
    Duplicate,
    Ignored,
}

pub struct ReconciliationUseCases {
    catalog: Arc<Catalog>,
    ledger: Arc<dyn CreditLedgerRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    intents: Arc<dyn PaymentIntentRepo>,
}

impl ReconciliationUseCases {
    pub fn new(
        catalog: Arc<Catalog>,
        ledger: Arc<dyn CreditLedgerRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        intents: Arc<dyn PaymentIntentRepo>,
    ) -> Self {
        Self {
            catalog,
            ledger,
            subscriptions,
            intents,
        }
    }

    /// Route a verified event to its handler. Unknown event types are
    /// acknowledged without processing so the gateway does not retry
    /// deliveries we intentionally ignore.
    pub async fn process(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> AppResult<EventOutcome> {
        match event_type {
            "subscription.activated" => self.handle_subscription_activated(payload).await,
            "subscription.cancelled" => self.handle_subscription_cancelled(payload).await,
            "payment.captured" => self.handle_payment_captured(payload).await,
            _ => {
                tracing::debug!(event_type, "Unhandled webhook event type");
                Ok(EventOutcome::Ignored)
            }
        }
    }

    async fn handle_subscription_activated(
        &self,
        payload: &serde_json::Value,
    ) -> AppResult<EventOutcome> {
        let subscription = &payload["subscription"];
        let external_id = match subscription["id"].as_str() {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::debug!("subscription.activated without subscription id, skipping");
                return Ok(EventOutcome::Ignored);
            }
        };

        let notes = &subscription["notes"];
        let user_id = match notes["userId"].as_str().and_then(|s| Uuid::parse_str(s).ok()) {
            Some(id) => id,
            None => {
                tracing::debug!(external_id, "subscription.activated without a valid userId note");
                return Ok(EventOutcome::Ignored);
            }
        };
        let plan_id = match notes["planId"].as_str() {
            Some(p) if !p.is_empty() => p,
            _ => {
                tracing::debug!(external_id, "subscription.activated without a planId note");
                return Ok(EventOutcome::Ignored);
            }
        };

        let plan = match self.catalog.resolve(CatalogKind::SubscriptionPlan, plan_id) {
            Some(p) => p,
            None => {
                // Dropped permanently: a retry cannot succeed until the
                // catalog changes, and the sender's retry budget is finite.
                tracing::warn!(
                    plan_id,
                    external_id,
                    "Plan no longer in catalog at processing time, dropping event"
                );
                return Ok(EventOutcome::Ignored);
            }
        };

        let current_period_end = subscription["current_period_end"]
            .as_i64()
            .and_then(timestamp_to_naive);

        let activate = ActivateSubscriptionInput {
            user_id,
            external_id: Some(external_id.to_string()),
            plan_id: plan.id.clone(),
            current_period_end,
        };
        let grant = GrantCreditsInput {
            user_id,
            delta: plan.credits,
            tx_type: TransactionType::SubscriptionActivated,
            reference_id: external_id.to_string(),
        };

        let (_, outcome) = self
            .subscriptions
            .activate_with_grant(&activate, &grant)
            .await?;

        self.confirm_intent(external_id).await;

        Ok(match outcome {
            GrantOutcome::Applied => EventOutcome::Applied,
            GrantOutcome::Duplicate => EventOutcome::Duplicate,
        })
    }

    async fn handle_subscription_cancelled(
        &self,
        payload: &serde_json::Value,
    ) -> AppResult<EventOutcome> {
        let external_id = match payload["subscription"]["id"].as_str() {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::debug!("subscription.cancelled without subscription id, skipping");
                return Ok(EventOutcome::Ignored);
            }
        };

        match self.subscriptions.cancel_by_external_id(external_id).await? {
            Some(_) => Ok(EventOutcome::Applied),
            None => {
                // No account to reconcile; ack so the gateway stops retrying.
                tracing::debug!(external_id, "Cancellation for unknown subscription, skipping");
                Ok(EventOutcome::Ignored)
            }
        }
    }

    async fn handle_payment_captured(
        &self,
        payload: &serde_json::Value,
    ) -> AppResult<EventOutcome> {
        let payment_id = match payload["payment"]["id"].as_str() {
            Some(id) if !id.is_empty() => id,
            _ => {
                tracing::debug!("payment.captured without payment id, skipping");
                return Ok(EventOutcome::Ignored);
            }
        };

        let notes = &payload["order"]["notes"];
        let user_id = match notes["userId"].as_str().and_then(|s| Uuid::parse_str(s).ok()) {
            Some(id) => id,
            None => {
                tracing::debug!(payment_id, "payment.captured without a valid userId note");
                return Ok(EventOutcome::Ignored);
            }
        };

        match notes["type"].as_str() {
            Some("credits") => {}
            other => {
                tracing::debug!(payment_id, note_type = ?other, "payment.captured with unhandled note type");
                return Ok(EventOutcome::Ignored);
            }
        }

        // The gateway serializes notes as strings; tolerate numbers too.
        let credits = notes["credits"]
            .as_str()
            .and_then(|s| s.parse::<i64>().ok())
            .or_else(|| notes["credits"].as_i64());
        let credits = match credits {
            Some(c) if c > 0 => c,
            _ => {
                tracing::debug!(payment_id, "payment.captured without a positive credits note");
                return Ok(EventOutcome::Ignored);
            }
        };

        let outcome = self
            .ledger
            .grant(&GrantCreditsInput {
                user_id,
                delta: credits,
                tx_type: TransactionType::CreditPurchase,
                reference_id: payment_id.to_string(),
            })
            .await?;

        if let Some(order_id) = payload["order"]["id"].as_str() {
            self.confirm_intent(order_id).await;
        }

        Ok(match outcome {
            GrantOutcome::Applied => EventOutcome::Applied,
            GrantOutcome::Duplicate => EventOutcome::Duplicate,
        })
    }

    /// Audit-trail update; never fails the delivery. The ledger and
    /// subscription writes are the authoritative effects.
    async fn confirm_intent(&self, external_id: &str) {
        match self
            .intents
            .mark_status_by_external_id(external_id, IntentStatus::Confirmed)
            .await
        {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(external_id, "No payment intent to confirm for external id");
            }
            Err(e) => {
                tracing::warn!(error = %e, external_id, "Failed to confirm payment intent (non-critical)");
            }
        }
    }
}
