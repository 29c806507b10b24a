//! Billing use cases: payment-intent construction and ledger/subscription
//! reads, plus the repository traits the persistence adapter implements.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        CreateOrderRequest, CreateSubscriptionRequest, PaymentGatewayPort,
    },
    application::use_cases::catalog::Catalog,
    domain::entities::{
        catalog::{BillingCycle, CatalogEntry, CatalogKind},
        credit_transaction::TransactionType,
        payment_intent::{IntentKind, IntentStatus},
        subscription::SubscriptionStatus,
    },
};

// ============================================================================
// Profile Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub external_id: Option<String>,
    pub plan_id: String,
    pub status: SubscriptionStatus,
    pub current_period_end: Option<NaiveDateTime>,
    pub cancel_at_period_end: bool,
    pub canceled_at: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreditTransactionProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub delta: i64,
    pub tx_type: TransactionType,
    pub reference_id: String,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PaymentIntentProfile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: IntentKind,
    pub catalog_id: String,
    pub external_id: Option<String>,
    pub status: IntentStatus,
    pub metadata: serde_json::Value,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

// ============================================================================
// Input Types
// ============================================================================

/// A signed credit delta keyed by its idempotency reference.
///
/// `(reference_id, tx_type)` is the uniqueness key: applying the same
/// input twice yields one ledger row and a `Duplicate` outcome.
#[derive(Debug, Clone)]
pub struct GrantCreditsInput {
    pub user_id: Uuid,
    pub delta: i64,
    pub tx_type: TransactionType,
    pub reference_id: String,
}

#[derive(Debug, Clone)]
pub struct ActivateSubscriptionInput {
    pub user_id: Uuid,
    /// None for the free tier, which never touches the gateway.
    pub external_id: Option<String>,
    pub plan_id: String,
    pub current_period_end: Option<NaiveDateTime>,
}

#[derive(Debug, Clone)]
pub struct CreateIntentInput {
    pub user_id: Uuid,
    pub kind: IntentKind,
    pub catalog_id: String,
    pub external_id: Option<String>,
    pub metadata: serde_json::Value,
}

/// Result of a conditional ledger insert. `Duplicate` is a success path:
/// the effect was already applied by an earlier delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantOutcome {
    Applied,
    Duplicate,
}

// ============================================================================
// Repository Traits
// ============================================================================

#[async_trait]
pub trait CreditLedgerRepo: Send + Sync {
    /// Conditionally insert one credit transaction. Reports `Duplicate`
    /// (not an error) when a row with the same `(reference_id, tx_type)`
    /// already exists.
    async fn grant(&self, input: &GrantCreditsInput) -> AppResult<GrantOutcome>;

    /// Balance is always derived by summing the ledger at read time.
    async fn balance(&self, user_id: Uuid) -> AppResult<i64>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<CreditTransactionProfile>>;
}

#[async_trait]
pub trait SubscriptionRepo: Send + Sync {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<SubscriptionProfile>>;

    async fn get_by_external_id(&self, external_id: &str)
    -> AppResult<Option<SubscriptionProfile>>;

    /// Upsert the user's subscription to `active` and apply the credit
    /// grant, both inside one storage transaction. Activation is legal
    /// from any prior state (idempotent re-activation under webhook
    /// retry); the grant dedupes on `(reference_id, tx_type)`.
    async fn activate_with_grant(
        &self,
        sub: &ActivateSubscriptionInput,
        grant: &GrantCreditsInput,
    ) -> AppResult<(SubscriptionProfile, GrantOutcome)>;

    /// Cancel by gateway subscription id. Returns `None` when the
    /// external id is unknown to us; idempotent when already canceled.
    async fn cancel_by_external_id(
        &self,
        external_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>>;
}

#[async_trait]
pub trait PaymentIntentRepo: Send + Sync {
    async fn create(&self, input: &CreateIntentInput) -> AppResult<PaymentIntentProfile>;

    /// Move an intent to a terminal status, looked up by the gateway id
    /// echoed in a webhook. `None` when no intent carries that id.
    async fn mark_status_by_external_id(
        &self,
        external_id: &str,
        status: IntentStatus,
    ) -> AppResult<Option<PaymentIntentProfile>>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PaymentIntentProfile>>;
}

// ============================================================================
// Result Types
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionIntentResult {
    /// Gateway subscription id; `None` for the free tier (no checkout).
    pub subscription_id: Option<String>,
    pub amount_cents: i64,
    pub currency: String,
    pub plan_name: String,
    pub billing_cycle: BillingCycle,
    pub checkout_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderIntentResult {
    pub order_id: String,
    pub amount_cents: i64,
    pub currency: String,
    pub description: String,
}

// ============================================================================
// Use Cases
// ============================================================================

pub struct BillingUseCases {
    catalog: Arc<Catalog>,
    gateway: Arc<dyn PaymentGatewayPort>,
    ledger: Arc<dyn CreditLedgerRepo>,
    subscriptions: Arc<dyn SubscriptionRepo>,
    intents: Arc<dyn PaymentIntentRepo>,
}

impl BillingUseCases {
    pub fn new(
        catalog: Arc<Catalog>,
        gateway: Arc<dyn PaymentGatewayPort>,
        ledger: Arc<dyn CreditLedgerRepo>,
        subscriptions: Arc<dyn SubscriptionRepo>,
        intents: Arc<dyn PaymentIntentRepo>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            ledger,
            subscriptions,
            intents,
        }
    }

    /// Build a subscription payment intent.
    ///
    /// The free tier bypasses the gateway entirely but goes through the
    /// same `activate_with_grant` primitive the webhook path uses, keyed
    /// by a synthetic reference id, so the exactly-once invariant holds
    /// across both entry points.
    pub async fn create_subscription_intent(
        &self,
        user_id: Uuid,
        plan_id: &str,
        cycle: BillingCycle,
    ) -> AppResult<SubscriptionIntentResult> {
        let plan = self
            .catalog
            .resolve(CatalogKind::SubscriptionPlan, plan_id)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown plan: {plan_id}")))?;

        if plan.is_free(cycle) {
            let grant = GrantCreditsInput {
                user_id,
                delta: plan.credits,
                tx_type: TransactionType::SubscriptionCreated,
                reference_id: format!("free:{}:{}", user_id, plan.id),
            };
            let activate = ActivateSubscriptionInput {
                user_id,
                external_id: None,
                plan_id: plan.id.clone(),
                current_period_end: None,
            };
            let (_subscription, outcome) = self
                .subscriptions
                .activate_with_grant(&activate, &grant)
                .await?;
            if outcome == GrantOutcome::Duplicate {
                tracing::debug!(%user_id, plan_id, "Free-tier grant already applied");
            }
            return Ok(SubscriptionIntentResult {
                subscription_id: None,
                amount_cents: 0,
                currency: plan.currency.clone(),
                plan_name: plan.name.clone(),
                billing_cycle: cycle,
                checkout_url: None,
            });
        }

        let notes = HashMap::from([
            ("userId".to_string(), user_id.to_string()),
            ("planId".to_string(), plan.id.clone()),
            ("billingCycle".to_string(), cycle.as_str().to_string()),
        ]);
        let gateway_sub = self
            .gateway
            .create_subscription(&CreateSubscriptionRequest {
                plan_code: format!("{}-{}", plan.id, cycle.as_str()),
                notes,
            })
            .await?;

        self.intents
            .create(&CreateIntentInput {
                user_id,
                kind: IntentKind::Subscription,
                catalog_id: plan.id.clone(),
                external_id: Some(gateway_sub.id.clone()),
                metadata: serde_json::json!({
                    "userId": user_id,
                    "planId": plan.id,
                    "billingCycle": cycle.as_str(),
                    "credits": plan.credits,
                }),
            })
            .await?;

        Ok(SubscriptionIntentResult {
            subscription_id: Some(gateway_sub.id),
            amount_cents: plan.price_for_cycle(cycle),
            currency: plan.currency.clone(),
            plan_name: plan.name.clone(),
            billing_cycle: cycle,
            checkout_url: gateway_sub.short_url,
        })
    }

    /// Build a one-time order intent. `order_type` discriminates what the
    /// order buys; only credit packages are purchasable here.
    pub async fn create_order_intent(
        &self,
        user_id: Uuid,
        order_type: &str,
        package_id: &str,
    ) -> AppResult<OrderIntentResult> {
        if order_type != "credits" {
            return Err(AppError::InvalidInput(format!(
                "Unsupported order type: {order_type}"
            )));
        }
        let package = self
            .catalog
            .resolve(CatalogKind::CreditPackage, package_id)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown package: {package_id}")))?;

        let intent_id = Uuid::new_v4();
        let notes = HashMap::from([
            ("userId".to_string(), user_id.to_string()),
            ("type".to_string(), "credits".to_string()),
            ("packageId".to_string(), package.id.clone()),
            ("credits".to_string(), package.credits.to_string()),
        ]);
        let order = self
            .gateway
            .create_order(&CreateOrderRequest {
                amount_cents: package.price_cents,
                currency: package.currency.clone(),
                receipt: format!("rcpt_{}", intent_id.simple()),
                notes,
            })
            .await?;

        self.intents
            .create(&CreateIntentInput {
                user_id,
                kind: IntentKind::Order,
                catalog_id: package.id.clone(),
                external_id: Some(order.id.clone()),
                metadata: serde_json::json!({
                    "userId": user_id,
                    "type": "credits",
                    "packageId": package.id,
                    "credits": package.credits,
                }),
            })
            .await?;

        Ok(OrderIntentResult {
            order_id: order.id,
            amount_cents: package.price_cents,
            currency: package.currency.clone(),
            description: format!("{} ({} credits)", package.name, package.credits),
        })
    }

    pub async fn balance(&self, user_id: Uuid) -> AppResult<i64> {
        self.ledger.balance(user_id).await
    }

    pub async fn transactions(&self, user_id: Uuid) -> AppResult<Vec<CreditTransactionProfile>> {
        self.ledger.list_by_user(user_id).await
    }

    pub async fn subscription_for_user(
        &self,
        user_id: Uuid,
    ) -> AppResult<Option<SubscriptionProfile>> {
        self.subscriptions.get_by_user(user_id).await
    }

    pub fn public_plans(&self) -> Vec<CatalogEntry> {
        self.catalog.plans().into_iter().cloned().collect()
    }

    pub fn public_packages(&self) -> Vec<CatalogEntry> {
        self.catalog.packages().into_iter().cloned().collect()
    }
}
