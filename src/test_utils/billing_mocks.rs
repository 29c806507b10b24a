//! In-memory mock implementations for billing repository traits and the
//! payment gateway port.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_gateway::{
        CreateOrderRequest, CreateSubscriptionRequest, GatewayOrder, GatewaySubscription,
        PaymentGatewayPort,
    },
    application::use_cases::billing::{
        ActivateSubscriptionInput, CreateIntentInput, CreditLedgerRepo, CreditTransactionProfile,
        GrantCreditsInput, GrantOutcome, PaymentIntentProfile, PaymentIntentRepo,
        SubscriptionProfile, SubscriptionRepo,
    },
    domain::entities::{payment_intent::IntentStatus, subscription::SubscriptionStatus},
};

// ============================================================================
// InMemoryCreditLedgerRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryCreditLedgerRepo {
    pub transactions: Mutex<Vec<CreditTransactionProfile>>,
    fail: bool,
}

impl InMemoryCreditLedgerRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger whose writes and reads fail like a lost connection.
    pub fn failing() -> Self {
        Self {
            transactions: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.lock().unwrap().is_empty()
    }

    /// Shared by `grant` and the subscription mock's transactional path,
    /// mirroring the single ledger-write primitive in Postgres.
    fn apply(&self, input: &GrantCreditsInput) -> AppResult<GrantOutcome> {
        if self.fail {
            return Err(AppError::Database("Database operation failed".into()));
        }
        let mut txs = self.transactions.lock().unwrap();
        if txs
            .iter()
            .any(|t| t.reference_id == input.reference_id && t.tx_type == input.tx_type)
        {
            return Ok(GrantOutcome::Duplicate);
        }
        txs.push(CreditTransactionProfile {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            delta: input.delta,
            tx_type: input.tx_type,
            reference_id: input.reference_id.clone(),
            created_at: Some(chrono::Utc::now().naive_utc()),
        });
        Ok(GrantOutcome::Applied)
    }
}

#[async_trait]
impl CreditLedgerRepo for InMemoryCreditLedgerRepo {
    async fn grant(&self, input: &GrantCreditsInput) -> AppResult<GrantOutcome> {
        self.apply(input)
    }

    async fn balance(&self, user_id: Uuid) -> AppResult<i64> {
        if self.fail {
            return Err(AppError::Database("Database operation failed".into()));
        }
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .map(|t| t.delta)
            .sum())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<CreditTransactionProfile>> {
        if self.fail {
            return Err(AppError::Database("Database operation failed".into()));
        }
        Ok(self
            .transactions
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// InMemorySubscriptionRepo
// ============================================================================

pub struct InMemorySubscriptionRepo {
    pub subscriptions: Mutex<HashMap<Uuid, SubscriptionProfile>>,
    ledger: std::sync::Arc<InMemoryCreditLedgerRepo>,
}

impl InMemorySubscriptionRepo {
    pub fn new(ledger: std::sync::Arc<InMemoryCreditLedgerRepo>) -> Self {
        Self {
            subscriptions: Mutex::new(HashMap::new()),
            ledger,
        }
    }
}

#[async_trait]
impl SubscriptionRepo for InMemorySubscriptionRepo {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<SubscriptionProfile>> {
        Ok(self.subscriptions.lock().unwrap().get(&user_id).cloned())
    }

    async fn get_by_external_id(
        &self,
        external_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .values()
            .find(|s| s.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn activate_with_grant(
        &self,
        sub: &ActivateSubscriptionInput,
        grant: &GrantCreditsInput,
    ) -> AppResult<(SubscriptionProfile, GrantOutcome)> {
        // Grant first: if it fails nothing is applied, mirroring the SQL
        // transaction rollback.
        let outcome = self.ledger.apply(grant)?;

        let mut subs = self.subscriptions.lock().unwrap();
        let now = chrono::Utc::now().naive_utc();
        let entry = subs
            .entry(sub.user_id)
            .or_insert_with(|| SubscriptionProfile {
                id: Uuid::new_v4(),
                user_id: sub.user_id,
                external_id: None,
                plan_id: sub.plan_id.clone(),
                status: SubscriptionStatus::Active,
                current_period_end: None,
                cancel_at_period_end: false,
                canceled_at: None,
                created_at: Some(now),
                updated_at: Some(now),
            });
        if sub.external_id.is_some() {
            entry.external_id = sub.external_id.clone();
        }
        entry.plan_id = sub.plan_id.clone();
        entry.status = SubscriptionStatus::Active;
        entry.current_period_end = sub.current_period_end;
        entry.cancel_at_period_end = false;
        entry.canceled_at = None;
        entry.updated_at = Some(now);
        Ok((entry.clone(), outcome))
    }

    async fn cancel_by_external_id(
        &self,
        external_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>> {
        let mut subs = self.subscriptions.lock().unwrap();
        let now = chrono::Utc::now().naive_utc();
        for sub in subs.values_mut() {
            if sub.external_id.as_deref() == Some(external_id) {
                sub.status = SubscriptionStatus::Canceled;
                sub.cancel_at_period_end = true;
                sub.canceled_at = sub.canceled_at.or(Some(now));
                sub.updated_at = Some(now);
                return Ok(Some(sub.clone()));
            }
        }
        Ok(None)
    }
}

// ============================================================================
// InMemoryPaymentIntentRepo
// ============================================================================

#[derive(Default)]
pub struct InMemoryPaymentIntentRepo {
    pub intents: Mutex<Vec<PaymentIntentProfile>>,
}

impl InMemoryPaymentIntentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentIntentRepo for InMemoryPaymentIntentRepo {
    async fn create(&self, input: &CreateIntentInput) -> AppResult<PaymentIntentProfile> {
        let now = chrono::Utc::now().naive_utc();
        let profile = PaymentIntentProfile {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            kind: input.kind,
            catalog_id: input.catalog_id.clone(),
            external_id: input.external_id.clone(),
            status: IntentStatus::Created,
            metadata: input.metadata.clone(),
            created_at: Some(now),
            updated_at: Some(now),
        };
        self.intents.lock().unwrap().push(profile.clone());
        Ok(profile)
    }

    async fn mark_status_by_external_id(
        &self,
        external_id: &str,
        status: IntentStatus,
    ) -> AppResult<Option<PaymentIntentProfile>> {
        let mut intents = self.intents.lock().unwrap();
        for intent in intents.iter_mut() {
            if intent.external_id.as_deref() == Some(external_id) {
                intent.status = status;
                intent.updated_at = Some(chrono::Utc::now().naive_utc());
                return Ok(Some(intent.clone()));
            }
        }
        Ok(None)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PaymentIntentProfile>> {
        Ok(self
            .intents
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.user_id == user_id)
            .cloned()
            .collect())
    }
}

// ============================================================================
// MockPaymentGateway
// ============================================================================

#[derive(Default)]
pub struct MockPaymentGateway {
    pub order_requests: Mutex<Vec<CreateOrderRequest>>,
    pub subscription_requests: Mutex<Vec<CreateSubscriptionRequest>>,
    counter: AtomicU64,
    fail: bool,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway whose calls fail like an unreachable API.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn order_calls(&self) -> usize {
        self.order_requests.lock().unwrap().len()
    }

    pub fn subscription_calls(&self) -> usize {
        self.subscription_requests.lock().unwrap().len()
    }

    pub fn last_order_request(&self) -> Option<CreateOrderRequest> {
        self.order_requests.lock().unwrap().last().cloned()
    }

    pub fn last_subscription_request(&self) -> Option<CreateSubscriptionRequest> {
        self.subscription_requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PaymentGatewayPort for MockPaymentGateway {
    async fn create_order(&self, req: &CreateOrderRequest) -> AppResult<GatewayOrder> {
        if self.fail {
            return Err(AppError::Gateway("mock gateway unavailable".into()));
        }
        self.order_requests.lock().unwrap().push(req.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(GatewayOrder {
            id: format!("order_mock_{}", n),
            amount_cents: req.amount_cents,
            currency: req.currency.clone(),
            status: "created".into(),
        })
    }

    async fn create_subscription(
        &self,
        req: &CreateSubscriptionRequest,
    ) -> AppResult<GatewaySubscription> {
        if self.fail {
            return Err(AppError::Gateway("mock gateway unavailable".into()));
        }
        self.subscription_requests.lock().unwrap().push(req.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let id = format!("sub_mock_{}", n);
        Ok(GatewaySubscription {
            short_url: Some(format!("https://gateway.test/checkout/{}", id)),
            id,
            status: "created".into(),
        })
    }
}
