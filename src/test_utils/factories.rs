//! Test fixtures: config, catalog, and an AppState builder wired to the
//! in-memory mocks.

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderValue;
use secrecy::SecretString;

use crate::{
    adapters::http::app_state::AppState,
    application::ports::payment_gateway::PaymentGatewayPort,
    application::use_cases::{
        billing::{BillingUseCases, CreditLedgerRepo, PaymentIntentRepo, SubscriptionRepo},
        catalog::Catalog,
        reconciliation::ReconciliationUseCases,
    },
    infra::config::AppConfig,
    test_utils::{
        InMemoryCreditLedgerRepo, InMemoryPaymentIntentRepo, InMemorySubscriptionRepo,
        MockPaymentGateway,
    },
};

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// The built-in catalog doubles as the test fixture: free + pro plans and
/// two credit packages.
pub fn test_catalog() -> Catalog {
    Catalog::builtin()
}

pub fn test_config() -> AppConfig {
    AppConfig {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        database_url: "postgres://unused".into(),
        webhook_secret: SecretString::new(TEST_WEBHOOK_SECRET.into()),
        gateway_url: "https://gateway.test/v1".parse().unwrap(),
        gateway_key_id: "key_test".into(),
        gateway_key_secret: SecretString::new("secret_test".into()),
        gateway_timeout: Duration::from_secs(5),
        catalog_path: None,
    }
}

pub struct TestAppStateBuilder {
    catalog: Arc<Catalog>,
    gateway: Arc<MockPaymentGateway>,
    ledger: Arc<InMemoryCreditLedgerRepo>,
    subscriptions: Arc<InMemorySubscriptionRepo>,
    intents: Arc<InMemoryPaymentIntentRepo>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        let ledger = Arc::new(InMemoryCreditLedgerRepo::new());
        let subscriptions = Arc::new(InMemorySubscriptionRepo::new(ledger.clone()));
        Self {
            catalog: Arc::new(test_catalog()),
            gateway: Arc::new(MockPaymentGateway::new()),
            ledger,
            subscriptions,
            intents: Arc::new(InMemoryPaymentIntentRepo::new()),
        }
    }

    pub fn with_failing_ledger(self) -> Self {
        let ledger = Arc::new(InMemoryCreditLedgerRepo::failing());
        let subscriptions = Arc::new(InMemorySubscriptionRepo::new(ledger.clone()));
        Self {
            ledger,
            subscriptions,
            ..self
        }
    }

    pub fn with_failing_gateway(self) -> Self {
        Self {
            gateway: Arc::new(MockPaymentGateway::failing()),
            ..self
        }
    }

    pub fn ledger(&self) -> Arc<InMemoryCreditLedgerRepo> {
        self.ledger.clone()
    }

    pub fn subscriptions(&self) -> Arc<InMemorySubscriptionRepo> {
        self.subscriptions.clone()
    }

    pub fn intents(&self) -> Arc<InMemoryPaymentIntentRepo> {
        self.intents.clone()
    }

    pub fn gateway(&self) -> Arc<MockPaymentGateway> {
        self.gateway.clone()
    }

    pub fn build(&self) -> AppState {
        let gateway = self.gateway.clone() as Arc<dyn PaymentGatewayPort>;
        let ledger = self.ledger.clone() as Arc<dyn CreditLedgerRepo>;
        let subscriptions = self.subscriptions.clone() as Arc<dyn SubscriptionRepo>;
        let intents = self.intents.clone() as Arc<dyn PaymentIntentRepo>;

        let billing_use_cases = BillingUseCases::new(
            self.catalog.clone(),
            gateway,
            ledger.clone(),
            subscriptions.clone(),
            intents.clone(),
        );
        let reconciliation_use_cases =
            ReconciliationUseCases::new(self.catalog.clone(), ledger, subscriptions, intents);

        AppState {
            config: Arc::new(test_config()),
            billing_use_cases: Arc::new(billing_use_cases),
            reconciliation_use_cases: Arc::new(reconciliation_use_cases),
        }
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
