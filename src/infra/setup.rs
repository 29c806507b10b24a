use std::fs::File;
use std::sync::Arc;

use secrecy::ExposeSecret;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::{http::app_state::AppState, persistence::PostgresPersistence},
    application::ports::payment_gateway::PaymentGatewayPort,
    application::use_cases::{
        billing::{BillingUseCases, CreditLedgerRepo, PaymentIntentRepo, SubscriptionRepo},
        catalog::Catalog,
        reconciliation::ReconciliationUseCases,
    },
    infra::{config::AppConfig, db::init_db, gateway_client::GatewayClient},
};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    let pool = init_db(&config.database_url).await?;
    let persistence = Arc::new(PostgresPersistence::new(pool));

    let catalog = Arc::new(match &config.catalog_path {
        Some(path) => Catalog::from_json_file(path)
            .map_err(|e| anyhow::anyhow!("Catalog load failed: {e}"))?,
        None => Catalog::builtin(),
    });

    let gateway = Arc::new(GatewayClient::new(
        config.gateway_url.to_string(),
        config.gateway_key_id.clone(),
        config.gateway_key_secret.expose_secret().to_string(),
        config.gateway_timeout,
    )) as Arc<dyn PaymentGatewayPort>;

    let ledger = persistence.clone() as Arc<dyn CreditLedgerRepo>;
    let subscriptions = persistence.clone() as Arc<dyn SubscriptionRepo>;
    let intents = persistence.clone() as Arc<dyn PaymentIntentRepo>;

    let billing_use_cases = BillingUseCases::new(
        catalog.clone(),
        gateway,
        ledger.clone(),
        subscriptions.clone(),
        intents.clone(),
    );

    let reconciliation_use_cases =
        ReconciliationUseCases::new(catalog, ledger, subscriptions, intents);

    Ok(AppState {
        config: Arc::new(config),
        billing_use_cases: Arc::new(billing_use_cases),
        reconciliation_use_cases: Arc::new(reconciliation_use_cases),
    })
}

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "creditum=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
