use std::sync::Arc;

use crate::{
    application::use_cases::{billing::BillingUseCases, reconciliation::ReconciliationUseCases},
    infra::config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub billing_use_cases: Arc<BillingUseCases>,
    pub reconciliation_use_cases: Arc<ReconciliationUseCases>,
}
