//! Billing routes: catalog listings, payment intents, balance and
//! subscription reads.

use super::common::*;
use crate::domain::entities::catalog::{BillingCycle, CatalogEntry};

// ============================================================================
// Types
// ============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionIntentPayload {
    user_id: Uuid,
    plan_id: String,
    billing_cycle: BillingCycle,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionIntentResponse {
    subscription_id: Option<String>,
    amount_cents: i64,
    currency: String,
    plan_name: String,
    billing_cycle: String,
    checkout_url: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderIntentPayload {
    user_id: Uuid,
    #[serde(rename = "type")]
    order_type: String,
    package_id: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderIntentResponse {
    order_id: String,
    amount_cents: i64,
    currency: String,
    description: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    id: String,
    name: String,
    description: Option<String>,
    monthly_price_cents: i64,
    annual_price_cents: i64,
    currency: String,
    credits: i64,
}

impl From<CatalogEntry> for PlanResponse {
    fn from(e: CatalogEntry) -> Self {
        PlanResponse {
            id: e.id,
            name: e.name,
            description: e.description,
            monthly_price_cents: e.monthly_price_cents,
            annual_price_cents: e.annual_price_cents,
            currency: e.currency,
            credits: e.credits,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PackageResponse {
    id: String,
    name: String,
    description: Option<String>,
    price_cents: i64,
    currency: String,
    credits: i64,
}

impl From<CatalogEntry> for PackageResponse {
    fn from(e: CatalogEntry) -> Self {
        PackageResponse {
            id: e.id,
            name: e.name,
            description: e.description,
            price_cents: e.price_cents,
            currency: e.currency,
            credits: e.credits,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceResponse {
    user_id: Uuid,
    balance: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TransactionResponse {
    id: Uuid,
    delta: i64,
    tx_type: String,
    reference_id: String,
    created_at: Option<i64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubscriptionResponse {
    id: Option<Uuid>,
    plan_id: Option<String>,
    status: String,
    current_period_end: Option<i64>,
    cancel_at_period_end: Option<bool>,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/billing/plans
async fn get_plans(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let plans: Vec<PlanResponse> = app_state
        .billing_use_cases
        .public_plans()
        .into_iter()
        .map(PlanResponse::from)
        .collect();
    Ok(Json(plans))
}

/// GET /api/billing/packages
async fn get_packages(State(app_state): State<AppState>) -> AppResult<impl IntoResponse> {
    let packages: Vec<PackageResponse> = app_state
        .billing_use_cases
        .public_packages()
        .into_iter()
        .map(PackageResponse::from)
        .collect();
    Ok(Json(packages))
}

/// POST /api/billing/subscription-intent
async fn create_subscription_intent(
    State(app_state): State<AppState>,
    Json(payload): Json<SubscriptionIntentPayload>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .billing_use_cases
        .create_subscription_intent(payload.user_id, &payload.plan_id, payload.billing_cycle)
        .await?;

    Ok(Json(SubscriptionIntentResponse {
        subscription_id: result.subscription_id,
        amount_cents: result.amount_cents,
        currency: result.currency,
        plan_name: result.plan_name,
        billing_cycle: result.billing_cycle.as_str().to_string(),
        checkout_url: result.checkout_url,
    }))
}

/// POST /api/billing/order-intent
async fn create_order_intent(
    State(app_state): State<AppState>,
    Json(payload): Json<OrderIntentPayload>,
) -> AppResult<impl IntoResponse> {
    let result = app_state
        .billing_use_cases
        .create_order_intent(payload.user_id, &payload.order_type, &payload.package_id)
        .await?;

    Ok(Json(OrderIntentResponse {
        order_id: result.order_id,
        amount_cents: result.amount_cents,
        currency: result.currency,
        description: result.description,
    }))
}

/// GET /api/billing/balance/{user_id}
async fn get_balance(
    State(app_state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let balance = app_state.billing_use_cases.balance(user_id).await?;
    Ok(Json(BalanceResponse { user_id, balance }))
}

/// GET /api/billing/transactions/{user_id}
async fn get_transactions(
    State(app_state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let transactions: Vec<TransactionResponse> = app_state
        .billing_use_cases
        .transactions(user_id)
        .await?
        .into_iter()
        .map(|t| TransactionResponse {
            id: t.id,
            delta: t.delta,
            tx_type: t.tx_type.as_str().to_string(),
            reference_id: t.reference_id,
            created_at: t.created_at.map(|dt| dt.and_utc().timestamp()),
        })
        .collect();
    Ok(Json(transactions))
}

/// GET /api/billing/subscription/{user_id}
async fn get_subscription(
    State(app_state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<impl IntoResponse> {
    let sub = app_state
        .billing_use_cases
        .subscription_for_user(user_id)
        .await?;

    match sub {
        Some(s) => Ok(Json(SubscriptionResponse {
            id: Some(s.id),
            plan_id: Some(s.plan_id),
            status: s.status.as_str().to_string(),
            current_period_end: s.current_period_end.map(|dt| dt.and_utc().timestamp()),
            cancel_at_period_end: Some(s.cancel_at_period_end),
        })),
        None => Ok(Json(SubscriptionResponse {
            id: None,
            plan_id: None,
            status: "none".to_string(),
            current_period_end: None,
            cancel_at_period_end: None,
        })),
    }
}

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/plans", get(get_plans))
        .route("/packages", get(get_packages))
        .route("/subscription-intent", post(create_subscription_intent))
        .route("/order-intent", post(create_order_intent))
        .route("/balance/{user_id}", get(get_balance))
        .route("/transactions/{user_id}", get(get_transactions))
        .route("/subscription/{user_id}", get(get_subscription))
}

// ============================================================================
// Tests
// ============================================================================
