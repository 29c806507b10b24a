//! Payment gateway webhook handler: the reconciliation coordinator's
//! HTTP-facing state machine (received → verified → dispatched → acked).

use super::common::*;
use crate::application::use_cases::reconciliation::EventOutcome;
use crate::infra::webhook_verifier::verify_signature;
use axum::body::Bytes;
use secrecy::ExposeSecret;

/// Determines if a webhook processing error should trigger a gateway retry.
///
/// Returns `true` if the error is transient, meaning we should return 5xx
/// so the gateway redelivers. Returns `false` for conditions a retry
/// cannot change (unknown records, malformed payloads), which are acked
/// and logged.
fn is_retryable_error(error: &AppError) -> bool {
    match error {
        // Transient errors - retry may succeed
        AppError::Database(_) => true,
        AppError::Internal(_) => true,
        AppError::Gateway(_) => true,

        // Expected conditions - won't change with retry
        AppError::NotFound => false,
        AppError::InvalidInput(_) => false,
        AppError::InvalidSignature => false,
    }
}

/// POST /api/billing/webhook
///
/// The body is taken as raw bytes and verified before any parsing:
/// re-serializing a parsed body can change it byte-for-byte and break
/// the signature match.
async fn handle_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let signature = headers
        .get("x-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::InvalidSignature)?;

    if !verify_signature(
        &body,
        signature,
        app_state.config.webhook_secret.expose_secret(),
    ) {
        // 4xx: the payload is untrusted and a retry will not help.
        return Err(AppError::InvalidSignature);
    }

    let event: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))?;

    let event_type = event["event"].as_str().unwrap_or("");
    let payload = &event["payload"];

    match app_state
        .reconciliation_use_cases
        .process(event_type, payload)
        .await
    {
        Ok(EventOutcome::Applied) => {
            tracing::info!(event_type, "Webhook applied");
        }
        Ok(EventOutcome::Duplicate) => {
            tracing::info!(event_type, "Webhook effect already applied, acking duplicate");
        }
        Ok(EventOutcome::Ignored) => {
            tracing::debug!(event_type, "Webhook acknowledged without effects");
        }
        Err(e) if is_retryable_error(&e) => {
            error!(
                error = %e,
                event_type,
                retryable = true,
                "Webhook processing failed, returning 500 for gateway retry"
            );
            return Ok(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Err(e) => {
            tracing::debug!(
                error = %e,
                event_type,
                retryable = false,
                "Non-retryable webhook failure, acking"
            );
        }
    }

    Ok(StatusCode::OK)
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/webhook", post(handle_webhook))
}

// ============================================================================
// Tests
// ============================================================================
