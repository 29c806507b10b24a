use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::{PostgresPersistence, credit_transaction::insert_credit_transaction},
    app_error::{AppError, AppResult},
    application::use_cases::billing::{
        ActivateSubscriptionInput, GrantCreditsInput, GrantOutcome, SubscriptionProfile,
        SubscriptionRepo,
    },
    domain::entities::subscription::SubscriptionStatus,
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> SubscriptionProfile {
    SubscriptionProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        external_id: row.get("external_id"),
        plan_id: row.get("plan_id"),
        status: row.get("status"),
        current_period_end: row.get("current_period_end"),
        cancel_at_period_end: row.get("cancel_at_period_end"),
        canceled_at: row.get("canceled_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, external_id, plan_id, status, current_period_end,
    cancel_at_period_end, canceled_at, created_at, updated_at
"#;

#[async_trait]
impl SubscriptionRepo for PostgresPersistence {
    async fn get_by_user(&self, user_id: Uuid) -> AppResult<Option<SubscriptionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn get_by_external_id(
        &self,
        external_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM subscriptions WHERE external_id = $1",
            SELECT_COLS
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn activate_with_grant(
        &self,
        sub: &ActivateSubscriptionInput,
        grant: &GrantCreditsInput,
    ) -> AppResult<(SubscriptionProfile, GrantOutcome)> {
        // One transaction for both writes: a 5xx to the sender always
        // means neither effect was applied.
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO subscriptions
                (id, user_id, external_id, plan_id, status, current_period_end)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id) DO UPDATE SET
                external_id = COALESCE(EXCLUDED.external_id, subscriptions.external_id),
                plan_id = EXCLUDED.plan_id,
                status = EXCLUDED.status,
                current_period_end = EXCLUDED.current_period_end,
                cancel_at_period_end = false,
                canceled_at = NULL,
                updated_at = CURRENT_TIMESTAMP
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(sub.user_id)
        .bind(&sub.external_id)
        .bind(&sub.plan_id)
        .bind(SubscriptionStatus::Active)
        .bind(sub.current_period_end)
        .fetch_one(&mut *tx)
        .await
        .map_err(AppError::from)?;

        let outcome = insert_credit_transaction(&mut *tx, grant).await?;

        tx.commit().await.map_err(AppError::from)?;
        Ok((row_to_profile(&row), outcome))
    }

    async fn cancel_by_external_id(
        &self,
        external_id: &str,
    ) -> AppResult<Option<SubscriptionProfile>> {
        // COALESCE keeps the original cancellation time on retried
        // deliveries.
        let row = sqlx::query(&format!(
            r#"
            UPDATE subscriptions SET
                status = $2,
                cancel_at_period_end = true,
                canceled_at = COALESCE(canceled_at, CURRENT_TIMESTAMP),
                updated_at = CURRENT_TIMESTAMP
            WHERE external_id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(external_id)
        .bind(SubscriptionStatus::Canceled)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }
}
