use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billing::{CreateIntentInput, PaymentIntentProfile, PaymentIntentRepo},
    domain::entities::payment_intent::IntentStatus,
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> PaymentIntentProfile {
    PaymentIntentProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: row.get("kind"),
        catalog_id: row.get("catalog_id"),
        external_id: row.get("external_id"),
        status: row.get("status"),
        metadata: row.get("metadata"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const SELECT_COLS: &str = r#"
    id, user_id, kind, catalog_id, external_id, status, metadata, created_at, updated_at
"#;

#[async_trait]
impl PaymentIntentRepo for PostgresPersistence {
    async fn create(&self, input: &CreateIntentInput) -> AppResult<PaymentIntentProfile> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO payment_intents
                (id, user_id, kind, catalog_id, external_id, status, metadata)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(input.kind)
        .bind(&input.catalog_id)
        .bind(&input.external_id)
        .bind(IntentStatus::Created)
        .bind(&input.metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row_to_profile(&row))
    }

    async fn mark_status_by_external_id(
        &self,
        external_id: &str,
        status: IntentStatus,
    ) -> AppResult<Option<PaymentIntentProfile>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE payment_intents SET
                status = $2,
                updated_at = CURRENT_TIMESTAMP
            WHERE external_id = $1
            RETURNING {}
            "#,
            SELECT_COLS
        ))
        .bind(external_id)
        .bind(status)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.as_ref().map(row_to_profile))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<PaymentIntentProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM payment_intents WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }
}
