use async_trait::async_trait;
use sqlx::Row;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    application::use_cases::billing::{
        CreditLedgerRepo, CreditTransactionProfile, GrantCreditsInput, GrantOutcome,
    },
};

fn row_to_profile(row: &sqlx::postgres::PgRow) -> CreditTransactionProfile {
    CreditTransactionProfile {
        id: row.get("id"),
        user_id: row.get("user_id"),
        delta: row.get("delta"),
        tx_type: row.get("tx_type"),
        reference_id: row.get("reference_id"),
        created_at: row.get("created_at"),
    }
}

const SELECT_COLS: &str = "id, user_id, delta, tx_type, reference_id, created_at";

/// The single ledger-write primitive, shared by the standalone grant and
/// the transactional activation path. The conditional insert is what
/// enforces exactly-once: the `(reference_id, tx_type)` uniqueness lives
/// in the database, so it holds across process instances without locks.
pub(super) async fn insert_credit_transaction<'e, E>(
    executor: E,
    input: &GrantCreditsInput,
) -> AppResult<GrantOutcome>
where
    E: sqlx::PgExecutor<'e>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO credit_transactions (id, user_id, delta, tx_type, reference_id)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (reference_id, tx_type) DO NOTHING
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(input.user_id)
    .bind(input.delta)
    .bind(input.tx_type)
    .bind(&input.reference_id)
    .execute(executor)
    .await
    .map_err(AppError::from)?;

    Ok(if result.rows_affected() == 1 {
        GrantOutcome::Applied
    } else {
        GrantOutcome::Duplicate
    })
}

#[async_trait]
impl CreditLedgerRepo for PostgresPersistence {
    async fn grant(&self, input: &GrantCreditsInput) -> AppResult<GrantOutcome> {
        insert_credit_transaction(&self.pool, input).await
    }

    async fn balance(&self, user_id: Uuid) -> AppResult<i64> {
        let balance: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(delta), 0)::BIGINT FROM credit_transactions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(balance)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<CreditTransactionProfile>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM credit_transactions WHERE user_id = $1 ORDER BY created_at DESC",
            SELECT_COLS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(rows.iter().map(row_to_profile).collect())
    }
}
