//! Repository for the `transactions` table.

use empodhera_core::finance::TransactionStatus;
use empodhera_core::types::DbId;
use sqlx::PgPool;

use crate::models::finance::{
    CreateTransaction, Transaction, TransactionFilter, UpdateTransaction,
};

/// Select list joining each transaction with its category.
const COLUMNS: &str = "t.id, t.type, t.amount_cents, t.date, t.description, t.category_id, \
                       c.name AS category_name, c.color AS category_color, t.subcategory, \
                       t.status, t.payment_method, t.source, t.is_recurring, t.created_by, \
                       t.created_at, t.updated_at";

const FROM: &str = "transactions t LEFT JOIN categories c ON c.id = t.category_id";

pub struct TransactionRepo;

impl TransactionRepo {
    /// Insert a transaction. The status defaults to `previsto`.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTransaction,
    ) -> Result<Transaction, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO transactions
                (type, amount_cents, date, description, category_id, subcategory, status,
                 payment_method, source, is_recurring, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING id",
        )
        .bind(input.kind.as_str())
        .bind(input.amount_cents)
        .bind(input.date)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(&input.subcategory)
        .bind(input.status.unwrap_or(TransactionStatus::Previsto).as_str())
        .bind(input.payment_method.map(|m| m.as_str()))
        .bind(input.source.map(|s| s.as_str()))
        .bind(input.is_recurring)
        .bind(input.created_by)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Transaction>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM {FROM} WHERE t.id = $1");
        sqlx::query_as::<_, Transaction>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List transactions matching `filter`, most recent date first.
    pub async fn list(
        pool: &PgPool,
        filter: &TransactionFilter,
    ) -> Result<Vec<Transaction>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM {FROM}
             WHERE ($1::text IS NULL OR t.type = $1)
               AND ($2::bigint IS NULL OR t.category_id = $2)
               AND ($3::text IS NULL OR t.status = $3)
               AND ($4::text IS NULL OR t.source = $4)
               AND ($5::date IS NULL OR t.date >= $5)
               AND ($6::date IS NULL OR t.date <= $6)
             ORDER BY t.date DESC, t.id DESC"
        );
        sqlx::query_as::<_, Transaction>(&query)
            .bind(filter.kind.map(|k| k.as_str()))
            .bind(filter.category_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(filter.source.map(|s| s.as_str()))
            .bind(filter.start_date)
            .bind(filter.end_date)
            .fetch_all(pool)
            .await
    }

    /// Patch a transaction. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTransaction,
    ) -> Result<Option<Transaction>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE transactions SET
                type = COALESCE($2, type),
                amount_cents = COALESCE($3, amount_cents),
                date = COALESCE($4, date),
                description = COALESCE($5, description),
                category_id = COALESCE($6, category_id),
                subcategory = COALESCE($7, subcategory),
                status = COALESCE($8, status),
                payment_method = COALESCE($9, payment_method),
                source = COALESCE($10, source),
                is_recurring = COALESCE($11, is_recurring),
                updated_at = NOW()
             WHERE id = $1",
        )
        .bind(id)
        .bind(input.kind.map(|k| k.as_str()))
        .bind(input.amount_cents)
        .bind(input.date)
        .bind(&input.description)
        .bind(input.category_id)
        .bind(&input.subcategory)
        .bind(input.status.map(|s| s.as_str()))
        .bind(input.payment_method.map(|m| m.as_str()))
        .bind(input.source.map(|s| s.as_str()))
        .bind(input.is_recurring)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a transaction. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
