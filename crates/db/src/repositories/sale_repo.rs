//! Repository for the `sales` table.

use empodhera_core::finance::TransactionSource;
use sqlx::PgPool;

use crate::models::finance::{CreateSale, Sale, SaleFilter};

const COLUMNS: &str = "id, buyer_name, buyer_email, buyer_phone, amount_cents, date, platform, \
                       source, creator, notes, transaction_id, created_by, created_at";

pub struct SaleRepo;

impl SaleRepo {
    /// Insert a sale. The source defaults to `organico`.
    pub async fn create(pool: &PgPool, input: &CreateSale) -> Result<Sale, sqlx::Error> {
        let query = format!(
            "INSERT INTO sales
                (buyer_name, buyer_email, buyer_phone, amount_cents, date, platform, source,
                 creator, notes, transaction_id, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(&input.buyer_name)
            .bind(&input.buyer_email)
            .bind(&input.buyer_phone)
            .bind(input.amount_cents)
            .bind(input.date)
            .bind(input.platform.as_str())
            .bind(input.source.unwrap_or(TransactionSource::Organico).as_str())
            .bind(input.creator.map(|c| c.as_str()))
            .bind(&input.notes)
            .bind(input.transaction_id)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// List sales matching `filter`, most recent first.
    pub async fn list(pool: &PgPool, filter: &SaleFilter) -> Result<Vec<Sale>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sales
             WHERE ($1::date IS NULL OR date >= $1)
               AND ($2::date IS NULL OR date <= $2)
               AND ($3::text IS NULL OR source = $3)
               AND ($4::text IS NULL OR creator = $4)
             ORDER BY date DESC, id DESC"
        );
        sqlx::query_as::<_, Sale>(&query)
            .bind(filter.start_date)
            .bind(filter.end_date)
            .bind(filter.source.map(|s| s.as_str()))
            .bind(filter.creator.map(|c| c.as_str()))
            .fetch_all(pool)
            .await
    }
}
