//! Repository for the `sponsors` table.

use empodhera_core::finance::TransactionStatus;
use empodhera_core::types::DbId;
use sqlx::PgPool;

use crate::models::finance::{CreateSponsor, Sponsor, UpdateSponsor};

const COLUMNS: &str = "id, company_name, contact_name, contact_email, contact_phone, plan, \
                       contracted_value_cents, payment_status, benefits_delivered, notes, \
                       created_by, created_at, updated_at";

pub struct SponsorRepo;

impl SponsorRepo {
    pub async fn create(pool: &PgPool, input: &CreateSponsor) -> Result<Sponsor, sqlx::Error> {
        let query = format!(
            "INSERT INTO sponsors
                (company_name, contact_name, contact_email, contact_phone, plan,
                 contracted_value_cents, payment_status, benefits_delivered, notes, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(&input.company_name)
            .bind(&input.contact_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(input.plan.as_str())
            .bind(input.contracted_value_cents)
            .bind(input.payment_status.unwrap_or(TransactionStatus::Previsto).as_str())
            .bind(&input.benefits_delivered)
            .bind(&input.notes)
            .bind(input.created_by)
            .fetch_one(pool)
            .await
    }

    /// List sponsors newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Sponsor>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sponsors ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Sponsor>(&query).fetch_all(pool).await
    }

    /// Patch a sponsor. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateSponsor,
    ) -> Result<Option<Sponsor>, sqlx::Error> {
        let query = format!(
            "UPDATE sponsors SET
                company_name = COALESCE($2, company_name),
                contact_name = COALESCE($3, contact_name),
                contact_email = COALESCE($4, contact_email),
                contact_phone = COALESCE($5, contact_phone),
                plan = COALESCE($6, plan),
                contracted_value_cents = COALESCE($7, contracted_value_cents),
                payment_status = COALESCE($8, payment_status),
                benefits_delivered = COALESCE($9, benefits_delivered),
                notes = COALESCE($10, notes),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Sponsor>(&query)
            .bind(id)
            .bind(&input.company_name)
            .bind(&input.contact_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(input.plan.map(|p| p.as_str()))
            .bind(input.contracted_value_cents)
            .bind(input.payment_status.map(|s| s.as_str()))
            .bind(&input.benefits_delivered)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }
}
