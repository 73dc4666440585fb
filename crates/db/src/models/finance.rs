//! Financial ledger models and DTOs: categories, transactions, sales and
//! sponsors.
//!
//! Money columns are integer cents. Optional enum columns (payment method,
//! source, creator) are read back as text; the table constraints keep them
//! within the known values.

use chrono::NaiveDate;
use empodhera_core::finance::{
    LedgerEntry, PaymentMethod, SalePlatform, SponsorPlan, TransactionSource, TransactionStatus,
    TransactionType,
};
use empodhera_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub color: Option<String>,
    pub icon: Option<String>,
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// A row from the `transactions` table, joined with its category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Transaction {
    pub id: DbId,
    #[sqlx(rename = "type", try_from = "String")]
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub subcategory: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub payment_method: Option<String>,
    pub source: Option<String>,
    pub is_recurring: bool,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Transaction {
    /// View of this row used by the report aggregations.
    pub fn ledger_entry(&self) -> LedgerEntry<'_> {
        LedgerEntry {
            kind: self.kind,
            status: self.status,
            amount_cents: self.amount_cents,
            date: self.date,
            category_name: self.category_name.as_deref(),
            category_color: self.category_color.as_deref(),
            source: self.source.as_deref().and_then(|s| s.parse().ok()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateTransaction {
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub subcategory: Option<String>,
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub source: Option<TransactionSource>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(skip)]
    pub created_by: Option<DbId>,
}

/// Patch DTO. Only non-`None` fields are applied.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTransaction {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub amount_cents: Option<i64>,
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub category_id: Option<DbId>,
    pub subcategory: Option<String>,
    pub status: Option<TransactionStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub source: Option<TransactionSource>,
    pub is_recurring: Option<bool>,
}

/// Optional filters for listing transactions. Dates are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    #[serde(rename = "type")]
    pub kind: Option<TransactionType>,
    pub category_id: Option<DbId>,
    pub status: Option<TransactionStatus>,
    pub source: Option<TransactionSource>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// A row from the `sales` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sale {
    pub id: DbId,
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: Option<String>,
    pub amount_cents: i64,
    pub date: NaiveDate,
    #[sqlx(try_from = "String")]
    pub platform: SalePlatform,
    #[sqlx(try_from = "String")]
    pub source: TransactionSource,
    pub creator: Option<String>,
    pub notes: Option<String>,
    pub transaction_id: Option<DbId>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSale {
    pub buyer_name: String,
    pub buyer_email: String,
    pub buyer_phone: Option<String>,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub platform: SalePlatform,
    pub source: Option<TransactionSource>,
    pub creator: Option<TransactionSource>,
    pub notes: Option<String>,
    pub transaction_id: Option<DbId>,
    #[serde(skip)]
    pub created_by: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub source: Option<TransactionSource>,
    pub creator: Option<TransactionSource>,
}

// ---------------------------------------------------------------------------
// Sponsors
// ---------------------------------------------------------------------------

/// A row from the `sponsors` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sponsor {
    pub id: DbId,
    pub company_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    #[sqlx(try_from = "String")]
    pub plan: SponsorPlan,
    pub contracted_value_cents: i64,
    #[sqlx(try_from = "String")]
    pub payment_status: TransactionStatus,
    pub benefits_delivered: Option<serde_json::Value>,
    pub notes: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateSponsor {
    pub company_name: String,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub plan: SponsorPlan,
    pub contracted_value_cents: i64,
    pub payment_status: Option<TransactionStatus>,
    pub benefits_delivered: Option<serde_json::Value>,
    pub notes: Option<String>,
    #[serde(skip)]
    pub created_by: Option<DbId>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSponsor {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub plan: Option<SponsorPlan>,
    pub contracted_value_cents: Option<i64>,
    pub payment_status: Option<TransactionStatus>,
    pub benefits_delivered: Option<serde_json::Value>,
    pub notes: Option<String>,
}
