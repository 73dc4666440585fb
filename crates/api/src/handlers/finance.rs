//! Handlers for the financial ledger under `/finance`.
//!
//! Reads are open to admins, finance staff and viewers; writes need admin or
//! finance. Report endpoints aggregate transactions in memory through
//! [`empodhera_core::finance`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use empodhera_core::error::CoreError;
use empodhera_core::finance::{self, ChartData, DreReport, FinanceStats};
use empodhera_core::types::DbId;
use empodhera_db::models::finance::{
    Category, CreateCategory, CreateSale, CreateSponsor, CreateTransaction, Sale, SaleFilter,
    Sponsor, Transaction, TransactionFilter, UpdateSponsor, UpdateTransaction,
};
use empodhera_db::repositories::{CategoryRepo, SaleRepo, SponsorRepo, TransactionRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireFinance, RequireFinanceRead};
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(entity: &'static str, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity, id })
}

fn require_name(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")).into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// GET /api/v1/finance/categories
pub async fn list_categories(
    State(state): State<AppState>,
    RequireFinanceRead(_session): RequireFinanceRead,
) -> AppResult<Json<DataResponse<Vec<Category>>>> {
    let categories = CategoryRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: categories }))
}

/// POST /api/v1/finance/categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireFinance(_session): RequireFinance,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<DataResponse<Category>>)> {
    require_name(&input.name, "name")?;
    let category = CategoryRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: category })))
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// GET /api/v1/finance/transactions
pub async fn list_transactions(
    State(state): State<AppState>,
    RequireFinanceRead(_session): RequireFinanceRead,
    Query(filter): Query<TransactionFilter>,
) -> AppResult<Json<DataResponse<Vec<Transaction>>>> {
    let transactions = TransactionRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: transactions }))
}

/// POST /api/v1/finance/transactions
pub async fn create_transaction(
    State(state): State<AppState>,
    RequireFinance(session): RequireFinance,
    Json(mut input): Json<CreateTransaction>,
) -> AppResult<(StatusCode, Json<DataResponse<Transaction>>)> {
    finance::validate_amount(input.amount_cents)?;
    input.created_by = Some(session.user_id);
    let transaction = TransactionRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: transaction })))
}

/// PUT /api/v1/finance/transactions/{id}
pub async fn update_transaction(
    State(state): State<AppState>,
    RequireFinance(_session): RequireFinance,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTransaction>,
) -> AppResult<Json<DataResponse<Transaction>>> {
    if let Some(cents) = input.amount_cents {
        finance::validate_amount(cents)?;
    }
    let transaction = TransactionRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("transaction", id))?;
    Ok(Json(DataResponse { data: transaction }))
}

/// DELETE /api/v1/finance/transactions/{id}
pub async fn delete_transaction(
    State(state): State<AppState>,
    RequireFinance(_session): RequireFinance,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TransactionRepo::delete(&state.pool, id).await? {
        return Err(not_found("transaction", id));
    }
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Sales
// ---------------------------------------------------------------------------

/// GET /api/v1/finance/sales
pub async fn list_sales(
    State(state): State<AppState>,
    RequireFinanceRead(_session): RequireFinanceRead,
    Query(filter): Query<SaleFilter>,
) -> AppResult<Json<DataResponse<Vec<Sale>>>> {
    let sales = SaleRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: sales }))
}

/// POST /api/v1/finance/sales
pub async fn create_sale(
    State(state): State<AppState>,
    RequireFinance(session): RequireFinance,
    Json(mut input): Json<CreateSale>,
) -> AppResult<(StatusCode, Json<DataResponse<Sale>>)> {
    require_name(&input.buyer_name, "buyer_name")?;
    finance::validate_amount(input.amount_cents)?;
    input.buyer_email = empodhera_core::contacts::parse_email(&input.buyer_email)?;
    input.created_by = Some(session.user_id);
    let sale = SaleRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: sale })))
}

// ---------------------------------------------------------------------------
// Sponsors
// ---------------------------------------------------------------------------

/// GET /api/v1/finance/sponsors
pub async fn list_sponsors(
    State(state): State<AppState>,
    RequireFinanceRead(_session): RequireFinanceRead,
) -> AppResult<Json<DataResponse<Vec<Sponsor>>>> {
    let sponsors = SponsorRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: sponsors }))
}

/// POST /api/v1/finance/sponsors
pub async fn create_sponsor(
    State(state): State<AppState>,
    RequireFinance(session): RequireFinance,
    Json(mut input): Json<CreateSponsor>,
) -> AppResult<(StatusCode, Json<DataResponse<Sponsor>>)> {
    require_name(&input.company_name, "company_name")?;
    finance::validate_amount(input.contracted_value_cents)?;
    input.created_by = Some(session.user_id);
    let sponsor = SponsorRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: sponsor })))
}

/// PUT /api/v1/finance/sponsors/{id}
pub async fn update_sponsor(
    State(state): State<AppState>,
    RequireFinance(_session): RequireFinance,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSponsor>,
) -> AppResult<Json<DataResponse<Sponsor>>> {
    if let Some(cents) = input.contracted_value_cents {
        finance::validate_amount(cents)?;
    }
    let sponsor = SponsorRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found("sponsor", id))?;
    Ok(Json(DataResponse { data: sponsor }))
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

async fn ledger(state: &AppState, range: DateRangeParams) -> AppResult<Vec<Transaction>> {
    if let (Some(start), Some(end)) = (range.start_date, range.end_date) {
        if start > end {
            return Err(CoreError::Validation("start_date must not be after end_date".into()).into());
        }
    }
    let filter = TransactionFilter {
        start_date: range.start_date,
        end_date: range.end_date,
        ..TransactionFilter::default()
    };
    Ok(TransactionRepo::list(&state.pool, &filter).await?)
}

/// GET /api/v1/finance/stats?start_date=&end_date=
pub async fn stats(
    State(state): State<AppState>,
    RequireFinanceRead(_session): RequireFinanceRead,
    Query(range): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<FinanceStats>>> {
    let rows = ledger(&state, range).await?;
    let entries: Vec<_> = rows.iter().map(Transaction::ledger_entry).collect();
    Ok(Json(DataResponse {
        data: finance::summarize(&entries),
    }))
}

/// GET /api/v1/finance/charts?start_date=&end_date=
pub async fn charts(
    State(state): State<AppState>,
    RequireFinanceRead(_session): RequireFinanceRead,
    Query(range): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<ChartData>>> {
    let rows = ledger(&state, range).await?;
    let entries: Vec<_> = rows.iter().map(Transaction::ledger_entry).collect();
    Ok(Json(DataResponse {
        data: finance::chart_data(&entries),
    }))
}

/// GET /api/v1/finance/dre?start_date=&end_date=
///
/// Income statement. Cancelled transactions are left out.
pub async fn dre(
    State(state): State<AppState>,
    RequireFinanceRead(_session): RequireFinanceRead,
    Query(range): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<DreReport>>> {
    let rows = ledger(&state, range).await?;
    let entries: Vec<_> = rows.iter().map(Transaction::ledger_entry).collect();
    Ok(Json(DataResponse {
        data: finance::dre(&entries),
    }))
}
