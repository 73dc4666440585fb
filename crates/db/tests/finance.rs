//! Integration tests for the financial ledger and its reports.

use chrono::NaiveDate;
use empodhera_core::finance::{
    self, SalePlatform, SponsorPlan, TransactionSource, TransactionStatus, TransactionType,
};
use empodhera_db::models::finance::{
    CreateCategory, CreateSale, CreateSponsor, CreateTransaction, SaleFilter, TransactionFilter,
    UpdateSponsor, UpdateTransaction,
};
use empodhera_db::repositories::{CategoryRepo, SaleRepo, SponsorRepo, TransactionRepo};
use sqlx::PgPool;

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

fn tx(kind: TransactionType, status: TransactionStatus, cents: i64, on: &str) -> CreateTransaction {
    CreateTransaction {
        kind,
        amount_cents: cents,
        date: date(on),
        description: None,
        category_id: None,
        subcategory: None,
        status: Some(status),
        payment_method: None,
        source: None,
        is_recurring: false,
        created_by: None,
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn transactions_join_category_and_filter(pool: PgPool) {
    let platform = CategoryRepo::create(
        &pool,
        &CreateCategory {
            name: finance::PLATFORM_CATEGORY.to_string(),
            kind: TransactionType::Despesa,
            color: Some("#F97316".to_string()),
            icon: None,
        },
    )
    .await
    .unwrap();

    let mut fee = tx(TransactionType::Despesa, TransactionStatus::Pago, 2_500, "2026-03-02");
    fee.category_id = Some(platform.id);
    let fee = TransactionRepo::create(&pool, &fee).await.unwrap();
    assert_eq!(fee.category_name.as_deref(), Some("Plataforma"));

    let mut ticket = tx(TransactionType::Receita, TransactionStatus::Recebido, 50_000, "2026-03-01");
    ticket.source = Some(TransactionSource::TrafegoPago);
    TransactionRepo::create(&pool, &ticket).await.unwrap();
    TransactionRepo::create(
        &pool,
        &tx(TransactionType::Receita, TransactionStatus::Previsto, 10_000, "2026-04-10"),
    )
    .await
    .unwrap();

    let march = TransactionFilter {
        start_date: Some(date("2026-03-01")),
        end_date: Some(date("2026-03-31")),
        ..Default::default()
    };
    let rows = TransactionRepo::list(&pool, &march).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, date("2026-03-02"), "most recent first");

    let entries: Vec<_> = rows.iter().map(|t| t.ledger_entry()).collect();
    let stats = finance::summarize(&entries);
    assert_eq!(stats.total_receita, 50_000);
    assert_eq!(stats.total_despesa, 2_500);

    let dre = finance::dre(&entries);
    assert_eq!(dre.platform_fees, 2_500);

    let by_source = finance::revenue_by_source(&entries);
    assert_eq!(by_source[0].source, TransactionSource::TrafegoPago);

    let expenses_only = TransactionFilter {
        kind: Some(TransactionType::Despesa),
        ..Default::default()
    };
    assert_eq!(TransactionRepo::list(&pool, &expenses_only).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn negative_amounts_are_rejected_by_the_schema(pool: PgPool) {
    let result = TransactionRepo::create(
        &pool,
        &tx(TransactionType::Despesa, TransactionStatus::Pago, -1, "2026-03-02"),
    )
    .await;
    assert!(result.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn transaction_patch_and_delete(pool: PgPool) {
    let created = TransactionRepo::create(
        &pool,
        &tx(TransactionType::Receita, TransactionStatus::Previsto, 1_000, "2026-03-02"),
    )
    .await
    .unwrap();

    let patch = UpdateTransaction {
        status: Some(TransactionStatus::Recebido),
        ..Default::default()
    };
    let updated = TransactionRepo::update(&pool, created.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.status, TransactionStatus::Recebido);
    assert_eq!(updated.amount_cents, 1_000);

    assert!(TransactionRepo::delete(&pool, created.id).await.unwrap());
    assert!(TransactionRepo::update(&pool, created.id, &patch).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn sales_default_to_organic_and_filter_by_creator(pool: PgPool) {
    let base = CreateSale {
        buyer_name: "Ana".to_string(),
        buyer_email: "ana@x.com".to_string(),
        buyer_phone: None,
        amount_cents: 29_700,
        date: date("2026-03-05"),
        platform: SalePlatform::Sympla,
        source: None,
        creator: None,
        notes: None,
        transaction_id: None,
        created_by: None,
    };
    let organic = SaleRepo::create(&pool, &base).await.unwrap();
    assert_eq!(organic.source, TransactionSource::Organico);

    let referred = CreateSale {
        creator: Some(TransactionSource::CriadoraSimone),
        source: Some(TransactionSource::CriadoraSimone),
        ..base
    };
    SaleRepo::create(&pool, &referred).await.unwrap();

    let filter = SaleFilter {
        creator: Some(TransactionSource::CriadoraSimone),
        ..Default::default()
    };
    let rows = SaleRepo::list(&pool, &filter).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].creator.as_deref(), Some("criadora_simone"));
}

#[sqlx::test(migrations = "./migrations")]
async fn sponsor_payment_status_patch(pool: PgPool) {
    let sponsor = SponsorRepo::create(
        &pool,
        &CreateSponsor {
            company_name: "Acme".to_string(),
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            plan: SponsorPlan::Ouro,
            contracted_value_cents: 1_000_000,
            payment_status: None,
            benefits_delivered: None,
            notes: None,
            created_by: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(sponsor.payment_status, TransactionStatus::Previsto);

    let patch = UpdateSponsor {
        payment_status: Some(TransactionStatus::Recebido),
        ..Default::default()
    };
    let updated = SponsorRepo::update(&pool, sponsor.id, &patch).await.unwrap().unwrap();
    assert_eq!(updated.payment_status, TransactionStatus::Recebido);
    assert_eq!(updated.plan, SponsorPlan::Ouro);
    assert_eq!(SponsorRepo::list(&pool).await.unwrap().len(), 1);
}
