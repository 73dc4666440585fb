//! Financial ledger vocabulary and report aggregations.
//!
//! Amounts are integer cents. Every report is a pure reduction over the
//! ledger rows for a period; nothing is stored.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Category name whose expenses are reported as platform fees in the DRE.
pub const PLATFORM_CATEGORY: &str = "Plataforma";

/// Bucket used for uncategorised rows.
pub const UNCATEGORIZED_NAME: &str = "Outros";

/// Colour used for uncategorised rows in charts.
pub const UNCATEGORIZED_COLOR: &str = "#78716C";

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Declare a closed, text-backed enum with `as_str`, `label`, `Display`,
/// `FromStr` and `TryFrom<String>` (used by sqlx row decoding).
macro_rules! define_text_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $variant:ident => ($text:literal, $label:literal) ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $( $variant ),+
        }

        impl $name {
            /// Database representation.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Self::$variant => $text ),+
                }
            }

            /// Human-readable (pt-BR) label.
            pub fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label ),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $text => Ok(Self::$variant), )+
                    other => Err(CoreError::Validation(format!(
                        concat!("Unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = CoreError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

define_text_enum! {
    /// Direction of a ledger entry.
    TransactionType {
        Receita => ("receita", "Receita"),
        Despesa => ("despesa", "Despesa"),
    }
}

define_text_enum! {
    /// Settlement status shared by transactions and sponsor payments.
    TransactionStatus {
        Previsto => ("previsto", "Previsto"),
        Recebido => ("recebido", "Recebido"),
        Pago => ("pago", "Pago"),
        Cancelado => ("cancelado", "Cancelado"),
    }
}

define_text_enum! {
    PaymentMethod {
        Pix => ("pix", "PIX"),
        Credito => ("credito", "Cartão de Crédito"),
        Debito => ("debito", "Cartão de Débito"),
        Transferencia => ("transferencia", "Transferência"),
        Boleto => ("boleto", "Boleto"),
    }
}

define_text_enum! {
    /// Acquisition channel of a sale or revenue entry.
    TransactionSource {
        Organico => ("organico", "Orgânico"),
        Indicacao => ("indicacao", "Indicação"),
        CriadoraSamira => ("criadora_samira", "Samira"),
        CriadoraSimone => ("criadora_simone", "Simone"),
        CriadoraSueli => ("criadora_sueli", "Sueli"),
        TrafegoPago => ("trafego_pago", "Tráfego Pago"),
    }
}

define_text_enum! {
    SalePlatform {
        Site => ("site", "Site"),
        Whatsapp => ("whatsapp", "WhatsApp"),
        Instagram => ("instagram", "Instagram"),
        Sympla => ("sympla", "Sympla"),
        Indicacao => ("indicacao", "Indicação"),
    }
}

define_text_enum! {
    SponsorPlan {
        Bronze => ("bronze", "Bronze"),
        Prata => ("prata", "Prata"),
        Ouro => ("ouro", "Ouro"),
        Diamante => ("diamante", "Diamante"),
    }
}

/// Reject negative amounts.
pub fn validate_amount(cents: i64) -> Result<(), CoreError> {
    if cents < 0 {
        return Err(CoreError::Validation("amount must not be negative".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Ledger view used by the reports
// ---------------------------------------------------------------------------

/// The fields of a transaction that the reports look at.
#[derive(Debug, Clone)]
pub struct LedgerEntry<'a> {
    pub kind: TransactionType,
    pub status: TransactionStatus,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub category_name: Option<&'a str>,
    pub category_color: Option<&'a str>,
    pub source: Option<TransactionSource>,
}

impl LedgerEntry<'_> {
    /// Money actually in or out: revenue received or expense paid.
    fn is_realized(&self) -> bool {
        matches!(
            (self.kind, self.status),
            (TransactionType::Receita, TransactionStatus::Recebido)
                | (TransactionType::Despesa, TransactionStatus::Pago)
        )
    }

    /// Realised or still expected. Cancelled entries never count.
    fn counts_for_dre(&self) -> bool {
        self.is_realized() || self.status == TransactionStatus::Previsto
    }

    fn category(&self) -> &str {
        self.category_name.unwrap_or(UNCATEGORIZED_NAME)
    }
}

fn margin(profit: i64, revenue: i64) -> f64 {
    if revenue > 0 {
        profit as f64 / revenue as f64 * 100.0
    } else {
        0.0
    }
}

/// Add `amount` to the bucket named `key`, keeping first-seen order.
fn accumulate<'k>(buckets: &mut Vec<(&'k str, i64)>, key: &'k str, amount: i64) {
    match buckets.iter_mut().find(|(k, _)| *k == key) {
        Some((_, total)) => *total += amount,
        None => buckets.push((key, amount)),
    }
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

/// Headline numbers for the finance dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinanceStats {
    pub total_receita: i64,
    pub total_despesa: i64,
    pub lucro_liquido: i64,
    /// Net margin as a percentage of realised revenue.
    pub margem: f64,
    pub receita_prevista: i64,
    pub despesa_prevista: i64,
}

pub fn summarize(entries: &[LedgerEntry<'_>]) -> FinanceStats {
    let mut stats = FinanceStats::default();

    for e in entries {
        match (e.kind, e.status) {
            (TransactionType::Receita, TransactionStatus::Recebido) => {
                stats.total_receita += e.amount_cents
            }
            (TransactionType::Receita, TransactionStatus::Previsto) => {
                stats.receita_prevista += e.amount_cents
            }
            (TransactionType::Despesa, TransactionStatus::Pago) => {
                stats.total_despesa += e.amount_cents
            }
            (TransactionType::Despesa, TransactionStatus::Previsto) => {
                stats.despesa_prevista += e.amount_cents
            }
            _ => {}
        }
    }

    stats.lucro_liquido = stats.total_receita - stats.total_despesa;
    stats.margem = margin(stats.lucro_liquido, stats.total_receita);
    stats
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    /// `YYYY-MM`.
    pub month: String,
    pub receita: i64,
    pub despesa: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub name: String,
    pub value: i64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceSlice {
    pub source: TransactionSource,
    pub label: &'static str,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub monthly: Vec<MonthlyPoint>,
    pub expenses_by_category: Vec<CategorySlice>,
    pub revenue_by_source: Vec<SourceSlice>,
}

/// Realised revenue and expenses per calendar month, oldest first.
pub fn monthly_series(entries: &[LedgerEntry<'_>]) -> Vec<MonthlyPoint> {
    let mut months: Vec<MonthlyPoint> = Vec::new();

    for e in entries {
        let month = e.date.format("%Y-%m").to_string();
        let idx = match months.iter().position(|m| m.month == month) {
            Some(idx) => idx,
            None => {
                months.push(MonthlyPoint { month, receita: 0, despesa: 0 });
                months.len() - 1
            }
        };
        match (e.kind, e.status) {
            (TransactionType::Receita, TransactionStatus::Recebido) => {
                months[idx].receita += e.amount_cents
            }
            (TransactionType::Despesa, TransactionStatus::Pago) => {
                months[idx].despesa += e.amount_cents
            }
            _ => {}
        }
    }

    months.sort_by(|a, b| a.month.cmp(&b.month));
    months
}

/// Paid expenses grouped by category.
pub fn expenses_by_category(entries: &[LedgerEntry<'_>]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();

    for e in entries
        .iter()
        .filter(|e| e.kind == TransactionType::Despesa && e.status == TransactionStatus::Pago)
    {
        let name = e.category();
        match slices.iter_mut().find(|s| s.name == name) {
            Some(slice) => slice.value += e.amount_cents,
            None => slices.push(CategorySlice {
                name: name.to_string(),
                value: e.amount_cents,
                color: e.category_color.unwrap_or(UNCATEGORIZED_COLOR).to_string(),
            }),
        }
    }

    slices
}

/// Received revenue grouped by acquisition source. Missing sources count as
/// organic.
pub fn revenue_by_source(entries: &[LedgerEntry<'_>]) -> Vec<SourceSlice> {
    let mut slices: Vec<SourceSlice> = Vec::new();

    for e in entries
        .iter()
        .filter(|e| e.kind == TransactionType::Receita && e.status == TransactionStatus::Recebido)
    {
        let source = e.source.unwrap_or(TransactionSource::Organico);
        match slices.iter_mut().find(|s| s.source == source) {
            Some(slice) => slice.value += e.amount_cents,
            None => slices.push(SourceSlice {
                source,
                label: source.label(),
                value: e.amount_cents,
            }),
        }
    }

    slices
}

pub fn chart_data(entries: &[LedgerEntry<'_>]) -> ChartData {
    ChartData {
        monthly: monthly_series(entries),
        expenses_by_category: expenses_by_category(entries),
        revenue_by_source: revenue_by_source(entries),
    }
}

// ---------------------------------------------------------------------------
// DRE
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreLine {
    pub name: String,
    pub value: i64,
}

/// Event results statement. Includes both settled and expected entries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreReport {
    pub revenue_by_category: Vec<DreLine>,
    pub total_receita: i64,
    /// Expenses in the [`PLATFORM_CATEGORY`] category.
    pub platform_fees: i64,
    /// Operating costs: every expense category except the platform one.
    pub operating_costs: Vec<DreLine>,
    pub other_expenses: i64,
    pub total_despesa: i64,
    pub lucro_operacional: i64,
    pub margem: f64,
}

pub fn dre(entries: &[LedgerEntry<'_>]) -> DreReport {
    let mut revenue: Vec<(&str, i64)> = Vec::new();
    let mut expenses: Vec<(&str, i64)> = Vec::new();

    for e in entries.iter().filter(|e| e.counts_for_dre()) {
        match e.kind {
            TransactionType::Receita => accumulate(&mut revenue, e.category(), e.amount_cents),
            TransactionType::Despesa => accumulate(&mut expenses, e.category(), e.amount_cents),
        }
    }

    let total_receita: i64 = revenue.iter().map(|(_, v)| v).sum();
    let total_despesa: i64 = expenses.iter().map(|(_, v)| v).sum();
    let platform_fees = expenses
        .iter()
        .find(|(name, _)| *name == PLATFORM_CATEGORY)
        .map_or(0, |(_, v)| *v);
    let lucro_operacional = total_receita - total_despesa;

    let to_lines = |buckets: Vec<(&str, i64)>| {
        buckets
            .into_iter()
            .map(|(name, value)| DreLine { name: name.to_string(), value })
            .collect::<Vec<_>>()
    };

    DreReport {
        revenue_by_category: to_lines(revenue),
        total_receita,
        platform_fees,
        operating_costs: to_lines(
            expenses
                .into_iter()
                .filter(|(name, _)| *name != PLATFORM_CATEGORY)
                .collect(),
        ),
        other_expenses: total_despesa - platform_fees,
        total_despesa,
        lucro_operacional,
        margem: margin(lucro_operacional, total_receita),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(
        kind: TransactionType,
        status: TransactionStatus,
        amount_cents: i64,
        date: &str,
        category: Option<&'static str>,
    ) -> LedgerEntry<'static> {
        LedgerEntry {
            kind,
            status,
            amount_cents,
            date: date.parse().unwrap(),
            category_name: category,
            category_color: None,
            source: None,
        }
    }

    fn ledger() -> Vec<LedgerEntry<'static>> {
        use TransactionStatus::*;
        use TransactionType::*;
        vec![
            entry(Receita, Recebido, 100_000, "2026-02-10", Some("Ingressos")),
            entry(Receita, Previsto, 50_000, "2026-03-01", Some("Patrocínio")),
            entry(Despesa, Pago, 30_000, "2026-02-12", Some("Buffet")),
            entry(Despesa, Pago, 5_000, "2026-03-02", Some(PLATFORM_CATEGORY)),
            entry(Despesa, Previsto, 10_000, "2026-03-05", None),
            entry(Despesa, Cancelado, 99_999, "2026-03-06", Some("Buffet")),
        ]
    }

    #[test]
    fn enum_text_round_trip() {
        assert_eq!("criadora_sueli".parse::<TransactionSource>().unwrap().label(), "Sueli");
        assert!("bitcoin".parse::<PaymentMethod>().is_err());
        assert_eq!(SponsorPlan::Diamante.to_string(), "diamante");
    }

    #[test]
    fn negative_amount_is_rejected() {
        assert!(validate_amount(-1).is_err());
        assert!(validate_amount(0).is_ok());
    }

    #[test]
    fn summary_splits_realised_and_expected() {
        let stats = summarize(&ledger());
        assert_eq!(stats.total_receita, 100_000);
        assert_eq!(stats.receita_prevista, 50_000);
        assert_eq!(stats.total_despesa, 35_000);
        assert_eq!(stats.despesa_prevista, 10_000);
        assert_eq!(stats.lucro_liquido, 65_000);
        assert!((stats.margem - 65.0).abs() < f64::EPSILON);
    }

    #[test]
    fn margin_is_zero_without_revenue() {
        let stats = summarize(&[entry(
            TransactionType::Despesa,
            TransactionStatus::Pago,
            10,
            "2026-01-01",
            None,
        )]);
        assert_eq!(stats.lucro_liquido, -10);
        assert_eq!(stats.margem, 0.0);
    }

    #[test]
    fn monthly_series_is_sorted_and_realised_only() {
        let months = monthly_series(&ledger());
        assert_eq!(
            months,
            vec![
                MonthlyPoint { month: "2026-02".into(), receita: 100_000, despesa: 30_000 },
                MonthlyPoint { month: "2026-03".into(), receita: 0, despesa: 5_000 },
            ]
        );
    }

    #[test]
    fn expenses_group_by_category_with_fallback() {
        let mut entries = ledger();
        entries.push(entry(
            TransactionType::Despesa,
            TransactionStatus::Pago,
            700,
            "2026-03-07",
            None,
        ));
        let slices = expenses_by_category(&entries);
        let outros = slices.iter().find(|s| s.name == UNCATEGORIZED_NAME).unwrap();
        assert_eq!(outros.value, 700);
        assert_eq!(outros.color, UNCATEGORIZED_COLOR);
        assert_eq!(slices.len(), 3);
    }

    #[test]
    fn revenue_without_source_counts_as_organic() {
        let slices = revenue_by_source(&ledger());
        assert_eq!(slices.len(), 1);
        assert_eq!(slices[0].source, TransactionSource::Organico);
        assert_eq!(slices[0].value, 100_000);
    }

    #[test]
    fn dre_separates_platform_fees() {
        let report = dre(&ledger());
        assert_eq!(report.total_receita, 150_000);
        assert_eq!(report.total_despesa, 45_000);
        assert_eq!(report.platform_fees, 5_000);
        assert_eq!(report.other_expenses, 40_000);
        assert_eq!(report.lucro_operacional, 105_000);
        assert!(report.operating_costs.iter().all(|l| l.name != PLATFORM_CATEGORY));
        assert_eq!(
            report.operating_costs,
            vec![
                DreLine { name: "Buffet".into(), value: 30_000 },
                DreLine { name: UNCATEGORIZED_NAME.into(), value: 10_000 },
            ]
        );
        assert!((report.margem - 70.0).abs() < 1e-9);
    }
}
