//! Shared query parameter types for API handlers.

use chrono::NaiveDate;
use serde::Deserialize;

/// Free-text search (`?search=`).
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
}

/// Inclusive date range (`?start_date=&end_date=`, `YYYY-MM-DD`).
///
/// Used by the finance report endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
