pub mod auth;
pub mod campaigns;
pub mod contacts;
pub mod dashboard;
pub mod finance;
pub mod health;
pub mod waiting_list;
pub mod workbook;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     signup (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /campaigns                                       list, create (admin only)
/// /campaigns/process-scheduled                     poll due campaigns (admin or cron token)
/// /campaigns/{id}                                  get, update, delete
/// /campaigns/{id}/schedule                         schedule (POST)
/// /campaigns/{id}/cancel-schedule                  back to draft (POST)
/// /campaigns/{id}/send                             send now (POST)
/// /campaigns/{id}/test                             test send (POST)
/// /campaigns/{id}/logs                             delivery log (GET)
///
/// /contacts                                        list (?search), create (admin only)
/// /contacts/import                                 CSV import (POST)
/// /contacts/export                                 CSV export (GET)
/// /contacts/{id}                                   delete
///
/// /waiting-list                                    join (public), list (admin)
/// /waiting-list/{id}                               delete (admin)
///
/// /dashboard                                       counters (admin only)
///
/// /finance/categories                              list, create
/// /finance/transactions                            list (filters), create
/// /finance/transactions/{id}                       update, delete
/// /finance/sales                                   list (filters), create
/// /finance/sponsors                                list, create
/// /finance/sponsors/{id}                           update
/// /finance/stats                                   totals (?start_date, end_date)
/// /finance/charts                                  chart series
/// /finance/dre                                     income statement
///
/// /workbook/modules                                activity catalog (auth required)
/// /workbook/responses                              list (?module_id), save (PUT)
/// /workbook/progress                               completion per module
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/campaigns", campaigns::router())
        .nest("/contacts", contacts::router())
        .nest("/waiting-list", waiting_list::router())
        .nest("/dashboard", dashboard::router())
        .nest("/finance", finance::router())
        .nest("/workbook", workbook::router())
}
