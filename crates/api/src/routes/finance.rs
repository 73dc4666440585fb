//! Route definitions for the `/finance` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::finance;
use crate::state::AppState;

/// Routes mounted at `/finance`.
///
/// ```text
/// GET    /categories          -> list_categories
/// POST   /categories          -> create_category
/// GET    /transactions        -> list_transactions
/// POST   /transactions        -> create_transaction
/// PUT    /transactions/{id}   -> update_transaction
/// DELETE /transactions/{id}   -> delete_transaction
/// GET    /sales               -> list_sales
/// POST   /sales               -> create_sale
/// GET    /sponsors            -> list_sponsors
/// POST   /sponsors            -> create_sponsor
/// PUT    /sponsors/{id}       -> update_sponsor
/// GET    /stats               -> stats
/// GET    /charts              -> charts
/// GET    /dre                 -> dre
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/categories",
            get(finance::list_categories).post(finance::create_category),
        )
        .route(
            "/transactions",
            get(finance::list_transactions).post(finance::create_transaction),
        )
        .route(
            "/transactions/{id}",
            put(finance::update_transaction).delete(finance::delete_transaction),
        )
        .route("/sales", get(finance::list_sales).post(finance::create_sale))
        .route(
            "/sponsors",
            get(finance::list_sponsors).post(finance::create_sponsor),
        )
        .route("/sponsors/{id}", put(finance::update_sponsor))
        .route("/stats", get(finance::stats))
        .route("/charts", get(finance::charts))
        .route("/dre", get(finance::dre))
}
