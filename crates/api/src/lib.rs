//! HTTP back office for EMPODHERA: admin panel API, workbook API and the
//! public waiting-list form.
//!
//! The binary in `main.rs` only wires configuration and background tasks;
//! [`app::build_router`] is what integration tests drive.

pub mod app;
pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod routes;
pub mod state;
