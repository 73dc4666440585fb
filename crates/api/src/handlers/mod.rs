//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the repositories in `empodhera_db`, the pure rules in
//! `empodhera_core` and the mail pipeline in `empodhera_mailer`, mapping
//! errors via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod campaigns;
pub mod contacts;
pub mod dashboard;
pub mod finance;
pub mod waiting_list;
pub mod workbook;
