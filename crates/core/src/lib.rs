//! Domain building blocks shared by the EMPODHERA back-office crates.
//!
//! This crate has zero internal dependencies and no I/O: it holds the
//! campaign lifecycle, contact parsing, finance aggregations, workbook
//! catalog and the debounced autosave state machine so that the database,
//! mailer and API layers can all share them.

pub mod autosave;
pub mod campaign;
pub mod contacts;
pub mod error;
pub mod finance;
pub mod roles;
pub mod types;
pub mod workbook;
