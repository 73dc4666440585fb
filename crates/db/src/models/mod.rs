//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches, where the
//!   entity can be patched

pub mod campaign;
pub mod contact;
pub mod dashboard;
pub mod finance;
pub mod session;
pub mod user;
pub mod waiting_list;
pub mod workbook;
