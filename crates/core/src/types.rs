//! Primitive aliases shared by every crate.

/// Primary key of every table (`BIGSERIAL`).
pub type DbId = i64;

/// Instants are stored as `TIMESTAMPTZ` and handled in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
