//! Success envelope shared by every JSON endpoint.

use serde::Serialize;

/// Body of every successful JSON response: `{ "data": ... }`.
///
/// Errors use a different shape, see [`AppError`](crate::error::AppError).
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
