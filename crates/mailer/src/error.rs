use empodhera_core::error::CoreError;

/// Failure reported by an email provider for a single message.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status. Displays the response
    /// body verbatim.
    #[error("{body}")]
    Rejected { status: u16, body: String },

    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// A sender or recipient address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

/// Error aborting a whole dispatch or test send.
///
/// Per-recipient provider failures during a dispatch are logged, never
/// returned; `Provider` only surfaces from a test send.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Email provider error: {0}")]
    Provider(#[from] ProviderError),
}
