//! Mail and scheduler configuration loaded from environment variables.

use std::time::Duration;

use empodhera_core::campaign::DEFAULT_SEND_DELAY;

/// Default Resend endpoint.
pub const DEFAULT_RESEND_API_URL: &str = "https://api.resend.com/emails";

/// Default sender mailbox.
pub const DEFAULT_MAIL_FROM: &str = "EMPODHERA <contato@empodhera.com>";

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Which provider delivers mail.
#[derive(Debug, Clone)]
pub enum MailBackend {
    Resend {
        api_key: String,
        api_url: String,
    },
    Smtp {
        host: String,
        port: u16,
        user: Option<String>,
        password: Option<String>,
    },
}

/// Configuration for outbound email.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// `None` when neither `RESEND_API_KEY` nor `SMTP_HOST` is set. Sending
    /// is then a configuration error.
    pub backend: Option<MailBackend>,
    /// RFC 5322 "From" mailbox.
    pub from: String,
    /// Pause between two recipients of one campaign.
    pub send_delay: Duration,
    /// Timeout for a single provider request.
    pub timeout: Duration,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Resend takes precedence when both backends are configured.
    ///
    /// | Env Var              | Default                               |
    /// |----------------------|---------------------------------------|
    /// | `RESEND_API_KEY`     | (none)                                |
    /// | `RESEND_API_URL`     | `https://api.resend.com/emails`       |
    /// | `SMTP_HOST`          | (none)                                |
    /// | `SMTP_PORT`          | `587`                                 |
    /// | `SMTP_USER`          | (none)                                |
    /// | `SMTP_PASSWORD`      | (none)                                |
    /// | `MAIL_FROM`          | `EMPODHERA <contato@empodhera.com>`   |
    /// | `MAIL_SEND_DELAY_MS` | `100`                                 |
    /// | `MAIL_TIMEOUT_SECS`  | `30`                                  |
    pub fn from_env() -> Self {
        let backend = if let Ok(api_key) = std::env::var("RESEND_API_KEY") {
            Some(MailBackend::Resend {
                api_key,
                api_url: std::env::var("RESEND_API_URL")
                    .unwrap_or_else(|_| DEFAULT_RESEND_API_URL.into()),
            })
        } else if let Ok(host) = std::env::var("SMTP_HOST") {
            Some(MailBackend::Smtp {
                host,
                port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(DEFAULT_SMTP_PORT),
                user: std::env::var("SMTP_USER").ok(),
                password: std::env::var("SMTP_PASSWORD").ok(),
            })
        } else {
            None
        };

        let send_delay_ms: u64 = std::env::var("MAIL_SEND_DELAY_MS")
            .map(|v| v.parse().expect("MAIL_SEND_DELAY_MS must be a valid u64"))
            .unwrap_or(DEFAULT_SEND_DELAY.as_millis() as u64);

        let timeout_secs: u64 = std::env::var("MAIL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("MAIL_TIMEOUT_SECS must be a valid u64");

        Self {
            backend,
            from: std::env::var("MAIL_FROM").unwrap_or_else(|_| DEFAULT_MAIL_FROM.into()),
            send_delay: Duration::from_millis(send_delay_ms),
            timeout: Duration::from_secs(timeout_secs),
        }
    }
}

/// Configuration for the background campaign poller.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Whether the API process runs the poller loop itself.
    pub enabled: bool,
    /// Time between two polls.
    pub interval: Duration,
    /// A `sending` campaign whose heartbeat is older than this is resumed.
    /// Must exceed `HEARTBEAT_MAX_AGE` plus the provider timeout.
    pub stale_after: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval: Duration::from_secs(60),
            stale_after: Duration::from_secs(30 * 60),
        }
    }
}

impl SchedulerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default |
    /// |-----------------------------|---------|
    /// | `SCHEDULER_ENABLED`         | `true`  |
    /// | `SCHEDULER_INTERVAL_SECS`   | `60`    |
    /// | `CAMPAIGN_STALE_AFTER_SECS` | `1800`  |
    ///
    /// # Panics
    ///
    /// Panics on a value that is not a number, or on a zero poll interval.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let enabled = std::env::var("SCHEDULER_ENABLED")
            .map(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(defaults.enabled);

        let interval = std::env::var("SCHEDULER_INTERVAL_SECS")
            .map(|v| {
                parse_poll_interval(&v)
                    .unwrap_or_else(|e| panic!("SCHEDULER_INTERVAL_SECS: {e}"))
            })
            .unwrap_or(defaults.interval);

        let stale_after = std::env::var("CAMPAIGN_STALE_AFTER_SECS")
            .map(|v| {
                Duration::from_secs(
                    v.parse()
                        .expect("CAMPAIGN_STALE_AFTER_SECS must be a valid u64"),
                )
            })
            .unwrap_or(defaults.stale_after);

        Self {
            enabled,
            interval,
            stale_after,
        }
    }
}

/// Whole seconds between polls. Zero is rejected: a zero-period interval
/// cannot tick.
pub fn parse_poll_interval(raw: &str) -> Result<Duration, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("must be at least 1 second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(format!("invalid number {raw:?}: {e}")),
    }
}
