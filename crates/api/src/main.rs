use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use empodhera_api::app::build_router;
use empodhera_api::background;
use empodhera_api::config::ServerConfig;
use empodhera_api::state::AppState;
use empodhera_db::DbPool;
use empodhera_mailer::{CampaignScheduler, Dispatcher, MailConfig, Mailer, SchedulerConfig};

const DEFAULT_LOG_FILTER: &str = "empodhera_api=debug,empodhera_mailer=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    let scheduler_config = SchedulerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Loaded server configuration");

    let pool = connect_database().await;

    let mailer = Mailer::from_config(&MailConfig::from_env())
        .expect("Failed to configure email provider")
        .map(Arc::new);
    match &mailer {
        Some(m) => tracing::info!(from = %m.from_address(), "Email provider configured"),
        None => tracing::warn!("No email provider configured, campaign sends are disabled"),
    }

    let cancel = CancellationToken::new();
    let handles = spawn_background(&pool, mailer.as_ref(), &scheduler_config, &cancel);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST must be an IP address"),
        config.port,
    );
    let grace = Duration::from_secs(config.shutdown_timeout_secs);

    let app = build_router(AppState {
        pool,
        config: Arc::new(config),
        mailer,
        scheduler: Arc::new(scheduler_config),
    });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // An interrupted campaign keeps its last heartbeat and is picked up again
    // by a later poll once that heartbeat is stale.
    tracing::info!("HTTP server stopped, waiting for background tasks");
    cancel.cancel();
    for handle in handles {
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Background task did not stop in time");
        }
    }
    tracing::info!("Shutdown complete");
}

/// Human-readable logs by default, JSON lines with `LOG_FORMAT=json`.
/// `RUST_LOG` overrides the filter.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Connect, verify and migrate. Any failure aborts startup.
async fn connect_database() -> DbPool {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = empodhera_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    empodhera_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    empodhera_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database ready");
    pool
}

/// Session cleanup always runs. The campaign poller needs both an email
/// provider and `SCHEDULER_ENABLED`.
fn spawn_background(
    pool: &DbPool,
    mailer: Option<&Arc<Mailer>>,
    scheduler_config: &SchedulerConfig,
    cancel: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    let mut handles = vec![tokio::spawn(background::session_cleanup::run(
        pool.clone(),
        cancel.clone(),
    ))];

    match (mailer, scheduler_config.enabled) {
        (Some(mailer), true) => {
            let scheduler = CampaignScheduler::new(
                pool.clone(),
                Dispatcher::new(pool.clone(), Arc::clone(mailer)),
                scheduler_config.clone(),
            );
            let cancel = cancel.clone();
            handles.push(tokio::spawn(async move { scheduler.run(cancel).await }));
        }
        (None, true) => {
            tracing::warn!("Campaign scheduler not started: no email provider configured");
        }
        (_, false) => tracing::info!("Campaign scheduler disabled"),
    }

    handles
}

/// Resolves on SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received SIGINT, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
