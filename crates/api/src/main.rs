//! API server entry point.

use std::sync::Arc;

use account_number::{AccountNumberIssuer, AtomicCounter, IssuerConfig, RedisCounter};
use api::config::{Config, LogFormat};
use api::{AppState, InMemoryBackends};
use store::{ActionRepository, PostgresActionRepository};
use tokio::signal;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

#[tokio::main]
async fn main() {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env();
    init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");

    // 3. Wire storage, ledgers and the account number counter
    let backends = InMemoryBackends::new();
    let mut repositories = backends.repositories();

    if let Some(url) = &config.database_url {
        let pool = sqlx::PgPool::connect(url)
            .await
            .expect("failed to connect to PostgreSQL");
        let actions = PostgresActionRepository::new(pool);
        actions
            .run_migrations()
            .await
            .expect("failed to run migrations");
        tracing::info!("actions persist in PostgreSQL");
        repositories.actions = Arc::new(actions) as Arc<dyn ActionRepository>;
    }

    let counter: Arc<dyn AtomicCounter> = match &config.redis_url {
        Some(url) => {
            let counter = RedisCounter::new(url)
                .await
                .expect("failed to connect to Redis");
            tracing::info!("account number counter lives in Redis");
            Arc::new(counter)
        }
        None => backends.counter(),
    };

    tracing::warn!("remote ledgers are served by in-memory stand-ins");

    let issuer = AccountNumberIssuer::new(
        counter,
        IssuerConfig::new(
            config.account_number_key_prefix.clone(),
            config.account_number_utc_offset_hours,
        ),
    );
    let state = Arc::new(AppState::new(
        repositories,
        backends.ledgers(),
        config.account_transport,
        issuer,
    ));

    // 4. Build the application
    let app = api::create_app(state, metrics_handle);

    // 5. Start server
    let addr = config.addr();
    tracing::info!(%addr, "starting API server");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    tracing::info!("server shut down gracefully");
}
