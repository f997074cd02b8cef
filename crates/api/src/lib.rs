//! HTTP API for authorize actions and account number issuance.
//!
//! Provides REST endpoints over the authorize action saga (one saga per
//! ledger backend) and the account number issuer, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use account_number::{AccountNumberIssuer, AtomicCounter, InMemoryCounter, IssuerConfig};
use axum::Router;
use axum::routing::{delete, get, post};
use metrics_exporter_prometheus::PrometheusHandle;
use saga::{
    AccountAdapter, AuthorizeActionSaga, CoinAdapter, InMemoryLedgerService, LedgerService,
    PointAwardAdapter,
};
use store::{
    ActionRepository, InMemoryActionRepository, InMemoryOrganizationRepository,
    InMemoryTransactionRepository, OrganizationRepository, TransactionRepository,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::AccountTransportMode;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub point_awards: AuthorizeActionSaga<PointAwardAdapter>,
    pub accounts: AuthorizeActionSaga<AccountAdapter>,
    pub coins: AuthorizeActionSaga<CoinAdapter>,
    pub actions: Arc<dyn ActionRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub issuer: AccountNumberIssuer,
}

/// Remote ledger clients, one per backend.
#[derive(Clone)]
pub struct Ledgers {
    pub point: Arc<dyn LedgerService>,
    pub account: Arc<dyn LedgerService>,
    pub coin: Arc<dyn LedgerService>,
}

/// Storage collaborators shared by the sagas.
#[derive(Clone)]
pub struct Repositories {
    pub actions: Arc<dyn ActionRepository>,
    pub transactions: Arc<dyn TransactionRepository>,
    pub organizations: Arc<dyn OrganizationRepository>,
}

impl AppState {
    /// Wires one saga per ledger backend over shared repositories.
    pub fn new(
        repositories: Repositories,
        ledgers: Ledgers,
        account_transport: AccountTransportMode,
        issuer: AccountNumberIssuer,
    ) -> Self {
        let Repositories {
            actions,
            transactions,
            organizations,
        } = repositories;

        let account_adapter = match account_transport {
            AccountTransportMode::Withdraw => AccountAdapter::withdraw(ledgers.account),
            AccountTransportMode::Transfer => {
                AccountAdapter::transfer(ledgers.account, Arc::clone(&organizations))
            }
        };

        Self {
            point_awards: AuthorizeActionSaga::new(
                Arc::clone(&actions),
                Arc::clone(&transactions),
                PointAwardAdapter::new(ledgers.point),
            ),
            accounts: AuthorizeActionSaga::new(
                Arc::clone(&actions),
                Arc::clone(&transactions),
                account_adapter,
            ),
            coins: AuthorizeActionSaga::new(
                Arc::clone(&actions),
                Arc::clone(&transactions),
                CoinAdapter::new(ledgers.coin, organizations),
            ),
            actions,
            transactions,
            issuer,
        }
    }
}

/// In-memory collaborators behind the default state, exposed for seeding.
#[derive(Clone)]
pub struct InMemoryBackends {
    pub actions: InMemoryActionRepository,
    pub transactions: InMemoryTransactionRepository,
    pub organizations: InMemoryOrganizationRepository,
    pub point_ledger: InMemoryLedgerService,
    pub account_ledger: InMemoryLedgerService,
    pub coin_ledger: InMemoryLedgerService,
    pub counter: InMemoryCounter,
}

impl InMemoryBackends {
    pub fn new() -> Self {
        Self {
            actions: InMemoryActionRepository::new(),
            transactions: InMemoryTransactionRepository::new(),
            organizations: InMemoryOrganizationRepository::new(),
            point_ledger: InMemoryLedgerService::new("point-ledger", "memory://points", "ptx"),
            account_ledger: InMemoryLedgerService::new(
                "account-ledger",
                "memory://accounts",
                "atx",
            ),
            coin_ledger: InMemoryLedgerService::new("coin-ledger", "memory://coins", "ctx"),
            counter: InMemoryCounter::new(),
        }
    }

    pub fn repositories(&self) -> Repositories {
        Repositories {
            actions: Arc::new(self.actions.clone()),
            transactions: Arc::new(self.transactions.clone()),
            organizations: Arc::new(self.organizations.clone()),
        }
    }

    pub fn ledgers(&self) -> Ledgers {
        Ledgers {
            point: Arc::new(self.point_ledger.clone()),
            account: Arc::new(self.account_ledger.clone()),
            coin: Arc::new(self.coin_ledger.clone()),
        }
    }

    pub fn counter(&self) -> Arc<dyn AtomicCounter> {
        Arc::new(self.counter.clone())
    }
}

impl Default for InMemoryBackends {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/transactions/place-order/{id}/actions/authorize",
            get(routes::authorize::list),
        )
        .route(
            "/transactions/place-order/{id}/actions/authorize/{kind}",
            post(routes::authorize::create),
        )
        .route(
            "/transactions/place-order/{id}/actions/authorize/{kind}/{action_id}",
            delete(routes::authorize::cancel),
        )
        .route("/accounts/numbers", post(routes::accounts::issue))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the default application state backed entirely by memory.
pub fn create_default_state() -> (Arc<AppState>, InMemoryBackends) {
    let backends = InMemoryBackends::new();
    let state = AppState::new(
        backends.repositories(),
        backends.ledgers(),
        AccountTransportMode::default(),
        AccountNumberIssuer::new(backends.counter(), IssuerConfig::default()),
    );
    (Arc::new(state), backends)
}
