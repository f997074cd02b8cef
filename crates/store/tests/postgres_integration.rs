//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;

use common::{ActionId, TransactionId};
use domain::{
    ActionAttributes, ActionPurpose, ActionResult, ActionStatus, AuthorizeKind, AuthorizeObject,
    ErrorSummary, Party, PendingLedgerTransaction, TransactionType,
};
use serial_test::serial;
use sqlx::PgPool;
use store::{ActionQuery, ActionRepository, PostgresActionRepository, StoreError};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_actions_table.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh repository with its own pool and a cleared table
async fn get_test_repository() -> PostgresActionRepository {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    sqlx::query("TRUNCATE TABLE actions")
        .execute(&pool)
        .await
        .unwrap();

    PostgresActionRepository::new(pool)
}

fn point_award_attributes(purpose_id: TransactionId) -> ActionAttributes {
    ActionAttributes {
        agent: Party::organization("seller-1", "Cinema"),
        recipient: Party::person("customer-1").with_membership("M-001"),
        object: AuthorizeObject::PointAward {
            amount: 500,
            to_account_number: "123".to_string(),
            notes: Some("first visit bonus".to_string()),
        },
        purpose: ActionPurpose {
            type_of: TransactionType::PlaceOrder,
            id: purpose_id,
        },
    }
}

fn coin_attributes(purpose_id: TransactionId) -> ActionAttributes {
    ActionAttributes {
        agent: Party::person("customer-1"),
        recipient: Party::organization("seller-1", "Cinema"),
        object: AuthorizeObject::Coin {
            amount: 300,
            from_account_number: "C-1".to_string(),
            to_account_number: "M-100".to_string(),
            notes: None,
        },
        purpose: ActionPurpose {
            type_of: TransactionType::PlaceOrder,
            id: purpose_id,
        },
    }
}

fn point_result() -> ActionResult {
    ActionResult::PointAward {
        amount: 500,
        point_transaction: PendingLedgerTransaction {
            id: "ptx1".to_string(),
            endpoint: "https://x".to_string(),
        },
    }
}

#[tokio::test]
#[serial]
async fn start_and_find_roundtrip() {
    let repo = get_test_repository().await;
    let attributes = point_award_attributes(TransactionId::new());

    let action = repo.start(attributes.clone()).await.unwrap();
    let loaded = repo.find_by_id(action.id).await.unwrap();

    assert_eq!(loaded.status, ActionStatus::Started);
    assert_eq!(loaded.agent, attributes.agent);
    assert_eq!(loaded.recipient, attributes.recipient);
    assert_eq!(loaded.object, attributes.object);
    assert_eq!(loaded.purpose, attributes.purpose);
    assert!(loaded.result.is_none());
    assert!(loaded.end_date.is_none());
}

#[tokio::test]
#[serial]
async fn complete_then_cancel_keeps_result() {
    let repo = get_test_repository().await;
    let action = repo
        .start(point_award_attributes(TransactionId::new()))
        .await
        .unwrap();

    let completed = repo.complete(action.id, point_result()).await.unwrap();
    assert_eq!(completed.status, ActionStatus::Completed);
    assert_eq!(completed.result, Some(point_result()));
    assert!(completed.end_date.is_some());

    let canceled = repo.cancel(action.id).await.unwrap();
    assert_eq!(canceled.status, ActionStatus::Canceled);
    assert_eq!(canceled.result, Some(point_result()));
}

#[tokio::test]
#[serial]
async fn give_up_records_sanitized_error() {
    let repo = get_test_repository().await;
    let action = repo
        .start(point_award_attributes(TransactionId::new()))
        .await
        .unwrap();

    let failed = repo
        .give_up(action.id, ErrorSummary::new("NotFoundError", "Not found: account"))
        .await
        .unwrap();

    assert_eq!(failed.status, ActionStatus::FailedGiveUp);
    let error = failed.error.unwrap();
    assert_eq!(error.name, "NotFoundError");
    assert_eq!(error.message, "Not found: account");
}

#[tokio::test]
#[serial]
async fn conditional_updates_reject_wrong_status() {
    let repo = get_test_repository().await;
    let action = repo
        .start(point_award_attributes(TransactionId::new()))
        .await
        .unwrap();

    // Started actions cannot be canceled
    assert!(matches!(
        repo.cancel(action.id).await,
        Err(StoreError::NotFound { .. })
    ));

    repo.complete(action.id, point_result()).await.unwrap();

    // Completed actions cannot complete or give up again
    assert!(repo.complete(action.id, point_result()).await.is_err());
    assert!(
        repo.give_up(action.id, ErrorSummary::new("Error", "late"))
            .await
            .is_err()
    );

    repo.cancel(action.id).await.unwrap();

    // A second cancel misses the conditional update
    assert!(matches!(
        repo.cancel(action.id).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
#[serial]
async fn unknown_action_is_not_found() {
    let repo = get_test_repository().await;
    assert!(matches!(
        repo.find_by_id(ActionId::new()).await,
        Err(StoreError::NotFound { .. })
    ));
}

#[tokio::test]
#[serial]
async fn search_and_count_with_filters() {
    let repo = get_test_repository().await;
    let tx1 = TransactionId::new();
    let tx2 = TransactionId::new();

    let first = repo.start(point_award_attributes(tx1)).await.unwrap();
    repo.start(coin_attributes(tx1)).await.unwrap();
    repo.start(point_award_attributes(tx2)).await.unwrap();
    repo.complete(first.id, point_result()).await.unwrap();

    let actions = repo.search(ActionQuery::for_purpose(tx1)).await.unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].id, first.id);

    let coin = ActionQuery::for_purpose(tx1).kind(AuthorizeKind::Coin);
    assert_eq!(repo.count(coin).await.unwrap(), 1);

    let completed = ActionQuery::new().status(ActionStatus::Completed);
    assert_eq!(repo.count(completed).await.unwrap(), 1);

    let limited = repo.search(ActionQuery::new().limit(2)).await.unwrap();
    assert_eq!(limited.len(), 2);

    assert_eq!(repo.count(ActionQuery::new()).await.unwrap(), 3);
}
