//! Integration tests for the API server.

use std::sync::Arc;

use account_number::AccountNumber;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use domain::{Organization, Party, PaymentMethodType, PlaceOrderTransaction, TransactionStatus};
use metrics_exporter_prometheus::PrometheusHandle;
use store::{OrganizationRepository, TransactionRepository};
use tower::ServiceExt;

use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> (axum::Router, api::InMemoryBackends) {
    let (state, backends) = api::create_default_state();
    let app = api::create_app(Arc::clone(&state), get_metrics_handle());
    (app, backends)
}

async fn seed_transaction(
    backends: &api::InMemoryBackends,
    status: TransactionStatus,
) -> PlaceOrderTransaction {
    backends
        .organizations
        .save(
            Organization::new("seller-1", "Cinema")
                .accepting(PaymentMethodType::Account, "Coin", "C-100")
                .accepting(PaymentMethodType::Mocoin, "Coin", "M-100"),
        )
        .await
        .unwrap();

    let mut tx = PlaceOrderTransaction::start(
        Party::person("customer-1").with_membership("M-001"),
        Party::organization("seller-1", "Cinema"),
        Utc::now() + Duration::minutes(15),
    );
    tx.status = status;
    backends.transactions.save(tx.clone()).await.unwrap();
    tx
}

fn authorize_uri(tx: &PlaceOrderTransaction, kind: &str) -> String {
    format!("/transactions/place-order/{}/actions/authorize/{kind}", tx.id)
}

fn post_json(uri: &str, agent_id: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(agent_id) = agent_id {
        builder = builder.header("x-agent-id", agent_id);
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn delete(uri: &str, agent_id: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("x-agent-id", agent_id)
        .body(Body::empty())
        .unwrap()
}

fn get_actions(tx: &PlaceOrderTransaction, agent_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(format!(
        "/transactions/place-order/{}/actions/authorize",
        tx.id
    ));
    if let Some(agent_id) = agent_id {
        builder = builder.header("x-agent-id", agent_id);
    }
    builder.body(Body::empty()).unwrap()
}

fn point_award_body() -> serde_json::Value {
    serde_json::json!({ "amount": 500, "to_account_number": "123" })
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
}

#[tokio::test]
async fn test_point_award_create_cancel_and_list() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            Some("customer-1"),
            point_award_body(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let action = body_json(response).await;
    assert_eq!(action["status"], "Completed");
    assert_eq!(action["result"]["amount"], 500);
    assert_eq!(action["result"]["point_transaction"]["id"], "ptx1");
    let action_id = action["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(delete(
            &format!("{}/{action_id}", authorize_uri(&tx, "point-award")),
            "customer-1",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(backends.point_ledger.cancel_calls(), vec!["ptx1".to_string()]);

    let response = app
        .oneshot(get_actions(&tx, Some("customer-1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let actions = body_json(response).await;
    assert_eq!(actions.as_array().unwrap().len(), 1);
    assert_eq!(actions[0]["status"], "Canceled");
}

#[tokio::test]
async fn test_listing_is_restricted_to_the_owner() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;
    app.clone()
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            Some("customer-1"),
            point_award_body(),
        ))
        .await
        .unwrap();

    let anonymous = app.clone().oneshot(get_actions(&tx, None)).await.unwrap();
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let foreign = app
        .oneshot(get_actions(&tx, Some("intruder")))
        .await
        .unwrap();
    assert_eq!(foreign.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(foreign).await["name"], "ForbiddenError");
}

#[tokio::test]
async fn test_second_cancel_is_not_found() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            Some("customer-1"),
            point_award_body(),
        ))
        .await
        .unwrap();
    let action = body_json(response).await;
    let uri = format!(
        "{}/{}",
        authorize_uri(&tx, "point-award"),
        action["id"].as_str().unwrap()
    );

    let first = app.clone().oneshot(delete(&uri, "customer-1")).await.unwrap();
    assert_eq!(first.status(), StatusCode::NO_CONTENT);

    let second = app.oneshot(delete(&uri, "customer-1")).await.unwrap();
    assert_eq!(second.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(second).await["name"], "NotFoundError");
    assert_eq!(backends.point_ledger.cancel_calls().len(), 1);
}

#[tokio::test]
async fn test_account_and_coin_holds() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;

    let response = app
        .clone()
        .oneshot(post_json(
            &authorize_uri(&tx, "account"),
            Some("customer-1"),
            serde_json::json!({
                "amount": 300,
                "account_type": "Coin",
                "from_account_number": "C-001"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let action = body_json(response).await;
    assert_eq!(action["object"]["to_account_number"], "C-100");
    assert_eq!(action["result"]["pending_transaction"]["id"], "atx1");

    let response = app
        .oneshot(post_json(
            &authorize_uri(&tx, "coin"),
            Some("customer-1"),
            serde_json::json!({ "amount": 120, "from_account_number": "W-001" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let action = body_json(response).await;
    assert_eq!(action["object"]["to_account_number"], "M-100");
    assert_eq!(action["result"]["coin_transaction"]["id"], "ctx1");
}

#[tokio::test]
async fn test_missing_agent_header_is_unauthorized() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;

    let response = app
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            None,
            point_award_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["name"], "UnauthorizedError");
}

#[tokio::test]
async fn test_foreign_agent_is_forbidden() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;

    let response = app
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            Some("intruder"),
            point_award_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(backends.point_ledger.start_count(), 0);
}

#[tokio::test]
async fn test_closed_transaction_is_not_found() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::Confirmed).await;

    let response = app
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            Some("customer-1"),
            point_award_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(backends.point_ledger.start_count(), 0);
}

#[tokio::test]
async fn test_bad_requests() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;

    let unknown_kind = app
        .clone()
        .oneshot(post_json(
            &authorize_uri(&tx, "gift-card"),
            Some("customer-1"),
            point_award_body(),
        ))
        .await
        .unwrap();
    assert_eq!(unknown_kind.status(), StatusCode::BAD_REQUEST);

    let malformed_body = app
        .clone()
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            Some("customer-1"),
            serde_json::json!({ "amount": "lots" }),
        ))
        .await
        .unwrap();
    assert_eq!(malformed_body.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(malformed_body).await["name"], "ArgumentError");

    let invalid_id = app
        .oneshot(post_json(
            "/transactions/place-order/not-a-uuid/actions/authorize/point-award",
            Some("customer-1"),
            point_award_body(),
        ))
        .await
        .unwrap();
    assert_eq!(invalid_id.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_remote_status_is_translated() {
    let (app, backends) = setup();
    let tx = seed_transaction(&backends, TransactionStatus::InProgress).await;
    backends.point_ledger.fail_start_with(Some(429));

    let response = app
        .oneshot(post_json(
            &authorize_uri(&tx, "point-award"),
            Some("customer-1"),
            point_award_body(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body_json(response).await["name"], "RateLimitExceededError");
    assert_eq!(backends.actions.action_count().await, 1);
}

#[tokio::test]
async fn test_issue_account_numbers() {
    let (app, _) = setup();
    let body = serde_json::json!({ "open_date": "2099-01-01T00:00:00Z" });

    let mut numbers = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/accounts/numbers", None, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        let number = AccountNumber::parse(json["account_number"].as_str().unwrap()).unwrap();
        numbers.push(number);
    }

    assert_eq!(numbers[0].date_key(), "990101");
    assert_eq!(numbers[0].sequence(), 1);
    assert_eq!(numbers[1].sequence(), 2);
}

#[tokio::test]
async fn test_issue_account_number_without_body() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/accounts/numbers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["account_number"].as_str().unwrap().len(), 11);
}

#[tokio::test]
async fn test_back_dated_account_number_is_rejected() {
    let (app, backends) = setup();
    let body = serde_json::json!({ "open_date": "2020-01-01T00:00:00Z" });

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(post_json("/accounts/numbers", None, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["name"], "ArgumentError");
    }
    assert_eq!(backends.counter.get("accountNumber.200101").await, None);
}
