//! Authorize action endpoints, one saga per ledger backend.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use common::{ActionId, TransactionId};
use domain::{Action, AuthorizeKind, DomainError};
use saga::{CancelAuthorization, CreateAuthorization};
use serde::de::DeserializeOwned;
use store::ActionQuery;

use crate::AppState;
use crate::error::ApiError;

/// Header carrying the id of the calling agent.
pub const AGENT_ID_HEADER: &str = "x-agent-id";

/// POST /transactions/place-order/{id}/actions/authorize/{kind} — place a hold.
#[tracing::instrument(skip(state, headers, body))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path((id, kind)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Action>), ApiError> {
    let transaction_id = parse_transaction_id(&id)?;
    let agent_id = caller_id(&headers)?;

    let action = match parse_kind(&kind)? {
        AuthorizeKind::PointAward => {
            state
                .point_awards
                .create(create_request(transaction_id, agent_id, body)?)
                .await?
        }
        AuthorizeKind::Account => {
            state
                .accounts
                .create(create_request(transaction_id, agent_id, body)?)
                .await?
        }
        AuthorizeKind::Coin => {
            state
                .coins
                .create(create_request(transaction_id, agent_id, body)?)
                .await?
        }
    };

    Ok((StatusCode::CREATED, Json(action)))
}

/// DELETE /transactions/place-order/{id}/actions/authorize/{kind}/{action_id} — release a hold.
#[tracing::instrument(skip(state, headers))]
pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path((id, kind, action_id)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let agent_id = caller_id(&headers)?;
    let request = CancelAuthorization {
        transaction_id: parse_transaction_id(&id)?,
        agent_id: &agent_id,
        action_id: action_id
            .parse::<ActionId>()
            .map_err(|e| DomainError::argument("actionId", e.to_string()))?,
    };

    match parse_kind(&kind)? {
        AuthorizeKind::PointAward => state.point_awards.cancel(request).await?,
        AuthorizeKind::Account => state.accounts.cancel(request).await?,
        AuthorizeKind::Coin => state.coins.cancel(request).await?,
    };

    Ok(StatusCode::NO_CONTENT)
}

/// GET /transactions/place-order/{id}/actions/authorize — list actions of every kind.
#[tracing::instrument(skip(state, headers))]
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Vec<Action>>, ApiError> {
    let transaction_id = parse_transaction_id(&id)?;
    let agent_id = caller_id(&headers)?;
    state
        .transactions
        .find_by_id(transaction_id)
        .await
        .map_err(DomainError::from)?
        .ensure_owned_by(&agent_id)?;

    let actions = state
        .actions
        .search(ActionQuery::for_purpose(transaction_id))
        .await
        .map_err(DomainError::from)?;
    Ok(Json(actions))
}

fn create_request<P: DeserializeOwned>(
    transaction_id: TransactionId,
    agent_id: String,
    body: serde_json::Value,
) -> Result<CreateAuthorization<P>, ApiError> {
    let object = serde_json::from_value(body)
        .map_err(|e| DomainError::argument("object", e.to_string()))?;
    Ok(CreateAuthorization {
        transaction_id,
        agent_id,
        object,
    })
}

fn caller_id(headers: &HeaderMap) -> Result<String, ApiError> {
    headers
        .get(AGENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            ApiError(DomainError::Unauthorized(format!(
                "missing {AGENT_ID_HEADER} header"
            )))
        })
}

fn parse_kind(kind: &str) -> Result<AuthorizeKind, ApiError> {
    AuthorizeKind::parse(kind)
        .ok_or_else(|| ApiError(DomainError::argument("kind", format!("unknown kind: {kind}"))))
}

fn parse_transaction_id(id: &str) -> Result<TransactionId, ApiError> {
    id.parse::<TransactionId>()
        .map_err(|e| ApiError(DomainError::argument("transactionId", e.to_string())))
}
