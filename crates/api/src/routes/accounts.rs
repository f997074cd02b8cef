//! Account number issuance endpoint.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use domain::DomainError;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct IssueAccountNumberRequest {
    /// Defaults to now.
    pub open_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AccountNumberResponse {
    pub account_number: String,
    pub open_date: DateTime<Utc>,
}

/// POST /accounts/numbers — issue a new account number.
#[tracing::instrument(skip(state, body))]
pub async fn issue(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<(StatusCode, Json<AccountNumberResponse>), ApiError> {
    let request = if body.is_empty() {
        IssueAccountNumberRequest::default()
    } else {
        serde_json::from_slice::<IssueAccountNumberRequest>(&body)
            .map_err(|e| DomainError::argument("openDate", e.to_string()))?
    };
    let open_date = request.open_date.unwrap_or_else(Utc::now);

    let account_number = state.issuer.publish(open_date).await?;
    tracing::info!(%account_number, "account number issued");

    Ok((
        StatusCode::CREATED,
        Json(AccountNumberResponse {
            account_number: account_number.to_string(),
            open_date,
        }),
    ))
}
