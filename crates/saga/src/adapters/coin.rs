//! Coin holds: transfer from the customer's coin account to the seller.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::{
    Action, ActionResult, AuthorizeKind, AuthorizeObject, DomainError, PaymentMethodType,
    PlaceOrderTransaction,
};
use serde::Deserialize;
use store::OrganizationRepository;

use super::{
    LedgerAdapter, PreparedAuthorization, ensure_positive, hold_expiry, mismatched,
    resolve_destination,
};
use crate::error::LedgerError;
use crate::services::{HoldKind, LedgerHold, LedgerService};

/// Account type of every coin hold.
pub const COIN_ACCOUNT_TYPE: &str = "Coin";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoinParams {
    pub amount: i64,
    pub from_account_number: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct CoinAdapter {
    service: Arc<dyn LedgerService>,
    organizations: Arc<dyn OrganizationRepository>,
}

impl CoinAdapter {
    pub fn new(
        service: Arc<dyn LedgerService>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self {
            service,
            organizations,
        }
    }
}

#[async_trait]
impl LedgerAdapter for CoinAdapter {
    type Params = CoinParams;

    fn kind(&self) -> AuthorizeKind {
        AuthorizeKind::Coin
    }

    async fn prepare(
        &self,
        transaction: &PlaceOrderTransaction,
        params: CoinParams,
    ) -> Result<PreparedAuthorization, DomainError> {
        ensure_positive(params.amount)?;
        let to_account_number = resolve_destination(
            self.organizations.as_ref(),
            &transaction.seller,
            PaymentMethodType::Mocoin,
            None,
        )
        .await?;

        Ok(PreparedAuthorization {
            agent: transaction.agent.clone(),
            recipient: transaction.seller.clone(),
            object: AuthorizeObject::Coin {
                amount: params.amount,
                from_account_number: params.from_account_number,
                to_account_number,
                notes: params.notes,
            },
        })
    }

    #[tracing::instrument(skip(self, action), fields(action_id = %action.id))]
    async fn start(&self, action: &Action) -> Result<ActionResult, LedgerError> {
        let AuthorizeObject::Coin {
            amount,
            from_account_number,
            to_account_number,
            notes,
        } = &action.object
        else {
            return Err(mismatched(self.kind(), action.kind()));
        };

        let coin_transaction = self
            .service
            .start(LedgerHold {
                kind: HoldKind::Transfer {
                    from_account_number: from_account_number.clone(),
                    to_account_number: to_account_number.clone(),
                },
                account_type: COIN_ACCOUNT_TYPE.to_string(),
                amount: *amount,
                agent_name: action.agent.display_name().to_string(),
                recipient_name: action.recipient.display_name().to_string(),
                notes: notes.clone(),
                expires: hold_expiry(Utc::now()),
            })
            .await?;

        Ok(ActionResult::Coin {
            amount: *amount,
            coin_transaction,
        })
    }

    async fn cancel(&self, result: &ActionResult) -> Result<(), LedgerError> {
        self.service.cancel(&result.pending_transaction().id).await
    }
}
