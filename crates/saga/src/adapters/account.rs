//! Account holds: debit the customer's account, optionally crediting the seller.

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

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccountParams {
    pub amount: i64,
    pub account_type: String,
    pub from_account_number: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// How the hold moves value.
#[derive(Clone)]
pub enum AccountTransport {
    /// Debit the customer's account only.
    Withdraw(Arc<dyn LedgerService>),
    /// Debit the customer and credit the seller's accepted account.
    Transfer {
        service: Arc<dyn LedgerService>,
        organizations: Arc<dyn OrganizationRepository>,
    },
}

impl AccountTransport {
    fn service(&self) -> &dyn LedgerService {
        match self {
            AccountTransport::Withdraw(service) => service.as_ref(),
            AccountTransport::Transfer { service, .. } => service.as_ref(),
        }
    }
}

/// Holds on the customer's account ledger.
#[derive(Clone)]
pub struct AccountAdapter {
    transport: AccountTransport,
}

impl AccountAdapter {
    pub fn new(transport: AccountTransport) -> Self {
        Self { transport }
    }

    pub fn withdraw(service: Arc<dyn LedgerService>) -> Self {
        Self::new(AccountTransport::Withdraw(service))
    }

    pub fn transfer(
        service: Arc<dyn LedgerService>,
        organizations: Arc<dyn OrganizationRepository>,
    ) -> Self {
        Self::new(AccountTransport::Transfer {
            service,
            organizations,
        })
    }
}

#[async_trait]
impl LedgerAdapter for AccountAdapter {
    type Params = AccountParams;

    fn kind(&self) -> AuthorizeKind {
        AuthorizeKind::Account
    }

    async fn prepare(
        &self,
        transaction: &PlaceOrderTransaction,
        params: AccountParams,
    ) -> Result<PreparedAuthorization, DomainError> {
        ensure_positive(params.amount)?;

        let to_account_number = match &self.transport {
            AccountTransport::Withdraw(_) => None,
            AccountTransport::Transfer { organizations, .. } => Some(
                resolve_destination(
                    organizations.as_ref(),
                    &transaction.seller,
                    PaymentMethodType::Account,
                    Some(&params.account_type),
                )
                .await?,
            ),
        };

        Ok(PreparedAuthorization {
            agent: transaction.agent.clone(),
            recipient: transaction.seller.clone(),
            object: AuthorizeObject::Account {
                amount: params.amount,
                account_type: params.account_type,
                from_account_number: params.from_account_number,
                to_account_number,
                notes: params.notes,
            },
        })
    }

    #[tracing::instrument(skip(self, action), fields(action_id = %action.id))]
    async fn start(&self, action: &Action) -> Result<ActionResult, LedgerError> {
        let AuthorizeObject::Account {
            amount,
            account_type,
            from_account_number,
            to_account_number,
            notes,
        } = &action.object
        else {
            return Err(mismatched(self.kind(), action.kind()));
        };

        let kind = match (&self.transport, to_account_number) {
            (AccountTransport::Withdraw(_), _) => HoldKind::Withdraw {
                from_account_number: from_account_number.clone(),
            },
            (AccountTransport::Transfer { .. }, Some(to)) => HoldKind::Transfer {
                from_account_number: from_account_number.clone(),
                to_account_number: to.clone(),
            },
            (AccountTransport::Transfer { .. }, None) => {
                return Err(LedgerError::Local(DomainError::argument(
                    "toAccountNumber",
                    "transfer requires a destination account",
                )));
            }
        };

        let pending_transaction = self
            .transport
            .service()
            .start(LedgerHold {
                kind,
                account_type: account_type.clone(),
                amount: *amount,
                agent_name: action.agent.display_name().to_string(),
                recipient_name: action.recipient.display_name().to_string(),
                notes: notes.clone(),
                expires: hold_expiry(Utc::now()),
            })
            .await?;

        Ok(ActionResult::Account {
            amount: *amount,
            account_type: account_type.clone(),
            pending_transaction,
        })
    }

    async fn cancel(&self, result: &ActionResult) -> Result<(), LedgerError> {
        self.transport
            .service()
            .cancel(&result.pending_transaction().id)
            .await
    }
}
