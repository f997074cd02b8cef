//! Point awards: deposit-style holds crediting a member's point account.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use domain::{
    Action, ActionResult, AuthorizeKind, AuthorizeObject, DomainError, PlaceOrderTransaction,
};
use serde::Deserialize;

use super::{LedgerAdapter, PreparedAuthorization, ensure_positive, hold_expiry, mismatched};
use crate::error::LedgerError;
use crate::services::{HoldKind, LedgerHold, LedgerService};

/// Account type of every point award hold.
pub const POINT_ACCOUNT_TYPE: &str = "Point";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PointAwardParams {
    pub amount: i64,
    pub to_account_number: String,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Awards points from the seller to the transaction's customer.
#[derive(Clone)]
pub struct PointAwardAdapter {
    service: Arc<dyn LedgerService>,
}

impl PointAwardAdapter {
    pub fn new(service: Arc<dyn LedgerService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl LedgerAdapter for PointAwardAdapter {
    type Params = PointAwardParams;

    fn kind(&self) -> AuthorizeKind {
        AuthorizeKind::PointAward
    }

    async fn prepare(
        &self,
        transaction: &PlaceOrderTransaction,
        params: PointAwardParams,
    ) -> Result<PreparedAuthorization, DomainError> {
        if !transaction.agent.is_member() {
            return Err(DomainError::Forbidden("Membership required".to_string()));
        }
        ensure_positive(params.amount)?;

        Ok(PreparedAuthorization {
            agent: transaction.seller.clone(),
            recipient: transaction.agent.clone(),
            object: AuthorizeObject::PointAward {
                amount: params.amount,
                to_account_number: params.to_account_number,
                notes: params.notes,
            },
        })
    }

    #[tracing::instrument(skip(self, action), fields(action_id = %action.id))]
    async fn start(&self, action: &Action) -> Result<ActionResult, LedgerError> {
        let AuthorizeObject::PointAward {
            amount,
            to_account_number,
            notes,
        } = &action.object
        else {
            return Err(mismatched(self.kind(), action.kind()));
        };

        let point_transaction = self
            .service
            .start(LedgerHold {
                kind: HoldKind::Deposit {
                    to_account_number: to_account_number.clone(),
                },
                account_type: POINT_ACCOUNT_TYPE.to_string(),
                amount: *amount,
                agent_name: action.agent.display_name().to_string(),
                recipient_name: action.recipient.display_name().to_string(),
                notes: notes.clone(),
                expires: hold_expiry(Utc::now()),
            })
            .await?;

        Ok(ActionResult::PointAward {
            amount: *amount,
            point_transaction,
        })
    }

    async fn cancel(&self, result: &ActionResult) -> Result<(), LedgerError> {
        self.service.cancel(&result.pending_transaction().id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::{ActionAttributes, ActionPurpose, Party, TransactionType};

    use crate::services::InMemoryLedgerService;

    fn transaction(member: bool) -> PlaceOrderTransaction {
        let customer = Party::person("customer-1");
        let customer = if member {
            customer.with_membership("M-001")
        } else {
            customer
        };
        PlaceOrderTransaction::start(
            customer,
            Party::organization("seller-1", "Cinema"),
            Utc::now() + Duration::minutes(15),
        )
    }

    fn params() -> PointAwardParams {
        PointAwardParams {
            amount: 500,
            to_account_number: "123".to_string(),
            notes: Some("thanks".to_string()),
        }
    }

    #[tokio::test]
    async fn test_prepare_requires_membership() {
        let ledger = InMemoryLedgerService::new("point-ledger", "https://x", "ptx");
        let adapter = PointAwardAdapter::new(Arc::new(ledger.clone()));

        let err = adapter
            .prepare(&transaction(false), params())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));
        assert_eq!(ledger.start_count(), 0);
    }

    #[tokio::test]
    async fn test_seller_awards_customer() {
        let adapter = PointAwardAdapter::new(Arc::new(InMemoryLedgerService::new(
            "point-ledger",
            "https://x",
            "ptx",
        )));
        let tx = transaction(true);

        let prepared = adapter.prepare(&tx, params()).await.unwrap();
        assert_eq!(prepared.agent.id, "seller-1");
        assert_eq!(prepared.recipient.id, "customer-1");
        assert_eq!(prepared.object.amount(), 500);
    }

    #[tokio::test]
    async fn test_start_places_deposit_hold() {
        let ledger = InMemoryLedgerService::new("point-ledger", "https://x", "ptx");
        let adapter = PointAwardAdapter::new(Arc::new(ledger.clone()));
        let tx = transaction(true);
        let prepared = adapter.prepare(&tx, params()).await.unwrap();
        let action = Action::start(
            ActionAttributes {
                agent: prepared.agent,
                recipient: prepared.recipient,
                object: prepared.object,
                purpose: ActionPurpose {
                    type_of: TransactionType::PlaceOrder,
                    id: tx.id,
                },
            },
            Utc::now(),
        );

        let result = adapter.start(&action).await.unwrap();
        assert_eq!(result.amount(), 500);
        assert_eq!(result.pending_transaction().id, "ptx1");

        let hold = &ledger.start_calls()[0];
        assert_eq!(
            hold.kind,
            HoldKind::Deposit {
                to_account_number: "123".to_string()
            }
        );
        assert_eq!(hold.agent_name, "Cinema");
        assert!(hold.expires > Utc::now() + Duration::days(27));

        adapter.cancel(&result).await.unwrap();
        assert_eq!(ledger.cancel_calls(), vec!["ptx1".to_string()]);
    }
}
