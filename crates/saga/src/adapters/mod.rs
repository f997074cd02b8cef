//! Ledger adapters: one per remote backend an authorize action can target.
//!
//! An adapter owns two concerns. [`LedgerAdapter::prepare`] runs the local
//! eligibility checks and resolves the destination account; it never talks to
//! the remote ledger. [`LedgerAdapter::start`] and [`LedgerAdapter::cancel`]
//! place and release the pending hold.

pub mod account;
pub mod coin;
pub mod point_award;

pub use account::{AccountAdapter, AccountParams, AccountTransport};
pub use coin::{CoinAdapter, CoinParams};
pub use point_award::{PointAwardAdapter, PointAwardParams};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Months, Utc};
use domain::{
    Action, ActionResult, AuthorizeKind, AuthorizeObject, DomainError, Party, PaymentMethodType,
    PlaceOrderTransaction,
};
use store::OrganizationRepository;

use crate::error::LedgerError;

/// Parties and hold parameters of an action about to be started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedAuthorization {
    pub agent: Party,
    pub recipient: Party,
    pub object: AuthorizeObject,
}

/// A remote ledger backend as seen by the authorize saga.
#[async_trait]
pub trait LedgerAdapter: Send + Sync {
    /// Caller-supplied hold parameters.
    type Params: std::fmt::Debug + Send + Sync + 'static;

    fn kind(&self) -> AuthorizeKind;

    /// Checks eligibility and builds the action attributes for `transaction`.
    async fn prepare(
        &self,
        transaction: &PlaceOrderTransaction,
        params: Self::Params,
    ) -> Result<PreparedAuthorization, DomainError>;

    /// Places the pending hold described by a started action.
    async fn start(&self, action: &Action) -> Result<ActionResult, LedgerError>;

    /// Releases the hold recorded in a completed action's result.
    async fn cancel(&self, result: &ActionResult) -> Result<(), LedgerError>;
}

/// Expiry attached to every hold: one calendar month after `now`.
pub fn hold_expiry(now: DateTime<Utc>) -> DateTime<Utc> {
    now.checked_add_months(Months::new(1))
        .unwrap_or(now + Duration::days(31))
}

fn ensure_positive(amount: i64) -> Result<(), DomainError> {
    if amount > 0 {
        Ok(())
    } else {
        Err(DomainError::argument("amount", "amount must be positive"))
    }
}

/// Looks up the seller's account for a payment method.
///
/// A seller without a matching accepted-payment entry fails with `Argument`.
async fn resolve_destination(
    organizations: &dyn OrganizationRepository,
    seller: &Party,
    payment_method_type: PaymentMethodType,
    account_type: Option<&str>,
) -> Result<String, DomainError> {
    let organization = organizations.find_by_id(&seller.id).await?;
    organization
        .find_payment_accepted(payment_method_type, account_type)
        .map(|accepted| accepted.account_number.clone())
        .ok_or_else(|| {
            DomainError::argument(
                "paymentAccepted",
                format!("{payment_method_type:?} payment not accepted by the seller"),
            )
        })
}

fn mismatched(expected: AuthorizeKind, found: AuthorizeKind) -> LedgerError {
    LedgerError::Local(DomainError::argument(
        "object",
        format!("expected a {expected} object, found {found}"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hold_expiry_is_one_month() {
        let now = Utc.with_ymd_and_hms(2025, 10, 19, 12, 0, 0).unwrap();
        assert_eq!(
            hold_expiry(now),
            Utc.with_ymd_and_hms(2025, 11, 19, 12, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_hold_expiry_clamps_to_month_end() {
        let now = Utc.with_ymd_and_hms(2025, 1, 31, 0, 0, 0).unwrap();
        assert_eq!(
            hold_expiry(now),
            Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_ensure_positive() {
        assert!(ensure_positive(1).is_ok());
        assert!(matches!(
            ensure_positive(0),
            Err(DomainError::Argument { ref argument, .. }) if argument == "amount"
        ));
    }
}
