//! Authorize action saga.
//!
//! An authorize action places a pending hold on a remote ledger on behalf of
//! an in-progress place-order transaction:
//! 1. Resolve the transaction and check the caller owns it
//! 2. Run the ledger adapter's local eligibility checks
//! 3. Record the action as `Started`
//! 4. Place the remote hold
//! 5. Record the action as `Completed`, or `FailedGiveUp` if the hold was rejected
//!
//! Cancelling reverses a completed action locally and then releases the hold.
//! Remote failures reach callers only as [`domain::DomainError`] kinds.

pub mod adapters;
pub mod coordinator;
pub mod error;
pub mod services;

pub use adapters::{
    AccountAdapter, AccountParams, AccountTransport, CoinAdapter, CoinParams, LedgerAdapter,
    PointAwardAdapter, PointAwardParams, PreparedAuthorization,
};
pub use coordinator::{AuthorizeActionSaga, CancelAuthorization, CreateAuthorization};
pub use error::{LedgerError, translate};
pub use services::{HoldKind, InMemoryLedgerService, LedgerHold, LedgerService};
