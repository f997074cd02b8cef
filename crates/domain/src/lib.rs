//! Domain model for authorizing holds against external ledgers.
//!
//! This crate provides:
//! - The authorize action record and its state machine
//! - In-progress place-order transactions that own actions
//! - Seller organizations and their accepted payment configuration
//! - The fixed error taxonomy every caller observes

pub mod action;
pub mod error;
pub mod organization;
pub mod party;
pub mod transaction;

pub use action::{
    Action, ActionAttributes, ActionError, ActionPurpose, ActionResult, ActionStatus, ActionType,
    AuthorizeKind, AuthorizeObject, ErrorSummary, PendingLedgerTransaction,
};
pub use error::DomainError;
pub use organization::{Organization, PaymentAccepted, PaymentMethodType};
pub use party::{Membership, Party, PartyType};
pub use transaction::{PlaceOrderTransaction, TransactionStatus, TransactionType};
