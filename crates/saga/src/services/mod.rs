//! Remote ledger clients used by the authorize adapters.

pub mod ledger;

pub use ledger::{HoldKind, InMemoryLedgerService, LedgerHold, LedgerService};
