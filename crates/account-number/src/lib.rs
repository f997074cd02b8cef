//! Account number issuance.
//!
//! An account number is 11 digits: a check digit followed by a 10-digit
//! source (`YYMMDD` + 4-digit daily sequence) rearranged by one of ten
//! fixed permutations selected by that check digit.
//!
//! ```text
//! open date ──► YYMMDD ──► INCR+EXPIREAT ──► source ──► check digit ──► permute
//! ```

pub mod account_number;
pub mod check_digit;
pub mod counter;
pub mod error;
pub mod issuer;
pub mod permutation;
pub mod redis_counter;

pub use account_number::AccountNumber;
pub use check_digit::{WEIGHTS, calculate_check_digit};
pub use counter::{AtomicCounter, InMemoryCounter};
pub use error::{AccountNumberError, Result};
pub use issuer::{AccountNumberIssuer, IssuerConfig};
pub use permutation::SORT_TYPES;
pub use redis_counter::RedisCounter;
