//! Account number issuer.

use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};

use crate::account_number::{AccountNumber, SEQUENCE_LENGTH};
use crate::counter::AtomicCounter;
use crate::{AccountNumberError, Result};

/// Largest sequence that fits the source without losing digits.
pub const MAX_SEQUENCE: i64 = 9_999;

/// Issuer settings.
#[derive(Debug, Clone)]
pub struct IssuerConfig {
    /// Counter keys are `{key_prefix}.{YYMMDD}`.
    pub key_prefix: String,
    /// Offset used to derive the calendar day of an open date.
    pub utc_offset: FixedOffset,
}

impl IssuerConfig {
    /// Builds a config from an offset in whole hours; out-of-range offsets fall back to UTC.
    pub fn new(key_prefix: impl Into<String>, utc_offset_hours: i32) -> Self {
        Self {
            key_prefix: key_prefix.into(),
            utc_offset: utc_offset_hours
                .checked_mul(3600)
                .and_then(FixedOffset::east_opt)
                .unwrap_or_else(|| Utc.fix()),
        }
    }
}

impl Default for IssuerConfig {
    fn default() -> Self {
        Self::new("accountNumber", 9)
    }
}

/// Issues account numbers from an atomic daily counter.
#[derive(Clone)]
pub struct AccountNumberIssuer {
    counter: Arc<dyn AtomicCounter>,
    config: IssuerConfig,
}

impl AccountNumberIssuer {
    pub fn new(counter: Arc<dyn AtomicCounter>, config: IssuerConfig) -> Self {
        Self { counter, config }
    }

    /// `YYMMDD` of the open date in the configured offset.
    pub fn date_key(&self, open_date: DateTime<Utc>) -> String {
        open_date
            .with_timezone(&self.config.utc_offset)
            .format("%y%m%d")
            .to_string()
    }

    /// Counter key for a date key.
    pub fn counter_key(&self, date_key: &str) -> String {
        format!("{}.{}", self.config.key_prefix, date_key)
    }

    /// Issues the next account number for the day of `open_date`.
    ///
    /// The daily counter expires one day after `open_date`; an open date whose
    /// counter would already be expired is rejected. Sequences above
    /// [`MAX_SEQUENCE`] keep only their last four digits and can collide with
    /// earlier numbers of the same day; this is logged and counted.
    #[tracing::instrument(skip(self))]
    pub async fn publish(&self, open_date: DateTime<Utc>) -> Result<AccountNumber> {
        let date_key = self.date_key(open_date);
        let key = self.counter_key(&date_key);
        let expire_at = open_date + Duration::days(1);
        if expire_at <= Utc::now() {
            return Err(AccountNumberError::ExpiredOpenDate(open_date));
        }

        let sequence = self.counter.incr_with_expiry(&key, expire_at).await?;
        if sequence < 1 {
            return Err(AccountNumberError::ServiceUnavailable(format!(
                "counter {key} returned non-positive sequence {sequence}"
            )));
        }
        if sequence > MAX_SEQUENCE {
            metrics::counter!("account_number_sequence_overflow_total").increment(1);
            tracing::warn!(
                %key,
                sequence,
                "daily sequence exceeds four digits, account number may collide"
            );
        }

        let source = compose_source(&date_key, sequence);
        let number = AccountNumber::from_source(&source)?;

        metrics::counter!("account_numbers_issued_total").increment(1);
        tracing::info!(%key, sequence, "account number issued");
        Ok(number)
    }
}

/// Date key followed by the last [`SEQUENCE_LENGTH`] digits of the zero-padded sequence.
pub fn compose_source(date_key: &str, sequence: i64) -> String {
    let padded = format!("{sequence:0>SEQUENCE_LENGTH$}");
    let tail = &padded[padded.len() - SEQUENCE_LENGTH..];
    format!("{date_key}{tail}")
}
