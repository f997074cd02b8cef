use serde::{Deserialize, Serialize};

use crate::check_digit::{SOURCE_LENGTH, check_digit_of, source_bytes};
use crate::permutation::{permute, restore};
use crate::{AccountNumberError, Result};

/// Length of the date key prefix of a source (`YYMMDD`).
pub const DATE_KEY_LENGTH: usize = 6;

/// Length of the daily sequence suffix of a source.
pub const SEQUENCE_LENGTH: usize = SOURCE_LENGTH - DATE_KEY_LENGTH;

/// An issued account number: check digit followed by the 10 permuted source digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountNumber(String);

impl AccountNumber {
    /// Builds the account number for a 10-digit source.
    pub fn from_source(source: &str) -> Result<Self> {
        let bytes = source_bytes(source)?;
        let check_digit = check_digit_of(&bytes);
        let permuted = permute(&bytes, check_digit);

        let mut number = String::with_capacity(SOURCE_LENGTH + 1);
        number.push(char::from(b'0' + check_digit));
        number.extend(permuted.iter().map(|&b| char::from(b)));
        Ok(Self(number))
    }

    /// Parses and verifies an account number.
    ///
    /// Fails unless the string is 11 digits whose restored source carries the
    /// same check digit.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || AccountNumberError::InvalidAccountNumber(s.to_string());
        let (head, tail) = s.split_at_checked(1).ok_or_else(invalid)?;
        let check_digit = head
            .bytes()
            .next()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .ok_or_else(invalid)?;
        let permuted = source_bytes(tail).map_err(|_| invalid())?;

        if check_digit_of(&restore(&permuted, check_digit)) != check_digit {
            return Err(invalid());
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn check_digit(&self) -> u8 {
        self.0.as_bytes()[0] - b'0'
    }

    /// Recovers the unpermuted 10-digit source.
    pub fn source(&self) -> String {
        let mut permuted = [0u8; SOURCE_LENGTH];
        permuted.copy_from_slice(&self.0.as_bytes()[1..]);
        restore(&permuted, self.check_digit())
            .iter()
            .map(|&b| char::from(b))
            .collect()
    }

    /// The `YYMMDD` date key embedded in the source.
    pub fn date_key(&self) -> String {
        self.source()[..DATE_KEY_LENGTH].to_string()
    }

    /// The (possibly truncated) daily sequence embedded in the source.
    pub fn sequence(&self) -> u32 {
        self.source()[DATE_KEY_LENGTH..]
            .bytes()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    }
}

impl std::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for AccountNumber {
    type Error = AccountNumberError;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<AccountNumber> for String {
    fn from(number: AccountNumber) -> Self {
        number.0
    }
}

impl AsRef<str> for AccountNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_source_known_values() {
        assert_eq!(
            AccountNumber::from_source("2301010001").unwrap().as_str(),
            "10002011031"
        );
        assert_eq!(
            AccountNumber::from_source("2510190002").unwrap().as_str(),
            "11012020059"
        );
    }

    #[test]
    fn accessors_recover_the_source() {
        let number = AccountNumber::from_source("2510200001").unwrap();
        assert_eq!(number.as_str(), "65101200002");
        assert_eq!(number.check_digit(), 6);
        assert_eq!(number.source(), "2510200001");
        assert_eq!(number.date_key(), "251020");
        assert_eq!(number.sequence(), 1);
    }

    #[test]
    fn parse_accepts_issued_numbers() {
        let number = AccountNumber::from_source("2510190001").unwrap();
        assert_eq!(AccountNumber::parse(number.as_str()).unwrap(), number);
    }

    #[test]
    fn parse_rejects_transcription_errors() {
        // 30021910510 is valid; change one permuted digit.
        assert!(AccountNumber::parse("30021910510").is_ok());
        assert!(matches!(
            AccountNumber::parse("30021910517"),
            Err(AccountNumberError::InvalidAccountNumber(_))
        ));
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(AccountNumber::parse("").is_err());
        assert!(AccountNumber::parse("3002191051").is_err());
        assert!(AccountNumber::parse("x0021910510").is_err());
        assert!(AccountNumber::parse("+0021910510").is_err());
    }

    #[test]
    fn serde_validates() {
        let json = serde_json::to_string(&AccountNumber::parse("30021910510").unwrap()).unwrap();
        assert_eq!(json, "\"30021910510\"");
        assert!(serde_json::from_str::<AccountNumber>("\"30021910517\"").is_err());
    }
}
