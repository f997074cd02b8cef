//! Weighted modulus-11 check digit.

use crate::{AccountNumberError, Result};

/// Number of digits in a source (date key + sequence).
pub const SOURCE_LENGTH: usize = 10;

/// Weights applied to the source digits read right to left.
pub const WEIGHTS: [u32; SOURCE_LENGTH] = [2, 3, 4, 5, 6, 7, 2, 3, 4, 5];

/// Parses a source into its 10 ASCII digit bytes.
pub(crate) fn source_bytes(source: &str) -> Result<[u8; SOURCE_LENGTH]> {
    let bytes: [u8; SOURCE_LENGTH] = source
        .as_bytes()
        .try_into()
        .map_err(|_| AccountNumberError::InvalidSource(source.to_string()))?;

    if !bytes.iter().all(u8::is_ascii_digit) {
        return Err(AccountNumberError::InvalidSource(source.to_string()));
    }
    Ok(bytes)
}

/// Computes the check digit of a 10-digit source.
///
/// The source is reversed, each digit multiplied by [`WEIGHTS`], and the
/// check digit is `11 - (sum mod 11)`, folded to `0` when that is 10 or 11.
pub fn calculate_check_digit(source: &str) -> Result<u8> {
    Ok(check_digit_of(&source_bytes(source)?))
}

pub(crate) fn check_digit_of(source: &[u8; SOURCE_LENGTH]) -> u8 {
    let sum: u32 = source
        .iter()
        .rev()
        .zip(WEIGHTS)
        .map(|(digit, weight)| u32::from(digit - b'0') * weight)
        .sum();

    match 11 - sum % 11 {
        check if check >= 10 => 0,
        // Always below 10 here.
        check => check as u8,
    }
}
