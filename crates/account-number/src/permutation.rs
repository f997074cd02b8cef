//! Digit permutation layer.
//!
//! `permuted[i] = source[SORT_TYPES[check_digit][i]]`

use crate::check_digit::SOURCE_LENGTH;

/// One permutation of the source positions per check digit.
pub const SORT_TYPES: [[usize; SOURCE_LENGTH]; 10] = [
    [5, 0, 7, 3, 9, 1, 8, 2, 6, 4],
    [2, 8, 4, 0, 6, 9, 3, 7, 1, 5],
    [9, 4, 1, 6, 0, 3, 7, 5, 8, 2],
    [3, 7, 0, 9, 5, 2, 6, 1, 4, 8],
    [6, 1, 9, 4, 8, 0, 2, 3, 5, 7],
    [8, 5, 2, 7, 1, 6, 0, 4, 9, 3],
    [1, 9, 6, 2, 4, 7, 5, 8, 3, 0],
    [4, 2, 8, 5, 3, 9, 1, 0, 7, 6],
    [7, 3, 5, 1, 2, 8, 4, 9, 0, 6],
    [0, 6, 3, 8, 7, 4, 9, 1, 2, 5],
];

/// Rearranges the source digits with the table selected by `check_digit` (0..=9).
pub fn permute(source: &[u8; SOURCE_LENGTH], check_digit: u8) -> [u8; SOURCE_LENGTH] {
    let table = &SORT_TYPES[usize::from(check_digit)];
    let mut permuted = [0u8; SOURCE_LENGTH];
    for (slot, &from) in permuted.iter_mut().zip(table) {
        *slot = source[from];
    }
    permuted
}

/// Inverse of [`permute`].
pub fn restore(permuted: &[u8; SOURCE_LENGTH], check_digit: u8) -> [u8; SOURCE_LENGTH] {
    let table = &SORT_TYPES[usize::from(check_digit)];
    let mut source = [0u8; SOURCE_LENGTH];
    for (&digit, &to) in permuted.iter().zip(table) {
        source[to] = digit;
    }
    source
}
