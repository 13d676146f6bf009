//! Locale-style text ordering for name sorts.
//!
//! Strings are compared level by level, in the manner of a default
//! collation table:
//! 1. base characters (accents stripped, case folded), with whitespace and
//!    punctuation ahead of digits and digits ahead of letters,
//! 2. accents,
//! 3. case, lowercase before uppercase,
//! 4. raw code points, so only identical strings compare equal.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Compares two task texts the way a user-facing name sort expects.
pub fn compare_text(left: &str, right: &str) -> Ordering {
    primary_key(left)
        .cmp(&primary_key(right))
        .then_with(|| secondary_key(left).cmp(&secondary_key(right)))
        .then_with(|| tertiary_key(left).cmp(&tertiary_key(right)))
        .then_with(|| left.cmp(right))
}

fn primary_key(value: &str) -> Vec<(u8, char)> {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| (char_class(c), c))
        .collect()
}

fn char_class(c: char) -> u8 {
    if c.is_numeric() {
        1
    } else if c.is_alphabetic() {
        2
    } else {
        0
    }
}

fn secondary_key(value: &str) -> String {
    value.nfd().flat_map(char::to_lowercase).collect()
}

fn tertiary_key(value: &str) -> Vec<u8> {
    value
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| u8::from(c.is_uppercase()))
        .collect()
}
