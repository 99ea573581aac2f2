//! Order key type and validation.
//!
//! # Responsibility
//! - Define the string key that places an item in an ordered list.
//! - Validate the length-headed key encoding.
//!
//! # Invariants
//! - Keys are ASCII; plain string comparison matches numeric order.
//! - The first character encodes the integer part length: `a`..`z` for
//!   positive integers of 1..26 digits, `A`..`Z` for negative integers of
//!   26..1 digits.
//! - A fraction never ends with the zero digit, so every value has exactly
//!   one encoding.

use crate::order::alphabet::Alphabet;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Digit count of the widest negative integer tier (head `A`).
const MAX_INTEGER_DIGITS: usize = 26;

/// Errors from order key validation and generation.
#[derive(Debug)]
pub enum OrderKeyError {
    /// Lower bound does not sort strictly before the upper bound.
    NotAscending { lower: String, upper: String },
    /// Key contains a digit outside the configured alphabet.
    ForeignDigit { key: String, digit: char },
    /// Key is not a valid length-headed encoding.
    Malformed { key: String, reason: &'static str },
    /// No representable key remains on the requested side.
    KeySpaceExhausted,
}

impl Display for OrderKeyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAscending { lower, upper } => {
                write!(f, "order keys must strictly ascend: `{lower}` >= `{upper}`")
            }
            Self::ForeignDigit { key, digit } => write!(
                f,
                "order key `{key}` contains digit `{digit}` outside the configured alphabet"
            ),
            Self::Malformed { key, reason } => write!(f, "invalid order key `{key}`: {reason}"),
            Self::KeySpaceExhausted => write!(f, "order key space exhausted at list edge"),
        }
    }
}

impl Error for OrderKeyError {}

/// String-encoded sort key placing an item in a list.
///
/// Comparison is plain string order; the encoding guarantees it matches the
/// numeric order of the encoded value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderKey(String);

impl OrderKey {
    /// Validates an externally sourced key against `alphabet`.
    ///
    /// # Errors
    /// - Malformed head, truncated integer part, foreign digits, a fraction
    ///   ending with the zero digit, or the unrepresentable minimum key.
    pub fn parse(value: impl Into<String>, alphabet: &Alphabet) -> Result<Self, OrderKeyError> {
        let value = value.into();
        validate_key(&value, alphabet)?;
        Ok(Self(value))
    }

    /// Wraps generator output, which is valid by construction.
    pub(crate) fn from_generated(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Total integer part length (head included) encoded by `head`.
pub(crate) fn integer_part_len(head: u8) -> Option<usize> {
    match head {
        b'a'..=b'z' => Some((head - b'a') as usize + 2),
        b'A'..=b'Z' => Some((b'Z' - head) as usize + 2),
        _ => None,
    }
}

/// Integer part slice of a validated key.
pub(crate) fn integer_part(key: &str) -> &str {
    let len = key
        .as_bytes()
        .first()
        .and_then(|&head| integer_part_len(head))
        .unwrap_or(key.len());
    &key[..len.min(key.len())]
}

/// The minimum representable integer key, `A` followed by 26 zero digits.
///
/// Nothing sorts below it, so it is rejected as a stored key.
pub(crate) fn smallest_integer(alphabet: &Alphabet) -> String {
    let mut key = String::with_capacity(1 + MAX_INTEGER_DIGITS);
    key.push('A');
    for _ in 0..MAX_INTEGER_DIGITS {
        key.push(alphabet.zero_digit() as char);
    }
    key
}

/// The first key handed out for an empty list, `a` + zero digit.
pub(crate) fn integer_zero(alphabet: &Alphabet) -> String {
    let mut key = String::with_capacity(2);
    key.push('a');
    key.push(alphabet.zero_digit() as char);
    key
}

pub(crate) fn validate_key(key: &str, alphabet: &Alphabet) -> Result<(), OrderKeyError> {
    if !key.is_ascii() {
        return Err(OrderKeyError::Malformed {
            key: key.to_string(),
            reason: "key must be ASCII",
        });
    }

    let bytes = key.as_bytes();
    let head = match bytes.first() {
        Some(&head) => head,
        None => {
            return Err(OrderKeyError::Malformed {
                key: key.to_string(),
                reason: "key is empty",
            });
        }
    };

    let int_len = integer_part_len(head).ok_or_else(|| OrderKeyError::Malformed {
        key: key.to_string(),
        reason: "first character is not a length head",
    })?;
    if bytes.len() < int_len {
        return Err(OrderKeyError::Malformed {
            key: key.to_string(),
            reason: "integer part is truncated",
        });
    }

    for &digit in &bytes[1..] {
        if !alphabet.contains(digit) {
            return Err(OrderKeyError::ForeignDigit {
                key: key.to_string(),
                digit: digit as char,
            });
        }
    }

    if key == smallest_integer(alphabet) {
        return Err(OrderKeyError::Malformed {
            key: key.to_string(),
            reason: "minimum integer key has no predecessor",
        });
    }

    if bytes.len() > int_len && bytes[bytes.len() - 1] == alphabet.zero_digit() {
        return Err(OrderKeyError::Malformed {
            key: key.to_string(),
            reason: "fraction ends with the zero digit",
        });
    }

    Ok(())
}
