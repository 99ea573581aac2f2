//! Order key generation between neighbors.
//!
//! # Responsibility
//! - Compute a key strictly between two neighbor keys, or past an open end.
//! - Keep generated keys as short as the surrounding gap allows.
//!
//! # Invariants
//! - Pure and deterministic: identical inputs yield identical output.
//! - Open-ended bounds step the integer part, so sequential appends stay
//!   short; bounded gaps bisect the fraction, descending one tier per
//!   exhausted digit range.
//! - Midpoints of odd-width digit ranges round up.

use crate::order::alphabet::Alphabet;
use crate::order::key::{
    integer_part, integer_zero, smallest_integer, validate_key, OrderKey, OrderKeyError,
};

/// Generates a key strictly between `lower` and `upper`.
///
/// `None` bounds mean no neighbor on that side: `(None, None)` starts an
/// empty list, `(Some(_), None)` appends at the tail, `(None, Some(_))`
/// prepends at the head.
///
/// # Errors
/// - `NotAscending` when both bounds are present and `lower >= upper`.
/// - Validation errors when either bound is malformed or uses digits
///   outside `alphabet`.
pub fn key_between(
    lower: Option<&OrderKey>,
    upper: Option<&OrderKey>,
    alphabet: &Alphabet,
) -> Result<OrderKey, OrderKeyError> {
    key_between_str(
        lower.map(OrderKey::as_str),
        upper.map(OrderKey::as_str),
        alphabet,
    )
    .map(OrderKey::from_generated)
}

/// Generates `count` keys strictly between `lower` and `upper`, strictly
/// ascending among themselves.
///
/// Open-ended sides chain single-key steps from the bounded end; fully
/// bounded gaps bisect recursively, so key length grows with the recursion
/// depth rather than linearly with `count`.
pub fn n_keys_between(
    lower: Option<&OrderKey>,
    upper: Option<&OrderKey>,
    count: usize,
    alphabet: &Alphabet,
) -> Result<Vec<OrderKey>, OrderKeyError> {
    n_keys_between_str(
        lower.map(OrderKey::as_str),
        upper.map(OrderKey::as_str),
        count,
        alphabet,
    )
    .map(|keys| keys.into_iter().map(OrderKey::from_generated).collect())
}

fn key_between_str(
    lower: Option<&str>,
    upper: Option<&str>,
    alphabet: &Alphabet,
) -> Result<String, OrderKeyError> {
    if let Some(lower) = lower {
        validate_key(lower, alphabet)?;
    }
    if let Some(upper) = upper {
        validate_key(upper, alphabet)?;
    }
    if let (Some(lower), Some(upper)) = (lower, upper) {
        if lower >= upper {
            return Err(OrderKeyError::NotAscending {
                lower: lower.to_string(),
                upper: upper.to_string(),
            });
        }
    }

    match (lower, upper) {
        (None, None) => Ok(integer_zero(alphabet)),
        (None, Some(upper)) => {
            let upper_int = integer_part(upper);
            let upper_frac = &upper[upper_int.len()..];
            if upper_int == smallest_integer(alphabet) {
                return Ok(format!(
                    "{upper_int}{}",
                    midpoint("", Some(upper_frac), alphabet)
                ));
            }
            if upper_int < upper {
                // the bare integer part already sorts below the fraction
                return Ok(upper_int.to_string());
            }
            decrement_integer(upper_int, alphabet).ok_or(OrderKeyError::KeySpaceExhausted)
        }
        (Some(lower), None) => {
            let lower_int = integer_part(lower);
            let lower_frac = &lower[lower_int.len()..];
            match increment_integer(lower_int, alphabet) {
                Some(next) => Ok(next),
                None => Ok(format!(
                    "{lower_int}{}",
                    midpoint(lower_frac, None, alphabet)
                )),
            }
        }
        (Some(lower), Some(upper)) => {
            let lower_int = integer_part(lower);
            let lower_frac = &lower[lower_int.len()..];
            let upper_int = integer_part(upper);
            let upper_frac = &upper[upper_int.len()..];
            if lower_int == upper_int {
                return Ok(format!(
                    "{lower_int}{}",
                    midpoint(lower_frac, Some(upper_frac), alphabet)
                ));
            }
            let next =
                increment_integer(lower_int, alphabet).ok_or(OrderKeyError::KeySpaceExhausted)?;
            if next.as_str() < upper {
                Ok(next)
            } else {
                Ok(format!(
                    "{lower_int}{}",
                    midpoint(lower_frac, None, alphabet)
                ))
            }
        }
    }
}

fn n_keys_between_str(
    lower: Option<&str>,
    upper: Option<&str>,
    count: usize,
    alphabet: &Alphabet,
) -> Result<Vec<String>, OrderKeyError> {
    match count {
        0 => return Ok(Vec::new()),
        1 => return Ok(vec![key_between_str(lower, upper, alphabet)?]),
        _ => {}
    }

    if upper.is_none() {
        let mut keys = Vec::with_capacity(count);
        let mut prev = key_between_str(lower, None, alphabet)?;
        for _ in 1..count {
            let next = key_between_str(Some(&prev), None, alphabet)?;
            keys.push(prev);
            prev = next;
        }
        keys.push(prev);
        return Ok(keys);
    }

    if lower.is_none() {
        let mut keys = Vec::with_capacity(count);
        let mut next = key_between_str(None, upper, alphabet)?;
        for _ in 1..count {
            let prev = key_between_str(None, Some(&next), alphabet)?;
            keys.push(next);
            next = prev;
        }
        keys.push(next);
        keys.reverse();
        return Ok(keys);
    }

    let below = count / 2;
    let mid = key_between_str(lower, upper, alphabet)?;
    let mut keys = n_keys_between_str(lower, Some(&mid), below, alphabet)?;
    let above = n_keys_between_str(Some(&mid), upper, count - below - 1, alphabet)?;
    keys.push(mid);
    keys.extend(above);
    Ok(keys)
}

/// Steps an integer part up by one at its current tier, growing into the
/// next tier on carry. `None` when the topmost tier overflows.
fn increment_integer(int: &str, alphabet: &Alphabet) -> Option<String> {
    let head = int.as_bytes()[0];
    let mut digits = int.as_bytes()[1..].to_vec();

    for slot in (0..digits.len()).rev() {
        match alphabet.index_of(digits[slot]) {
            Some(value) if value + 1 < alphabet.radix() => {
                digits[slot] = alphabet.digit(value + 1);
                return Some(assemble(head, &digits));
            }
            _ => digits[slot] = alphabet.zero_digit(),
        }
    }

    // carry past the most significant digit: move up one length tier
    match head {
        b'z' => None,
        b'Z' => Some(assemble(b'a', &[alphabet.zero_digit()])),
        _ => {
            let next_head = head + 1;
            if next_head > b'a' {
                digits.push(alphabet.zero_digit());
            } else {
                digits.pop();
            }
            Some(assemble(next_head, &digits))
        }
    }
}

/// Steps an integer part down by one at its current tier, growing into the
/// next tier on borrow. `None` when the bottommost tier underflows.
fn decrement_integer(int: &str, alphabet: &Alphabet) -> Option<String> {
    let head = int.as_bytes()[0];
    let mut digits = int.as_bytes()[1..].to_vec();

    for slot in (0..digits.len()).rev() {
        match alphabet.index_of(digits[slot]) {
            Some(value) if value > 0 => {
                digits[slot] = alphabet.digit(value - 1);
                return Some(assemble(head, &digits));
            }
            _ => digits[slot] = alphabet.max_digit(),
        }
    }

    match head {
        b'A' => None,
        b'a' => Some(assemble(b'Z', &[alphabet.max_digit()])),
        _ => {
            let prev_head = head - 1;
            if prev_head < b'Z' {
                digits.push(alphabet.max_digit());
            } else {
                digits.pop();
            }
            Some(assemble(prev_head, &digits))
        }
    }
}

/// Fraction strictly between `lower` and `upper` (`None` = unbounded above).
///
/// Operands never end with the zero digit; missing digits in `lower` read
/// as zero. The result never ends with the zero digit either.
fn midpoint(lower: &str, upper: Option<&str>, alphabet: &Alphabet) -> String {
    let zero = alphabet.zero_digit();
    debug_assert!(
        upper.map_or(true, |upper| lower < upper),
        "midpoint operands must ascend"
    );

    if let Some(upper) = upper {
        // shared prefix is kept verbatim
        let lower_bytes = lower.as_bytes();
        let upper_bytes = upper.as_bytes();
        let mut shared = 0;
        while shared < upper_bytes.len()
            && lower_bytes.get(shared).copied().unwrap_or(zero) == upper_bytes[shared]
        {
            shared += 1;
        }
        if shared > 0 {
            let lower_rest = &lower[shared.min(lower.len())..];
            return format!(
                "{}{}",
                &upper[..shared],
                midpoint(lower_rest, Some(&upper[shared..]), alphabet)
            );
        }
    }

    let low = match lower.as_bytes().first() {
        Some(&digit) => alphabet.index_of(digit).unwrap_or(0),
        None => 0,
    };
    let high = match upper {
        Some(upper) => alphabet.index_of(upper.as_bytes()[0]).unwrap_or(0),
        None => alphabet.radix(),
    };

    if high - low > 1 {
        // odd-width ranges round the midpoint up
        let mid = (low + high + 1) / 2;
        return (alphabet.digit(mid) as char).to_string();
    }

    // adjacent first digits: borrow the upper's leading digit when it has
    // more precision, otherwise descend one tier on the lower side
    match upper {
        Some(upper) if upper.len() > 1 => upper[..1].to_string(),
        _ => {
            let lower_rest = if lower.is_empty() { "" } else { &lower[1..] };
            format!(
                "{}{}",
                alphabet.digit(low) as char,
                midpoint(lower_rest, None, alphabet)
            )
        }
    }
}

fn assemble(head: u8, digits: &[u8]) -> String {
    let mut key = String::with_capacity(1 + digits.len());
    key.push(head as char);
    for &digit in digits {
        key.push(digit as char);
    }
    key
}
