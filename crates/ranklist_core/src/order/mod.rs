//! Fractional order key generation.
//!
//! # Responsibility
//! - Produce sortable string keys strictly between two neighbor keys.
//! - Keep key generation pure and independent of storage.
//!
//! # Invariants
//! - Generated keys compare lexicographically in numeric order.
//! - Generation reads nothing besides the two neighbor keys passed in.
//! - Tail appends step the integer part; midpoints extend the fraction.

pub mod alphabet;
pub mod generate;
pub mod key;

pub use alphabet::{Alphabet, AlphabetError, BASE62_DIGITS};
pub use generate::{key_between, n_keys_between};
pub use key::{OrderKey, OrderKeyError};
