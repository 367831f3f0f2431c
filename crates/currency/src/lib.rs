//! # Currency Normalization
//!
//! Converts monetary amounts from an account's native currency into the single
//! reporting currency that every cross-account comparison is made in.
//!
//! - `ExchangeRates`: a versioned, read-only rate snapshot. It is loaded by the
//!   caller (see the `database` crate) and never mutated here.
//! - `CurrencyNormalizer`: pure conversion over a borrowed snapshot.
//!
//! Unknown currencies are reported as `CurrencyError::UnknownCurrency`; whether
//! to fall back to treating the amount as already converted is the caller's
//! decision.

pub mod error;
pub mod normalizer;
pub mod rates;

pub use error::CurrencyError;
pub use normalizer::CurrencyNormalizer;
pub use rates::ExchangeRates;
