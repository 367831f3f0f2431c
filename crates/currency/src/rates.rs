use crate::error::CurrencyError;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;

/// A read-only snapshot of exchange rates into a single reporting currency.
///
/// `rate(code)` is the number of reporting-currency units one unit of `code`
/// is worth (1 USD = 3.75 SAR gives `rate("USD") == 3.75` when reporting in
/// SAR). The reporting currency always has an implicit rate of exactly one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExchangeRates {
    reporting_currency: String,
    version: String,
    rates: HashMap<String, Decimal>,
}

impl ExchangeRates {
    /// Builds a snapshot, rejecting malformed codes and non-positive rates.
    pub fn new<I>(reporting_currency: &str, version: impl Into<String>, rates: I) -> Result<Self, CurrencyError>
    where
        I: IntoIterator<Item = (String, Decimal)>,
    {
        let reporting_currency = normalize_code(reporting_currency)?;

        let mut table = HashMap::new();
        for (code, rate) in rates {
            let code = normalize_code(&code)?;
            if rate <= Decimal::ZERO {
                return Err(CurrencyError::InvalidRate { currency: code, rate });
            }
            if code == reporting_currency {
                // The reporting currency is pinned to one; a stored row for it is ignored.
                continue;
            }
            table.insert(code, rate);
        }

        Ok(Self {
            reporting_currency,
            version: version.into(),
            rates: table,
        })
    }

    /// A snapshot that only knows the reporting currency itself.
    pub fn reporting_only(reporting_currency: &str) -> Result<Self, CurrencyError> {
        Self::new(reporting_currency, "static", std::iter::empty())
    }

    pub fn reporting_currency(&self) -> &str {
        &self.reporting_currency
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_reporting(&self, code: &str) -> bool {
        code.trim().eq_ignore_ascii_case(&self.reporting_currency)
    }

    /// Looks up the rate for `code`, case-insensitively.
    pub fn rate(&self, code: &str) -> Option<Decimal> {
        if self.is_reporting(code) {
            return Some(Decimal::ONE);
        }
        self.rates.get(&code.trim().to_ascii_uppercase()).copied()
    }

    /// Every currency with a known rate, the reporting currency included.
    pub fn currencies(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.rates.keys().map(String::as_str).collect();
        codes.push(&self.reporting_currency);
        codes.sort_unstable();
        codes
    }
}

fn normalize_code(code: &str) -> Result<String, CurrencyError> {
    let code = code.trim();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(CurrencyError::InvalidCode(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}
