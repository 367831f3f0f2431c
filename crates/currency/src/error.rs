use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurrencyError {
    #[error("No exchange rate for currency '{0}'")]
    UnknownCurrency(String),

    #[error("Exchange rate for '{currency}' must be positive, got {rate}")]
    InvalidRate { currency: String, rate: Decimal },

    #[error("Invalid currency code '{0}'")]
    InvalidCode(String),

    #[error("Converting {amount} {currency} overflows the decimal range")]
    Overflow { currency: String, amount: Decimal },
}

impl CurrencyError {
    /// Errors caused by stored amounts or rates rather than by the request.
    pub fn is_data_error(&self) -> bool {
        matches!(self, CurrencyError::Overflow { .. })
    }
}
