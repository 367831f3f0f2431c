use crate::error::CurrencyError;
use crate::rates::ExchangeRates;
use core_types::MetricAggregate;
use rust_decimal::Decimal;

/// Converts monetary amounts into the snapshot's reporting currency.
///
/// Holds only a shared borrow of the snapshot, so one snapshot can back any
/// number of normalizers on any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct CurrencyNormalizer<'a> {
    rates: &'a ExchangeRates,
}

impl<'a> CurrencyNormalizer<'a> {
    pub fn new(rates: &'a ExchangeRates) -> Self {
        Self { rates }
    }

    pub fn reporting_currency(&self) -> &str {
        self.rates.reporting_currency()
    }

    /// The multiplier applied to amounts in `source_currency`.
    pub fn rate_for(&self, source_currency: &str) -> Result<Decimal, CurrencyError> {
        self.rates
            .rate(source_currency)
            .ok_or_else(|| CurrencyError::UnknownCurrency(source_currency.trim().to_string()))
    }

    /// Converts `amount` from `source_currency` into the reporting currency.
    ///
    /// Amounts already in the reporting currency are returned untouched.
    pub fn to_reporting_currency(
        &self,
        amount: Decimal,
        source_currency: &str,
    ) -> Result<Decimal, CurrencyError> {
        if self.rates.is_reporting(source_currency) {
            return Ok(amount);
        }
        let rate = self.rate_for(source_currency)?;
        convert(amount, rate, source_currency)
    }

    /// Returns a copy of `agg` with spend and revenue converted and the
    /// currency retagged. Counters and grouping keys are unchanged.
    pub fn normalize_aggregate(&self, agg: &MetricAggregate) -> Result<MetricAggregate, CurrencyError> {
        if self.rates.is_reporting(&agg.currency) {
            return Ok(MetricAggregate {
                currency: self.reporting_currency().to_string(),
                ..agg.clone()
            });
        }

        let rate = self.rate_for(&agg.currency)?;
        tracing::trace!(currency = %agg.currency, %rate, "Normalizing aggregate.");
        Ok(MetricAggregate {
            currency: self.reporting_currency().to_string(),
            spend: convert(agg.spend, rate, &agg.currency)?,
            revenue: convert(agg.revenue, rate, &agg.currency)?,
            ..agg.clone()
        })
    }
}

fn convert(amount: Decimal, rate: Decimal, currency: &str) -> Result<Decimal, CurrencyError> {
    amount.checked_mul(rate).ok_or_else(|| CurrencyError::Overflow {
        currency: currency.trim().to_string(),
        amount,
    })
}
