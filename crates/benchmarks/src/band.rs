use crate::percentile::quartiles;
use rust_decimal::Decimal;
use serde::Serialize;

/// The 25th/50th/75th percentile thresholds of one KPI across a peer group.
///
/// Only constructed from at least the configured minimum number of samples,
/// so holding a `PercentileBand` means the benchmark is real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PercentileBand {
    pub p25: Decimal,
    pub p50: Decimal,
    pub p75: Decimal,
    /// Number of accounts the band was computed from.
    pub sample_size: usize,
}

impl PercentileBand {
    /// Builds a band from raw samples. `None` when there are fewer than
    /// `min_samples` of them.
    pub fn from_samples(samples: &[Decimal], min_samples: usize) -> Option<Self> {
        if samples.len() < min_samples.max(1) {
            return None;
        }
        let (p25, p50, p75) = quartiles(samples)?;
        Some(Self {
            p25,
            p50,
            p75,
            sample_size: samples.len(),
        })
    }

    /// Midpoint of the p50..p75 span.
    pub fn upper_mid(&self) -> Decimal {
        (self.p50 + self.p75) / Decimal::TWO
    }

    /// Midpoint of the p25..p50 span.
    pub fn lower_mid(&self) -> Decimal {
        (self.p25 + self.p50) / Decimal::TWO
    }
}

/// A benchmark for one KPI in one group: a band, or an explicit marker that
/// the population was too small to produce one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BenchmarkOutcome {
    Available(PercentileBand),
    InsufficientData { sample_size: usize },
}

impl BenchmarkOutcome {
    pub fn from_samples(samples: &[Decimal], min_samples: usize) -> Self {
        match PercentileBand::from_samples(samples, min_samples) {
            Some(band) => BenchmarkOutcome::Available(band),
            None => BenchmarkOutcome::InsufficientData {
                sample_size: samples.len(),
            },
        }
    }

    pub fn band(&self) -> Option<&PercentileBand> {
        match self {
            BenchmarkOutcome::Available(band) => Some(band),
            BenchmarkOutcome::InsufficientData { .. } => None,
        }
    }

    pub fn sample_size(&self) -> usize {
        match self {
            BenchmarkOutcome::Available(band) => band.sample_size,
            BenchmarkOutcome::InsufficientData { sample_size } => *sample_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn one_sample_is_insufficient() {
        let outcome = BenchmarkOutcome::from_samples(&[dec!(2.1)], 2);
        assert_eq!(outcome, BenchmarkOutcome::InsufficientData { sample_size: 1 });
        assert!(outcome.band().is_none());
    }

    #[test]
    fn two_samples_make_a_band() {
        let outcome = BenchmarkOutcome::from_samples(&[dec!(1), dec!(3)], 2);
        let band = outcome.band().unwrap();
        assert_eq!(band.p25, dec!(1.5));
        assert_eq!(band.p50, dec!(2));
        assert_eq!(band.p75, dec!(2.5));
        assert_eq!(band.sample_size, 2);
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(BenchmarkOutcome::InsufficientData { sample_size: 1 }).unwrap();
        assert_eq!(json["status"], "insufficient_data");
        assert_eq!(json["sample_size"], 1);

        let band = BenchmarkOutcome::from_samples(&[dec!(1), dec!(3)], 2);
        let json = serde_json::to_value(band).unwrap();
        assert_eq!(json["status"], "available");
        assert_eq!(json["p50"], 2.0);
    }
}
