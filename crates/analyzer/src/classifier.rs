use benchmarks::{BenchmarkOutcome, PercentileBand};
use core_types::{Direction, PerformanceStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

const SCORE_FLOOR: Decimal = Decimal::ZERO;
const SCORE_CEILING: Decimal = Decimal::ONE_HUNDRED;
const SCORE_AT_P25: Decimal = dec!(25);
const SCORE_SPAN: Decimal = dec!(50);
const SCORE_AT_BAND: Decimal = dec!(50);

/// The outcome of comparing one actual value against its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    /// 0–100, higher is always better regardless of the metric's direction.
    pub performance: Option<Decimal>,
    pub status: PerformanceStatus,
}

impl Classification {
    pub const NO_DATA: Classification = Classification {
        performance: None,
        status: PerformanceStatus::NoData,
    };
}

/// A KPI with its benchmark and verdict. Built per request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedMetric {
    pub metric: String,
    pub actual: Option<Decimal>,
    pub band: Option<PercentileBand>,
    pub direction: Direction,
    pub status: PerformanceStatus,
    pub performance: Option<Decimal>,
}

/// Maps actual KPI values onto the status scale of a percentile band.
#[derive(Debug, Clone, Copy, Default)]
pub struct PerformanceClassifier;

impl PerformanceClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(
        &self,
        actual: Option<Decimal>,
        band: Option<&PercentileBand>,
        direction: Direction,
    ) -> Classification {
        let (Some(actual), Some(band)) = (actual, band) else {
            return Classification::NO_DATA;
        };
        Classification {
            performance: Some(performance_score(actual, band, direction)),
            status: status_for(actual, band, direction),
        }
    }

    /// Classifies a named KPI, taking its direction from the metric name.
    pub fn classify_metric(
        &self,
        metric: &str,
        actual: Option<Decimal>,
        outcome: Option<&BenchmarkOutcome>,
    ) -> ClassifiedMetric {
        let direction = Direction::for_metric(metric);
        let band = outcome.and_then(BenchmarkOutcome::band).copied();
        let classification = self.classify(actual, band.as_ref(), direction);
        ClassifiedMetric {
            metric: metric.to_string(),
            actual,
            band,
            direction,
            status: classification.status,
            performance: classification.performance,
        }
    }
}

fn status_for(actual: Decimal, band: &PercentileBand, direction: Direction) -> PerformanceStatus {
    match direction {
        Direction::HigherIsBetter => {
            if actual <= band.p25 {
                PerformanceStatus::Poor
            } else if actual <= band.p50 {
                PerformanceStatus::BelowAverage
            } else if actual <= band.p75 {
                if actual > band.upper_mid() {
                    PerformanceStatus::Good
                } else {
                    PerformanceStatus::Average
                }
            } else {
                PerformanceStatus::Excellent
            }
        }
        Direction::LowerIsBetter => {
            if actual >= band.p75 {
                PerformanceStatus::Poor
            } else if actual >= band.p50 {
                PerformanceStatus::BelowAverage
            } else if actual >= band.p25 {
                if actual < band.lower_mid() {
                    PerformanceStatus::Good
                } else {
                    PerformanceStatus::Average
                }
            } else {
                PerformanceStatus::Excellent
            }
        }
    }
}

/// `25 + 50 * (actual - p25) / (p75 - p25)` clamped to 0–100, mirrored for
/// lower-is-better metrics. A band with no spread scores 50 on the band and
/// 0 or 100 either side of it.
fn performance_score(actual: Decimal, band: &PercentileBand, direction: Direction) -> Decimal {
    let spread = band.p75 - band.p25;
    let raw = if spread.is_zero() {
        if actual == band.p50 {
            return SCORE_AT_BAND;
        } else if actual > band.p50 {
            SCORE_CEILING
        } else {
            SCORE_FLOOR
        }
    } else {
        let offset = actual
            .checked_sub(band.p25)
            .and_then(|d| d.checked_mul(SCORE_SPAN))
            .and_then(|d| d.checked_div(spread));
        match offset {
            Some(offset) => (SCORE_AT_P25 + offset).clamp(SCORE_FLOOR, SCORE_CEILING),
            None if actual > band.p25 => SCORE_CEILING,
            None => SCORE_FLOOR,
        }
    };

    match direction {
        Direction::HigherIsBetter => raw,
        Direction::LowerIsBetter => SCORE_CEILING - raw,
    }
}
