//! Static industry ranges served when live benchmarks cannot be computed.
//!
//! Monetary ranges are in SAR. Callers using another reporting currency
//! convert them before display.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// The currency the static monetary ranges are expressed in.
pub const FALLBACK_CURRENCY: &str = "SAR";

/// Industry used when a requested industry has no static entry.
pub const GENERAL_INDUSTRY: &str = "general";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricRange {
    pub min: Decimal,
    pub avg: Decimal,
    pub max: Decimal,
}

const fn range(min: Decimal, avg: Decimal, max: Decimal) -> MetricRange {
    MetricRange { min, avg, max }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FallbackBenchmark {
    pub industry: &'static str,
    pub ctr: MetricRange,
    pub cpc: MetricRange,
    pub cpm: MetricRange,
    pub cvr: MetricRange,
    pub cpl: MetricRange,
}

impl FallbackBenchmark {
    /// Range for a metric name, if the static dataset covers it.
    pub fn metric(&self, name: &str) -> Option<MetricRange> {
        match name {
            "ctr" => Some(self.ctr),
            "cpc" => Some(self.cpc),
            "cpm" => Some(self.cpm),
            "cvr" => Some(self.cvr),
            "cpl" => Some(self.cpl),
            _ => None,
        }
    }

    pub fn metrics(&self) -> [(&'static str, MetricRange); 5] {
        [
            ("ctr", self.ctr),
            ("cpc", self.cpc),
            ("cpm", self.cpm),
            ("cvr", self.cvr),
            ("cpl", self.cpl),
        ]
    }
}

pub const FALLBACK_BENCHMARKS: &[FallbackBenchmark] = &[
    FallbackBenchmark {
        industry: "ecommerce",
        ctr: range(dec!(0.9), dec!(1.6), dec!(2.8)),
        cpc: range(dec!(1.2), dec!(2.6), dec!(4.5)),
        cpm: range(dec!(18), dec!(32), dec!(55)),
        cvr: range(dec!(1.5), dec!(3.0), dec!(5.5)),
        cpl: range(dec!(25), dec!(60), dec!(120)),
    },
    FallbackBenchmark {
        industry: "real_estate",
        ctr: range(dec!(0.6), dec!(1.1), dec!(2.0)),
        cpc: range(dec!(2.5), dec!(4.8), dec!(8.0)),
        cpm: range(dec!(22), dec!(38), dec!(65)),
        cvr: range(dec!(2.0), dec!(4.5), dec!(8.0)),
        cpl: range(dec!(45), dec!(95), dec!(180)),
    },
    FallbackBenchmark {
        industry: "healthcare",
        ctr: range(dec!(0.7), dec!(1.3), dec!(2.2)),
        cpc: range(dec!(2.0), dec!(3.9), dec!(6.5)),
        cpm: range(dec!(20), dec!(35), dec!(60)),
        cvr: range(dec!(3.0), dec!(6.0), dec!(10.0)),
        cpl: range(dec!(35), dec!(75), dec!(140)),
    },
    FallbackBenchmark {
        industry: "education",
        ctr: range(dec!(0.8), dec!(1.4), dec!(2.5)),
        cpc: range(dec!(1.5), dec!(3.0), dec!(5.0)),
        cpm: range(dec!(15), dec!(28), dec!(48)),
        cvr: range(dec!(4.0), dec!(8.0), dec!(13.0)),
        cpl: range(dec!(20), dec!(45), dec!(90)),
    },
    FallbackBenchmark {
        industry: "automotive",
        ctr: range(dec!(0.6), dec!(1.0), dec!(1.8)),
        cpc: range(dec!(2.2), dec!(4.2), dec!(7.0)),
        cpm: range(dec!(20), dec!(36), dec!(62)),
        cvr: range(dec!(2.5), dec!(5.0), dec!(9.0)),
        cpl: range(dec!(50), dec!(110), dec!(200)),
    },
    FallbackBenchmark {
        industry: "finance",
        ctr: range(dec!(0.5), dec!(0.9), dec!(1.6)),
        cpc: range(dec!(3.0), dec!(6.0), dec!(11.0)),
        cpm: range(dec!(25), dec!(45), dec!(80)),
        cvr: range(dec!(2.0), dec!(4.0), dec!(7.5)),
        cpl: range(dec!(60), dec!(130), dec!(250)),
    },
    FallbackBenchmark {
        industry: "food_and_beverage",
        ctr: range(dec!(1.0), dec!(1.8), dec!(3.2)),
        cpc: range(dec!(0.8), dec!(1.7), dec!(3.0)),
        cpm: range(dec!(12), dec!(24), dec!(40)),
        cvr: range(dec!(2.0), dec!(4.0), dec!(7.0)),
        cpl: range(dec!(15), dec!(35), dec!(70)),
    },
    FallbackBenchmark {
        industry: "travel",
        ctr: range(dec!(0.8), dec!(1.5), dec!(2.6)),
        cpc: range(dec!(1.5), dec!(3.2), dec!(5.5)),
        cpm: range(dec!(16), dec!(30), dec!(52)),
        cvr: range(dec!(1.5), dec!(3.5), dec!(6.5)),
        cpl: range(dec!(30), dec!(70), dec!(130)),
    },
    FallbackBenchmark {
        industry: GENERAL_INDUSTRY,
        ctr: range(dec!(0.7), dec!(1.3), dec!(2.4)),
        cpc: range(dec!(1.5), dec!(3.3), dec!(6.0)),
        cpm: range(dec!(18), dec!(33), dec!(58)),
        cvr: range(dec!(2.0), dec!(4.5), dec!(8.0)),
        cpl: range(dec!(30), dec!(75), dec!(150)),
    },
];

/// The static entry for an industry, falling back to `general`.
pub fn fallback_for(industry: &str) -> &'static FallbackBenchmark {
    let wanted = industry.trim().to_lowercase().replace([' ', '-'], "_");
    FALLBACK_BENCHMARKS
        .iter()
        .find(|b| b.industry == wanted)
        .or_else(|| FALLBACK_BENCHMARKS.iter().find(|b| b.industry == GENERAL_INDUSTRY))
        .unwrap_or(&FALLBACK_BENCHMARKS[0])
}
