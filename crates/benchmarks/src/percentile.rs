use rust_decimal::prelude::*;
use rust_decimal::Decimal;

/// The `p`-th quantile (`p` in [0, 1]) of an ascending-sorted slice, using
/// linear interpolation between order statistics: with `h = (n - 1) * p`, the
/// result is `x[⌊h⌋] + (h - ⌊h⌋) * (x[⌊h⌋ + 1] - x[⌊h⌋])`.
///
/// Returns `None` for an empty slice.
pub fn percentile_sorted(sorted: &[Decimal], p: Decimal) -> Option<Decimal> {
    let last = sorted.len().checked_sub(1)?;
    let p = p.clamp(Decimal::ZERO, Decimal::ONE);

    let h = Decimal::from(last) * p;
    let lower_idx = h.floor().to_usize()?.min(last);
    let upper_idx = (lower_idx + 1).min(last);
    let fraction = h - h.floor();

    let lower = sorted[lower_idx];
    let upper = sorted[upper_idx];
    if fraction.is_zero() {
        return Some(lower);
    }
    // Weighted form: `upper - lower` alone can exceed the decimal range.
    Some(lower * (Decimal::ONE - fraction) + upper * fraction)
}

/// Sorts a copy of `samples` and returns the (p25, p50, p75) quartiles.
///
/// The input order never affects the result.
pub fn quartiles(samples: &[Decimal]) -> Option<(Decimal, Decimal, Decimal)> {
    let mut sorted = samples.to_vec();
    sorted.sort_unstable();

    let p25 = percentile_sorted(&sorted, Decimal::new(25, 2))?;
    let p50 = percentile_sorted(&sorted, Decimal::new(50, 2))?;
    let p75 = percentile_sorted(&sorted, Decimal::new(75, 2))?;
    Some((p25, p50, p75))
}
