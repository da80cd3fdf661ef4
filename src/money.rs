//! Minor-unit money arithmetic.
//!
//! Every monetary amount in the engine is a non-negative `i64` in minor
//! currency units (cents). The only float multiply/divide in the whole crate
//! lives here and is immediately rounded back to an integer.

/// Compute a percentage fee on a minor-unit base amount.
///
/// `rate_pct` is a decimal percentage (10.0 = 10%). Rounding is
/// half-to-even ("banker's rounding") so fee totals summed across many small
/// transactions do not drift upward.
pub fn percentage_fee(base_minor: i64, rate_pct: f64) -> i64 {
    let exact = base_minor as f64 * rate_pct / 100.0;
    exact.round_ties_even() as i64
}
