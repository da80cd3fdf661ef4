//! Default fee schedule for the livestock marketplace.
//!
//! These constants back the hard-coded fallback config used whenever no
//! stored fee config is active or applicable. Checkout must keep working
//! with these values even if the fee_configs table is empty.
//! Values are configurable via environment variables within sane bounds.

use std::env;

/// Operating currency for the deployment (single-currency platform).
pub const CURRENCY: &str = "ZAR";

/// Default platform commission: 10% of merchandise value.
///
/// Override via PLATFORM_COMMISSION_PCT environment variable.
pub const DEFAULT_PLATFORM_COMMISSION_PCT: f64 = 10.0;

/// Default seller payout fee: 2.5% of merchandise value.
///
/// Override via SELLER_PAYOUT_FEE_PCT environment variable.
pub const DEFAULT_SELLER_PAYOUT_FEE_PCT: f64 = 2.5;

/// Default buyer processing fee: 1.5% of merchandise value.
///
/// Override via BUYER_PROCESSING_FEE_PCT environment variable.
pub const DEFAULT_BUYER_PROCESSING_FEE_PCT: f64 = 1.5;

/// Default flat escrow service fee in minor units (R25.00).
///
/// Override via ESCROW_SERVICE_FEE_MINOR environment variable.
pub const DEFAULT_ESCROW_SERVICE_FEE_MINOR: i64 = 2500;

/// Maximum percentage any single fee rate may be configured to.
/// Above this the value is almost certainly an operator error: a commission
/// over 100% would drive seller net payouts negative.
pub const MAX_FEE_PCT: f64 = 100.0;

fn get_pct(var: &str, default: f64) -> f64 {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(|pct: f64| {
            if !(0.0..=MAX_FEE_PCT).contains(&pct) {
                tracing::warn!(pct = pct, var = var, "fee percentage out of bounds, using default");
                default
            } else {
                pct
            }
        })
        .unwrap_or(default)
}

/// Get the configured default platform commission percentage.
pub fn get_default_platform_commission_pct() -> f64 {
    get_pct("PLATFORM_COMMISSION_PCT", DEFAULT_PLATFORM_COMMISSION_PCT)
}

/// Get the configured default seller payout fee percentage.
pub fn get_default_seller_payout_fee_pct() -> f64 {
    get_pct("SELLER_PAYOUT_FEE_PCT", DEFAULT_SELLER_PAYOUT_FEE_PCT)
}

/// Get the configured default buyer processing fee percentage.
pub fn get_default_buyer_processing_fee_pct() -> f64 {
    get_pct("BUYER_PROCESSING_FEE_PCT", DEFAULT_BUYER_PROCESSING_FEE_PCT)
}

/// Get the configured flat escrow service fee in minor units.
pub fn get_default_escrow_fee_minor() -> i64 {
    env::var("ESCROW_SERVICE_FEE_MINOR")
        .ok()
        .and_then(|v| v.parse().ok())
        .filter(|fee: &i64| *fee >= 0)
        .unwrap_or(DEFAULT_ESCROW_SERVICE_FEE_MINOR)
}
