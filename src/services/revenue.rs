//! Platform revenue reporting over finalized fee snapshots.
//!
//! Read-only aggregation. Payout fees are seller-side deductions, not
//! platform revenue; they are summed for visibility but excluded from
//! `total_revenue_minor`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::SellerOrderFees;

/// Revenue aggregates for one commission model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelRevenue {
    pub model: String,
    pub order_count: i64,
    /// Commission from both sides (exactly one is non-zero per snapshot)
    pub commission_minor: i64,
    pub processing_fee_minor: i64,
    pub escrow_fee_minor: i64,
    /// Seller-side deduction, reported separately from platform revenue
    pub payout_fee_minor: i64,
    /// commission + processing + escrow
    pub total_revenue_minor: i64,
}

/// Platform revenue summary for a date range
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformRevenueSummary {
    pub start: String,
    pub end: String,
    pub by_model: Vec<ModelRevenue>,
    pub total_revenue_minor: i64,
}

/// Aggregate finalized fee snapshots in `[start, end)`, grouped by model.
pub fn platform_revenue_summary(
    conn: &mut SqliteConnection,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<PlatformRevenueSummary> {
    let start_str = start.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let end_str = end.format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let snapshots = SellerOrderFees::find_in_range(conn, &start_str, &end_str)?;

    let mut by_model: BTreeMap<String, ModelRevenue> = BTreeMap::new();
    for snap in &snapshots {
        let entry = by_model
            .entry(snap.model.clone())
            .or_insert_with(|| ModelRevenue {
                model: snap.model.clone(),
                ..Default::default()
            });
        entry.order_count += 1;
        entry.commission_minor += snap.buyer_commission_minor + snap.platform_commission_minor;
        entry.processing_fee_minor += snap.buyer_processing_fee_minor;
        entry.escrow_fee_minor += snap.escrow_fee_minor;
        entry.payout_fee_minor += snap.seller_payout_fee_minor;
        entry.total_revenue_minor = entry.commission_minor
            + entry.processing_fee_minor
            + entry.escrow_fee_minor;
    }

    let by_model: Vec<ModelRevenue> = by_model.into_values().collect();
    let total_revenue_minor = by_model.iter().map(|m| m.total_revenue_minor).sum();

    Ok(PlatformRevenueSummary {
        start: start_str,
        end: end_str,
        by_model,
        total_revenue_minor,
    })
}
