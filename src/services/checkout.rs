//! Checkout preview orchestration.
//!
//! Fans the fee calculator across every seller in a multi-seller cart and
//! aggregates buyer/seller/platform totals. Purely advisory: performs no
//! writes and may be called any number of times.

use anyhow::Result;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::fee::CURRENCY;
use crate::services::fee_calculator::{calculate_seller_order_fees, SellerFeeCalculation};
use crate::services::fee_resolver::resolve_active_config;

/// One seller's portion of a multi-seller cart. Ephemeral input, never
/// persisted as such.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub seller_id: String,
    pub merch_subtotal_minor: i64,
    pub delivery_minor: i64,
    pub abattoir_minor: i64,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub export: bool,
}

/// Per-seller preview line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerPreview {
    pub seller_id: String,
    /// Config the breakdown was computed with ("default" for the fallback)
    pub fee_config_id: String,
    #[serde(flatten)]
    pub fees: SellerFeeCalculation,
}

/// Cart-level aggregates in minor units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartTotals {
    pub buyer_grand_total_minor: i64,
    pub seller_total_net_payout_minor: i64,
    pub platform_revenue_estimate_minor: i64,
}

/// Checkout preview response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutPreview {
    pub per_seller: Vec<SellerPreview>,
    pub cart_totals: CartTotals,
    /// Config id of the first cart item, for display only. Multi-config
    /// carts show per-seller breakdowns instead of a single summary rate.
    pub fee_config_id: Option<String>,
    pub currency: String,
}

/// Compute a fee preview for a multi-seller cart.
///
/// Each item resolves its own config from its species/export flag, so
/// different sellers in one cart may legitimately price under different
/// configs.
pub fn preview_checkout(conn: &mut SqliteConnection, cart: &[CartItem]) -> Result<CheckoutPreview> {
    let mut per_seller = Vec::with_capacity(cart.len());
    let mut totals = CartTotals::default();

    for item in cart {
        let resolved = resolve_active_config(conn, item.species.as_deref(), item.export)?;
        let fees = calculate_seller_order_fees(
            &resolved.config,
            item.merch_subtotal_minor,
            item.delivery_minor,
            item.abattoir_minor,
        );

        totals.buyer_grand_total_minor += fees.buyer_total_minor;
        totals.seller_total_net_payout_minor += fees.seller_net_payout_minor;
        totals.platform_revenue_estimate_minor += fees.platform_commission_minor
            + fees.buyer_commission_minor
            + fees.buyer_processing_fee_minor
            + fees.escrow_fee_minor;

        per_seller.push(SellerPreview {
            seller_id: item.seller_id.clone(),
            fee_config_id: resolved.config.id.clone(),
            fees,
        });
    }

    Ok(CheckoutPreview {
        fee_config_id: per_seller.first().map(|s| s.fee_config_id.clone()),
        per_seller,
        cart_totals: totals,
        currency: CURRENCY.to_string(),
    })
}
