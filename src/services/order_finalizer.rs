//! Order finalization: freezes the fee numbers into immutable snapshots.
//!
//! Never trusts client-submitted fee numbers. The caller supplies only raw
//! cart amounts and a config id; the named config is re-loaded from storage
//! and every number recomputed server-side before being persisted.

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::config::fee::CURRENCY;
use crate::error::{Result, SettlementError};
use crate::models::seller_order_fees::{seller_order_id, NewSellerOrderFees, SellerOrderFees};
use crate::models::FeeConfig;
use crate::services::checkout::CartItem;
use crate::services::fee_calculator::calculate_seller_order_fees;
use crate::services::fee_resolver::{default_config, DEFAULT_CONFIG_ID};

/// Re-derive and persist one immutable fee snapshot per seller.
///
/// Strict on configuration: an unknown `fee_config_id` fails with
/// `ConfigNotFound` and writes nothing (unlike checkout preview, which
/// degrades to defaults). The one exception is the well-known "default" id,
/// which names the hard-coded fallback rather than a stored row.
///
/// The whole order group is written in one transaction, so a mid-cart
/// failure leaves no partial snapshot. Re-finalizing an already-finalized
/// seller-order returns the existing rows unchanged.
pub fn finalize_order_fees(
    conn: &mut SqliteConnection,
    order_group_id: &str,
    cart: &[CartItem],
    fee_config_id: &str,
) -> Result<Vec<SellerOrderFees>> {
    let config = if fee_config_id == DEFAULT_CONFIG_ID {
        default_config()
    } else {
        FeeConfig::find_by_id(conn, fee_config_id)?
            .ok_or_else(|| SettlementError::ConfigNotFound(fee_config_id.to_string()))?
    };

    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    let snapshots = conn
        .transaction::<Vec<SellerOrderFees>, anyhow::Error, _>(|conn| {
            let mut snapshots = Vec::with_capacity(cart.len());
            for item in cart {
                let fees = calculate_seller_order_fees(
                    &config,
                    item.merch_subtotal_minor,
                    item.delivery_minor,
                    item.abattoir_minor,
                );
                let snapshot = SellerOrderFees::create(
                    conn,
                    NewSellerOrderFees {
                        seller_order_id: seller_order_id(order_group_id, &item.seller_id),
                        order_group_id: order_group_id.to_string(),
                        seller_id: item.seller_id.clone(),
                        fee_config_id: config.id.clone(),
                        model: config.model.clone(),
                        merch_subtotal_minor: fees.merch_subtotal_minor,
                        delivery_minor: fees.delivery_minor,
                        abattoir_minor: fees.abattoir_minor,
                        buyer_processing_fee_minor: fees.buyer_processing_fee_minor,
                        escrow_fee_minor: fees.escrow_fee_minor,
                        buyer_commission_minor: fees.buyer_commission_minor,
                        platform_commission_minor: fees.platform_commission_minor,
                        seller_payout_fee_minor: fees.seller_payout_fee_minor,
                        buyer_total_minor: fees.buyer_total_minor,
                        seller_net_payout_minor: fees.seller_net_payout_minor,
                        currency: CURRENCY.to_string(),
                        created_at: now.clone(),
                    },
                )?;
                snapshots.push(snapshot);
            }
            Ok(snapshots)
        })
        .map_err(SettlementError::Storage)?;

    tracing::info!(
        order_group_id = %order_group_id,
        sellers = snapshots.len(),
        fee_config_id = %config.id,
        "order fees finalized"
    );

    Ok(snapshots)
}
