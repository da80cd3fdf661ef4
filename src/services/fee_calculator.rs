//! Per-seller fee breakdown.
//!
//! Pure function of (config, cart amounts): no I/O, no shared state. The
//! dual commission model charges the platform cut to exactly one side:
//! buyer_pays_commission adds it to the buyer total, seller_pays_commission
//! deducts it from the seller payout. It is never charged to both.

use serde::{Deserialize, Serialize};

use crate::models::fee_config::{FeeConfig, FeeModel};
use crate::money::percentage_fee;

/// Full fee breakdown for one seller's cart line, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerFeeCalculation {
    pub merch_subtotal_minor: i64,
    pub delivery_minor: i64,
    pub abattoir_minor: i64,
    pub buyer_processing_fee_minor: i64,
    pub escrow_fee_minor: i64,
    /// Commission added to the buyer total (buyer_pays_commission model only)
    pub buyer_commission_minor: i64,
    /// Commission deducted from the seller (seller_pays_commission model only)
    pub platform_commission_minor: i64,
    pub seller_payout_fee_minor: i64,
    pub buyer_total_minor: i64,
    pub seller_net_payout_minor: i64,
}

/// Compute the fee breakdown for a single seller's portion of an order.
///
/// Invariant (checked by callers at configuration time, asserted here in
/// debug builds): the seller net payout must not go negative. A negative
/// result means a commission rate above 100%, which is a config error.
pub fn calculate_seller_order_fees(
    config: &FeeConfig,
    merch_minor: i64,
    delivery_minor: i64,
    abattoir_minor: i64,
) -> SellerFeeCalculation {
    let buyer_processing_fee = percentage_fee(merch_minor, config.buyer_processing_fee_pct);
    let escrow_fee = config.escrow_service_fee_minor;
    let seller_payout_fee = percentage_fee(merch_minor, config.seller_payout_fee_pct);

    let commission = percentage_fee(merch_minor, config.platform_commission_pct);
    let (buyer_commission, platform_commission) = match config.fee_model() {
        FeeModel::BuyerPaysCommission => (commission, 0),
        FeeModel::SellerPaysCommission => (0, commission),
    };

    let buyer_total =
        merch_minor + delivery_minor + abattoir_minor + buyer_processing_fee + escrow_fee + buyer_commission;
    let seller_net_payout = merch_minor - platform_commission - seller_payout_fee;

    debug_assert!(
        seller_net_payout >= 0,
        "negative seller payout: commission/payout fee misconfigured"
    );

    SellerFeeCalculation {
        merch_subtotal_minor: merch_minor,
        delivery_minor,
        abattoir_minor,
        buyer_processing_fee_minor: buyer_processing_fee,
        escrow_fee_minor: escrow_fee,
        buyer_commission_minor: buyer_commission,
        platform_commission_minor: platform_commission,
        seller_payout_fee_minor: seller_payout_fee,
        buyer_total_minor: buyer_total,
        seller_net_payout_minor: seller_net_payout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(model: FeeModel) -> FeeConfig {
        FeeConfig {
            id: "cfg-test".to_string(),
            name: "test".to_string(),
            model: model.as_str().to_string(),
            platform_commission_pct: 10.0,
            seller_payout_fee_pct: 2.5,
            buyer_processing_fee_pct: 1.5,
            escrow_service_fee_minor: 2500,
            applies_to: None,
            is_active: 1,
            effective_from: "2025-01-01T00:00:00Z".to_string(),
            effective_to: None,
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_seller_pays_commission_example() {
        // R1000.00 merch + R50.00 delivery, seller pays 10% commission
        let calc = calculate_seller_order_fees(&config(FeeModel::SellerPaysCommission), 100_000, 5_000, 0);
        assert_eq!(calc.buyer_processing_fee_minor, 1_500);
        assert_eq!(calc.escrow_fee_minor, 2_500);
        assert_eq!(calc.buyer_commission_minor, 0);
        assert_eq!(calc.platform_commission_minor, 10_000);
        assert_eq!(calc.seller_payout_fee_minor, 2_500);
        assert_eq!(calc.buyer_total_minor, 109_000);
        assert_eq!(calc.seller_net_payout_minor, 87_500);
    }

    #[test]
    fn test_buyer_pays_commission_example() {
        // Same amounts, buyer pays the 10% commission instead
        let calc = calculate_seller_order_fees(&config(FeeModel::BuyerPaysCommission), 100_000, 5_000, 0);
        assert_eq!(calc.buyer_commission_minor, 10_000);
        assert_eq!(calc.platform_commission_minor, 0);
        assert_eq!(calc.buyer_total_minor, 119_000);
        assert_eq!(calc.seller_net_payout_minor, 97_500);
    }

    #[test]
    fn test_buyer_total_consistency() {
        for model in [FeeModel::BuyerPaysCommission, FeeModel::SellerPaysCommission] {
            for merch in [0i64, 99, 12_345, 100_000, 7_777_777] {
                let calc = calculate_seller_order_fees(&config(model), merch, 1_200, 800);
                assert_eq!(
                    calc.buyer_total_minor,
                    calc.merch_subtotal_minor
                        + calc.delivery_minor
                        + calc.abattoir_minor
                        + calc.buyer_processing_fee_minor
                        + calc.escrow_fee_minor
                        + calc.buyer_commission_minor
                );
                assert_eq!(
                    calc.seller_net_payout_minor,
                    calc.merch_subtotal_minor
                        - calc.platform_commission_minor
                        - calc.seller_payout_fee_minor
                );
            }
        }
    }

    #[test]
    fn test_dual_model_exclusivity() {
        let buyer = calculate_seller_order_fees(&config(FeeModel::BuyerPaysCommission), 100_000, 0, 0);
        assert!(buyer.buyer_commission_minor > 0);
        assert_eq!(buyer.platform_commission_minor, 0);

        let seller = calculate_seller_order_fees(&config(FeeModel::SellerPaysCommission), 100_000, 0, 0);
        assert!(seller.platform_commission_minor > 0);
        assert_eq!(seller.buyer_commission_minor, 0);
    }

    #[test]
    fn test_abattoir_flows_through_buyer_total() {
        let calc = calculate_seller_order_fees(&config(FeeModel::SellerPaysCommission), 50_000, 0, 7_500);
        // Abattoir charge is a pass-through: buyer pays it, no fee applies to it
        assert_eq!(calc.abattoir_minor, 7_500);
        assert_eq!(calc.buyer_processing_fee_minor, percentage_fee(50_000, 1.5));
        assert_eq!(calc.seller_net_payout_minor, 50_000 - 5_000 - 1_250);
    }

    #[test]
    fn test_zero_amount_line() {
        let calc = calculate_seller_order_fees(&config(FeeModel::SellerPaysCommission), 0, 0, 0);
        assert_eq!(calc.buyer_total_minor, 2_500); // flat escrow fee still applies
        assert_eq!(calc.seller_net_payout_minor, 0);
    }
}
