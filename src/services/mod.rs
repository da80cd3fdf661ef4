//! Settlement services
//!
//! Pure computation lives in `fee_calculator`; everything else orchestrates
//! models over a database connection.

pub mod checkout;
pub mod fee_calculator;
pub mod fee_resolver;
pub mod order_finalizer;
pub mod payout;
pub mod revenue;
pub mod webhook_ledger;

pub use checkout::{preview_checkout, CartItem, CartTotals, CheckoutPreview, SellerPreview};
pub use fee_calculator::{calculate_seller_order_fees, SellerFeeCalculation};
pub use fee_resolver::{
    activate_config, create_config, default_config, resolve_active_config, FeeSource,
    ResolvedFeeConfig, DEFAULT_CONFIG_ID,
};
pub use order_finalizer::finalize_order_fees;
pub use payout::{create_payout, update_payout_status};
pub use revenue::{platform_revenue_summary, ModelRevenue, PlatformRevenueSummary};
pub use webhook_ledger::{record_webhook_event, WebhookReceipt};
