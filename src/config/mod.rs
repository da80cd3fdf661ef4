//! Configuration modules for the settlement engine

pub mod fee;

pub use fee::{
    get_default_buyer_processing_fee_pct, get_default_escrow_fee_minor,
    get_default_platform_commission_pct, get_default_seller_payout_fee_pct, CURRENCY,
    DEFAULT_BUYER_PROCESSING_FEE_PCT, DEFAULT_ESCROW_SERVICE_FEE_MINOR,
    DEFAULT_PLATFORM_COMMISSION_PCT, DEFAULT_SELLER_PAYOUT_FEE_PCT,
};
