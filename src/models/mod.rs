//! Database models for the settlement engine

pub mod fee_config;
pub mod payout;
pub mod seller_order_fees;
pub mod webhook_event;

pub use fee_config::{AppliesTo, FeeConfig, FeeModel, NewFeeConfig};
pub use payout::{NewPayout, Payout, PayoutResponse, PayoutStatus};
pub use seller_order_fees::{NewSellerOrderFees, SellerOrderFees};
pub use webhook_event::{InsertOutcome, NewWebhookEvent, WebhookEvent};
