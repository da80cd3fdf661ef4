//! Fee calculation and settlement engine for the livestock marketplace.
//!
//! Computes buyer/seller obligations for multi-seller orders, freezes them
//! into immutable per-seller snapshots at finalization, and drives seller
//! payouts to completion while staying idempotent under duplicate
//! payment-provider callbacks.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod money;
pub mod schema;
pub mod services;
