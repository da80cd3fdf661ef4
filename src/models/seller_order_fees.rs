//! Immutable per-seller fee snapshot.
//!
//! One row per seller per finalized order group, written exactly once at
//! order placement. This row is the sole source of truth for the seller's
//! payout amount: later fee config edits must never change it, so there are
//! no update functions on this model.

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};

use crate::schema::seller_order_fees;

/// Persisted fee snapshot for one seller's portion of one order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Queryable)]
#[diesel(table_name = seller_order_fees)]
pub struct SellerOrderFees {
    pub seller_order_id: String,
    pub order_group_id: String,
    pub seller_id: String,
    pub fee_config_id: String,
    pub model: String,
    pub merch_subtotal_minor: i64,
    pub delivery_minor: i64,
    pub abattoir_minor: i64,
    pub buyer_processing_fee_minor: i64,
    pub escrow_fee_minor: i64,
    pub buyer_commission_minor: i64,
    pub platform_commission_minor: i64,
    pub seller_payout_fee_minor: i64,
    pub buyer_total_minor: i64,
    pub seller_net_payout_minor: i64,
    pub currency: String,
    pub created_at: String,
}

/// New snapshot row for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = seller_order_fees)]
pub struct NewSellerOrderFees {
    pub seller_order_id: String,
    pub order_group_id: String,
    pub seller_id: String,
    pub fee_config_id: String,
    pub model: String,
    pub merch_subtotal_minor: i64,
    pub delivery_minor: i64,
    pub abattoir_minor: i64,
    pub buyer_processing_fee_minor: i64,
    pub escrow_fee_minor: i64,
    pub buyer_commission_minor: i64,
    pub platform_commission_minor: i64,
    pub seller_payout_fee_minor: i64,
    pub buyer_total_minor: i64,
    pub seller_net_payout_minor: i64,
    pub currency: String,
    pub created_at: String,
}

/// Composite key for one seller's portion of one order group.
pub fn seller_order_id(order_group_id: &str, seller_id: &str) -> String {
    format!("{order_group_id}:{seller_id}")
}

impl SellerOrderFees {
    /// Insert a snapshot row, treating a duplicate key as idempotent success.
    ///
    /// A client retry of finalization hits the primary key on
    /// `seller_order_id`; the existing row is returned unchanged rather than
    /// overwritten, keeping the snapshot immutable.
    pub fn create(conn: &mut SqliteConnection, new: NewSellerOrderFees) -> Result<Self> {
        let key = new.seller_order_id.clone();
        match diesel::insert_into(seller_order_fees::table)
            .values(&new)
            .execute(conn)
        {
            Ok(_) => {}
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                tracing::info!(seller_order_id = %key, "fee snapshot already exists, returning existing row");
            }
            Err(e) => {
                return Err(e).context("Failed to insert seller order fees snapshot");
            }
        }
        seller_order_fees::table
            .find(key)
            .first(conn)
            .context("Failed to retrieve seller order fees snapshot")
    }

    /// Find snapshot by its composite seller-order id
    pub fn find_by_id(conn: &mut SqliteConnection, key: &str) -> Result<Option<Self>> {
        seller_order_fees::table
            .find(key)
            .first::<SellerOrderFees>(conn)
            .optional()
            .context("Failed to query seller order fees by id")
    }

    /// All snapshots written for one order group, one per seller
    pub fn find_by_order_group(conn: &mut SqliteConnection, group_id: &str) -> Result<Vec<Self>> {
        seller_order_fees::table
            .filter(seller_order_fees::order_group_id.eq(group_id))
            .order(seller_order_fees::seller_id.asc())
            .load(conn)
            .context("Failed to query seller order fees by order group")
    }

    /// Snapshots created within `[start, end)`, for revenue reporting.
    pub fn find_in_range(conn: &mut SqliteConnection, start: &str, end: &str) -> Result<Vec<Self>> {
        seller_order_fees::table
            .filter(seller_order_fees::created_at.ge(start))
            .filter(seller_order_fees::created_at.lt(end))
            .order(seller_order_fees::created_at.asc())
            .load(conn)
            .context("Failed to query seller order fees by date range")
    }
}
