//! Payout model tracking money owed to a seller for one seller-order.
//!
//! State machine: pending -> processing -> completed, with
//! processing -> failed -> pending as the retry loop. Completed is terminal.
//! `attempts` counts transitions into failed.

use anyhow::{Context, Result};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::payouts;

/// Payout status enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Whether the state machine permits moving from `self` to `next`.
    pub fn can_transition_to(&self, next: PayoutStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
                | (Self::Failed, Self::Pending)
        )
    }
}

/// Payout database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = payouts)]
pub struct Payout {
    pub id: String,
    pub seller_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub transfer_ref: Option<String>,
    pub attempts: i32,
    pub created_at: String,
    pub updated_at: String,
}

/// New payout for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = payouts)]
pub struct NewPayout {
    pub id: String,
    pub seller_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub attempts: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl NewPayout {
    pub fn new(seller_order_id: &str, amount_minor: i64, currency: &str) -> Self {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        Self {
            id: Uuid::new_v4().to_string(),
            seller_order_id: seller_order_id.to_string(),
            amount_minor,
            currency: currency.to_string(),
            status: PayoutStatus::Pending.as_str().to_string(),
            attempts: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Seller-facing payout view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoutResponse {
    pub id: String,
    pub seller_order_id: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    pub transfer_ref: Option<String>,
    pub attempts: i32,
    pub created_at: String,
}

impl From<Payout> for PayoutResponse {
    fn from(p: Payout) -> Self {
        Self {
            id: p.id,
            seller_order_id: p.seller_order_id,
            amount_minor: p.amount_minor,
            currency: p.currency,
            status: p.status,
            transfer_ref: p.transfer_ref,
            attempts: p.attempts,
            created_at: p.created_at,
        }
    }
}

impl Payout {
    pub fn payout_status(&self) -> PayoutStatus {
        PayoutStatus::from_str(&self.status)
    }

    /// Insert a new payout row
    pub fn create(conn: &mut SqliteConnection, new: NewPayout) -> Result<Self> {
        let payout_id = new.id.clone();
        diesel::insert_into(payouts::table)
            .values(&new)
            .execute(conn)
            .context("Failed to insert payout")?;
        payouts::table
            .find(payout_id)
            .first(conn)
            .context("Failed to retrieve created payout")
    }

    /// Find payout by ID
    pub fn find_by_id(conn: &mut SqliteConnection, payout_id: &str) -> Result<Option<Self>> {
        payouts::table
            .find(payout_id)
            .first::<Payout>(conn)
            .optional()
            .context("Failed to query payout by id")
    }

    /// Find the payout for a seller-order, if one was created
    pub fn find_by_seller_order(
        conn: &mut SqliteConnection,
        seller_order: &str,
    ) -> Result<Option<Self>> {
        payouts::table
            .filter(payouts::seller_order_id.eq(seller_order))
            .first::<Payout>(conn)
            .optional()
            .context("Failed to query payout by seller order")
    }

    /// Apply a validated status change. Increments `attempts` when entering
    /// failed; stores the gateway transfer reference when provided.
    pub fn apply_transition(
        conn: &mut SqliteConnection,
        payout_id: &str,
        next: PayoutStatus,
        gateway_ref: Option<&str>,
        attempts_after: i32,
    ) -> Result<Self> {
        use crate::schema::payouts::dsl::*;

        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

        match gateway_ref {
            Some(r) => {
                diesel::update(payouts.find(payout_id))
                    .set((
                        status.eq(next.as_str()),
                        transfer_ref.eq(r),
                        attempts.eq(attempts_after),
                        updated_at.eq(&now),
                    ))
                    .execute(conn)
                    .context("Failed to update payout status")?;
            }
            None => {
                diesel::update(payouts.find(payout_id))
                    .set((
                        status.eq(next.as_str()),
                        attempts.eq(attempts_after),
                        updated_at.eq(&now),
                    ))
                    .execute(conn)
                    .context("Failed to update payout status")?;
            }
        }

        payouts
            .find(payout_id)
            .first(conn)
            .context("Failed to retrieve updated payout")
    }
}
