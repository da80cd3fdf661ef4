//! Payout lifecycle management.
//!
//! The payout amount is copied from the immutable fee snapshot at creation
//! and never recomputed. Creation is idempotent under both a pre-existing
//! row and a lost insert race on the unique seller_order_id.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::SqliteConnection;

use crate::error::{Result, SettlementError};
use crate::models::payout::{NewPayout, Payout, PayoutStatus};
use crate::models::SellerOrderFees;

/// Create the payout owed for a finalized seller-order.
///
/// Fails with `SnapshotNotFound` if finalization has not run yet (caller
/// sequencing bug). Returns the existing payout unchanged if one was
/// already created for this seller-order.
pub fn create_payout(conn: &mut SqliteConnection, seller_order: &str) -> Result<Payout> {
    let snapshot = SellerOrderFees::find_by_id(conn, seller_order)?
        .ok_or_else(|| SettlementError::SnapshotNotFound(seller_order.to_string()))?;

    if let Some(existing) = Payout::find_by_seller_order(conn, seller_order)? {
        tracing::debug!(seller_order_id = %seller_order, payout_id = %existing.id, "payout already exists");
        return Ok(existing);
    }

    let new = NewPayout::new(
        seller_order,
        snapshot.seller_net_payout_minor,
        &snapshot.currency,
    );
    match diesel::insert_into(crate::schema::payouts::table)
        .values(&new)
        .execute(conn)
    {
        Ok(_) => {
            tracing::info!(
                seller_order_id = %seller_order,
                payout_id = %new.id,
                amount_minor = new.amount_minor,
                "payout created"
            );
        }
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            // Lost a creation race: the winner's row is the payout.
            tracing::info!(seller_order_id = %seller_order, "payout creation raced, returning existing");
        }
        Err(e) => {
            return Err(SettlementError::Storage(
                anyhow::Error::new(e).context("Failed to insert payout"),
            ));
        }
    }

    Payout::find_by_seller_order(conn, seller_order)?.ok_or_else(|| {
        SettlementError::Storage(anyhow::anyhow!(
            "payout missing after insert for seller order {seller_order}"
        ))
    })
}

/// Advance a payout through its state machine.
///
/// Rejects illegal transitions (anything out of completed, state skipping)
/// with `InvalidTransition`. Entering failed increments `attempts`; the
/// optional `transfer_ref` records the gateway's transfer reference.
pub fn update_payout_status(
    conn: &mut SqliteConnection,
    payout_id: &str,
    next: PayoutStatus,
    transfer_ref: Option<&str>,
) -> Result<Payout> {
    let payout = Payout::find_by_id(conn, payout_id)?
        .ok_or_else(|| SettlementError::PayoutNotFound(payout_id.to_string()))?;

    let current = payout.payout_status();
    if !current.can_transition_to(next) {
        return Err(SettlementError::InvalidTransition {
            from: current.as_str().to_string(),
            to: next.as_str().to_string(),
        });
    }

    let attempts_after = if next == PayoutStatus::Failed {
        payout.attempts + 1
    } else {
        payout.attempts
    };

    let updated = Payout::apply_transition(conn, payout_id, next, transfer_ref, attempts_after)?;
    tracing::info!(
        payout_id = %payout_id,
        from = current.as_str(),
        to = next.as_str(),
        attempts = updated.attempts,
        "payout status updated"
    );
    Ok(updated)
}
