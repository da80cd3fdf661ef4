//! Webhook idempotency ledger service.
//!
//! Deduplicates inbound payment-provider events by (provider, event_id) so
//! a retried callback cannot trigger its side effect twice. The caller runs
//! the downstream payout update only when `already_processed` is false.

use anyhow::Result;
use diesel::prelude::*;

use crate::models::webhook_event::{InsertOutcome, NewWebhookEvent, WebhookEvent};

/// Result of recording an inbound event.
#[derive(Debug, Clone)]
pub struct WebhookReceipt {
    pub event: WebhookEvent,
    /// True if this (provider, event_id) pair was seen before; the caller
    /// must not re-run the associated side effect.
    pub already_processed: bool,
}

/// Record an inbound provider event exactly once.
///
/// The lookup is an optimization; correctness comes from the unique index
/// on (provider, event_id). A delivery that loses the insert race is
/// reported as already processed, never as an error.
pub fn record_webhook_event(
    conn: &mut SqliteConnection,
    provider: &str,
    event_id: &str,
    payload: &str,
    signature: Option<&str>,
) -> Result<WebhookReceipt> {
    if let Some(existing) = WebhookEvent::find_by_provider_event(conn, provider, event_id)? {
        tracing::warn!(provider = %provider, event_id = %event_id, "duplicate webhook delivery ignored");
        return Ok(WebhookReceipt {
            event: existing,
            already_processed: true,
        });
    }

    let new = NewWebhookEvent::new(provider, event_id, payload, signature);
    let outcome = WebhookEvent::insert(conn, &new)?;

    let event = WebhookEvent::find_by_provider_event(conn, provider, event_id)?
        .ok_or_else(|| anyhow::anyhow!("webhook event missing after insert: {provider}/{event_id}"))?;

    match outcome {
        InsertOutcome::Recorded => {
            tracing::info!(provider = %provider, event_id = %event_id, "webhook event recorded");
            Ok(WebhookReceipt {
                event,
                already_processed: false,
            })
        }
        InsertOutcome::AlreadyProcessed => {
            tracing::warn!(provider = %provider, event_id = %event_id, "webhook insert raced, treating as duplicate");
            Ok(WebhookReceipt {
                event,
                already_processed: true,
            })
        }
    }
}
