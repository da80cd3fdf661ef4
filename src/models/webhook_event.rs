//! Webhook dedup ledger.
//!
//! One row per payment-provider event, keyed by (provider, event_id).
//! Rows are never updated or deleted; they are kept for dispute resolution.

use anyhow::{Context, Result};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::webhook_events;

/// Outcome of attempting to record an inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// First sighting: the caller should run the downstream side effect.
    Recorded,
    /// Duplicate delivery: the side effect already ran (or is running).
    AlreadyProcessed,
}

/// Webhook event database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = webhook_events)]
pub struct WebhookEvent {
    pub id: String,
    pub provider: String,
    pub event_id: String,
    pub payload: String,
    pub signature: Option<String>,
    pub received_at: String,
}

/// New webhook event for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = webhook_events)]
pub struct NewWebhookEvent {
    pub id: String,
    pub provider: String,
    pub event_id: String,
    pub payload: String,
    pub signature: Option<String>,
    pub received_at: String,
}

impl NewWebhookEvent {
    pub fn new(provider: &str, event_id: &str, payload: &str, signature: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            provider: provider.to_string(),
            event_id: event_id.to_string(),
            payload: payload.to_string(),
            signature: signature.map(|s| s.to_string()),
            received_at: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string(),
        }
    }
}

impl WebhookEvent {
    /// Insert an event record, mapping the unique-index violation on
    /// (provider, event_id) to `AlreadyProcessed`.
    ///
    /// Two near-simultaneous deliveries can both miss the lookup; the losing
    /// writer of the insert race lands here and must treat the violation as
    /// a duplicate, not an error.
    pub fn insert(conn: &mut SqliteConnection, new: &NewWebhookEvent) -> Result<InsertOutcome> {
        match diesel::insert_into(webhook_events::table)
            .values(new)
            .execute(conn)
        {
            Ok(_) => Ok(InsertOutcome::Recorded),
            Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
                Ok(InsertOutcome::AlreadyProcessed)
            }
            Err(e) => Err(e).context("Failed to insert webhook event"),
        }
    }

    /// Find an event by its provider-scoped id
    pub fn find_by_provider_event(
        conn: &mut SqliteConnection,
        provider_name: &str,
        event: &str,
    ) -> Result<Option<Self>> {
        webhook_events::table
            .filter(webhook_events::provider.eq(provider_name))
            .filter(webhook_events::event_id.eq(event))
            .first::<WebhookEvent>(conn)
            .optional()
            .context("Failed to query webhook event")
    }
}
