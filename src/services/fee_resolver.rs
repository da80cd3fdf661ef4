//! Fee config resolution service.
//!
//! Resolves the fee config for a cart item, supporting:
//! - A stored, currently-active config (fee_configs table) matched against
//!   the item's species/export flag
//! - Hard-coded platform defaults when nothing active applies
//!
//! Checkout must never hard-fail because of missing configuration, so every
//! miss (no active config, expired window, applies_to mismatch) falls back
//! to the defaults from `config::fee`.

use anyhow::{Context, Result};
use diesel::prelude::*;

use crate::config::fee::{
    get_default_buyer_processing_fee_pct, get_default_escrow_fee_minor,
    get_default_platform_commission_pct, get_default_seller_payout_fee_pct,
};
use crate::models::fee_config::{FeeConfig, FeeModel, NewFeeConfig};

/// Well-known id of the hard-coded fallback config. Snapshots written under
/// this id reference no fee_configs row.
pub const DEFAULT_CONFIG_ID: &str = "default";

/// Resolved fee configuration for one cart item.
#[derive(Debug, Clone)]
pub struct ResolvedFeeConfig {
    pub config: FeeConfig,
    /// Source of the fee config
    pub source: FeeSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeSource {
    /// An active row from the fee_configs table
    Stored,
    /// Hard-coded platform defaults
    Default,
}

/// The hard-coded fallback config: seller pays 10% commission, 2.5% payout
/// fee, 1.5% buyer processing fee, flat escrow fee. Applies to everything.
pub fn default_config() -> FeeConfig {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    FeeConfig {
        id: DEFAULT_CONFIG_ID.to_string(),
        name: "Platform default".to_string(),
        model: FeeModel::SellerPaysCommission.as_str().to_string(),
        platform_commission_pct: get_default_platform_commission_pct(),
        seller_payout_fee_pct: get_default_seller_payout_fee_pct(),
        buyer_processing_fee_pct: get_default_buyer_processing_fee_pct(),
        escrow_service_fee_minor: get_default_escrow_fee_minor(),
        applies_to: None,
        is_active: 1,
        effective_from: now.clone(),
        effective_to: None,
        created_at: now,
    }
}

/// Resolve the fee config for a cart item.
///
/// Priority:
/// 1. The single active config whose validity window contains now, if its
///    applies_to rule matches the item's species/export flag.
/// 2. Otherwise, the hard-coded platform defaults.
pub fn resolve_active_config(
    conn: &mut SqliteConnection,
    species: Option<&str>,
    export: bool,
) -> Result<ResolvedFeeConfig> {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();

    if let Some(config) =
        FeeConfig::find_active(conn, &now).context("Failed to resolve active fee config")?
    {
        if config.applies_to_rule().matches(species, export) {
            return Ok(ResolvedFeeConfig {
                config,
                source: FeeSource::Stored,
            });
        }
        tracing::debug!(
            config_id = %config.id,
            species = ?species,
            export = export,
            "active fee config does not apply to item, using defaults"
        );
    } else {
        tracing::warn!("no active fee config, using platform defaults");
    }

    Ok(ResolvedFeeConfig {
        config: default_config(),
        source: FeeSource::Default,
    })
}

/// Insert a new fee config (initially inactive unless activated afterwards).
pub fn create_config(conn: &mut SqliteConnection, new: NewFeeConfig) -> Result<FeeConfig> {
    let config = FeeConfig::create(conn, new)?;
    tracing::info!(config_id = %config.id, name = %config.name, "fee config created");
    Ok(config)
}

/// Activate the named config, deactivating every other one atomically.
/// Returns false if the config does not exist.
pub fn activate_config(conn: &mut SqliteConnection, config_id: &str) -> Result<bool> {
    let activated = FeeConfig::activate(conn, config_id)?;
    if activated {
        tracing::info!(config_id = %config_id, "fee config activated");
    } else {
        tracing::warn!(config_id = %config_id, "fee config activation failed: not found");
    }
    Ok(activated)
}
