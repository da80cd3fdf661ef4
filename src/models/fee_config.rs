//! Versioned fee policy model.
//!
//! Configs are append-only: a new policy is created, then activated, which
//! deactivates every previous policy inside one transaction. Old configs are
//! never deleted because fee snapshots reference them by id for audit.

use anyhow::{Context, Result};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::fee_configs;

/// Who bears the platform commission for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeModel {
    BuyerPaysCommission,
    SellerPaysCommission,
}

impl FeeModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuyerPaysCommission => "buyer_pays_commission",
            Self::SellerPaysCommission => "seller_pays_commission",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "buyer_pays_commission" => Self::BuyerPaysCommission,
            _ => Self::SellerPaysCommission,
        }
    }
}

/// Match rule restricting which cart items a config applies to.
///
/// Evaluated by `matches`, never by free-form key lookup, so an unknown or
/// missing field cannot silently bypass the filter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppliesTo {
    /// Eligible species (e.g. "cattle", "sheep"). None = all species.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub species: Option<Vec<String>>,
    /// When true, the config only applies to export orders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_only: Option<bool>,
}

impl AppliesTo {
    /// Check whether a cart item with the given species/export flag is
    /// eligible under this rule.
    pub fn matches(&self, species: Option<&str>, export: bool) -> bool {
        if let Some(eligible) = &self.species {
            match species {
                Some(s) if eligible.iter().any(|e| e == s) => {}
                _ => return false,
            }
        }
        if self.export_only == Some(true) && !export {
            return false;
        }
        true
    }
}

/// Fee config database model
#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Identifiable)]
#[diesel(table_name = fee_configs)]
pub struct FeeConfig {
    pub id: String,
    pub name: String,
    pub model: String,
    pub platform_commission_pct: f64,
    pub seller_payout_fee_pct: f64,
    pub buyer_processing_fee_pct: f64,
    pub escrow_service_fee_minor: i64,
    /// JSON-encoded `AppliesTo`, None = applies to everything
    pub applies_to: Option<String>,
    pub is_active: i32,
    pub effective_from: String,
    pub effective_to: Option<String>,
    pub created_at: String,
}

/// New fee config for insertion
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = fee_configs)]
pub struct NewFeeConfig {
    pub id: String,
    pub name: String,
    pub model: String,
    pub platform_commission_pct: f64,
    pub seller_payout_fee_pct: f64,
    pub buyer_processing_fee_pct: f64,
    pub escrow_service_fee_minor: i64,
    pub applies_to: Option<String>,
    pub is_active: i32,
    pub effective_from: String,
    pub effective_to: Option<String>,
    pub created_at: String,
}

impl NewFeeConfig {
    /// Build a new, initially inactive config effective immediately.
    pub fn new(
        name: &str,
        model: FeeModel,
        platform_commission_pct: f64,
        seller_payout_fee_pct: f64,
        buyer_processing_fee_pct: f64,
        escrow_service_fee_minor: i64,
        applies_to: Option<&AppliesTo>,
    ) -> Result<Self> {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
        let applies_to = applies_to
            .map(serde_json::to_string)
            .transpose()
            .context("Failed to serialize applies_to rule")?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            model: model.as_str().to_string(),
            platform_commission_pct,
            seller_payout_fee_pct,
            buyer_processing_fee_pct,
            escrow_service_fee_minor,
            applies_to,
            is_active: 0,
            effective_from: now.clone(),
            effective_to: None,
            created_at: now,
        })
    }
}

impl FeeConfig {
    pub fn fee_model(&self) -> FeeModel {
        FeeModel::from_str(&self.model)
    }

    /// Decode the applies_to rule. A missing or unreadable rule is treated
    /// as "applies to everything" so a bad row cannot block checkout.
    pub fn applies_to_rule(&self) -> AppliesTo {
        match &self.applies_to {
            Some(json) => serde_json::from_str(json).unwrap_or_else(|e| {
                tracing::warn!(config_id = %self.id, error = %e, "unreadable applies_to rule, treating as match-all");
                AppliesTo::default()
            }),
            None => AppliesTo::default(),
        }
    }

    /// Create a new config row (insert only, never updates).
    pub fn create(conn: &mut SqliteConnection, new: NewFeeConfig) -> Result<Self> {
        let config_id = new.id.clone();
        diesel::insert_into(fee_configs::table)
            .values(&new)
            .execute(conn)
            .context("Failed to insert fee config")?;
        fee_configs::table
            .find(config_id)
            .first(conn)
            .context("Failed to retrieve created fee config")
    }

    /// Find config by ID
    pub fn find_by_id(conn: &mut SqliteConnection, config_id: &str) -> Result<Option<Self>> {
        fee_configs::table
            .find(config_id)
            .first::<FeeConfig>(conn)
            .optional()
            .context("Failed to query fee config by id")
    }

    /// Find the single active config whose validity window contains `now`.
    ///
    /// `now` is a UTC timestamp in the stored text format; the window
    /// comparison is lexicographic, which is correct for that format.
    pub fn find_active(conn: &mut SqliteConnection, now: &str) -> Result<Option<Self>> {
        use crate::schema::fee_configs::dsl::*;

        let result = fee_configs
            .filter(is_active.eq(1))
            .filter(effective_from.le(now))
            .filter(effective_to.is_null().or(effective_to.gt(now)))
            .first::<FeeConfig>(conn)
            .optional()
            .context("Failed to query active fee config")?;

        Ok(result)
    }

    /// List all configs, newest first (admin view).
    pub fn list(conn: &mut SqliteConnection) -> Result<Vec<Self>> {
        fee_configs::table
            .order(fee_configs::created_at.desc())
            .load(conn)
            .context("Failed to list fee configs")
    }

    /// Atomically deactivate every active config and activate the named one.
    ///
    /// Runs inside a single transaction: SQLite serializes writers, so two
    /// concurrent activations cannot both leave their target active. Returns
    /// false if the named config does not exist (nothing is changed).
    pub fn activate(conn: &mut SqliteConnection, config_id: &str) -> Result<bool> {
        use crate::schema::fee_configs::dsl::*;

        conn.transaction::<bool, anyhow::Error, _>(|conn| {
            let exists = fee_configs
                .find(config_id)
                .first::<FeeConfig>(conn)
                .optional()
                .context("Failed to look up fee config for activation")?
                .is_some();
            if !exists {
                return Ok(false);
            }

            diesel::update(fee_configs.filter(is_active.eq(1)))
                .set(is_active.eq(0))
                .execute(conn)
                .context("Failed to deactivate fee configs")?;

            diesel::update(fee_configs.find(config_id))
                .set(is_active.eq(1))
                .execute(conn)
                .context("Failed to activate fee config")?;

            Ok(true)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fee_model_round_trip() {
        assert_eq!(FeeModel::BuyerPaysCommission.as_str(), "buyer_pays_commission");
        assert_eq!(FeeModel::SellerPaysCommission.as_str(), "seller_pays_commission");
        assert_eq!(
            FeeModel::from_str("buyer_pays_commission"),
            FeeModel::BuyerPaysCommission
        );
        assert_eq!(
            FeeModel::from_str("seller_pays_commission"),
            FeeModel::SellerPaysCommission
        );
    }

    #[test]
    fn test_applies_to_match_all() {
        let rule = AppliesTo::default();
        assert!(rule.matches(None, false));
        assert!(rule.matches(Some("cattle"), true));
    }

    #[test]
    fn test_applies_to_species_filter() {
        let rule = AppliesTo {
            species: Some(vec!["cattle".to_string(), "sheep".to_string()]),
            export_only: None,
        };
        assert!(rule.matches(Some("cattle"), false));
        assert!(rule.matches(Some("sheep"), true));
        assert!(!rule.matches(Some("goats"), false));
        // No species on the item cannot satisfy a species-restricted rule
        assert!(!rule.matches(None, false));
    }

    #[test]
    fn test_applies_to_export_only() {
        let rule = AppliesTo {
            species: None,
            export_only: Some(true),
        };
        assert!(rule.matches(Some("cattle"), true));
        assert!(!rule.matches(Some("cattle"), false));

        // export_only = false is not a restriction
        let rule = AppliesTo {
            species: None,
            export_only: Some(false),
        };
        assert!(rule.matches(None, false));
    }
}
