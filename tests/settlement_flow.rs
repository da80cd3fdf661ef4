//! End-to-end settlement flow over a pooled on-disk database:
//! config activation, checkout preview, finalization, payout lifecycle and
//! webhook deduplication, including the duplicate-delivery race.

use chrono::{Duration, Utc};
use tempfile::TempDir;

use marketplace_settlement::db::{
    create_pool, db_create_payout, db_finalize_order_fees, db_preview_checkout,
    db_record_webhook_event, db_revenue_summary, run_migrations, DbPool,
};
use marketplace_settlement::error::SettlementError;
use marketplace_settlement::models::fee_config::{FeeModel, NewFeeConfig};
use marketplace_settlement::models::{FeeConfig, PayoutResponse, PayoutStatus};
use marketplace_settlement::services::checkout::CartItem;
use marketplace_settlement::services::fee_resolver::{activate_config, create_config};
use marketplace_settlement::services::payout::update_payout_status;

fn test_pool(dir: &TempDir) -> DbPool {
    let db_path = dir.path().join("settlement.db");
    let pool = create_pool(db_path.to_str().unwrap()).unwrap();
    let mut conn = pool.get().unwrap();
    run_migrations(&mut conn).unwrap();
    pool
}

fn cart() -> Vec<CartItem> {
    vec![
        CartItem {
            seller_id: "seller-1".to_string(),
            merch_subtotal_minor: 100_000,
            delivery_minor: 5_000,
            abattoir_minor: 0,
            species: Some("cattle".to_string()),
            export: false,
        },
        CartItem {
            seller_id: "seller-2".to_string(),
            merch_subtotal_minor: 40_000,
            delivery_minor: 2_000,
            abattoir_minor: 1_500,
            species: Some("sheep".to_string()),
            export: false,
        },
    ]
}

fn activated_config(pool: &DbPool) -> FeeConfig {
    let mut conn = pool.get().unwrap();
    let config = create_config(
        &mut conn,
        NewFeeConfig::new(
            "Standard marketplace",
            FeeModel::SellerPaysCommission,
            10.0,
            2.5,
            1.5,
            2_500,
            None,
        )
        .unwrap(),
    )
    .unwrap();
    assert!(activate_config(&mut conn, &config.id).unwrap());
    config
}

#[tokio::test(flavor = "multi_thread")]
async fn preview_then_finalize_matches() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir);
    let config = activated_config(&pool);

    let preview = db_preview_checkout(&pool, cart()).await.unwrap();
    assert_eq!(preview.fee_config_id.as_deref(), Some(config.id.as_str()));
    assert_eq!(preview.currency, "ZAR");
    assert_eq!(preview.per_seller.len(), 2);

    let snapshots = db_finalize_order_fees(&pool, "og-100".to_string(), cart(), config.id.clone())
        .await
        .unwrap();
    assert_eq!(snapshots.len(), 2);

    // Finalization recomputes exactly what the preview showed
    for (snap, line) in snapshots.iter().zip(preview.per_seller.iter()) {
        assert_eq!(snap.seller_id, line.seller_id);
        assert_eq!(snap.buyer_total_minor, line.fees.buyer_total_minor);
        assert_eq!(snap.seller_net_payout_minor, line.fees.seller_net_payout_minor);
    }
    let total: i64 = snapshots.iter().map(|s| s.buyer_total_minor).sum();
    assert_eq!(total, preview.cart_totals.buyer_grand_total_minor);
}

#[tokio::test(flavor = "multi_thread")]
async fn snapshot_survives_config_changes() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir);
    let config = activated_config(&pool);

    let first = db_finalize_order_fees(&pool, "og-100".to_string(), cart(), config.id.clone())
        .await
        .unwrap();

    // Activate a pricier policy after the order was placed
    {
        let mut conn = pool.get().unwrap();
        let pricier = create_config(
            &mut conn,
            NewFeeConfig::new("Pricier", FeeModel::BuyerPaysCommission, 25.0, 5.0, 3.0, 9_900, None)
                .unwrap(),
        )
        .unwrap();
        assert!(activate_config(&mut conn, &pricier.id).unwrap());
    }

    // Re-finalizing returns the original snapshot bit for bit
    let second = db_finalize_order_fees(&pool, "og-100".to_string(), cart(), config.id.clone())
        .await
        .unwrap();
    assert_eq!(first, second);

    // And the payout is funded from the frozen snapshot, not the new config
    let payout = db_create_payout(&pool, "og-100:seller-1".to_string())
        .await
        .unwrap();
    assert_eq!(payout.amount_minor, 87_500);
}

#[tokio::test(flavor = "multi_thread")]
async fn payout_lifecycle_with_webhooks() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir);
    let config = activated_config(&pool);

    db_finalize_order_fees(&pool, "og-100".to_string(), cart(), config.id.clone())
        .await
        .unwrap();

    let payout = db_create_payout(&pool, "og-100:seller-1".to_string())
        .await
        .unwrap();
    assert_eq!(payout.status, "pending");

    // Duplicate creation requests return the same payout
    let again = db_create_payout(&pool, "og-100:seller-1".to_string())
        .await
        .unwrap();
    assert_eq!(payout.id, again.id);

    // Gateway picks the payout up, then confirms via webhook
    let mut conn = pool.get().unwrap();
    update_payout_status(&mut conn, &payout.id, PayoutStatus::Processing, None).unwrap();

    let receipt = db_record_webhook_event(
        &pool,
        "paygate".to_string(),
        "evt_555".to_string(),
        r#"{"event":"transfer.completed","transfer_ref":"tr_987"}"#.to_string(),
        Some("sig".to_string()),
    )
    .await
    .unwrap();
    assert!(!receipt.already_processed);

    let completed =
        update_payout_status(&mut conn, &payout.id, PayoutStatus::Completed, Some("tr_987"))
            .unwrap();
    assert_eq!(completed.status, "completed");
    assert_eq!(completed.transfer_ref.as_deref(), Some("tr_987"));

    // Retried delivery of the same event: recorded once, side effect skipped
    let retry = db_record_webhook_event(
        &pool,
        "paygate".to_string(),
        "evt_555".to_string(),
        r#"{"event":"transfer.completed","transfer_ref":"tr_987"}"#.to_string(),
        Some("sig".to_string()),
    )
    .await
    .unwrap();
    assert!(retry.already_processed);

    // Had the caller ignored the flag, the transition would still be refused
    let err = update_payout_status(&mut conn, &payout.id, PayoutStatus::Processing, None)
        .unwrap_err();
    assert!(matches!(err, SettlementError::InvalidTransition { .. }));

    // Seller-facing view carries status, amount and the transfer reference
    let view = PayoutResponse::from(completed);
    assert_eq!(view.status, "completed");
    assert_eq!(view.amount_minor, 87_500);
    assert_eq!(view.transfer_ref.as_deref(), Some("tr_987"));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_duplicate_webhook_deliveries() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            db_record_webhook_event(
                &pool,
                "paygate".to_string(),
                "evt_race".to_string(),
                "{}".to_string(),
                None,
            )
            .await
        }));
    }

    let mut recorded = 0;
    for handle in handles {
        let receipt = handle.await.unwrap().unwrap();
        if !receipt.already_processed {
            recorded += 1;
        }
    }
    // Exactly one delivery wins; every other one reports already-processed
    assert_eq!(recorded, 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_payout_creation() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir);
    let config = activated_config(&pool);

    db_finalize_order_fees(&pool, "og-100".to_string(), cart(), config.id.clone())
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let pool = pool.clone();
        handles.push(tokio::spawn(async move {
            db_create_payout(&pool, "og-100:seller-2".to_string()).await
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.dedup();
    assert_eq!(ids.len(), 1, "every caller must observe the same payout");
}

#[tokio::test(flavor = "multi_thread")]
async fn revenue_summary_over_finalized_orders() {
    let dir = TempDir::new().unwrap();
    let pool = test_pool(&dir);
    let config = activated_config(&pool);

    db_finalize_order_fees(&pool, "og-100".to_string(), cart(), config.id.clone())
        .await
        .unwrap();

    let now = Utc::now();
    let summary = db_revenue_summary(&pool, now - Duration::hours(1), now + Duration::hours(1))
        .await
        .unwrap();

    assert_eq!(summary.by_model.len(), 1);
    let model = &summary.by_model[0];
    assert_eq!(model.model, "seller_pays_commission");
    assert_eq!(model.order_count, 2);
    // 10% of 100_000 + 10% of 40_000
    assert_eq!(model.commission_minor, 14_000);
    // 1.5% of each merch line
    assert_eq!(model.processing_fee_minor, 1_500 + 600);
    // Flat escrow fee per seller line
    assert_eq!(model.escrow_fee_minor, 5_000);
    assert_eq!(
        model.total_revenue_minor,
        model.commission_minor + model.processing_fee_minor + model.escrow_fee_minor
    );
    assert_eq!(summary.total_revenue_minor, model.total_revenue_minor);
}
