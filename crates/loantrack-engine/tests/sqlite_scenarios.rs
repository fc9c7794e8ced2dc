//! Scan scenarios against a real (in-memory) SQLite database.

use std::sync::Arc;

use chrono::Utc;
use loantrack_core::{Product, ScanOutcome, SortOrder};
use loantrack_db::{Database, DbConfig};
use loantrack_engine::{DashboardSession, LoanEngine, SqliteStore, StoreError};

async fn engine() -> LoanEngine<SqliteStore> {
    let db = Database::new(DbConfig::in_memory()).await.unwrap();
    LoanEngine::new(SqliteStore::new(db))
}

fn db(engine: &LoanEngine<SqliteStore>) -> &Database {
    engine.store().database()
}

#[tokio::test]
async fn empty_scan_reports_no_code() {
    let engine = engine().await;
    let outcome = engine.process_scan("", "u-1").await.unwrap();
    assert_eq!(outcome.message(), "no code supplied");
}

#[tokio::test]
async fn unknown_barcode_reports_no_match() {
    let engine = engine().await;
    db(&engine).products().create("Drill", "A1").await.unwrap();

    let outcome = engine.process_scan("XYZ999", "u-1").await.unwrap();
    assert_eq!(outcome.message(), "no match: XYZ999");
    assert_eq!(db(&engine).loans().count_open().await.unwrap(), 0);
}

#[tokio::test]
async fn user_badge_is_echoed_without_mutation() {
    let engine = engine().await;

    let outcome = engine.process_scan("U12345", "u-1").await.unwrap();
    assert_eq!(
        outcome,
        ScanOutcome::UserScanned {
            code: "U12345".to_string()
        }
    );
    assert_eq!(db(&engine).loans().count_open().await.unwrap(), 0);
}

#[tokio::test]
async fn scan_checks_out_then_returns() {
    let engine = engine().await;
    let drill = db(&engine).products().create("Cordless Drill", "A1").await.unwrap();

    let first = engine.process_scan("A1", "u-1").await.unwrap();
    assert_eq!(first.message(), "checked out: Cordless Drill");
    let stored = db(&engine).products().get_by_id(&drill.id).await.unwrap().unwrap();
    assert!(!stored.available);
    assert_eq!(db(&engine).loans().count_open().await.unwrap(), 1);

    let second = engine.process_scan("A1", "u-1").await.unwrap();
    assert_eq!(second.message(), "returned: Cordless Drill");
    let stored = db(&engine).products().get_by_id(&drill.id).await.unwrap().unwrap();
    assert!(stored.available);
    assert_eq!(db(&engine).loans().count_open().await.unwrap(), 0);

    let history = db(&engine).loans().history_for_product(&drill.id).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history[0].returned);
}

#[tokio::test]
async fn stale_product_without_loan_is_left_alone() {
    let engine = engine().await;
    let now = Utc::now();
    db(&engine)
        .products()
        .insert(&Product {
            id: "p-stale".to_string(),
            name: "Projector".to_string(),
            barcode: "P1".to_string(),
            available: false,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();

    let outcome = engine.process_scan("P1", "u-1").await.unwrap();

    assert_eq!(outcome.message(), "no active loan found: Projector");
    let stored = db(&engine).products().get_by_id("p-stale").await.unwrap().unwrap();
    assert!(!stored.available);
}

#[tokio::test]
async fn many_scans_never_open_two_loans() {
    let engine = engine().await;
    let drill = db(&engine).products().create("Drill", "A1").await.unwrap();
    let ladder = db(&engine).products().create("Ladder", "L1").await.unwrap();

    for code in ["A1", "L1", "A1", "A1", "L1", "XYZ", "A1", "U7", "L1"] {
        engine.process_scan(code, "u-1").await.unwrap();

        for product in [&drill, &ladder] {
            let open = db(&engine)
                .loans()
                .history_for_product(&product.id)
                .await
                .unwrap()
                .into_iter()
                .filter(|l| l.is_open())
                .count();
            assert!(open <= 1);

            let stored = db(&engine).products().get_by_id(&product.id).await.unwrap().unwrap();
            assert_eq!(stored.available, open == 0);
        }
    }
}

#[tokio::test]
async fn session_tracks_open_loans_with_sort() {
    let engine = Arc::new(engine().await);
    db(&engine).products().create("Drill", "A1").await.unwrap();
    db(&engine).products().create("Ladder", "L1").await.unwrap();
    let session = DashboardSession::new(engine.clone());

    session.scan("A1", "u-1").await.unwrap();
    session.scan("L1", "u-1").await.unwrap();

    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.product_count(), 2);
    assert_eq!(snapshot.open_loans.len(), 2);
    assert!(snapshot
        .open_loans
        .windows(2)
        .all(|w| w[0].loan_date >= w[1].loan_date));

    session.set_sort(SortOrder::Oldest).await;
    let snapshot = session.snapshot().await;
    assert!(snapshot
        .open_loans
        .windows(2)
        .all(|w| w[0].loan_date <= w[1].loan_date));
}

#[tokio::test]
async fn closed_database_surfaces_unavailable() {
    let engine = engine().await;
    db(&engine).close().await;

    let err = engine.process_scan("A1", "u-1").await.unwrap_err();
    assert!(matches!(err, StoreError::Unavailable(_)));
}
