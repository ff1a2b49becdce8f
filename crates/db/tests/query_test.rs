//! Record listing: filters, time windows, pagination and order lookups.

mod common;

use chrono::{TimeDelta, Utc};
use memberlink_core::ledger::{
    BalanceChangeType, FlowDirection, LedgerError, PointsChangeType, RecordFilter,
};
use memberlink_db::BalanceLedgerService;
use memberlink_db::entities::{balance_records, sea_orm_active_enums::Status};
use memberlink_shared::{PageRequest, TenantId, UserId};
use rstest::rstest;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use common::{balance_service, points_service, seed_account, setup_db, tenant};

/// Posts a fixed mix of balance mutations; the final balance is 1_350.
async fn post_history(service: &BalanceLedgerService, tenant_id: &TenantId, user: UserId) {
    let steps: [(i64, &str, &str); 6] = [
        (1_000, "recharge", "ORD-1"),
        (-200, "consume", "ORD-2"),
        (300, "refund", "ORD-2"),
        (-100, "deduct", ""),
        (250, "reward", ""),
        (100, "recharge", "ORD-3"),
    ];
    for (amount, kind, order_no) in steps {
        service
            .change_balance(tenant_id, user, amount, kind, "", order_no)
            .await
            .unwrap();
    }
}

async fn seeded() -> (DatabaseConnection, TenantId, UserId) {
    let db = setup_db().await;
    let acme = tenant("acme");
    let user = UserId::new(1);
    seed_account(&db, &acme, user, 0, 0).await;
    post_history(&balance_service(&db), &acme, user).await;
    (db, acme, user)
}

#[tokio::test]
async fn test_lists_newest_first() {
    let (db, acme, user) = seeded().await;

    let (records, total) = balance_service(&db)
        .records(&acme, user, &RecordFilter::new())
        .await
        .unwrap();

    assert_eq!(total, 6);
    let amounts: Vec<i64> = records.iter().map(|r| r.amount).collect();
    assert_eq!(amounts, vec![100, 250, -100, 300, -200, 1_000]);
    assert!(
        records
            .windows(2)
            .all(|pair| pair[0].created_at >= pair[1].created_at)
    );
}

#[rstest]
#[case(BalanceChangeType::Recharge, 2)]
#[case(BalanceChangeType::Consume, 1)]
#[case(BalanceChangeType::Refund, 1)]
#[case(BalanceChangeType::Deduct, 1)]
#[case(BalanceChangeType::Reward, 1)]
#[tokio::test]
async fn test_filter_by_type(#[case] kind: BalanceChangeType, #[case] expected: u64) {
    let (db, acme, user) = seeded().await;

    let filter = RecordFilter::new().with_change_type(kind);
    let (records, total) = balance_service(&db)
        .records(&acme, user, &filter)
        .await
        .unwrap();

    assert_eq!(total, expected);
    assert!(records.iter().all(|r| r.kind() == kind));
}

#[tokio::test]
async fn test_filter_by_direction() {
    let (db, acme, user) = seeded().await;
    let service = balance_service(&db);

    let income = RecordFilter::new().with_direction(FlowDirection::Income);
    let (records, total) = service.records(&acme, user, &income).await.unwrap();
    assert_eq!(total, 4);
    assert!(records.iter().all(balance_records::Model::is_income));

    let expense = RecordFilter::new().with_direction(FlowDirection::Expense);
    let (records, total) = service.records(&acme, user, &expense).await.unwrap();
    assert_eq!(total, 2);
    assert!(records.iter().all(balance_records::Model::is_expense));

    // Contradictory type and direction match nothing.
    let contradiction = RecordFilter::new()
        .with_change_type(BalanceChangeType::Recharge)
        .with_direction(FlowDirection::Expense);
    let (records, total) = service.records(&acme, user, &contradiction).await.unwrap();
    assert!(records.is_empty());
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_time_window() {
    let (db, acme, user) = seeded().await;
    let service = balance_service(&db);
    let now = Utc::now();

    let around_now = RecordFilter::new()
        .between(Some(now - TimeDelta::hours(1)), Some(now + TimeDelta::hours(1)))
        .unwrap();
    let (_, total) = service.records(&acme, user, &around_now).await.unwrap();
    assert_eq!(total, 6);

    let future = RecordFilter::new()
        .between(Some(now + TimeDelta::hours(1)), None)
        .unwrap();
    let (_, total) = service.records(&acme, user, &future).await.unwrap();
    assert_eq!(total, 0);

    let past = RecordFilter::new()
        .between(None, Some(now - TimeDelta::hours(1)))
        .unwrap();
    let (_, total) = service.records(&acme, user, &past).await.unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_parsed_filter_matches_typed_filter() {
    let (db, acme, user) = seeded().await;
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let filter = RecordFilter::<BalanceChangeType>::parse(
        Some("recharge"),
        Some(&today),
        Some(&today),
        PageRequest::default(),
    )
    .unwrap();
    let (records, total) = balance_service(&db)
        .records(&acme, user, &filter)
        .await
        .unwrap();

    // Date-only bounds cover the whole day.
    assert_eq!(total, 2);
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_filter_parsing_errors() {
    let err = RecordFilter::<BalanceChangeType>::parse(
        Some("obtain"),
        None,
        None,
        PageRequest::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidMutationType { .. }));

    let err = RecordFilter::<PointsChangeType>::parse(
        None,
        Some("2026-10-18"),
        Some("2026-10-17"),
        PageRequest::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTimeRange));

    let err = RecordFilter::<PointsChangeType>::parse(
        None,
        Some("last tuesday"),
        None,
        PageRequest::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidTimeFormat(_)));
}

#[tokio::test]
async fn test_pagination() {
    let (db, acme, user) = seeded().await;
    let service = balance_service(&db);

    let mut seen = Vec::new();
    for page in 1..=3 {
        let filter = RecordFilter::new().with_page(PageRequest::new(page, 4));
        let response = service.records_page(&acme, user, &filter).await.unwrap();

        assert_eq!(response.meta.total, 6);
        assert_eq!(response.meta.total_pages, 2);
        assert_eq!(response.meta.page, page);
        assert_eq!(response.meta.per_page, 4);
        match page {
            1 => assert_eq!(response.data.len(), 4),
            2 => assert_eq!(response.data.len(), 2),
            _ => assert!(response.data.is_empty()),
        }
        seen.extend(response.data.into_iter().map(|r| r.id));
    }

    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), 6);
}

#[tokio::test]
async fn test_out_of_range_page_is_normalized() {
    let (db, acme, user) = seeded().await;

    let filter = RecordFilter::new().with_page(PageRequest {
        page: 0,
        per_page: 1_000,
    });
    let response = balance_service(&db)
        .records_page(&acme, user, &filter)
        .await
        .unwrap();

    assert_eq!(response.meta.page, 1);
    assert_eq!(response.meta.per_page, 100);
    assert_eq!(response.data.len(), 6);
}

#[tokio::test]
async fn test_reads_are_repeatable() {
    let (db, acme, user) = seeded().await;
    let service = balance_service(&db);
    let filter = RecordFilter::new().with_page(PageRequest::new(1, 3));

    let first = service.records(&acme, user, &filter).await.unwrap();
    let second = service.records(&acme, user, &filter).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_inactive_records_are_hidden() {
    let (db, acme, user) = seeded().await;
    let service = balance_service(&db);

    let (records, _) = service.records(&acme, user, &RecordFilter::new()).await.unwrap();
    let newest = records[0].clone();
    let mut hidden: balance_records::ActiveModel = newest.into();
    hidden.status = Set(Status::Deleted);
    hidden.update(&db).await.unwrap();

    let (records, total) = service.records(&acme, user, &RecordFilter::new()).await.unwrap();
    assert_eq!(total, 5);
    assert_eq!(records[0].amount, 250);

    // The row itself is still stored.
    let stored = balance_records::Entity::find().all(&db).await.unwrap();
    assert_eq!(stored.len(), 6);
}

#[tokio::test]
async fn test_lookup_by_order_no() {
    let (db, acme, _) = seeded().await;
    let service = balance_service(&db);

    let records = service.records_by_order_no(&acme, "ORD-2").await.unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].amount, -200);
    assert_eq!(records[1].amount, 300);

    assert!(service.records_by_order_no(&acme, "ORD-404").await.unwrap().is_empty());
    assert!(
        service
            .records_by_order_no(&tenant("other"), "ORD-1")
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_points_listing_and_order_lookup() {
    let db = setup_db().await;
    let acme = tenant("acme");
    let user = UserId::new(3);
    seed_account(&db, &acme, user, 0, 0).await;
    let service = points_service(&db);

    service
        .change_points(&acme, user, 500, "obtain", "", "PTS-1", 30)
        .await
        .unwrap();
    service
        .change_points(&acme, user, -120, "use", "", "PTS-2", 0)
        .await
        .unwrap();
    service
        .change_points(&acme, user, -30, "deduct", "", "", 0)
        .await
        .unwrap();

    let expense = RecordFilter::new().with_direction(FlowDirection::Expense);
    let (records, total) = service.records(&acme, user, &expense).await.unwrap();
    assert_eq!(total, 2);
    assert_eq!(records[0].kind(), PointsChangeType::Deduct);

    let page = service
        .records_page(&acme, user, &RecordFilter::new())
        .await
        .unwrap();
    assert_eq!(page.meta.total, 3);
    assert_eq!(page.data[0].points_after, 350);

    let by_order = service.records_by_order_no(&acme, "PTS-1").await.unwrap();
    assert_eq!(by_order.len(), 1);
    assert!(by_order[0].expire_time.is_some());
}

#[tokio::test]
async fn test_unknown_account_lists_nothing() {
    let (db, acme, _) = seeded().await;

    let (records, total) = balance_service(&db)
        .records(&acme, UserId::new(999), &RecordFilter::new())
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(total, 0);
}
