//! Order accrual against a mocked Postgres connection.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{DatabaseBackend, MockDatabase};
use uuid::Uuid;

use folio_core::rebate::{RateResolver, RebateError};
use folio_db::RebateRepository;
use folio_db::entities::{
    order_items, orders, partner_rebates, rebate_rates, royalties,
    sea_orm_active_enums::RoyaltyType, works,
};
use folio_shared::types::OrderId;

struct Fixture {
    order: orders::Model,
    item: order_items::Model,
    work: works::Model,
}

fn fixture(status: &str) -> Fixture {
    let order_id = Uuid::now_v7();
    let work_id = Uuid::now_v7();
    Fixture {
        order: orders::Model {
            id: order_id,
            partner_id: Some(Uuid::now_v7()),
            status: status.to_string(),
            total: 10_000,
            created_at: Utc::now().into(),
        },
        item: order_items::Model {
            id: Uuid::now_v7(),
            order_id,
            work_id,
            quantity: 2,
            price: 5000,
        },
        work: works::Model {
            id: work_id,
            title: "L'Aventure ambiguë".to_string(),
            isbn: Some("978-2-264-02365-2".to_string()),
            price: 5000,
            stock: 50,
            status: "PUBLISHED".to_string(),
            author_id: Some(Uuid::now_v7()),
            royalty_rate: dec!(10),
            royalty_type: RoyaltyType::Percentage,
            created_at: Utc::now().into(),
        },
    }
}

fn stored_rebate(f: &Fixture, amount: i64) -> partner_rebates::Model {
    partner_rebates::Model {
        id: Uuid::now_v7(),
        partner_id: f.order.partner_id.unwrap_or_default(),
        order_id: Some(f.order.id),
        work_id: Some(f.work.id),
        amount,
        rate: dec!(10),
        status: "ACCRUED".to_string(),
        validated_at: None,
        paid_at: None,
        created_at: Utc::now().into(),
    }
}

fn stored_royalty(f: &Fixture, amount: i64) -> royalties::Model {
    royalties::Model {
        id: Uuid::now_v7(),
        user_id: f.work.author_id.unwrap_or_default(),
        work_id: f.work.id,
        order_id: Some(f.order.id),
        amount,
        rate: dec!(10),
        approved: false,
        approved_at: None,
        approved_by: None,
        paid: false,
        paid_at: None,
        paid_by: None,
        created_at: Utc::now().into(),
    }
}

fn resolver() -> RateResolver {
    RateResolver::new(dec!(10), dec!(15))
}

#[tokio::test]
async fn test_validated_order_creates_rebate_and_royalty() {
    let f = fixture("VALIDATED");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![f.order.clone()]])
        .append_query_results([vec![f.item.clone()]])
        .append_query_results([vec![f.work.clone()]])
        .append_query_results([Vec::<partner_rebates::Model>::new()])
        .append_query_results([Vec::<royalties::Model>::new()])
        .append_query_results([Vec::<rebate_rates::Model>::new()])
        .append_query_results([vec![stored_rebate(&f, 1000)]])
        .append_query_results([vec![stored_royalty(&f, 1000)]])
        .into_connection();

    let result = RebateRepository::new(Arc::new(db))
        .accrue_order(OrderId::from_uuid(f.order.id), &resolver())
        .await
        .unwrap();

    assert_eq!(result.rebates.len(), 1);
    assert_eq!(result.rebates[0].amount, 1000);
    assert_eq!(result.royalties.len(), 1);
    assert_eq!(result.royalties[0].user_id, f.work.author_id.unwrap());
}

#[tokio::test]
async fn test_second_accrual_creates_nothing() {
    let f = fixture("DELIVERED");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![f.order.clone()]])
        .append_query_results([vec![f.item.clone()]])
        .append_query_results([vec![f.work.clone()]])
        .append_query_results([vec![stored_rebate(&f, 1000)]])
        .append_query_results([vec![stored_royalty(&f, 1000)]])
        .append_query_results([Vec::<rebate_rates::Model>::new()])
        .into_connection();

    let result = RebateRepository::new(Arc::new(db))
        .accrue_order(OrderId::from_uuid(f.order.id), &resolver())
        .await
        .unwrap();

    assert!(result.rebates.is_empty());
    assert!(result.royalties.is_empty());
}

#[tokio::test]
async fn test_unvalidated_order_refused() {
    let f = fixture("PENDING");
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![f.order.clone()]])
        .append_query_results([vec![f.item.clone()]])
        .append_query_results([vec![f.work.clone()]])
        .append_query_results([Vec::<partner_rebates::Model>::new()])
        .append_query_results([Vec::<royalties::Model>::new()])
        .append_query_results([Vec::<rebate_rates::Model>::new()])
        .into_connection();

    let err = RebateRepository::new(Arc::new(db))
        .accrue_order(OrderId::from_uuid(f.order.id), &resolver())
        .await
        .unwrap_err();

    assert!(matches!(err, RebateError::OrderNotEligible(status) if status == "PENDING"));
}

#[tokio::test]
async fn test_configured_work_rate_applies() {
    let f = fixture("SHIPPED");
    let rate = rebate_rates::Model {
        id: Uuid::now_v7(),
        rate_type: folio_db::entities::sea_orm_active_enums::RebateRateType::Work,
        work_id: Some(f.work.id),
        user_id: None,
        partner_id: None,
        rate: dec!(20),
        is_active: true,
        start_date: None,
        end_date: None,
        created_at: Utc::now().into(),
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![f.order.clone()]])
        .append_query_results([vec![f.item.clone()]])
        .append_query_results([vec![f.work.clone()]])
        .append_query_results([Vec::<partner_rebates::Model>::new()])
        .append_query_results([vec![stored_royalty(&f, 1000)]])
        .append_query_results([vec![rate]])
        .append_query_results([vec![stored_rebate(&f, 2000)]])
        .into_connection();

    let result = RebateRepository::new(Arc::new(db))
        .accrue_order(OrderId::from_uuid(f.order.id), &resolver())
        .await
        .unwrap();

    assert_eq!(result.rebates.len(), 1);
    assert_eq!(result.rebates[0].amount, 2000);
    assert!(result.royalties.is_empty());
    assert_ne!(result.rebates[0].rate, Decimal::ZERO);
}
