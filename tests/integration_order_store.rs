//! Order Store Integration Tests
//!
//! Require a PostgreSQL database at DATABASE_URL:
//! `cargo test -- --ignored --test-threads=1`

use rust_decimal_macros::dec;
use uuid::Uuid;

use shop_orders::catalog::{PgProductCatalog, Product, ProductLookup};
use shop_orders::domain::{NewOrderLine, OrderQuery, OrderSortColumn, OrderStatus};
use shop_orders::store::{OrderStore, PgOrderStore, StoreError};

mod common;

async fn seeded() -> (PgOrderStore, Product, Product) {
    let pool = common::setup_test_db().await;
    let product_a = Product::new("P-A", "Product A", dec!(10.0)).with_description("first");
    let product_b = Product::new("P-B", "Product B", dec!(5.0));
    common::seed_product(&pool, &product_a).await;
    common::seed_product(&pool, &product_b).await;
    (PgOrderStore::new(pool), product_a, product_b)
}

fn lines(a: &Product, b: &Product) -> Vec<NewOrderLine> {
    vec![
        NewOrderLine::priced(a.id, 2, a.price),
        NewOrderLine::priced(b.id, 1, b.price),
    ]
}

#[tokio::test]
#[ignore]
async fn test_create_and_load_order() {
    let (store, a, b) = seeded().await;
    let user_id = Uuid::new_v4();

    let created = store.create_order(user_id, lines(&a, &b)).await.unwrap();
    assert_eq!(created.status, OrderStatus::New);
    assert_eq!(created.version, 1);
    assert_eq!(created.total_price, dec!(25.0));
    assert_eq!(created.lines.len(), 2);

    let loaded = store.get_order_by_id(created.id, true).await.unwrap();
    assert_eq!(loaded.code, created.code);
    assert_eq!(loaded.lines.len(), 2);
    assert_eq!(loaded.lines[0].product_id, a.id);
    assert_eq!(loaded.lines[0].price, dec!(20.0));
    assert_eq!(
        loaded.lines[0].product.as_ref().map(|p| p.description.as_str()),
        Some("first")
    );

    let bare = store.get_order_by_id(created.id, false).await.unwrap();
    assert!(bare.lines.is_empty());
}

#[tokio::test]
#[ignore]
async fn test_failed_line_rolls_back_order() {
    let (store, a, _) = seeded().await;
    let user_id = Uuid::new_v4();

    // Unknown product violates the foreign key on the last line
    let err = store
        .create_order(
            user_id,
            vec![
                NewOrderLine::priced(a.id, 1, a.price),
                NewOrderLine::priced(Uuid::new_v4(), 1, dec!(1.0)),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Database(_)));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);

    let line_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_lines")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(line_count, 0);
}

#[tokio::test]
#[ignore]
async fn test_get_missing_order() {
    let (store, _, _) = seeded().await;
    let err = store.get_order_by_id(Uuid::new_v4(), true).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore]
async fn test_list_filters_and_paginates() {
    let (store, a, b) = seeded().await;
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();

    let mut placed = Vec::new();
    for _ in 0..3 {
        placed.push(store.create_order(alice, lines(&a, &b)).await.unwrap());
    }
    store.create_order(bob, lines(&a, &b)).await.unwrap();

    let (orders, page) = store
        .get_my_orders(alice, &OrderQuery::new().page(1, 2))
        .await
        .unwrap();
    assert_eq!(page.total, 3);
    assert_eq!(page.total_page, 2);
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o.user_id == alice && o.lines.len() == 2));

    let (orders, page) = store
        .get_my_orders(alice, &OrderQuery::new().page(2, 2))
        .await
        .unwrap();
    assert_eq!(page.current_page, 2);
    assert_eq!(page.skip, 2);
    assert_eq!(orders.len(), 1);

    let (orders, _) = store
        .get_my_orders(alice, &OrderQuery::new().with_code(placed[1].code.clone()))
        .await
        .unwrap();
    assert!(orders.iter().any(|o| o.id == placed[1].id));

    let (orders, _) = store
        .get_my_orders(bob, &OrderQuery::new().with_code(placed[1].code.clone()))
        .await
        .unwrap();
    assert!(orders.is_empty());

    let (orders, _) = store
        .get_my_orders(
            alice,
            &OrderQuery::new().ordered_by(OrderSortColumn::CreatedAt, true),
        )
        .await
        .unwrap();
    assert!(orders.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
#[ignore]
async fn test_update_status_with_version_check() {
    let (store, a, b) = seeded().await;
    let created = store
        .create_order(Uuid::new_v4(), lines(&a, &b))
        .await
        .unwrap();

    let mut first = store.get_order_by_id(created.id, false).await.unwrap();
    let mut stale = first.clone();

    first.cancel().unwrap();
    store.update_order(&mut first).await.unwrap();
    assert_eq!(first.version, 2);

    let reloaded = store.get_order_by_id(created.id, false).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Cancelled);

    stale.status = OrderStatus::InProgress;
    let err = store.update_order(&mut stale).await.unwrap_err();
    assert!(err.is_conflict());

    let reloaded = store.get_order_by_id(created.id, false).await.unwrap();
    assert_eq!(reloaded.status, OrderStatus::Cancelled);
}

#[tokio::test]
#[ignore]
async fn test_product_catalog_lookup() {
    let pool = common::setup_test_db().await;
    let product = Product::new("P-X", "Product X", dec!(7.5));
    common::seed_product(&pool, &product).await;

    let catalog = PgProductCatalog::new(pool);
    let found = catalog.get_product_by_id(product.id).await.unwrap();
    assert_eq!(found.name, "Product X");
    assert_eq!(found.price, dec!(7.5));

    let err = catalog.get_product_by_id(Uuid::new_v4()).await.unwrap_err();
    assert!(err.is_not_found());
}
