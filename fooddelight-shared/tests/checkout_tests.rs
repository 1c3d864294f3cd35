/// Integration tests for order placement
///
/// Most tests run against their own in-memory SQLite database; concurrency is
/// exercised on a file database with a multi-connection pool.

use fooddelight_shared::auth::credentials::register;
use fooddelight_shared::checkout::{place_order, OrderError};
use fooddelight_shared::db::{
    migrations::run_migrations,
    pool::{create_pool, DatabaseConfig},
};
use fooddelight_shared::models::order::{Order, OrderItem};
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

async fn pool_with_user() -> (SqlitePool, Uuid) {
    let pool = create_pool(DatabaseConfig::in_memory())
        .await
        .expect("Failed to create in-memory pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    let user_id = register(&pool, "eater@example.com", "pw1").await.unwrap();
    (pool, user_id)
}

async fn file_pool_with_user(dir: &TempDir) -> (SqlitePool, Uuid) {
    let config = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("orders.db").display()),
        ..DatabaseConfig::default()
    };
    let pool = create_pool(config).await.expect("Failed to create file pool");
    run_migrations(&pool).await.expect("Failed to run migrations");
    let user_id = register(&pool, "eater@example.com", "pw1").await.unwrap();
    (pool, user_id)
}

fn pizza() -> OrderItem {
    OrderItem {
        image: Some("https://cdn.example.com/pizza.png".to_string()),
        title: "Pizza".to_string(),
        price: 9.99,
        quantity: 2,
    }
}

#[tokio::test]
async fn test_place_order_persists_one_row() {
    let (pool, user_id) = pool_with_user().await;

    let placed = place_order(&pool, user_id, vec![pizza()], 19.98).await.unwrap();

    assert_eq!(placed.owner_email, "eater@example.com");
    assert_eq!(placed.order.user_id, user_id);
    assert_eq!(Order::count(&pool).await.unwrap(), 1);

    let stored = Order::find_by_id(&pool, placed.order.id).await.unwrap().unwrap();
    assert_eq!(stored.items(), &[pizza()]);
    assert_eq!(stored.total, 19.98);
}

#[tokio::test]
async fn test_items_round_trip_exactly() {
    let (pool, user_id) = pool_with_user().await;
    let items = vec![
        pizza(),
        OrderItem {
            image: None,
            title: "Crème brûlée \u{1F36E}".to_string(),
            price: 0.35,
            quantity: 3,
        },
        OrderItem {
            image: Some(String::new()),
            title: "Soda, \"large\"".to_string(),
            price: 1.25,
            quantity: 1,
        },
    ];

    let placed = place_order(&pool, user_id, items.clone(), 22.13).await.unwrap();
    let stored = Order::find_by_id(&pool, placed.order.id).await.unwrap().unwrap();

    assert_eq!(stored.items(), items.as_slice());
}

#[tokio::test]
async fn test_mismatched_total_is_stored_as_submitted() {
    let (pool, user_id) = pool_with_user().await;

    let placed = place_order(&pool, user_id, vec![pizza()], 5.0).await.unwrap();
    let stored = Order::find_by_id(&pool, placed.order.id).await.unwrap().unwrap();

    assert_eq!(stored.total, 5.0);
}

#[tokio::test]
async fn test_empty_cart_persists_nothing() {
    let (pool, user_id) = pool_with_user().await;

    let result = place_order(&pool, user_id, vec![], 0.0).await;

    assert!(matches!(result, Err(OrderError::EmptyCart)));
    assert_eq!(Order::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_invalid_total_persists_nothing() {
    let (pool, user_id) = pool_with_user().await;

    let result = place_order(&pool, user_id, vec![pizza()], -1.0).await;

    assert!(matches!(result, Err(OrderError::InvalidTotal)));
    assert_eq!(Order::count(&pool).await.unwrap(), 0);
}

#[tokio::test]
async fn test_missing_owner_persists_nothing() {
    let (pool, _) = pool_with_user().await;
    let ghost = Uuid::new_v4();

    let result = place_order(&pool, ghost, vec![pizza()], 19.98).await;

    assert!(matches!(result, Err(OrderError::OwnerMissing(id)) if id == ghost));
    assert_eq!(Order::count(&pool).await.unwrap(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_orders_on_file_database_all_stored() {
    let dir = tempfile::tempdir().unwrap();
    let (pool, user_id) = file_pool_with_user(&dir).await;

    let handles: Vec<_> = (0..40)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move { place_order(&pool, user_id, vec![pizza()], 19.98).await })
        })
        .collect();

    for handle in handles {
        let placed = handle.await.unwrap().expect("concurrent order failed");
        assert_eq!(placed.owner_email, "eater@example.com");
    }

    assert_eq!(Order::count(&pool).await.unwrap(), 40);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_missing_owner_on_file_database_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (pool, _) = file_pool_with_user(&dir).await;
    let ghost = Uuid::new_v4();

    let result = place_order(&pool, ghost, vec![pizza()], 19.98).await;

    assert!(matches!(result, Err(OrderError::OwnerMissing(id)) if id == ghost));
    assert_eq!(Order::count(&pool).await.unwrap(), 0);
}
