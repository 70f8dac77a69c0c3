//! POS checkout against a real database.
//!
//! Skipped unless `TOKOKU_DATABASE_URL` (or `DATABASE_URL`) points at a
//! Postgres the tests may migrate and write to.

use rand::Rng;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use tokoku_core::{Cart, PaymentMethod, Product, ProductInput, Rupiah, UserId};
use tokoku_web::db::{ProductRepository, TransactionRepository};
use tokoku_web::services::{AuthService, ChangeHub, CheckoutError, CheckoutRequest, CheckoutService};

async fn database() -> Option<PgPool> {
    let Ok(url) = std::env::var("TOKOKU_DATABASE_URL").or_else(|_| std::env::var("DATABASE_URL"))
    else {
        eprintln!("no database configured, skipping");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(4)
        .connect(&url)
        .await
        .expect("connect");
    sqlx::migrate!("../web/migrations")
        .run(&pool)
        .await
        .expect("migrate");
    Some(pool)
}

async fn shop_owner(pool: &PgPool) -> UserId {
    let email = format!("kasir-{}@warungsari.id", rand::rng().random::<u64>());
    AuthService::new(pool)
        .register_with_password(&email, "Sari", "rahasia-sekali")
        .await
        .expect("register")
        .id
}

async fn stocked(pool: &PgPool, user_id: UserId, name: &str, price: i64, stock: i32) -> Product {
    ProductRepository::new(pool)
        .create(
            user_id,
            &ProductInput {
                name: name.to_owned(),
                category: "Minuman".to_owned(),
                price: Rupiah::from_whole(price),
                stock,
                image_url: None,
            },
        )
        .await
        .expect("create product")
}

async fn stock_of(pool: &PgPool, user_id: UserId, product: &Product) -> i32 {
    ProductRepository::new(pool)
        .get(user_id, product.id)
        .await
        .expect("get product")
        .expect("product exists")
        .stock
}

#[tokio::test]
async fn test_insufficient_stock_rolls_back_every_line() {
    let Some(pool) = database().await else {
        return;
    };
    let user_id = shop_owner(&pool).await;
    let tea = stocked(&pool, user_id, "Es Teh", 5_000, 10).await;
    let coffee = stocked(&pool, user_id, "Kopi Susu", 18_000, 1).await;

    let mut cart = Cart::new();
    cart.add(&tea, 3).expect("add");
    cart.add(&coffee, 2).expect("add");

    let hub = ChangeHub::new();
    let result = CheckoutService::new(&pool, &hub)
        .checkout(user_id, &cart, CheckoutRequest::default())
        .await;

    match result {
        Err(CheckoutError::InsufficientStock { product }) => assert_eq!(product, "Kopi Susu"),
        other => panic!("expected insufficient stock, got {other:?}"),
    }
    assert_eq!(stock_of(&pool, user_id, &tea).await, 10);
    assert_eq!(stock_of(&pool, user_id, &coffee).await, 1);
    let sales = TransactionRepository::new(&pool)
        .list(user_id)
        .await
        .expect("list sales");
    assert!(sales.is_empty());
}

#[tokio::test]
async fn test_resubmitted_checkout_is_recorded_once() {
    let Some(pool) = database().await else {
        return;
    };
    let user_id = shop_owner(&pool).await;
    let tea = stocked(&pool, user_id, "Es Teh", 5_000, 10).await;

    let mut cart = Cart::new();
    cart.add(&tea, 4).expect("add");

    let request = CheckoutRequest {
        payment_method: PaymentMethod::Qris,
        customer_name: Some("Budi".to_owned()),
        idempotency_key: Some(Uuid::new_v4()),
    };
    let hub = ChangeHub::new();
    let checkout = CheckoutService::new(&pool, &hub);

    let first = checkout
        .checkout(user_id, &cart, request.clone())
        .await
        .expect("first checkout");
    let replay = checkout
        .checkout(user_id, &cart, request)
        .await
        .expect("replayed checkout");

    assert_eq!(replay.id, first.id);
    assert_eq!(first.total, Rupiah::from_whole(20_000));
    assert_eq!(stock_of(&pool, user_id, &tea).await, 6);
    let sales = TransactionRepository::new(&pool)
        .list(user_id)
        .await
        .expect("list sales");
    assert_eq!(sales.len(), 1);
}
