//! Database-backed reservation tests
//!
//! These exercise the locked adjustment path directly against Postgres.
//! They need DATABASE_URL pointing at a migrated database. Run with:
//! cargo test -- --ignored

use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use lendhub_server::error::AppError;
use lendhub_server::models::inventory::{Channel, Direction, ItemInventory};
use lendhub_server::repository::inventory::InventoryRepository;

async fn connect() -> Pool<Postgres> {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
    let pool = PgPoolOptions::new()
        .max_connections(15)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    pool
}

async fn seed(repo: &InventoryRepository, physical: i32, digital: i32) -> Uuid {
    let item_ref = Uuid::new_v4();
    repo.create(&ItemInventory::new(item_ref, physical, digital))
        .await
        .expect("Failed to seed inventory");
    item_ref
}

#[tokio::test]
#[ignore]
async fn concurrent_reservations_admit_exactly_the_stock() {
    let pool = connect().await;
    let repo = InventoryRepository::new(pool);

    let stock = 5;
    let attempts = 12;
    let item_ref = seed(&repo, stock, 0).await;

    let mut handles = Vec::new();
    for i in 0..attempts {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.apply_adjustment(
                item_ref,
                Channel::Physical,
                Direction::Outbound,
                1,
                &format!("loan-{}", i),
            )
            .await
        }));
    }

    let mut accepted = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.expect("adjustment task panicked") {
            Ok(_) => accepted += 1,
            Err(AppError::CapacityExceeded(_)) => rejected += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(accepted, stock);
    assert_eq!(rejected as i32, attempts - stock);

    let inventory = repo
        .get_by_item_ref(item_ref)
        .await
        .unwrap()
        .expect("inventory vanished");
    assert_eq!(inventory.physical_available, 0);

    // One ledger row per accepted adjustment, and replaying them lands
    // exactly on the stored counter
    let movements = repo.movements(inventory.id).await.unwrap();
    assert_eq!(movements.len(), stock as usize);
    assert_eq!(
        ItemInventory::reconstruct_available(stock, Channel::Physical, &movements),
        inventory.physical_available
    );
}

#[tokio::test]
#[ignore]
async fn rejected_adjustment_leaves_no_trace() {
    let pool = connect().await;
    let repo = InventoryRepository::new(pool);
    let item_ref = seed(&repo, 1, 0).await;

    let err = repo
        .apply_adjustment(item_ref, Channel::Physical, Direction::Outbound, 2, "too-many")
        .await
        .expect_err("overdraw should be rejected");
    assert!(matches!(err, AppError::CapacityExceeded(_)));

    let inventory = repo.get_by_item_ref(item_ref).await.unwrap().unwrap();
    assert_eq!(inventory.physical_available, 1);
    assert!(repo.movements(inventory.id).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore]
async fn repeated_reference_applies_once() {
    let pool = connect().await;
    let repo = InventoryRepository::new(pool);
    let item_ref = seed(&repo, 4, 0).await;

    let first = repo
        .apply_adjustment(item_ref, Channel::Physical, Direction::Outbound, 1, "retry")
        .await
        .unwrap();
    let second = repo
        .apply_adjustment(item_ref, Channel::Physical, Direction::Outbound, 1, "retry")
        .await
        .unwrap();

    assert_eq!(first.physical_available, 3);
    assert_eq!(second.physical_available, 3);

    let movements = repo.movements(first.id).await.unwrap();
    assert_eq!(movements.len(), 1);
}

#[tokio::test]
#[ignore]
async fn same_reference_allows_both_directions() {
    // A loan reserves and later releases under one reference; the
    // idempotency key includes the direction so the pair coexists.
    let pool = connect().await;
    let repo = InventoryRepository::new(pool);
    let item_ref = seed(&repo, 2, 0).await;

    repo.apply_adjustment(item_ref, Channel::Physical, Direction::Outbound, 1, "loan-a")
        .await
        .unwrap();
    let after_release = repo
        .apply_adjustment(item_ref, Channel::Physical, Direction::Inbound, 1, "loan-a")
        .await
        .unwrap();

    assert_eq!(after_release.physical_available, 2);
    assert_eq!(repo.movements(after_release.id).await.unwrap().len(), 2);
}

#[tokio::test]
#[ignore]
async fn release_into_a_full_pool_is_rejected() {
    let pool = connect().await;
    let repo = InventoryRepository::new(pool);
    let item_ref = seed(&repo, 2, 0).await;

    let err = repo
        .apply_adjustment(item_ref, Channel::Physical, Direction::Inbound, 1, "phantom")
        .await
        .expect_err("inbound past total should be rejected");
    assert!(matches!(err, AppError::CapacityExceeded(_)));
}

#[tokio::test]
#[ignore]
async fn channels_are_independent_pools() {
    let pool = connect().await;
    let repo = InventoryRepository::new(pool);
    let item_ref = seed(&repo, 1, 3).await;

    repo.apply_adjustment(item_ref, Channel::Physical, Direction::Outbound, 1, "phys")
        .await
        .unwrap();

    // Physical exhausted, digital untouched
    let err = repo
        .apply_adjustment(item_ref, Channel::Physical, Direction::Outbound, 1, "phys-2")
        .await
        .expect_err("physical pool is empty");
    assert!(matches!(err, AppError::CapacityExceeded(_)));

    let after_digital = repo
        .apply_adjustment(item_ref, Channel::Digital, Direction::Outbound, 2, "dig")
        .await
        .unwrap();
    assert_eq!(after_digital.digital_available, 1);
    assert_eq!(after_digital.physical_available, 0);
}
