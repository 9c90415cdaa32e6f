//! API integration tests
//!
//! These run against a live server (`cargo run`) with its database and
//! Redis, plus the catalog and identity collaborators for the lending
//! flow tests. Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080/api/v1";

async fn create_inventory(client: &Client, physical: i32, digital: i32) -> Uuid {
    let item_ref = Uuid::new_v4();
    let response = client
        .post(format!("{}/inventory", BASE_URL))
        .json(&json!({
            "item_ref": item_ref,
            "physical_total": physical,
            "digital_total": digital
        }))
        .send()
        .await
        .expect("Failed to create inventory");
    assert_eq!(response.status(), 201);
    item_ref
}

async fn reserve(client: &Client, item_ref: Uuid, reference: &str) -> reqwest::Response {
    client
        .post(format!("{}/inventory/{}/reserve", BASE_URL, item_ref))
        .json(&json!({
            "channel": "physical",
            "quantity": 1,
            "reference": reference
        }))
        .send()
        .await
        .expect("Failed to send reserve request")
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness_check_reports_ready_with_database_up() {
    let client = Client::new();

    let response = client
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
#[ignore]
async fn test_create_inventory_rejects_duplicates() {
    let client = Client::new();
    let item_ref = create_inventory(&client, 3, 1).await;

    let response = client
        .post(format!("{}/inventory", BASE_URL))
        .json(&json!({
            "item_ref": item_ref,
            "physical_total": 3,
            "digital_total": 1
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_create_inventory_rejects_negative_totals() {
    let client = Client::new();

    let response = client
        .post(format!("{}/inventory", BASE_URL))
        .json(&json!({
            "item_ref": Uuid::new_v4(),
            "physical_total": -1,
            "digital_total": 0
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_reserve_decrements_until_capacity_exceeded() {
    let client = Client::new();
    let item_ref = create_inventory(&client, 5, 0).await;

    let response = reserve(&client, item_ref, "loan-0").await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["physical_available"], 4);

    for i in 1..5 {
        let response = reserve(&client, item_ref, &format!("loan-{}", i)).await;
        assert_eq!(response.status(), 200);
    }

    // Pool exhausted: the sixth reservation fails, state untouched
    let response = reserve(&client, item_ref, "loan-5").await;
    assert_eq!(response.status(), 409);

    let state: Value = client
        .get(format!("{}/inventory/{}", BASE_URL, item_ref))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["physical_available"], 0);

    // Exactly one ledger row per accepted call, none for the rejection
    let movements: Value = client
        .get(format!("{}/inventory/{}/movements", BASE_URL, item_ref))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(movements.as_array().unwrap().len(), 5);
}

#[tokio::test]
#[ignore]
async fn test_release_restores_availability() {
    let client = Client::new();
    let item_ref = create_inventory(&client, 2, 0).await;

    let response = reserve(&client, item_ref, "loan-rt").await;
    assert_eq!(response.status(), 200);

    let response = client
        .post(format!("{}/inventory/{}/release", BASE_URL, item_ref))
        .json(&json!({
            "channel": "physical",
            "quantity": 1,
            "reference": "loan-rt"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["physical_available"], 2);
}

#[tokio::test]
#[ignore]
async fn test_release_beyond_total_is_rejected() {
    let client = Client::new();
    let item_ref = create_inventory(&client, 2, 0).await;

    let response = client
        .post(format!("{}/inventory/{}/release", BASE_URL, item_ref))
        .json(&json!({
            "channel": "physical",
            "quantity": 1,
            "reference": "phantom-return"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_zero_quantity_is_rejected_before_any_state_read() {
    let client = Client::new();
    let item_ref = create_inventory(&client, 2, 0).await;

    let response = client
        .post(format!("{}/inventory/{}/reserve", BASE_URL, item_ref))
        .json(&json!({
            "channel": "physical",
            "quantity": 0,
            "reference": "nothing"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_shrinking_totals_caps_availability() {
    let client = Client::new();
    let item_ref = create_inventory(&client, 5, 0).await;

    let response = client
        .put(format!("{}/inventory/{}", BASE_URL, item_ref))
        .json(&json!({
            "physical_total": 2,
            "digital_total": 0
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["physical_total"], 2);
    assert_eq!(body["physical_available"], 2);
}

#[tokio::test]
#[ignore]
async fn test_retried_reservation_is_a_no_op() {
    let client = Client::new();
    let item_ref = create_inventory(&client, 3, 0).await;

    let first: Value = reserve(&client, item_ref, "retry-me").await.json().await.unwrap();
    let second: Value = reserve(&client, item_ref, "retry-me").await.json().await.unwrap();

    assert_eq!(first["physical_available"], 2);
    assert_eq!(second["physical_available"], 2);

    let movements: Value = client
        .get(format!("{}/inventory/{}/movements", BASE_URL, item_ref))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(movements.as_array().unwrap().len(), 1);
}

#[tokio::test]
#[ignore]
async fn test_concurrent_reservations_never_overdraw() {
    let client = Client::new();
    let stock = 3usize;
    let attempts = 10usize;
    let item_ref = create_inventory(&client, stock as i32, 0).await;

    let mut handles = Vec::new();
    for i in 0..attempts {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            reserve(&client, item_ref, &format!("concurrent-{}", i))
                .await
                .status()
                .as_u16()
        }));
    }

    let mut successes = 0;
    let mut capacity_errors = 0;
    for handle in handles {
        match handle.await.expect("reserve task panicked") {
            200 => successes += 1,
            409 => capacity_errors += 1,
            other => panic!("unexpected status {}", other),
        }
    }

    assert_eq!(successes, stock);
    assert_eq!(capacity_errors, attempts - stock);

    let state: Value = client
        .get(format!("{}/inventory/{}", BASE_URL, item_ref))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(state["physical_available"], 0);
}

// The lending flow tests below additionally require the catalog and
// identity collaborators, with LENDHUB_TEST_BORROWER pointing at an
// active, debt-free account and LENDHUB_TEST_ITEM at a catalog item.

fn test_borrower() -> Uuid {
    std::env::var("LENDHUB_TEST_BORROWER")
        .expect("LENDHUB_TEST_BORROWER not set")
        .parse()
        .expect("LENDHUB_TEST_BORROWER is not a UUID")
}

fn test_item() -> Uuid {
    std::env::var("LENDHUB_TEST_ITEM")
        .expect("LENDHUB_TEST_ITEM not set")
        .parse()
        .expect("LENDHUB_TEST_ITEM is not a UUID")
}

#[tokio::test]
#[ignore]
async fn test_borrow_then_double_return() {
    let client = Client::new();
    let item_ref = test_item();

    let response = client
        .post(format!("{}/inventory", BASE_URL))
        .json(&json!({
            "item_ref": item_ref,
            "physical_total": 2,
            "digital_total": 0
        }))
        .send()
        .await
        .unwrap();
    // The item may already carry inventory from a previous run
    assert!(response.status() == 201 || response.status() == 409);

    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .json(&json!({
            "borrower_id": test_borrower(),
            "item_ref": item_ref,
            "channel": "physical"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let borrowing: Value = response.json().await.unwrap();
    let borrowing_id = borrowing["id"].as_str().unwrap().to_string();

    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let outcome: Value = response.json().await.unwrap();
    assert_eq!(outcome["borrowing"]["returned"], true);
    // Returned within the loan period: no fee
    assert!(outcome["late_fee"].is_null());

    // Terminal state: a second return is rejected and creates nothing
    let response = client
        .post(format!("{}/borrowings/{}/return", BASE_URL, borrowing_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    let response = client
        .get(format!("{}/fees/borrowing/{}", BASE_URL, borrowing_id))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_borrow_unknown_borrower_is_not_found() {
    let client = Client::new();
    let item_ref = test_item();

    let response = client
        .post(format!("{}/borrowings", BASE_URL))
        .json(&json!({
            "borrower_id": Uuid::new_v4(),
            "item_ref": item_ref,
            "channel": "physical"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
