//! Inventory ledger tests: the availability bounds and the clamping rules
//! on reserve, release, and administrative quantity edits.

use chrono::Utc;
use librarius::db;
use librarius::domain::LifecycleError;
use librarius::models::book;
use librarius::services::inventory_service;
use sea_orm::{DatabaseConnection, EntityTrait, Set};

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

async fn create_test_book(
    db: &DatabaseConnection,
    isbn: &str,
    quantity: i32,
    available: i32,
    is_digital: bool,
) -> i32 {
    let now = Utc::now().to_rfc3339();
    let book = book::ActiveModel {
        title: Set("Ledger Book".to_string()),
        author: Set("Test Author".to_string()),
        isbn: Set(isbn.to_string()),
        genre: Set("Fiction".to_string()),
        publication_year: Set(2020),
        quantity: Set(quantity),
        available_copies: Set(available),
        is_digital: Set(is_digital),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = book::Entity::insert(book)
        .exec(db)
        .await
        .expect("Failed to create book");
    res.last_insert_id
}

async fn get_book(db: &DatabaseConnection, id: i32) -> book::Model {
    book::Entity::find_by_id(id)
        .one(db)
        .await
        .expect("query failed")
        .expect("book not found")
}

#[tokio::test]
async fn test_reserve_decrements_until_out_of_stock() {
    let db = setup_test_db().await;
    let id = create_test_book(&db, "9781111111101", 2, 2, false).await;

    inventory_service::reserve_copy(&db, id).await.unwrap();
    inventory_service::reserve_copy(&db, id).await.unwrap();
    assert_eq!(get_book(&db, id).await.available_copies, 0);

    let err = inventory_service::reserve_copy(&db, id)
        .await
        .expect_err("reserve at zero should fail");
    assert!(matches!(err, LifecycleError::OutOfStock));

    // Never negative
    assert_eq!(get_book(&db, id).await.available_copies, 0);
}

#[tokio::test]
async fn test_reserve_fails_for_digital_and_missing_books() {
    let db = setup_test_db().await;
    let digital = create_test_book(&db, "9781111111102", 1, 1, true).await;

    let err = inventory_service::reserve_copy(&db, digital)
        .await
        .expect_err("digital reserve should fail");
    assert!(matches!(err, LifecycleError::OutOfStock));
    assert_eq!(get_book(&db, digital).await.available_copies, 1);

    let err = inventory_service::reserve_copy(&db, 9999)
        .await
        .expect_err("missing book reserve should fail");
    assert!(matches!(err, LifecycleError::OutOfStock));
}

#[tokio::test]
async fn test_release_clamps_at_total() {
    let db = setup_test_db().await;
    let id = create_test_book(&db, "9781111111103", 2, 1, false).await;

    inventory_service::release_copy(&db, id).await.unwrap();
    assert_eq!(get_book(&db, id).await.available_copies, 2);

    // A double release does not push past the total
    inventory_service::release_copy(&db, id).await.unwrap();
    assert_eq!(get_book(&db, id).await.available_copies, 2);
}

#[tokio::test]
async fn test_adjust_quantity_grows_available_by_delta() {
    let db = setup_test_db().await;
    let id = create_test_book(&db, "9781111111104", 3, 3, false).await;

    let updated = inventory_service::adjust_quantity(&db, id, 5)
        .await
        .expect("adjust failed");
    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.available_copies, 5);
}

#[tokio::test]
async fn test_adjust_quantity_shrink_floors_available_at_zero() {
    let db = setup_test_db().await;
    // 2 of 3 copies out on loan
    let id = create_test_book(&db, "9781111111105", 3, 1, false).await;

    let updated = inventory_service::adjust_quantity(&db, id, 2)
        .await
        .expect("adjust failed");
    assert_eq!(updated.quantity, 2);
    assert_eq!(updated.available_copies, 0);

    // Shrinking below the outstanding loans still floors at zero
    let updated = inventory_service::adjust_quantity(&db, id, 1)
        .await
        .expect("adjust failed");
    assert_eq!(updated.quantity, 1);
    assert_eq!(updated.available_copies, 0);
}

#[tokio::test]
async fn test_adjust_quantity_never_exceeds_new_total() {
    let db = setup_test_db().await;
    let id = create_test_book(&db, "9781111111106", 4, 4, false).await;

    let updated = inventory_service::adjust_quantity(&db, id, 2)
        .await
        .expect("adjust failed");
    assert_eq!(updated.quantity, 2);
    assert_eq!(updated.available_copies, 2);
}

#[tokio::test]
async fn test_adjust_quantity_validation() {
    let db = setup_test_db().await;
    let id = create_test_book(&db, "9781111111107", 1, 1, false).await;

    let err = inventory_service::adjust_quantity(&db, id, 0)
        .await
        .expect_err("zero quantity should fail");
    assert!(matches!(err, LifecycleError::InvalidRequest(_)));

    let err = inventory_service::adjust_quantity(&db, 9999, 2)
        .await
        .expect_err("missing book should fail");
    assert!(matches!(err, LifecycleError::NotFound));
}
