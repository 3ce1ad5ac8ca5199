//! End-to-end tests through the HTTP surface: borrow and return with
//! bearer tokens, role gates on catalog management, and the admin
//! quantity-edit path.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use librarius::auth::{create_jwt, hash_password};
use librarius::config::Config;
use librarius::db;
use librarius::infrastructure::AppState;
use librarius::models::user::{self, Role};
use librarius::models::{book, borrowing};
use sea_orm::{DatabaseConnection, EntityTrait, Set};
use tower::util::ServiceExt; // for `oneshot`

// Helper to create a test database
async fn setup_test_db() -> DatabaseConnection {
    db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB")
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        cors_allowed_origins: Vec::new(),
        fine_rate_per_day: 1.0,
    }
}

async fn create_test_user(db: &DatabaseConnection, email: &str, role: Role) -> user::Model {
    let now = Utc::now().to_rfc3339();
    let user = user::ActiveModel {
        name: Set("Api Test".to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password("password").unwrap()),
        role: Set(role),
        borrowed_books: Set("[]".to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let res = user::Entity::insert(user)
        .exec(db)
        .await
        .expect("Failed to create user");
    user::Entity::find_by_id(res.last_insert_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
}

async fn create_test_book(db: &DatabaseConnection, isbn: &str, quantity: i32) -> i32 {
    let now = Utc::now().to_rfc3339();
    let book = book::ActiveModel {
        title: Set("Api Test Book".to_string()),
        author: Set("Test Author".to_string()),
        isbn: Set(isbn.to_string()),
        genre: Set("Fiction".to_string()),
        publication_year: Set(2020),
        quantity: Set(quantity),
        available_copies: Set(quantity),
        is_digital: Set(false),
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

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn app(db: DatabaseConnection) -> Router {
    librarius::api::api_router(AppState::new(db, test_config()))
}

#[tokio::test]
async fn test_borrow_and_return_via_http() {
    let db = setup_test_db().await;
    let user = create_test_user(&db, "borrower@example.com", Role::Student).await;
    let book_id = create_test_book(&db, "9782222222201", 1).await;
    let token = create_jwt(&user).unwrap();

    let app = app(db.clone());

    let due = (Utc::now() + Duration::days(14)).to_rfc3339();
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/borrowings",
            Some(&token),
            Some(serde_json::json!({ "book_id": book_id, "expected_return_date": due })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = json_body(response).await;
    assert_eq!(json["borrowing"]["status"], "borrowed");
    let borrowing_id = json["borrowing"]["id"].as_i64().unwrap();

    let book = book::Entity::find_by_id(book_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(book.available_copies, 0);

    // my-borrowings shows the active record with book details
    let response = app
        .clone()
        .oneshot(request("GET", "/borrowings/my-borrowings", Some(&token), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["borrowings"].as_array().unwrap().len(), 1);
    assert_eq!(json["borrowings"][0]["book_title"], "Api Test Book");

    // Return it
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/borrowings/return/{}", borrowing_id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["borrowing"]["status"], "returned");
    assert_eq!(json["borrowing"]["fine_amount"], 0.0);

    let book = book::Entity::find_by_id(book_id)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(book.available_copies, 1);

    // A second return is rejected
    let response = app
        .oneshot(request(
            "PUT",
            &format!("/borrowings/return/{}", borrowing_id),
            Some(&token),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_borrow_out_of_stock_via_http() {
    let db = setup_test_db().await;
    let alice = create_test_user(&db, "alice@example.com", Role::Student).await;
    let bob = create_test_user(&db, "bob@example.com", Role::Student).await;
    let book_id = create_test_book(&db, "9782222222202", 1).await;

    let app = app(db);
    let due = (Utc::now() + Duration::days(7)).to_rfc3339();
    let payload = serde_json::json!({ "book_id": book_id, "expected_return_date": due });

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/borrowings",
            Some(&create_jwt(&alice).unwrap()),
            Some(payload.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .oneshot(request(
            "POST",
            "/borrowings",
            Some(&create_jwt(&bob).unwrap()),
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(
        json["error"],
        "No copies of this book are currently available"
    );
}

#[tokio::test]
async fn test_return_forbidden_for_non_owner() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "owner@example.com", Role::Student).await;
    let stranger = create_test_user(&db, "stranger@example.com", Role::Student).await;
    let librarian = create_test_user(&db, "staff@example.com", Role::Librarian).await;
    let book_id = create_test_book(&db, "9782222222203", 1).await;

    let app = app(db);
    let due = (Utc::now() + Duration::days(7)).to_rfc3339();

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/borrowings",
            Some(&create_jwt(&owner).unwrap()),
            Some(serde_json::json!({ "book_id": book_id, "expected_return_date": due })),
        ))
        .await
        .unwrap();
    let borrowing_id = json_body(response).await["borrowing"]["id"]
        .as_i64()
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/borrowings/return/{}", borrowing_id),
            Some(&create_jwt(&stranger).unwrap()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Staff can return on the borrower's behalf
    let response = app
        .oneshot(request(
            "PUT",
            &format!("/borrowings/return/{}", borrowing_id),
            Some(&create_jwt(&librarian).unwrap()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_borrowings_listing_is_staff_only() {
    let db = setup_test_db().await;
    let student = create_test_user(&db, "student@example.com", Role::Student).await;
    let librarian = create_test_user(&db, "staff@example.com", Role::Librarian).await;

    let app = app(db);

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/borrowings",
            Some(&create_jwt(&student).unwrap()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(request(
            "GET",
            "/borrowings",
            Some(&create_jwt(&librarian).unwrap()),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_book_creation_role_gate_and_duplicate_isbn() {
    let db = setup_test_db().await;
    let student = create_test_user(&db, "student@example.com", Role::Student).await;
    let librarian = create_test_user(&db, "staff@example.com", Role::Librarian).await;

    let app = app(db);
    let payload = serde_json::json!({
        "title": "New Arrival",
        "author": "Some Author",
        "isbn": "9782222222204",
        "genre": "Fiction",
        "publication_year": 2024,
        "quantity": 3
    });

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/books",
            Some(&create_jwt(&student).unwrap()),
            Some(payload.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/books",
            Some(&create_jwt(&librarian).unwrap()),
            Some(payload.clone()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert_eq!(json["book"]["available_copies"], 3);

    // Same ISBN again
    let response = app
        .oneshot(request(
            "POST",
            "/books",
            Some(&create_jwt(&librarian).unwrap()),
            Some(payload),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_quantity_edit_flows_through_ledger() {
    let db = setup_test_db().await;
    let owner = create_test_user(&db, "reader@example.com", Role::Student).await;
    let admin = create_test_user(&db, "admin@example.com", Role::Admin).await;
    let book_id = create_test_book(&db, "9782222222205", 2).await;

    let app = app(db.clone());
    let due = (Utc::now() + Duration::days(7)).to_rfc3339();

    // One copy out on loan
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/borrowings",
            Some(&create_jwt(&owner).unwrap()),
            Some(serde_json::json!({ "book_id": book_id, "expected_return_date": due })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Admin shrinks the stock to 1: the delta lands on available_copies
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/books/{}", book_id),
            Some(&create_jwt(&admin).unwrap()),
            Some(serde_json::json!({ "quantity": 1 })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["book"]["quantity"], 1);
    assert_eq!(json["book"]["available_copies"], 0);

    let count = borrowing::Entity::find().all(&db).await.unwrap().len();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_public_book_listing() {
    let db = setup_test_db().await;
    create_test_book(&db, "9782222222206", 1).await;
    create_test_book(&db, "9782222222207", 2).await;

    let app = app(db);

    // No token needed for the catalog
    let response = app
        .oneshot(request("GET", "/books?limit=10", None, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["total"], 2);
    assert_eq!(json["books"].as_array().unwrap().len(), 2);
}
