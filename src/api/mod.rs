pub mod auth;
pub mod books;
pub mod borrowings;
pub mod health;
pub mod users;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;

use crate::domain::LifecycleError;
use crate::infrastructure::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Users
        .route("/users/profile", get(users::get_profile))
        .route("/users", get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // Borrowings
        .route(
            "/borrowings",
            get(borrowings::list_borrowings).post(borrowings::borrow_book),
        )
        .route("/borrowings/my-borrowings", get(borrowings::my_borrowings))
        .route("/borrowings/return/:id", put(borrowings::return_book))
        .with_state(state)
}

// HTTP translation of the business error set. Domain code stays
// framework-free; this is the only place status codes are chosen.
impl IntoResponse for LifecycleError {
    fn into_response(self) -> Response {
        let status = match &self {
            LifecycleError::NotFound => StatusCode::NOT_FOUND,
            LifecycleError::InvalidRequest(_)
            | LifecycleError::DuplicateBorrowing
            | LifecycleError::OutOfStock
            | LifecycleError::AlreadyReturned => StatusCode::BAD_REQUEST,
            LifecycleError::Forbidden => StatusCode::FORBIDDEN,
            LifecycleError::Storage(msg) => {
                tracing::error!("Storage failure: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
