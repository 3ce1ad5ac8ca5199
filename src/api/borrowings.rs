use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::domain::LifecycleError;
use crate::infrastructure::AppState;
use crate::services::borrowing_service;

#[derive(Deserialize)]
pub struct BorrowRequest {
    pub book_id: i32,
    pub expected_return_date: String,
}

pub async fn borrow_book(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<BorrowRequest>,
) -> Result<(StatusCode, Json<Value>), LifecycleError> {
    let record = borrowing_service::borrow(
        state.db(),
        claims.uid,
        payload.book_id,
        &payload.expected_return_date,
    )
    .await?;

    tracing::info!(
        "User {} borrowed book {} (borrowing {})",
        claims.uid,
        payload.book_id,
        record.id
    );

    Ok((StatusCode::CREATED, Json(json!({ "borrowing": record }))))
}

pub async fn return_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, LifecycleError> {
    let record = borrowing_service::return_book(
        state.db(),
        id,
        claims.uid,
        claims.role,
        state.config.fine_rate_per_day,
    )
    .await?;

    Ok(Json(json!({ "borrowing": record })))
}

pub async fn list_borrowings(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, LifecycleError> {
    if !claims.role.is_staff() {
        return Err(LifecycleError::Forbidden);
    }

    let borrowings = borrowing_service::list_all(state.db()).await?;

    Ok(Json(json!({ "borrowings": borrowings })))
}

pub async fn my_borrowings(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, LifecycleError> {
    let borrowings = borrowing_service::list_active_for_user(state.db(), claims.uid).await?;

    Ok(Json(json!({ "borrowings": borrowings })))
}
