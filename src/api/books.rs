use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::Claims;
use crate::domain::{BookFilter, CreateBookInput, LifecycleError, UpdateBookInput};
use crate::infrastructure::AppState;
use crate::services::inventory_service;

#[derive(Deserialize)]
pub struct ListBooksQuery {
    pub genre: Option<String>,
    pub is_digital: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn list_books(
    State(state): State<AppState>,
    Query(query): Query<ListBooksQuery>,
) -> Result<Json<Value>, LifecycleError> {
    let result = state
        .book_repo
        .find_all(BookFilter {
            genre: query.genre,
            is_digital: query.is_digital,
            page: query.page,
            limit: query.limit,
        })
        .await?;

    Ok(Json(json!({
        "books": result.books,
        "count": result.books.len(),
        "total": result.total,
    })))
}

pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, LifecycleError> {
    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    Ok(Json(json!({ "book": book })))
}

pub async fn create_book(
    State(state): State<AppState>,
    claims: Claims,
    Json(payload): Json<CreateBookInput>,
) -> Result<(StatusCode, Json<Value>), LifecycleError> {
    if !claims.role.is_staff() {
        return Err(LifecycleError::Forbidden);
    }

    if payload.quantity < 1 {
        return Err(LifecycleError::InvalidRequest(
            "quantity must be at least 1".to_string(),
        ));
    }

    if payload.is_digital && payload.digital_link.is_none() {
        return Err(LifecycleError::InvalidRequest(
            "digital books require a digital link".to_string(),
        ));
    }

    if state.book_repo.find_by_isbn(&payload.isbn).await?.is_some() {
        return Err(LifecycleError::InvalidRequest(
            "Book with this ISBN already exists".to_string(),
        ));
    }

    let book = state.book_repo.create(payload).await?;

    Ok((StatusCode::CREATED, Json(json!({ "book": book }))))
}

#[derive(Deserialize)]
pub struct UpdateBookRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i32>,
    pub description: Option<Option<String>>,
    pub cover_image: Option<Option<String>>,
    pub is_digital: Option<bool>,
    pub digital_link: Option<Option<String>>,
    pub quantity: Option<i32>,
}

pub async fn update_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBookRequest>,
) -> Result<Json<Value>, LifecycleError> {
    if !claims.role.is_staff() {
        return Err(LifecycleError::Forbidden);
    }

    // Quantity edits are ledger operations: the available-copy counter
    // moves by the same delta as the total, clamped by outstanding loans.
    if let Some(quantity) = payload.quantity {
        inventory_service::adjust_quantity(state.db(), id, quantity).await?;
    }

    let book = state
        .book_repo
        .update(
            id,
            UpdateBookInput {
                title: payload.title,
                author: payload.author,
                isbn: payload.isbn,
                genre: payload.genre,
                publication_year: payload.publication_year,
                description: payload.description,
                cover_image: payload.cover_image,
                is_digital: payload.is_digital,
                digital_link: payload.digital_link,
            },
        )
        .await?;

    Ok(Json(json!({ "book": book })))
}

pub async fn delete_book(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, LifecycleError> {
    if !claims.role.is_staff() {
        return Err(LifecycleError::Forbidden);
    }

    state.book_repo.delete(id).await?;

    Ok(Json(json!({ "message": "Book deleted successfully" })))
}
