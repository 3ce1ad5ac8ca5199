use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, Claims};
use crate::domain::{LifecycleError, UpdateUserInput};
use crate::infrastructure::AppState;
use crate::models::user::{self, Role};

/// User fields safe to expose over the API (never the password hash)
pub fn public_user_json(user: &user::Model) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
        "role": user.role,
        "borrowed_books": user.borrowed_book_ids(),
    })
}

pub async fn get_profile(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, LifecycleError> {
    let user = state
        .user_repo
        .find_by_id(claims.uid)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    Ok(Json(public_user_json(&user)))
}

pub async fn list_users(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<Value>, LifecycleError> {
    if claims.role != Role::Admin {
        return Err(LifecycleError::Forbidden);
    }

    let users = state.user_repo.find_all().await?;
    let users: Vec<Value> = users.iter().map(public_user_json).collect();

    Ok(Json(json!({ "users": users })))
}

pub async fn get_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, LifecycleError> {
    if claims.role != Role::Admin {
        return Err(LifecycleError::Forbidden);
    }

    let user = state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    Ok(Json(public_user_json(&user)))
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    role: Option<Role>,
    password: Option<String>,
}

pub async fn update_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<Value>, LifecycleError> {
    if claims.role != Role::Admin {
        return Err(LifecycleError::Forbidden);
    }

    let password_hash = match payload.password {
        Some(password) => Some(
            hash_password(&password)
                .map_err(|e| LifecycleError::InvalidRequest(format!("Invalid password: {}", e)))?,
        ),
        None => None,
    };

    let user = state
        .user_repo
        .update(
            id,
            UpdateUserInput {
                name: payload.name,
                email: payload.email,
                password_hash,
                role: payload.role,
            },
        )
        .await?;

    Ok(Json(public_user_json(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    claims: Claims,
    Path(id): Path<i32>,
) -> Result<Json<Value>, LifecycleError> {
    if claims.role != Role::Admin {
        return Err(LifecycleError::Forbidden);
    }

    state.user_repo.delete(id).await?;

    Ok(Json(json!({ "message": "User removed" })))
}
