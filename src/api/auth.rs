use crate::auth::{create_jwt, hash_password, verify_password, Claims};
use crate::domain::{CreateUserInput, LifecycleError};
use crate::infrastructure::AppState;
use crate::models::user::Role;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use super::users::public_user_json;

#[derive(Deserialize)]
pub struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    role: Option<Role>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    email: String,
    password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, LifecycleError> {
    if state.user_repo.find_by_email(&payload.email).await?.is_some() {
        return Err(LifecycleError::InvalidRequest(
            "User already exists".to_string(),
        ));
    }

    let password_hash = hash_password(&payload.password)
        .map_err(|e| LifecycleError::InvalidRequest(format!("Invalid password: {}", e)))?;

    let user = state
        .user_repo
        .create(CreateUserInput {
            name: payload.name,
            email: payload.email,
            password_hash,
            role: payload.role.unwrap_or(Role::Student),
        })
        .await?;

    tracing::info!("Registered new user: {}", user.email);

    let token =
        create_jwt(&user).map_err(|e| LifecycleError::Storage(format!("JWT error: {}", e)))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": public_user_json(&user) })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> impl IntoResponse {
    tracing::info!("Login attempt for: {}", payload.email);

    let user = match state.user_repo.find_by_email(&payload.email).await {
        Ok(Some(u)) => u,
        _ => {
            tracing::warn!("User not found: {}", payload.email);
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response();
        }
    };

    match verify_password(&payload.password, &user.password_hash) {
        Ok(true) => match create_jwt(&user) {
            Ok(token) => (
                StatusCode::OK,
                Json(json!({ "token": token, "user": public_user_json(&user) })),
            )
                .into_response(),
            Err(e) => {
                tracing::error!("Failed to create JWT: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to create token" })),
                )
                    .into_response()
            }
        },
        _ => {
            tracing::warn!("Password verification failed for: {}", user.email);
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid credentials" })),
            )
                .into_response()
        }
    }
}

pub async fn me(
    State(state): State<AppState>,
    claims: Claims,
) -> Result<Json<serde_json::Value>, LifecycleError> {
    let user = state
        .user_repo
        .find_by_id(claims.uid)
        .await?
        .ok_or(LifecycleError::NotFound)?;

    Ok(Json(public_user_json(&user)))
}
