use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{hash_password, storage::insert_user, types::RegisterRequest, MIN_PASSWORD_LEN};
use crate::{
    api::handlers::{
        invalid_payload, is_unique_violation, normalize_email, valid_email, ApiError, ErrorBody,
        MessageResponse,
    },
    auth::PasswordHasher,
};

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registration successful", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 409, description = "User with the specified email already exists", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip(pool, hasher, payload))]
pub async fn register(
    pool: Extension<PgPool>,
    hasher: Extension<Arc<PasswordHasher>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let Some(Json(user)) = payload else {
        return invalid_payload();
    };

    let name = user.name.trim();
    if name.is_empty() {
        return ApiError::BadRequest("Name is required".to_string()).into_response();
    }

    let email = normalize_email(&user.email);
    if !valid_email(&email) {
        return ApiError::BadRequest("Invalid email".to_string()).into_response();
    }

    if user.password.chars().count() < MIN_PASSWORD_LEN {
        return ApiError::BadRequest(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ))
        .into_response();
    }

    let password_hash = match hash_password(hasher.0.clone(), user.password).await {
        Ok(hash) => hash,
        Err(err) => return err.into_response(),
    };

    match insert_user(&pool, name, &email, &password_hash).await {
        Ok(id) => {
            debug!(user_id = %id, "user registered");
            (
                StatusCode::CREATED,
                Json(MessageResponse::new("User registered successfully")),
            )
                .into_response()
        }
        Err(err) if is_unique_violation(&err) => {
            ApiError::Conflict("User already exists").into_response()
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}
