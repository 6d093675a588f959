use axum::{extract::Extension, response::IntoResponse, Json};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::{
    storage::find_by_email,
    types::{LoginRequest, LoginResponse},
    verify_password,
};
use crate::{
    api::handlers::{invalid_payload, normalize_email, ApiError, ErrorBody},
    auth::{PasswordHasher, TokenAuthority},
};

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Bearer token and the user's profile", body = LoginResponse),
        (status = 400, description = "Missing or invalid payload", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip(pool, hasher, tokens, payload))]
pub async fn login(
    pool: Extension<PgPool>,
    hasher: Extension<Arc<PasswordHasher>>,
    tokens: Extension<Arc<TokenAuthority>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let Some(Json(credentials)) = payload else {
        return invalid_payload();
    };

    let email = normalize_email(&credentials.email);
    if email.is_empty() || credentials.password.is_empty() {
        return ApiError::InvalidCredentials.into_response();
    }

    let user = match find_by_email(&pool, &email).await {
        Ok(user) => user,
        Err(err) => return ApiError::from(err).into_response(),
    };

    let stored = user.as_ref().map(|user| user.password_hash.clone());
    let verified = match verify_password(hasher.0.clone(), credentials.password, stored).await {
        Ok(verified) => verified,
        Err(err) => return err.into_response(),
    };

    let user = match (user, verified) {
        (Some(user), true) => user,
        (Some(user), false) => {
            debug!(user_id = %user.id, "login with wrong password");
            return ApiError::InvalidCredentials.into_response();
        }
        (None, _) => {
            debug!("login for unknown email");
            return ApiError::InvalidCredentials.into_response();
        }
    };

    let token = match tokens.issue(&user.id.to_string()) {
        Ok(token) => token,
        Err(err) => {
            return ApiError::Internal(anyhow::Error::new(err).context("failed to issue token"))
                .into_response()
        }
    };

    Json(LoginResponse {
        token,
        user: user.to_response(),
    })
    .into_response()
}
