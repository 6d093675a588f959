//! Account endpoints: registration, login and the caller's profile.
//!
//! Flow Overview:
//! 1) Register: validate, hash the password off the async runtime, insert.
//!    A taken email answers 409.
//! 2) Login: look up by normalized email, verify the hash, issue a bearer
//!    token. Unknown email and wrong password share one 401 response.
//! 3) Profile: routes behind the bearer middleware read `Identity` from the
//!    request extensions and load the user fresh from the store.

pub(crate) mod login;
pub(crate) mod profile;
pub(crate) mod register;
mod storage;
pub(crate) mod types;

use anyhow::Context;
use std::sync::Arc;

use super::ApiError;
use crate::auth::PasswordHasher;

const MIN_PASSWORD_LEN: usize = 8;

/// Hash on the blocking pool; Argon2 is CPU bound.
async fn hash_password(hasher: Arc<PasswordHasher>, password: String) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || hasher.hash(&password))
        .await
        .context("password hashing task failed")
        .and_then(|hash| hash.context("failed to hash password"))
        .map_err(ApiError::Internal)
}

/// Verify on the blocking pool. `None` (no such account) still pays for a
/// full Argon2 run and yields `false`.
async fn verify_password(
    hasher: Arc<PasswordHasher>,
    password: String,
    stored: Option<String>,
) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || match stored {
        Some(stored) => hasher.verify(&password, &stored),
        None => hasher.verify_absent(&password),
    })
    .await
    .context("password verification task failed")
    .map_err(ApiError::Internal)
}
