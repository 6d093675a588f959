use crate::{
    api::{self, ApiConfig},
    auth::{PasswordHasher, TokenAuthority},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: SecretString,
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub password_hash_cost: u32,
    pub frontend_base_url: String,
}

/// Build the auth components from configuration and run the HTTP server.
/// # Errors
/// Returns an error if the hasher rejects the cost, the database is
/// unreachable or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let tokens = TokenAuthority::new(args.token_secret).with_ttl_seconds(args.token_ttl_seconds);
    let hasher =
        PasswordHasher::new(args.password_hash_cost).context("Invalid password hash cost")?;

    debug!(
        token_ttl_seconds = tokens.ttl_seconds(),
        password_hash_cost = hasher.cost(),
        frontend_base_url = %args.frontend_base_url,
        "auth configured"
    );

    api::new(
        args.port,
        &args.dsn,
        Arc::new(tokens),
        Arc::new(hasher),
        ApiConfig::new(args.frontend_base_url),
    )
    .await
}
