//! Token signing and password hashing options.

use crate::auth::{password::DEFAULT_HASH_COST, token::DEFAULT_TOKEN_TTL_SECONDS};
use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_TOKEN_SECRET: &str = "token-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";
pub const ARG_PASSWORD_HASH_COST: &str = "password-hash-cost";
pub const ARG_FRONTEND_BASE_URL: &str = "frontend-base-url";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_TOKEN_SECRET)
                .long(ARG_TOKEN_SECRET)
                .help("Secret used to sign bearer tokens (at least 32 bytes)")
                .env("EVENTLY_TOKEN_SECRET")
                .hide_env_values(true)
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Bearer token lifetime in seconds")
                .env("EVENTLY_TOKEN_TTL_SECONDS")
                .default_value("31536000")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new(ARG_PASSWORD_HASH_COST)
                .long(ARG_PASSWORD_HASH_COST)
                .help("Argon2 time cost (iterations) for new password hashes")
                .env("EVENTLY_PASSWORD_HASH_COST")
                .default_value("3")
                .value_parser(clap::value_parser!(u32)),
        )
        .arg(
            Arg::new(ARG_FRONTEND_BASE_URL)
                .long(ARG_FRONTEND_BASE_URL)
                .help("Frontend base URL, used for CORS and registration links")
                .env("EVENTLY_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
}

#[derive(Debug)]
pub struct Options {
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub password_hash_cost: u32,
    pub frontend_base_url: String,
}

impl Options {
    /// # Errors
    /// Returns an error if a required argument is missing.
    pub fn parse(matches: &ArgMatches) -> Result<Self> {
        Ok(Self {
            token_secret: matches
                .get_one::<String>(ARG_TOKEN_SECRET)
                .map(|secret| SecretString::from(secret.clone()))
                .context("missing required argument: --token-secret")?,
            token_ttl_seconds: matches
                .get_one::<u64>(ARG_TOKEN_TTL_SECONDS)
                .copied()
                .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS),
            password_hash_cost: matches
                .get_one::<u32>(ARG_PASSWORD_HASH_COST)
                .copied()
                .unwrap_or(DEFAULT_HASH_COST),
            frontend_base_url: matches
                .get_one::<String>(ARG_FRONTEND_BASE_URL)
                .cloned()
                .context("missing required argument: --frontend-base-url")?,
        })
    }
}
