//! Credential hashing, bearer token issuance and the auth error taxonomy.
//!
//! Everything in here is pure: no store access and no ambient globals. The
//! signing secret and hashing cost are injected at construction so several
//! configurations can coexist (tests build authorities with different secrets
//! side by side).
//!
//! ## Tokens
//!
//! Tokens are stateless HS256 JWS values carrying `sub`, `iat` and `exp`. They
//! are valid until expiry regardless of later credential changes; there is no
//! revocation list.

pub mod password;
pub mod token;

pub use password::{HashError, PasswordHasher};
pub use token::{TokenAuthority, TokenError};

use thiserror::Error;

/// Failures surfaced to callers of protected routes.
///
/// Token level detail (`Malformed` vs `BadSignature`) is intentionally folded
/// into `InvalidToken` so responses stay stable.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no bearer credential supplied")]
    Unauthenticated,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
}

impl AuthError {
    /// Stable machine readable code for response bodies.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::InvalidToken => "invalid_token",
            Self::Expired => "token_expired",
        }
    }

    /// User facing message; never carries internal detail.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Unauthenticated => "Access Denied. No token provided.",
            Self::InvalidToken => "Invalid Token",
            Self::Expired => "Token expired",
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            TokenError::Malformed | TokenError::BadSignature | TokenError::InvalidKey => {
                Self::InvalidToken
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_errors_collapse_into_invalid_token() {
        assert_eq!(AuthError::from(TokenError::Malformed), AuthError::InvalidToken);
        assert_eq!(
            AuthError::from(TokenError::BadSignature),
            AuthError::InvalidToken
        );
        assert_eq!(AuthError::from(TokenError::Expired), AuthError::Expired);
    }

    #[test]
    fn messages_do_not_leak_token_detail() {
        for err in [
            AuthError::Unauthenticated,
            AuthError::InvalidToken,
            AuthError::Expired,
        ] {
            assert!(!err.message().to_lowercase().contains("signature"));
            assert!(!err.code().is_empty());
        }
    }
}
