//! Bearer token authentication for protected routes.
//!
//! Flow Overview: read `Authorization: Bearer <token>`, verify it with the
//! shared `TokenAuthority`, and insert an `Identity` into the request
//! extensions before handing the request to the handler. Failures answer 401
//! and the handler never runs. No database access happens here; handlers that
//! need fresh user state load it themselves.

use axum::{
    extract::{Extension, Request},
    http::{
        header::{AUTHORIZATION, WWW_AUTHENTICATE},
        HeaderMap, HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use super::handlers::ErrorBody;
use crate::auth::{AuthError, TokenAuthority};

/// Caller identity resolved from a verified token. Lives for one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Uuid,
}

/// Middleware guarding protected routes.
pub async fn require_auth(
    Extension(tokens): Extension<Arc<TokenAuthority>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authenticate(request.headers(), &tokens) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            debug!(reason = %err, "rejecting unauthenticated request");
            err.into_response()
        }
    }
}

/// Resolve the bearer credential in `headers` into an `Identity`.
///
/// # Errors
/// `Unauthenticated` when no bearer credential is present, `InvalidToken` or
/// `Expired` when verification fails.
pub fn authenticate(headers: &HeaderMap, tokens: &TokenAuthority) -> Result<Identity, AuthError> {
    let token = bearer_token(headers).ok_or(AuthError::Unauthenticated)?;
    let subject = tokens.verify(token)?;
    // Tokens are only issued for user ids; anything else was not minted here.
    let user_id = Uuid::parse_str(&subject).map_err(|_| AuthError::InvalidToken)?;

    Ok(Identity { user_id })
}

/// Extract the token from `Authorization`, matching the scheme case-insensitively.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ErrorBody::new(self.code(), self.message());
        let mut response = (StatusCode::UNAUTHORIZED, Json(body)).into_response();
        response
            .headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::token::now_unix_seconds;
    use axum::{body::Body, http::Request as HttpRequest, middleware, routing::get, Router};
    use secrecy::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-0123456789abcdef0123456789";

    fn authority(secret: &str) -> Arc<TokenAuthority> {
        Arc::new(TokenAuthority::new(SecretString::from(secret.to_string())))
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn app(tokens: Arc<TokenAuthority>, calls: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move |Extension(identity): Extension<Identity>| {
                    let calls = calls.clone();
                    async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        identity.user_id.to_string()
                    }
                }),
            )
            .route_layer(middleware::from_fn(require_auth))
            .layer(Extension(tokens))
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        for value in ["Bearer abc", "bearer abc", "BEARER abc", "  Bearer   abc  "] {
            assert_eq!(bearer_token(&headers_with(value)), Some("abc"), "{value}");
        }
    }

    #[test]
    fn non_bearer_credentials_are_ignored() {
        for value in ["Basic dXNlcjpwYXNz", "Bearer", "Bearer   ", "abc"] {
            assert_eq!(bearer_token(&headers_with(value)), None, "{value}");
        }
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn authenticate_resolves_user_id() {
        let tokens = authority(SECRET);
        let user_id = Uuid::new_v4();
        let token = tokens.issue(&user_id.to_string()).unwrap();

        let identity = authenticate(&headers_with(&format!("Bearer {token}")), &tokens).unwrap();
        assert_eq!(identity.user_id, user_id);
    }

    #[test]
    fn authenticate_maps_failures() {
        let tokens = authority(SECRET);

        assert_eq!(
            authenticate(&HeaderMap::new(), &tokens),
            Err(AuthError::Unauthenticated)
        );
        assert_eq!(
            authenticate(&headers_with("Bearer not-a-token"), &tokens),
            Err(AuthError::InvalidToken)
        );

        let foreign = authority("another-secret-0123456789abcdef012345")
            .issue(&Uuid::new_v4().to_string())
            .unwrap();
        assert_eq!(
            authenticate(&headers_with(&format!("Bearer {foreign}")), &tokens),
            Err(AuthError::InvalidToken)
        );

        let non_uuid = tokens.issue("u1").unwrap();
        assert_eq!(
            authenticate(&headers_with(&format!("Bearer {non_uuid}")), &tokens),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn authenticate_reports_expiry() {
        let expiring = TokenAuthority::new(SecretString::from(SECRET.to_string()))
            .with_ttl_seconds(60);
        let token = expiring
            .issue_at(&Uuid::new_v4().to_string(), now_unix_seconds() - 120)
            .unwrap();

        assert_eq!(
            authenticate(&headers_with(&format!("Bearer {token}")), &expiring),
            Err(AuthError::Expired)
        );
    }

    #[tokio::test]
    async fn missing_header_never_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = app(authority(SECRET), calls.clone())
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers().get(WWW_AUTHENTICATE).unwrap(),
            HeaderValue::from_static("Bearer")
        );
        assert!(body_string(response).await.contains("unauthenticated"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_token_never_reaches_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let response = app(authority(SECRET), calls.clone())
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, "Bearer garbage.token.value")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = body_string(response).await;
        assert!(body.contains("invalid_token"));
        assert!(!body.contains(SECRET));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_once_with_identity() {
        let tokens = authority(SECRET);
        let user_id = Uuid::new_v4();
        let token = tokens.issue(&user_id.to_string()).unwrap();
        let calls = Arc::new(AtomicUsize::new(0));

        let response = app(tokens, calls.clone())
            .oneshot(
                HttpRequest::builder()
                    .uri("/protected")
                    .header(AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, user_id.to_string());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
