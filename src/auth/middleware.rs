//! Request Authenticator & Authorization Guard
//! Mission: Resolve bearer credentials once per request, enforce per-route

use crate::auth::jwt::JwtCodec;
use crate::auth::models::Identity;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Per-request identity attachment, owned by one request's lifetime.
///
/// Populated by [`auth_context`] before route dispatch; empty when the
/// request carried no usable bearer credential.
#[derive(Debug, Clone, Default)]
pub struct AuthSession {
    pub user: Option<Identity>,
    pub token: Option<String>,
}

/// Best-effort authenticator, run on every request before route dispatch.
///
/// Reads `Authorization: Bearer <token>`; on a verified token attaches the
/// embedded identity and the raw token to the request extensions. A missing,
/// malformed, or invalid credential leaves the session empty and the request
/// proceeds: enforcement is the guard's job, so public routes stay public
/// and protected routes reject at [`require_identity`].
pub async fn auth_context(
    State(codec): State<Arc<JwtCodec>>,
    mut req: Request,
    next: Next,
) -> Response {
    let mut session = AuthSession::default();

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .map(str::to_string);

    if let Some(token) = token {
        match codec.verify(&token) {
            Ok(claims) => {
                session.user = Some(claims.identity());
                session.token = Some(token);
            }
            Err(err) => {
                // Collapses to "no identity"; the guard decides the outcome.
                debug!("Discarding bearer credential: {}", err);
            }
        }
    }

    req.extensions_mut().insert(session);
    next.run(req).await
}

/// Extract the token from an Authorization header value. The `Bearer `
/// prefix is matched exactly, case-sensitively; anything else counts as no
/// credential.
fn bearer_token(header_value: &str) -> Option<&str> {
    header_value.strip_prefix("Bearer ")
}

/// Demand a resolved identity, failing the request if none is attached.
/// Pure read of the session; never re-verifies the token.
pub fn require_identity(session: &AuthSession) -> Result<Identity, AuthError> {
    session.user.clone().ok_or(AuthError::Unauthorized)
}

/// Return the resolved identity if one is attached. Never fails.
pub fn optional_identity(session: &AuthSession) -> Option<Identity> {
    session.user.clone()
}

/// Extractor form of [`require_identity`] for protected handlers.
///
/// Runs against the request head, so an unauthenticated request is rejected
/// before its body is read.
pub struct RequireIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<AuthSession>()
            .cloned()
            .unwrap_or_default();
        require_identity(&session).map(RequireIdentity)
    }
}

/// Guard failure, rendered as a client-facing 401 at the transport boundary.
#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let AuthError::Unauthorized = self;
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized. Please log in." })),
        )
            .into_response()
    }
}
