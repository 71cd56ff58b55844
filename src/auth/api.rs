//! Authentication API Endpoints
//! Mission: Mint tokens on signup and login

use crate::auth::{
    jwt::JwtCodec,
    models::{AuthResponse, Identity, LoginRequest, SignupRequest},
    user_store::{CreateUserError, UserStore},
};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub user_store: Arc<UserStore>,
    pub jwt: Arc<JwtCodec>,
}

/// Signup endpoint - POST /api/auth/signup
pub async fn signup(
    State(state): State<AuthState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AuthApiError> {
    let username = payload.username.trim();
    let email = payload.email.trim();

    if username.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingFields);
    }

    let user = state
        .user_store
        .create_user(username, email, &payload.password)
        .map_err(|e| match e {
            CreateUserError::DuplicateEmail => AuthApiError::DuplicateEmail,
            CreateUserError::Store(err) => {
                error!("Signup store error: {:#}", err);
                AuthApiError::Internal
            }
        })?;

    let identity = Identity::from_user(&user);
    let token = issue_token(&state.jwt, &identity)?;

    info!("🔐 New account: {} <{}>", identity.username, identity.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user: identity,
            token,
        }),
    ))
}

/// Login endpoint - POST /api/auth/login
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AuthApiError> {
    let email = payload.email.trim();

    if email.is_empty() || payload.password.is_empty() {
        return Err(AuthApiError::MissingFields);
    }

    // Unknown email and wrong password collapse to the same error; the
    // store keeps their cost identical as well.
    let user = state
        .user_store
        .authenticate(email, &payload.password)
        .map_err(|err| {
            error!("Login store error: {:#}", err);
            AuthApiError::Internal
        })?
        .ok_or_else(|| {
            warn!("❌ Failed login attempt: {}", email);
            AuthApiError::InvalidCredentials
        })?;

    let identity = Identity::from_user(&user);
    let token = issue_token(&state.jwt, &identity)?;

    info!("✅ Login successful: {}", identity.username);

    Ok(Json(AuthResponse {
        user: identity,
        token,
    }))
}

fn issue_token(jwt: &JwtCodec, identity: &Identity) -> Result<String, AuthApiError> {
    jwt.issue(identity).map_err(|err| {
        error!("Token issue failed: {:#}", err);
        AuthApiError::Internal
    })
}

/// Auth API errors, mapped 1:1 to HTTP statuses.
#[derive(Debug)]
pub enum AuthApiError {
    MissingFields,
    DuplicateEmail,
    InvalidCredentials,
    Internal,
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::MissingFields => (StatusCode::BAD_REQUEST, "Missing required fields"),
            AuthApiError::DuplicateEmail => (StatusCode::BAD_REQUEST, "User already exists"),
            AuthApiError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
            AuthApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
