//! Prompt API Endpoints
//! Mission: Browse, publish, and like prompts

use crate::auth::middleware::{require_identity, AuthError, AuthSession, RequireIdentity};
use crate::prompts::store::{NewPrompt, Prompt, PromptStore};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    Extension,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub prompts: Arc<PromptStore>,
}

/// Browse prompts - GET /api/prompts
///
/// Public: no identity required.
pub async fn list_prompts(
    State(state): State<AppState>,
    Query(params): Query<PromptQuery>,
) -> Result<Json<PromptsResponse>, ApiError> {
    let prompts = state
        .prompts
        .list(params.category.as_deref(), params.search.as_deref())?;

    Ok(Json(PromptsResponse { prompts }))
}

/// Publish a prompt - POST /api/prompts
pub async fn create_prompt(
    State(state): State<AppState>,
    RequireIdentity(author): RequireIdentity,
    Json(payload): Json<NewPrompt>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if payload.title.trim().is_empty()
        || payload.prompt.trim().is_empty()
        || payload.category.trim().is_empty()
    {
        return Err(ApiError::BadRequest("Missing required fields".to_string()));
    }

    let prompt = state.prompts.create(&payload, &author)?;

    Ok((StatusCode::CREATED, Json(json!({ "prompt": prompt }))))
}

/// Toggle a like - POST /api/prompts/:id/like
pub async fn toggle_like(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Extension(session): Extension<AuthSession>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = require_identity(&session)?;

    let (likes, is_liked) = state
        .prompts
        .toggle_like(&id, &user.id)?
        .ok_or_else(|| ApiError::NotFound(format!("Prompt {id} not found")))?;

    Ok(Json(json!({ "likes": likes, "isLiked": is_liked })))
}

// ===== Request/Response Types =====

#[derive(Debug, Deserialize)]
pub struct PromptQuery {
    /// Narrow to a category ("all" or absent means no filter)
    pub category: Option<String>,
    /// Free-text search over title, body, tags, and author
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PromptsResponse {
    pub prompts: Vec<Prompt>,
}

// ===== Error Handling =====

#[derive(Debug)]
pub enum ApiError {
    Database(anyhow::Error),
    NotFound(String),
    BadRequest(String),
    Auth(AuthError),
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Database(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::Auth(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => {
                tracing::error!("Database error: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Auth(err) => return err.into_response(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
