//! Router assembly and health check.

use axum::{
    middleware,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::auth::{self, api::AuthState, middleware::auth_context};
use crate::middleware::logging::request_logging;
use crate::prompts::{self, api::AppState};

/// Create the API router.
///
/// The authenticator layer runs on every request, including public routes;
/// it only attaches (or declines to attach) an identity. Enforcement lives
/// in the handlers' guards.
pub fn build_router(auth_state: AuthState, app_state: AppState) -> Router {
    let jwt = auth_state.jwt.clone();

    let auth_routes = Router::new()
        .route("/api/auth/signup", post(auth::api::signup))
        .route("/api/auth/login", post(auth::api::login))
        .with_state(auth_state);

    let prompt_routes = Router::new()
        .route(
            "/api/prompts",
            get(prompts::api::list_prompts).post(prompts::api::create_prompt),
        )
        .route("/api/prompts/:id/like", post(prompts::api::toggle_like))
        .with_state(app_state);

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_routes)
        .merge(prompt_routes)
        .layer(middleware::from_fn_with_state(jwt, auth_context))
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}
