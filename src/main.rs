//! PromptPin - Prompt Sharing Backend
//! Mission: Sign up, log in, publish and like prompts

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use promptpin_backend::{
    api::build_router,
    auth::{api::AuthState, JwtCodec, UserStore},
    config::Config,
    prompts::{api::AppState, PromptStore},
};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "promptpin_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let user_store = Arc::new(UserStore::new(&config.database_path)?);
    let prompt_store = Arc::new(PromptStore::new(&config.database_path)?);
    let jwt = Arc::new(JwtCodec::new(&config.jwt_secret));
    info!("🔐 Stores initialized at: {}", config.database_path);

    let app = build_router(
        AuthState {
            user_store,
            jwt,
        },
        AppState {
            prompts: prompt_store,
        },
    );

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("🎯 API server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
