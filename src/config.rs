//! Application configuration

use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        // No baked-in fallback: a predictable signing secret would let
        // anyone mint valid tokens.
        let jwt_secret =
            std::env::var("JWT_SECRET").context("JWT_SECRET must be set in the environment")?;

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./promptpin.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .unwrap_or(8080);

        Ok(Self {
            database_path,
            port,
            jwt_secret,
        })
    }
}
