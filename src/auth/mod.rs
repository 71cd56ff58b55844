//! Authentication Module
//! Mission: Credential storage, bearer tokens, and per-request identity

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtCodec;
pub use middleware::{auth_context, optional_identity, require_identity, AuthSession};
pub use user_store::UserStore;
