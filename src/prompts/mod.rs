//! Prompts Module
//! Mission: Prompt publishing, browsing, and likes

pub mod api;
pub mod store;

pub use api::AppState;
pub use store::PromptStore;
