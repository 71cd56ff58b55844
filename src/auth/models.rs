//! Authentication Models
//! Mission: Define user, identity, and token claim data structures

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user account as held by the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
}

/// Resolved, trusted representation of a user.
///
/// Built from the credential store at login/signup, or from verified token
/// claims at request time. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl Identity {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            email: user.email.clone(),
        }
    }
}

/// JWT claims payload.
///
/// Every field is required: a token whose payload is missing any of them
/// fails decoding instead of being coerced into a partial identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (user id)
    pub username: String,
    pub email: String,
    pub iat: usize, // issued-at timestamp
    pub exp: usize, // expiration timestamp
}

impl Claims {
    /// The identity embedded in the token, trusted as-is for the life of
    /// the token's validity window (no credential store lookup).
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.sub.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Signup request body. Fields default to empty so absent JSON keys are
/// reported as missing fields (400) rather than a deserialization error.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Login/signup response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: Identity,
    pub token: String,
}
