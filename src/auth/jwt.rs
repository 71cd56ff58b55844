//! JWT Token Codec
//! Mission: Issue and verify signed, time-bounded bearer tokens

use crate::auth::models::{Claims, Identity};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Token lifetime in days.
const TOKEN_TTL_DAYS: i64 = 7;

/// Token codec holding the process-wide HMAC signing secret.
///
/// Tokens are self-contained: verification never consults the credential
/// store, so embedded claims stay valid until the token expires even if the
/// underlying account changes.
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        // No leeway: a token at or past its expiry instant is rejected.
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a signed token embedding the identity claims, expiring 7 days
    /// from now.
    pub fn issue(&self, identity: &Identity) -> Result<String> {
        let now = Utc::now();
        let expiry = now
            .checked_add_signed(chrono::Duration::days(TOKEN_TTL_DAYS))
            .context("Invalid expiry timestamp")?;

        let claims = Claims {
            sub: identity.id.clone(),
            username: identity.username.clone(),
            email: identity.email.clone(),
            iat: now.timestamp() as usize,
            exp: expiry.timestamp() as usize,
        };

        debug!(
            "Issuing token for {} ({}), expires in {}d",
            identity.username, identity.id, TOKEN_TTL_DAYS
        );

        encode(&Header::default(), &claims, &self.encoding_key).context("Failed to sign token")
    }

    /// Verify a token's signature and expiry and return its claims.
    ///
    /// Fails on a bad signature, a malformed or incomplete payload, or an
    /// expired token. A token signed with a previous secret fails like any
    /// other bad signature.
    pub fn verify(&self, token: &str) -> Result<Claims, InvalidToken> {
        let decoded =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(InvalidToken)?;
        Ok(decoded.claims)
    }
}

/// Token verification failure. The request authenticator collapses this to
/// "no identity"; it is never surfaced to clients as a distinct error.
#[derive(Debug)]
pub struct InvalidToken(jsonwebtoken::errors::Error);

impl std::fmt::Display for InvalidToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid token: {}", self.0)
    }
}

impl std::error::Error for InvalidToken {}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity() -> Identity {
        Identity {
            id: uuid::Uuid::new_v4().to_string(),
            username: "ada".to_string(),
            email: "ada@x.com".to_string(),
        }
    }

    #[test]
    fn test_round_trip_preserves_identity() {
        let codec = JwtCodec::new("test-secret-key-12345");
        let identity = test_identity();

        let token = codec.issue(&identity).unwrap();
        assert!(!token.is_empty());

        let claims = codec.verify(&token).unwrap();
        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.exp, claims.iat + (TOKEN_TTL_DAYS * 86400) as usize);
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = "test-secret-key-12345";
        let codec = JwtCodec::new(secret);

        // Token issued 8 days ago, expired 1 day ago.
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: "user-1".to_string(),
            username: "ada".to_string(),
            email: "ada@x.com".to_string(),
            iat: now - 8 * 86400,
            exp: now - 86400,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(codec.verify(&token).is_err());
    }

    #[test]
    fn test_tampered_signature_rejected() {
        let codec = JwtCodec::new("test-secret-key-12345");
        let token = codec.issue(&test_identity()).unwrap();

        // Flip the last character of the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(codec.verify(&tampered).is_err());
        assert!(codec.verify(&token).is_ok());
    }

    #[test]
    fn test_rotated_secret_rejected() {
        let old = JwtCodec::new("old-secret");
        let new = JwtCodec::new("new-secret");

        let token = old.issue(&test_identity()).unwrap();
        assert!(new.verify(&token).is_err());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let codec = JwtCodec::new("test-secret-key-12345");
        assert!(codec.verify("not.a.token").is_err());
        assert!(codec.verify("").is_err());
    }

    #[test]
    fn test_incomplete_claims_rejected() {
        let secret = "test-secret-key-12345";
        let codec = JwtCodec::new(secret);

        // Validly signed payload missing the email claim.
        let now = Utc::now().timestamp() as usize;
        let partial = serde_json::json!({
            "sub": "user-1",
            "username": "ada",
            "iat": now,
            "exp": now + 3600,
        });
        let token = encode(
            &Header::default(),
            &partial,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();

        assert!(codec.verify(&token).is_err());
    }
}
