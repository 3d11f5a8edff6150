//! Access token verification.
//!
//! The identity service signs access tokens with RS256; this service only
//! ever verifies them with the public key, and only to attribute events to
//! a user when possible. Verification is pure CPU work, no I/O.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct AccessClaims {
    /// User id
    sub: String,
    #[allow(dead_code)]
    exp: i64,
    #[serde(default)]
    token_type: String,
}

#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Build a verifier from the identity service's PEM-encoded RS256
    /// public key.
    pub fn from_rsa_pem(pem: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        Ok(Self {
            decoding_key: DecodingKey::from_rsa_pem(pem.as_bytes())?,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    /// Extract the user id from an access token. Any failure (bad
    /// signature, expiry, wrong token type, malformed subject) yields None;
    /// the tracking path treats those callers as anonymous.
    pub fn parse_access_token(&self, token: &str) -> Option<Uuid> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).ok()?;
        if !data.claims.token_type.is_empty() && data.claims.token_type != "access" {
            return None;
        }
        Uuid::parse_str(&data.claims.sub).ok()
    }
}
