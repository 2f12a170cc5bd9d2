use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Session token claims issued by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub role: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub jti: String,
}

impl Claims {
    pub fn new(sub: impl Into<String>, email: Option<String>, role: impl Into<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: sub.into(),
            email,
            role: role.into(),
            exp,
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.sub)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// The token does not establish a session: malformed, forged or expired.
    #[error("Invalid session token: {0}")]
    Invalid(String),

    /// Verification itself broke (key, algorithm or crypto failure).
    #[error("Session verification failed: {0}")]
    Internal(String),

    #[error("Session token generation failed: {0}")]
    Generation(String),
}

/// Signs and verifies HS256 session tokens with the configured secret.
#[derive(Clone)]
pub struct SessionVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    admin_role: String,
    expiry_hours: u64,
}

impl SessionVerifier {
    pub fn new(security: &SecurityConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 30;

        Self {
            encoding: EncodingKey::from_secret(security.session_secret.as_bytes()),
            decoding: DecodingKey::from_secret(security.session_secret.as_bytes()),
            validation,
            admin_role: security.admin_role.clone(),
            expiry_hours: security.session_expiry_hours,
        }
    }

    pub fn is_admin(&self, claims: &Claims) -> bool {
        claims.role == self.admin_role
    }

    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidToken
                | ErrorKind::InvalidSignature
                | ErrorKind::ExpiredSignature
                | ErrorKind::ImmatureSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::MissingRequiredClaim(_)
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => SessionError::Invalid(e.to_string()),
                _ => SessionError::Internal(e.to_string()),
            })
    }

    /// Sign a session for `sub`. Used by operator tooling and tests; end users
    /// get their sessions from the auth provider.
    pub fn issue(&self, sub: &str, email: Option<String>, role: &str) -> Result<String, SessionError> {
        let claims = Claims::new(sub, email, role, self.expiry_hours);
        self.sign(&claims)
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, SessionError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| SessionError::Generation(e.to_string()))
    }
}
