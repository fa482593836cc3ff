//! Session token creation and verification.
//!
//! Tokens are self-contained signed claim bundles; the server keeps no
//! session state. A token is usable until its expiry instant and cannot be
//! revoked before that.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{api::models::users::VerifiedIdentity, config::Config, errors::Error};

/// Session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,           // Subject (user email)
    pub name: String,          // Display name
    pub version_stamp: String, // Identity record version the token was issued against
    pub exp: i64,              // Expiration time
    pub iat: i64,              // Issued at
}

impl SessionClaims {
    /// Create new session claims for a verified identity
    pub fn new(identity: &VerifiedIdentity, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.security.token_expiry;

        Self {
            sub: identity.email.clone(),
            name: identity.name.clone(),
            version_stamp: identity.version_stamp.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<SessionClaims> for VerifiedIdentity {
    fn from(claims: SessionClaims) -> Self {
        Self {
            email: claims.sub,
            name: claims.name,
            version_stamp: claims.version_stamp,
        }
    }
}

/// Create a signed session token for an identity
pub fn create_session_token(identity: &VerifiedIdentity, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(identity, config);
    let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
        operation: "session tokens: secret_key is required".to_string(),
    })?;

    let key = EncodingKey::from_secret(secret_key.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("sign session token: {e}"),
    })
}

/// Verify and decode a session token
pub fn verify_session_token(token: &str, config: &Config) -> Result<VerifiedIdentity, Error> {
    let secret_key = config.secret_key.as_ref().ok_or_else(|| Error::Internal {
        operation: "session tokens: secret_key is required".to_string(),
    })?;

    let key = DecodingKey::from_secret(secret_key.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<SessionClaims>(token, &key, &validation).map_err(|e| match e.kind() {
        // Client errors (401) - malformed tokens, invalid claims, expired tokens
        jsonwebtoken::errors::ErrorKind::InvalidToken
        | jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::ExpiredSignature
        | jsonwebtoken::errors::ErrorKind::MissingRequiredClaim(_)
        | jsonwebtoken::errors::ErrorKind::InvalidIssuer
        | jsonwebtoken::errors::ErrorKind::InvalidAudience
        | jsonwebtoken::errors::ErrorKind::InvalidSubject
        | jsonwebtoken::errors::ErrorKind::ImmatureSignature
        | jsonwebtoken::errors::ErrorKind::Base64(_)
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => Error::Unauthenticated,

        // Server errors (500) - key issues, internal failures
        jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_)
        | jsonwebtoken::errors::ErrorKind::RsaFailedSigning
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithmName
        | jsonwebtoken::errors::ErrorKind::InvalidKeyFormat
        | jsonwebtoken::errors::ErrorKind::MissingAlgorithm
        | jsonwebtoken::errors::ErrorKind::Json(_)
        | jsonwebtoken::errors::ErrorKind::Utf8(_)
        | jsonwebtoken::errors::ErrorKind::Crypto(_) => Error::Internal {
            operation: format!("session token verification: {e}"),
        },

        // Catch-all for any future error variants (default to server error for safety)
        _ => Error::Internal {
            operation: format!("session token verification (unknown error): {e}"),
        },
    })?;

    Ok(VerifiedIdentity::from(token_data.claims))
}
