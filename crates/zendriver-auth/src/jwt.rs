//! Token issuance and validation.
//!
//! [`JwtHandler`] is built once from a [`JwtConfig`] and shared read-only
//! across requests. There is no revocation list: a token stays valid until
//! its `exp` passes, whatever happens to the user afterwards.
//!
//! # Example
//!
//! ```ignore
//! use zendriver_auth::JwtHandler;
//! use zendriver_config::JwtConfig;
//!
//! let handler = JwtHandler::new(&JwtConfig::from_env());
//! let issued = handler.issue(&user)?;
//! let claims = handler.validate(&issued.token)?;
//! assert_eq!(claims.user_id()?, user.id);
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;
use tracing::debug;

use zendriver_config::JwtConfig;
use zendriver_core::AppError;
use zendriver_models::User;

use crate::claims::Claims;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("failed to create token: {0}")]
    Encoding(String),
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::unauthorized("Token has expired"),
            TokenError::Invalid(_) => AppError::unauthorized("Invalid token"),
            TokenError::Encoding(reason) => {
                AppError::internal_error(format!("Failed to create token: {}", reason))
            }
        }
    }
}

fn classify(err: JwtError) -> TokenError {
    match err.kind() {
        JwtErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Invalid(err.to_string()),
    }
}

/// A freshly signed token and the moment it stops being valid.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Seconds.
    token_lifetime: i64,
    issuer: Option<String>,
    validation: Validation,
    expiry_check: Validation,
}

impl fmt::Debug for JwtHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtHandler")
            .field("token_lifetime", &self.token_lifetime)
            .field("issuer", &self.issuer)
            .finish_non_exhaustive()
    }
}

impl JwtHandler {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            validation.set_required_spec_claims(&["exp", "iss"]);
        }

        // Checks `exp` only, so expiry can be reported even when the
        // signature would not verify.
        let mut expiry_check = Validation::new(ALGORITHM);
        expiry_check.leeway = 0;
        expiry_check.insecure_disable_signature_validation();

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            token_lifetime: config.token_lifetime,
            issuer: config.issuer.clone(),
            validation,
            expiry_check,
        }
    }

    /// Signs a token for `user`, valid for the configured lifetime.
    pub fn issue(&self, user: &User) -> Result<IssuedToken, TokenError> {
        self.issue_at(user, Utc::now())
    }

    /// Signs a token as if issued at `now`.
    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let expires_at = Duration::try_seconds(self.token_lifetime)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| TokenError::Encoding("token lifetime out of range".to_string()))?;

        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| TokenError::Encoding(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verifies expiry and signature and returns the decoded claims.
    ///
    /// An elapsed `exp` yields [`TokenError::Expired`] whether or not the
    /// signature is correct. Every other failure is [`TokenError::Invalid`].
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.expiry_check).map_err(classify)?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "token rejected");
            classify(e)
        })?;

        Ok(data.claims)
    }
}
