use std::env;

use crate::error::ConfigError;
use crate::server::Environment;

pub const DEFAULT_JWT_SECRET: &str = "zendriver-development-secret-change-me";

/// Minimum secret length accepted in production (HS256 key size).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime: ten years, in seconds.
pub const MAX_TOKEN_LIFETIME: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds.
    pub token_lifetime: i64,
    /// Expected `iss` claim; issued tokens carry it and validation requires it.
    pub issuer: Option<String>,
}

impl JwtConfig {
    pub fn from_env() -> Self {
        Self {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            token_lifetime: env::var("JWT_TOKEN_LIFETIME")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(604800), // 7 days
            issuer: env::var("JWT_ISSUER").ok().filter(|s| !s.is_empty()),
        }
    }

    pub fn validate(&self, environment: Environment) -> Result<(), ConfigError> {
        if !(1..=MAX_TOKEN_LIFETIME).contains(&self.token_lifetime) {
            return Err(ConfigError::Invalid {
                key: "JWT_TOKEN_LIFETIME",
                reason: format!("must be between 1 and {} seconds", MAX_TOKEN_LIFETIME),
            });
        }

        if environment.is_production()
            && (self.secret == DEFAULT_JWT_SECRET || self.secret.len() < MIN_SECRET_LENGTH)
        {
            return Err(ConfigError::Invalid {
                key: "JWT_SECRET",
                reason: format!(
                    "production requires a non-default secret of at least {} bytes",
                    MIN_SECRET_LENGTH
                ),
            });
        }

        Ok(())
    }
}
