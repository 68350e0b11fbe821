//! # ZenDriver Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: token signing secret, lifetime and issuer
//! - [`cors`]: allowed origins (fully open by default)
//! - [`database`]: PostgreSQL connection settings
//! - [`server`]: bind address, environment, Swagger toggle
//! - [`logging`]: log level, log directory, observability toggle
//!
//! [`AppConfig`] gathers all of them and is built once at process start.
//!
//! # Example
//!
//! ```ignore
//! use zendriver_config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! println!("listening on {}", config.server.bind_address());
//! ```

pub mod cors;
pub mod database;
pub mod error;
pub mod jwt;
pub mod logging;
pub mod server;

use std::env;

pub use cors::CorsConfig;
pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use jwt::JwtConfig;
pub use logging::LoggingConfig;
pub use server::{Environment, ServerConfig};

/// bcrypt's default work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
    pub bcrypt_cost: u32,
}

impl AppConfig {
    /// Loads every section from the environment and validates the result.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            server: ServerConfig::from_env(),
            database: DatabaseConfig::from_env(),
            jwt: JwtConfig::from_env(),
            cors: CorsConfig::from_env(),
            logging: LoggingConfig::from_env(),
            bcrypt_cost: env::var("BCRYPT_COST")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_BCRYPT_COST),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate(self.server.environment)?;

        if !(4..=31).contains(&self.bcrypt_cost) {
            return Err(ConfigError::Invalid {
                key: "BCRYPT_COST",
                reason: "must be between 4 and 31".to_string(),
            });
        }

        Ok(())
    }
}
