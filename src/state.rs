use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;
use zendriver_auth::JwtHandler;
use zendriver_config::AppConfig;

use crate::modules::users::service::UserService;
use crate::repository::UserRepository;

/// Shared, read-only application services. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtHandler>,
    pub user_service: UserService,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Wires the services over the given user store.
    pub fn new(config: AppConfig, users: Arc<dyn UserRepository>) -> Self {
        let jwt = Arc::new(JwtHandler::new(&config.jwt));
        let user_service = UserService::new(users.clone(), jwt.clone(), config.bcrypt_cost);

        Self {
            config: Arc::new(config),
            users,
            jwt,
            user_service,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: Option<PrometheusHandle>) -> Self {
        self.metrics = handle;
        self
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    use zendriver_config::{CorsConfig, DatabaseConfig, JwtConfig, LoggingConfig, ServerConfig};

    AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
        },
        jwt: JwtConfig {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            token_lifetime: 3600,
            issuer: None,
        },
        cors: CorsConfig::permissive(),
        logging: LoggingConfig::default(),
        bcrypt_cost: 4,
    }
}
