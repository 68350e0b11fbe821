use std::env;

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Default level for the application's own targets.
    pub level: String,
    /// Directory for daily-rotated JSON logs; console only when unset.
    pub dir: Option<String>,
    /// Enables request metrics and the `/metrics` endpoint.
    pub observability_enabled: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            dir: env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            observability_enabled: env::var("OBSERVABILITY_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            dir: None,
            observability_enabled: false,
        }
    }
}
