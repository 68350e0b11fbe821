//! Command-line entry points.

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{info, warn};
use validator::Validate;
use zendriver_config::AppConfig;
use zendriver_db::{init_db_pool, run_migrations};
use zendriver_models::{RegisterRequest, Role};

use crate::metrics::init_metrics;
use crate::repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
use crate::router::init_router;
use crate::state::AppState;

#[derive(Parser, Debug)]
#[command(name = "zendriver")]
#[command(about = "ZenDriver API server and administrative tools", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server (the default)
    Serve {
        /// Keep users in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },
    /// Create an administrator account
    CreateAdmin {
        username: String,
        password: String,
        first_name: String,
        last_name: String,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Serve { in_memory: false }
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or_default() {
        Command::Serve { in_memory } => serve(config, in_memory).await,
        Command::CreateAdmin {
            username,
            password,
            first_name,
            last_name,
        } => {
            let request = RegisterRequest {
                username,
                password,
                first_name,
                last_name,
            };
            create_admin(config, request).await
        }
    }
}

async fn connect_repository(config: &AppConfig) -> anyhow::Result<Arc<dyn UserRepository>> {
    let pool = init_db_pool(&config.database)
        .await
        .context("failed to connect to the database")?;
    run_migrations(&pool)
        .await
        .context("failed to run database migrations")?;

    Ok(Arc::new(PgUserRepository::new(pool)))
}

pub async fn serve(config: AppConfig, in_memory: bool) -> anyhow::Result<()> {
    let users: Arc<dyn UserRepository> = if in_memory {
        warn!("Using the in-memory user store; accounts are lost on shutdown");
        Arc::new(InMemoryUserRepository::new())
    } else {
        connect_repository(&config).await?
    };

    let metrics = init_metrics(config.logging.observability_enabled)?;
    let address = config.server.bind_address();
    let swagger_enabled = config.server.swagger_enabled;

    let state = AppState::new(config, users).with_metrics(metrics);
    let app = init_router(state);

    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {}", address))?;

    info!(address = %address, "Server running");
    if swagger_enabled {
        info!("Swagger UI available at http://{}/swagger-ui", address);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

pub async fn create_admin(config: AppConfig, request: RegisterRequest) -> anyhow::Result<()> {
    request.validate()?;

    let users = connect_repository(&config).await?;
    let state = AppState::new(config, users);

    let admin = state.user_service.create(request, Role::Admin).await?;
    info!(user_id = %admin.id, username = %admin.username, "Administrator created");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => warn!(error = %e, "failed to listen for SIGTERM"),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
