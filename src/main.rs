use clap::Parser;
use dotenvy::dotenv;
use zendriver::cli::{Cli, run};
use zendriver::logging::init_tracing;
use zendriver_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    init_tracing(&config.logging)?;

    run(cli, config).await
}
