use anyhow::Context;
use product_catalog::{AppConfig, Application, ConfigService};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting product catalog...");

    let config = AppConfig::from_config(&ConfigService::from_env())
        .context("invalid configuration")?;

    let app = Application::bootstrap(config)
        .await
        .context("failed to initialize application")?;

    app.serve().await.context("server terminated abnormally")?;

    tracing::info!("Server stopped");
    Ok(())
}
