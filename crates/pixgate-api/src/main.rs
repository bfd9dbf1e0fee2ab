use pixgate_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration from the environment (and .env when present)
    let config = Config::from_env()?;

    // Wire up telemetry, storage, the validation pipeline, and routes
    let (_state, router) = pixgate_api::setup::initialize_app(config.clone()).await?;

    // Serve until SIGINT/SIGTERM
    pixgate_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
