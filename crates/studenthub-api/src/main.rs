use studenthub_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, session store, sweeper, routes)
    let (_state, router, sweeper) = studenthub_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    studenthub_api::setup::server::start_server(&config, router, sweeper).await?;

    Ok(())
}
