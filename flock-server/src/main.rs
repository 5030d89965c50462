use anyhow::Context;

use flock_server::{Config, Server, ServerState, setup_environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    setup_environment();

    tracing::info!("Flock server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. State (pool, migrations, bootstrap seed)
    let state = ServerState::initialize(&config)
        .await
        .context("server initialization failed")?;

    // 4. HTTP server
    let server = Server::with_state(state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
