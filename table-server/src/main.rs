use table_server::{Config, Server, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Environment (dotenv, logging)
    table_server::setup_environment();

    tracing::info!("Table server starting...");

    // 2. Configuration
    let config = Config::from_env();

    // 3. Services and shared state
    let state = ServerState::initialize(&config);

    // 4. Background tasks (intent handler, TCP bus)
    state.start_background_tasks();

    tracing::info!(
        http_port = config.http_port,
        bus_tcp_port = config.bus_tcp_port,
        environment = %config.environment,
        "Table server ready"
    );

    // 5. HTTP server until shutdown
    let server = Server::with_state(config, state);
    server.run().await?;

    Ok(())
}
