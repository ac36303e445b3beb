use anyhow::{anyhow, Context, Result};
use todo_core::TodoHandler;
use todo_server::ServerConfig;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let config = ServerConfig::from_env()?;
    let store = config
        .open_store()
        .await
        .with_context(|| format!("opening {:?} store", config.store))?;

    let addr = config.addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(%addr, store = ?config.store, "listening");
    todo_server::run(listener, TodoHandler::new(store)).await?;
    Ok(())
}
