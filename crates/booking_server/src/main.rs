use anyhow::{Context, Result};
use booking_core::db::open_db;
use booking_core::{init_logging, LoggingConfig};
use booking_server::{build_router, config::ServerConfig, state::AppState};
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;

    let log_dir = config.log_dir.to_string_lossy().into_owned();
    init_logging(&LoggingConfig::new(config.log_level.as_str(), log_dir).with_stderr_echo(true))
        .map_err(anyhow::Error::msg)?;

    let conn = open_db(&config.database_path)
        .with_context(|| format!("opening {}", config.database_path.display()))?;
    let state = AppState::new(conn, &config);
    let app = build_router(state, &config);

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("event=server_start module=http status=ok addr={addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
