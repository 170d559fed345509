use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use lectern::{create_router, AppState, Config, SessionManager};
use tracing::info;

/// Lecture recording and transcription service
#[derive(Parser, Debug)]
#[command(name = "lectern", version, about = "Lecture recording and transcription service")]
struct Cli {
    /// Path to configuration file (without extension)
    #[arg(long, value_name = "PATH", default_value = "config/lectern")]
    config: String,

    /// Override the HTTP bind address
    #[arg(long, value_name = "ADDR")]
    bind: Option<String>,

    /// Override the HTTP port
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let mut cfg = Config::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        cfg.service.http.bind = bind;
    }
    if let Some(port) = cli.port {
        cfg.service.http.port = port;
    }

    info!("Lectern v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded config: {}", cfg.service.name);
    info!("Transcription endpoint: {}", cfg.endpoints.transcribe_url);
    info!("Recording mode: {}", cfg.recording.mode);

    let manager = Arc::new(SessionManager::new(&cfg)?);
    let app = create_router(AppState::new(manager));

    let addr = format!("{}:{}", cfg.service.http.bind, cfg.service.http.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server to {addr}"))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
