//! famli-gateway: Famli WhatsApp gateway binary
//!
//! Usage:
//!   famli-gateway                  - Start the HTTP server (webhook + REST API)
//!   famli-gateway --config <file>  - Start with an explicit TOML config
//!   famli-gateway --help           - Show help

use std::sync::Arc;

use famli_core::{Config, ItemStore};
use famli_whatsapp::WhatsAppBot;
use tracing_subscriber::EnvFilter;

/// Run mode
enum RunMode {
    /// Server mode, optionally with a config file path
    Server(Option<String>),
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = match parse_args()? {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("famli-gateway {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Server(path) => path,
    };

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    dotenvy::dotenv().ok();

    let config = match config_path {
        Some(path) => {
            tracing::info!("Loading configuration from {}", path);
            Config::from_toml_file(&path)
        }
        None => Config::load(),
    }
    .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    tracing::info!("Starting famli-gateway...");
    run_server(config).await
}

/// Parse command line arguments
fn parse_args() -> anyhow::Result<RunMode> {
    let mut args = std::env::args().skip(1);
    let mut config_path = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(RunMode::Help),
            "--version" | "-v" => return Ok(RunMode::Version),
            "--config" | "-c" => {
                let path = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a file path"))?;
                config_path = Some(path);
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
    }

    Ok(RunMode::Server(config_path))
}

/// Print help message
fn print_help() {
    println!("famli-gateway - Famli WhatsApp gateway");
    println!();
    println!("Usage:");
    println!("  famli-gateway                  Start the HTTP server");
    println!("  famli-gateway --config <file>  Use a TOML config file (default: famli.toml)");
    println!("  famli-gateway --help           Show this help message");
    println!("  famli-gateway --version        Show version");
    println!();
    println!("Environment Variables:");
    println!("  PORT                       HTTP port (default: 8080)");
    println!("  JWT_SECRET                 HS256 secret for /link tokens");
    println!("  TWILIO_ACCOUNT_SID         Twilio account SID");
    println!("  TWILIO_AUTH_TOKEN          Twilio auth token");
    println!("  TWILIO_WHATSAPP_NUMBER     WhatsApp sender number");
    println!("  WHATSAPP_WEBHOOK_URL       Public webhook URL used for signatures");
    println!("  WHATSAPP_ENABLED           Enable the WhatsApp channel (default: false)");
    println!("  WHATSAPP_VERIFY_SIGNATURE  Verify Twilio signatures (default: true)");
    println!("  DB_PATH                    SQLite database path (default: data/famli.db)");
    println!("  RATE_LIMIT_MAX             Requests per window (default: 60)");
    println!("  RATE_LIMIT_WINDOW_SECS     Rate limit window (default: 60)");
}

/// Run server mode
async fn run_server(config: Config) -> anyhow::Result<()> {
    if config.auth.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; /link will reject every request");
    }

    let items = Arc::new(
        ItemStore::new(&config.storage.db_path)
            .map_err(|e| anyhow::anyhow!("Failed to open item store: {}", e))?,
    );
    tracing::info!("Item store opened at {}", config.storage.db_path);

    let bot = WhatsAppBot::from_config(&config.whatsapp, items)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to start WhatsApp bot: {}", e))?;

    if bot.is_enabled() {
        tracing::info!("WhatsApp channel enabled");
    } else {
        tracing::info!("WhatsApp channel disabled (incomplete Twilio settings)");
    }

    let port = config.server.port;
    let handle = tokio::spawn(async move {
        if let Err(e) = famli_api::start_server(config, bot).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });
    tracing::info!("HTTP server started on port {}", port);
    tracing::info!("Press Ctrl+C to exit");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    handle.abort();

    tracing::info!("Shutdown complete");
    Ok(())
}
