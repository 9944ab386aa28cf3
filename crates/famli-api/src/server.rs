//! HTTP API Server
//!
//! Starts and manages the axum-based HTTP server.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, middleware};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info};

use famli_core::Config;
use famli_whatsapp::WhatsAppBot;

use crate::middleware::auth::JwtAuth;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter, rate_limit_middleware};
use crate::routes::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub bot: WhatsAppBot,
    pub auth: JwtAuth,
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    pub fn new(config: Config, bot: WhatsAppBot) -> crate::Result<Self> {
        let auth = JwtAuth::from_config(&config.auth)?;
        let limiter = Arc::new(RateLimiter::with_config(RateLimitConfig::from(
            &config.rate_limit,
        )));

        Ok(Self {
            config,
            bot,
            auth,
            limiter,
        })
    }
}

/// Full application router: REST API plus the Twilio webhook.
///
/// The rate limiter covers the REST routes only; the webhook is
/// authenticated by its request signature.
pub fn create_router(state: AppState) -> Router {
    let api = routes(state.clone())
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.limiter),
            rate_limit_middleware,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(api)
        .merge(state.bot.router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Start the HTTP API server
pub async fn start_server(config: Config, bot: WhatsAppBot) -> anyhow::Result<()> {
    let port = config.server.port;
    let state = AppState::new(config, bot)?;

    let limiter = Arc::clone(&state.limiter);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(limiter.window());
        loop {
            interval.tick().await;
            limiter.cleanup().await;
            debug!("Rate limiter cleanup complete");
        }
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("HTTP API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
