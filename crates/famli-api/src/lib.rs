//! famli-api: HTTP surface of the Famli WhatsApp gateway
//!
//! Serves the Twilio webhook alongside the account-link and status
//! endpoints, with JWT authentication and per-client rate limiting.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;

pub use error::{ApiError, Result};
pub use server::{AppState, create_router, start_server};
