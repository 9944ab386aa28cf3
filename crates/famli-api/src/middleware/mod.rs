//! Middleware modules
//!
//! Contains JWT authentication and rate limiting middleware.

pub mod auth;
pub mod rate_limit;
