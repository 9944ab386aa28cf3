//! Error types for famli-whatsapp

use thiserror::Error;

/// famli-whatsapp error type
#[derive(Error, Debug)]
pub enum WhatsAppError {
    #[error("Twilio credentials not set")]
    CredentialsNotSet,

    #[error("Webhook signature verification failed")]
    SignatureVerificationFailed,

    #[error("Invalid webhook payload: {0}")]
    InvalidPayload(String),

    #[error("Twilio API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Storage error: {0}")]
    Storage(#[from] famli_core::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for WhatsAppError {
    fn from(err: reqwest::Error) -> Self {
        WhatsAppError::Http(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, WhatsAppError>;
