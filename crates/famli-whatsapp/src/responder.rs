//! Outbound messages
//!
//! Replies to inbound webhooks travel back synchronously as TwiML. This module
//! covers the other direction: notifications the server initiates itself,
//! such as the confirmation after an account link.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::error::Result;
use crate::phone;

/// Transport able to deliver a WhatsApp message
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `body` (and optionally a media URL) to `phone`, returning a provider message id
    async fn send(&self, phone: &str, body: &str, media_url: Option<&str>) -> Result<String>;
}

/// Fire-and-forget wrapper around a [`MessageSender`]
#[derive(Clone)]
pub struct Responder {
    sender: Arc<dyn MessageSender>,
}

impl Responder {
    pub fn new(sender: Arc<dyn MessageSender>) -> Self {
        Self { sender }
    }

    /// Send in a background task. Failures are logged and dropped.
    pub fn notify(&self, phone: &str, body: impl Into<String>) -> JoinHandle<()> {
        let sender = Arc::clone(&self.sender);
        let phone = phone.to_string();
        let body = body.into();

        tokio::spawn(async move {
            match sender.send(&phone, &body, None).await {
                Ok(id) => debug!(message_id = %id, "Notification delivered"),
                Err(e) => error!(
                    phone = %phone::mask(&phone),
                    "Failed to send WhatsApp notification: {}", e
                ),
            }
        })
    }
}
