//! WhatsApp bot wrapper
//!
//! Owns the session store, the conversation handler and the outbound
//! responder, and exposes what the HTTP layer needs: the webhook router,
//! account linking and channel status.

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use tracing::{info, warn};

use famli_core::{ItemRepository, PhoneLink, WhatsAppConfig};

use crate::dialogue::ConversationHandler;
use crate::error::Result;
use crate::phone;
use crate::reply;
use crate::responder::{MessageSender, Responder};
use crate::session::SessionStore;
use crate::twilio::TwilioClient;
use crate::webhook::{self, SignatureCheck, WebhookState};

/// Outcome of a link attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkResult {
    Linked,
    InvalidCode,
}

/// Outcome of an unlink request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlinkResult {
    Unlinked,
    /// The number is not linked to the requesting user
    NotLinked,
}

/// WhatsApp bot wrapper
#[derive(Clone)]
pub struct WhatsAppBot {
    config: WhatsAppConfig,
    handler: Arc<ConversationHandler>,
    responder: Option<Responder>,
    signature: SignatureCheck,
}

impl WhatsAppBot {
    /// Build the bot from config, restoring persisted phone links.
    ///
    /// Outbound messaging is only wired up when the channel is active.
    pub async fn from_config(config: &WhatsAppConfig, items: Arc<dyn ItemRepository>) -> Result<Self> {
        let sender: Option<Arc<dyn MessageSender>> = if config.is_active() {
            Some(Arc::new(TwilioClient::from_config(config)?))
        } else {
            info!("WhatsApp channel inactive; outbound messages disabled");
            None
        };

        let bot = Self::with_sender(config.clone(), items, sender);
        bot.restore_links().await?;
        Ok(bot)
    }

    /// Build the bot around an explicit sender (or none)
    pub fn with_sender(
        config: WhatsAppConfig,
        items: Arc<dyn ItemRepository>,
        sender: Option<Arc<dyn MessageSender>>,
    ) -> Self {
        let signature = SignatureCheck::from_config(&config);
        let handler = Arc::new(ConversationHandler::new(SessionStore::new(), items));

        Self {
            config,
            handler,
            responder: sender.map(Responder::new),
            signature,
        }
    }

    async fn restore_links(&self) -> Result<()> {
        let links = self.handler.items().load_links().await?;
        let count = links.len();
        for link in links {
            self.handler.sessions().link(&link.phone, &link.user_id).await;
        }
        info!("Restored {} WhatsApp phone links", count);
        Ok(())
    }

    /// Webhook routes (`GET`/`POST /webhook`)
    pub fn router(&self) -> Router {
        webhook::router(WebhookState {
            handler: Arc::clone(&self.handler),
            signature: self.signature.clone(),
        })
    }

    pub fn handler(&self) -> &Arc<ConversationHandler> {
        &self.handler
    }

    pub fn sessions(&self) -> &SessionStore {
        self.handler.sessions()
    }

    pub fn is_enabled(&self) -> bool {
        self.config.is_active()
    }

    pub fn phone_number(&self) -> &str {
        &self.config.phone_number
    }

    pub fn webhook_url(&self) -> &str {
        &self.config.webhook_url
    }

    /// Link a phone number to a user with a code issued over WhatsApp.
    ///
    /// On success the link is persisted and a confirmation message is sent in
    /// the background.
    pub async fn link_phone(&self, raw_phone: &str, code: &str, user_id: &str) -> Result<LinkResult> {
        let phone = phone::normalize(raw_phone);
        if phone.is_empty() || !self.sessions().redeem_link_code(&phone, code, user_id).await {
            return Ok(LinkResult::InvalidCode);
        }

        let link = PhoneLink {
            phone: phone.clone(),
            user_id: user_id.to_string(),
            linked_at: Utc::now(),
        };
        if let Err(e) = self.handler.items().save_link(&link).await {
            self.sessions().unlink(&phone).await;
            return Err(e.into());
        }

        info!(phone = %phone::mask(&phone), user_id, "Linked WhatsApp number");

        self.notify(&phone, reply::link_confirmed());

        Ok(LinkResult::Linked)
    }

    /// Remove the link between `raw_phone` and `user_id`.
    ///
    /// Numbers linked to a different user are reported as [`UnlinkResult::NotLinked`].
    pub async fn unlink_phone(&self, raw_phone: &str, user_id: &str) -> Result<UnlinkResult> {
        let phone = phone::normalize(raw_phone);
        if phone.is_empty() || self.sessions().linked_user(&phone).await.as_deref() != Some(user_id) {
            return Ok(UnlinkResult::NotLinked);
        }

        self.handler.items().delete_link(&phone).await?;
        self.sessions().unlink(&phone).await;
        info!(phone = %phone::mask(&phone), user_id, "Unlinked WhatsApp number");

        self.notify(&phone, reply::unlinked());

        Ok(UnlinkResult::Unlinked)
    }

    fn notify(&self, phone: &str, body: String) {
        match &self.responder {
            Some(responder) => {
                responder.notify(phone, body);
            }
            None => warn!("No outbound sender configured; skipping notification"),
        }
    }
}
