//! Webhook endpoints for receiving WhatsApp messages from Twilio

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{OriginalUri, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::{error, info, warn};

use famli_core::WhatsAppConfig;

use crate::dialogue::ConversationHandler;
use crate::error::{Result, WhatsAppError};
use crate::phone;
use crate::reply;
use crate::twilio::{IncomingMessage, SIGNATURE_HEADER, verify_signature};

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Body returned to the provider's reachability check
pub const VERIFICATION_BODY: &str = "Famli WhatsApp webhook is active";

/// How inbound requests are authenticated
#[derive(Debug, Clone, Default)]
pub struct SignatureCheck {
    pub enabled: bool,
    pub auth_token: String,
    /// Public URL Twilio signs; derived from the Host header when empty
    pub webhook_url: String,
}

impl SignatureCheck {
    pub fn from_config(config: &WhatsAppConfig) -> Self {
        let enabled = config.verify_signature && !config.auth_token.is_empty();
        if !enabled {
            warn!("Twilio webhook signature verification is disabled");
        }

        Self {
            enabled,
            auth_token: config.auth_token.clone(),
            webhook_url: config.webhook_url.clone(),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Authenticate a raw form body against the `X-Twilio-Signature` header.
    ///
    /// Runs before the body is interpreted, so unsigned requests never reach
    /// payload parsing.
    pub fn verify(&self, headers: &HeaderMap, uri: &axum::http::Uri, body: &[u8]) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or(WhatsAppError::SignatureVerificationFailed)?;
        let url = self
            .signed_url(headers, uri)
            .ok_or(WhatsAppError::SignatureVerificationFailed)?;
        let params: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
            .map_err(|_| WhatsAppError::SignatureVerificationFailed)?;

        if verify_signature(&self.auth_token, &url, &params, signature) {
            Ok(())
        } else {
            Err(WhatsAppError::SignatureVerificationFailed)
        }
    }

    fn signed_url(&self, headers: &HeaderMap, uri: &axum::http::Uri) -> Option<String> {
        if !self.webhook_url.is_empty() {
            return Some(self.webhook_url.clone());
        }

        let host = headers.get(header::HOST)?.to_str().ok()?;
        Some(format!("https://{}{}", host, uri))
    }
}

/// Webhook state
#[derive(Clone)]
pub struct WebhookState {
    pub handler: Arc<ConversationHandler>,
    pub signature: SignatureCheck,
}

/// Routes for the Twilio webhook
pub fn router(state: WebhookState) -> Router {
    Router::new()
        .route("/webhook", get(verify_endpoint).post(handle_webhook))
        .with_state(Arc::new(state))
}

/// Render a TwiML envelope with an optional single reply message
pub fn twiml(reply: Option<&str>) -> String {
    match reply {
        Some(text) => format!(
            "{}<Response><Message>{}</Message></Response>",
            XML_DECLARATION,
            quick_xml::escape::escape(text)
        ),
        None => format!("{}<Response></Response>", XML_DECLARATION),
    }
}

fn twiml_response(reply: Option<&str>) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        twiml(reply),
    )
        .into_response()
}

/// Reachability check used by the provider
async fn verify_endpoint() -> &'static str {
    VERIFICATION_BODY
}

/// Decode the Twilio form payload
pub fn parse_message(body: &[u8]) -> Result<IncomingMessage> {
    serde_urlencoded::from_bytes(body).map_err(|e| WhatsAppError::InvalidPayload(e.to_string()))
}

/// Handle an incoming WhatsApp webhook
async fn handle_webhook(
    State(state): State<Arc<WebhookState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if let Err(e) = state.signature.verify(&headers, &uri, &body) {
        warn!("Rejected webhook: {}", e);
        return StatusCode::FORBIDDEN.into_response();
    }

    let message = match parse_message(&body) {
        Ok(message) => message,
        Err(e) => {
            error!("{}", e);
            return twiml_response(Some(&reply::apology()));
        }
    };

    info!(
        sid = %message.message_sid,
        from = %phone::mask(&phone::normalize(&message.from)),
        "Received WhatsApp message"
    );

    let reply = state.handler.handle(&message).await;
    twiml_response(reply.as_deref())
}
