//! Twilio API client for WhatsApp

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use tracing::{debug, info};

use famli_core::WhatsAppConfig;

use crate::error::{Result, WhatsAppError};
use crate::phone;
use crate::responder::MessageSender;

type HmacSha1 = Hmac<Sha1>;

/// Header Twilio puts the request signature in
pub const SIGNATURE_HEADER: &str = "x-twilio-signature";

/// Twilio API client
#[derive(Debug, Clone)]
pub struct TwilioClient {
    client: Client,
    account_sid: String,
    auth_token: String,
    phone_number: String,
    base_url: String,
}

/// Incoming WhatsApp message from the Twilio webhook
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IncomingMessage {
    #[serde(default)]
    pub message_sid: String,
    #[serde(default)]
    pub account_sid: String,
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub num_media: u32,
    #[serde(rename = "MediaUrl0", default)]
    pub media_url: Option<String>,
    #[serde(rename = "MediaContentType0", default)]
    pub media_content_type: Option<String>,
    #[serde(default)]
    pub profile_name: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Outgoing message payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SendMessagePayload {
    from: String,
    to: String,
    body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    media_url: Option<String>,
}

#[derive(Deserialize)]
struct SendMessageResponse {
    sid: String,
}

impl TwilioClient {
    /// Build a client from channel settings, with the configured request timeout
    pub fn from_config(config: &WhatsAppConfig) -> Result<Self> {
        if config.account_sid.is_empty() || config.auth_token.is_empty() {
            return Err(WhatsAppError::CredentialsNotSet);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WhatsAppError::Config(e.to_string()))?;

        Ok(Self {
            client,
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            phone_number: config.phone_number.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Sender number this client posts from
    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// Send a WhatsApp message, returning the Twilio message SID
    pub async fn send_message(&self, to: &str, body: &str, media_url: Option<&str>) -> Result<String> {
        info!("Sending WhatsApp message to {}", phone::mask(&phone::normalize(to)));

        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );

        let payload = SendMessagePayload {
            from: phone::whatsapp_address(&self.phone_number),
            to: phone::whatsapp_address(to),
            body: body.to_string(),
            media_url: media_url.map(str::to_string),
        };

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(WhatsAppError::Api(format!(
                "Failed to send message: {} - {}",
                status, text
            )));
        }

        let result: SendMessageResponse = response.json().await?;
        debug!(sid = %result.sid, "Message accepted by Twilio");
        Ok(result.sid)
    }
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send(&self, phone: &str, body: &str, media_url: Option<&str>) -> Result<String> {
        self.send_message(phone, body, media_url).await
    }
}

fn signed_payload(url: &str, params: &[(String, String)]) -> String {
    let mut sorted: Vec<&(String, String)> = params.iter().collect();
    sorted.sort();

    let mut data = String::from(url);
    for (key, value) in sorted {
        data.push_str(key);
        data.push_str(value);
    }
    data
}

/// Twilio request signature: base64(HMAC-SHA1(auth_token, url + sorted key/value pairs))
pub fn compute_signature(auth_token: &str, url: &str, params: &[(String, String)]) -> String {
    let mut mac = match HmacSha1::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::new(),
    };
    mac.update(signed_payload(url, params).as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Check an `X-Twilio-Signature` value in constant time
pub fn verify_signature(
    auth_token: &str,
    url: &str,
    params: &[(String, String)],
    signature: &str,
) -> bool {
    let Ok(expected) = STANDARD.decode(signature.trim()) else {
        return false;
    };

    let mut mac = match HmacSha1::new_from_slice(auth_token.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(signed_payload(url, params).as_bytes());
    mac.verify_slice(&expected).is_ok()
}
