//! HTTP API handlers
//!
//! Account linking and WhatsApp channel status.

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use famli_whatsapp::{LinkResult, UnlinkResult, phone};

use crate::error::{ApiError, Result};
use crate::middleware::auth::AuthUser;
use crate::server::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

/// Link request payload
#[derive(Debug, Deserialize)]
pub struct LinkRequest {
    /// Code the user received on WhatsApp
    pub code: String,
    /// Number the code was issued to
    pub phone_number: String,
}

/// Link response payload
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub success: bool,
    /// Masked number
    pub phone_number: String,
}

/// Unlink request payload
#[derive(Debug, Deserialize)]
pub struct UnlinkRequest {
    pub phone_number: String,
}

/// Channel status payload
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub enabled: bool,
    /// Masked number
    pub phone_number: String,
    pub webhook_url: String,
}

// ============================================================================
// Handler functions
// ============================================================================

/// Health check endpoint
pub async fn health() -> &'static str {
    "OK"
}

/// WhatsApp channel status
pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        enabled: state.bot.is_enabled(),
        phone_number: phone::mask(state.bot.phone_number()),
        webhook_url: state.bot.webhook_url().to_string(),
    })
}

/// Link the caller's account to a WhatsApp number
pub async fn link(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<LinkRequest>,
) -> Result<Json<LinkResponse>> {
    let code = req.code.trim();
    let phone_number = phone::normalize(&req.phone_number);
    debug!(user_id = %user.user_id, phone = %phone::mask(&phone_number), "Link request");

    if code.is_empty() || phone_number.is_empty() {
        return Err(ApiError::InvalidRequest(
            "code and phone_number are required".to_string(),
        ));
    }

    match state.bot.link_phone(&phone_number, code, &user.user_id).await? {
        LinkResult::Linked => {
            info!(user_id = %user.user_id, "WhatsApp number linked via API");
            Ok(Json(LinkResponse {
                success: true,
                phone_number: phone::mask(&phone_number),
            }))
        }
        LinkResult::InvalidCode => Err(ApiError::InvalidRequest(
            "invalid or expired link code".to_string(),
        )),
    }
}

/// Remove the link between the caller's account and a WhatsApp number
pub async fn unlink(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<UnlinkRequest>,
) -> Result<Json<LinkResponse>> {
    let phone_number = phone::normalize(&req.phone_number);
    if phone_number.is_empty() {
        return Err(ApiError::InvalidRequest("phone_number is required".to_string()));
    }

    match state.bot.unlink_phone(&phone_number, &user.user_id).await? {
        UnlinkResult::Unlinked => {
            info!(user_id = %user.user_id, "WhatsApp number unlinked via API");
            Ok(Json(LinkResponse {
                success: true,
                phone_number: phone::mask(&phone_number),
            }))
        }
        UnlinkResult::NotLinked => Err(ApiError::InvalidRequest(
            "number is not linked to this account".to_string(),
        )),
    }
}
