//! Authentication middleware
//!
//! Famli sessions are HS256 JSON Web Tokens. Protected routes require
//! `Authorization: Bearer <token>`; tokens close to expiry are renewed and the
//! fresh token is returned in the `X-Renewed-Token` response header.

use axum::{
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware::Next,
    response::Response,
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use famli_core::AuthConfig;

use crate::error::ApiError;
use crate::server::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Response header carrying a renewed token
pub const RENEWED_TOKEN_HEADER: &str = "x-renewed-token";

const JWT_ALGORITHM: &str = "HS256";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing bearer token")]
    Missing,

    #[error("malformed token")]
    Malformed,

    #[error("unsupported token algorithm")]
    UnsupportedAlgorithm,

    #[error("invalid token signature")]
    BadSignature,

    #[error("token expired")]
    Expired,

    #[error("authentication is not configured")]
    NotConfigured,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    #[serde(default)]
    typ: Option<String>,
}

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Authenticated user, available to handlers as an extension
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
}

/// HS256 token issuer and verifier
#[derive(Clone)]
pub struct JwtAuth {
    secret: Vec<u8>,
    ttl: Duration,
    renew_window: Duration,
}

impl std::fmt::Debug for JwtAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtAuth")
            .field("ttl", &self.ttl)
            .field("renew_window", &self.renew_window)
            .finish_non_exhaustive()
    }
}

impl JwtAuth {
    pub fn new(secret: &str, ttl: Duration, renew_window: Duration) -> Self {
        Self {
            secret: secret.as_bytes().to_vec(),
            ttl,
            renew_window,
        }
    }

    /// Build from `[auth]` settings. Lifetimes must be positive and fit a
    /// timestamp.
    pub fn from_config(config: &AuthConfig) -> famli_core::Result<Self> {
        let ttl = config_hours("token_ttl_hours", config.token_ttl_hours)?;
        let renew_window = config_hours("renew_window_hours", config.renew_window_hours)?;
        Ok(Self::new(&config.jwt_secret, ttl, renew_window))
    }

    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    fn mac(&self) -> Result<HmacSha256, AuthError> {
        if !self.is_configured() {
            return Err(AuthError::NotConfigured);
        }
        HmacSha256::new_from_slice(&self.secret).map_err(|_| AuthError::NotConfigured)
    }

    /// Issue a token for `user_id` valid for the configured lifetime
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        self.encode(&Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(self.ttl)
                .ok_or(AuthError::Malformed)?
                .timestamp(),
        })
    }

    /// Sign arbitrary claims
    pub fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        let header = Header {
            alg: JWT_ALGORITHM.to_string(),
            typ: Some("JWT".to_string()),
        };

        let header = serde_json::to_vec(&header).map_err(|_| AuthError::Malformed)?;
        let claims = serde_json::to_vec(claims).map_err(|_| AuthError::Malformed)?;
        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(claims)
        );

        let mut mac = self.mac()?;
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{}.{}", signing_input, signature))
    }

    /// Verify signature, algorithm and expiry
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let mut parts = token.trim().split('.');
        let (Some(header_segment), Some(payload), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::Malformed);
        };

        let header: Header = decode_segment(header_segment)?;
        if header.alg != JWT_ALGORITHM {
            return Err(AuthError::UnsupportedAlgorithm);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| AuthError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(format!("{}.{}", header_segment, payload).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::BadSignature)?;

        let claims: Claims = decode_segment(payload)?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(AuthError::Expired);
        }

        Ok(claims)
    }

    /// Whether a valid token is close enough to expiry to be replaced
    pub fn needs_renewal(&self, claims: &Claims) -> bool {
        claims.exp - Utc::now().timestamp() < self.renew_window.num_seconds()
    }
}

fn config_hours(name: &str, hours: i64) -> famli_core::Result<Duration> {
    Duration::try_hours(hours)
        .filter(|d| *d > Duration::zero())
        .filter(|d| Utc::now().checked_add_signed(*d).is_some())
        .ok_or_else(|| famli_core::Error::Config(format!("auth.{} out of range: {}", name, hours)))
}

fn decode_segment<T: for<'de> Deserialize<'de>>(segment: &str) -> Result<T, AuthError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| AuthError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| AuthError::Malformed)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// JWT authentication middleware
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(&request).ok_or(AuthError::Missing)?;
    let claims = state.auth.verify(token)?;
    let renew = state.auth.needs_renewal(&claims);

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub.clone(),
    });

    let mut response = next.run(request).await;

    if renew {
        match state.auth.issue(&claims.sub) {
            Ok(token) => {
                if let Ok(value) = HeaderValue::from_str(&token) {
                    debug!(user_id = %claims.sub, "Renewed session token");
                    response.headers_mut().insert(RENEWED_TOKEN_HEADER, value);
                }
            }
            Err(e) => debug!("Token renewal skipped: {}", e),
        }
    }

    Ok(response)
}
