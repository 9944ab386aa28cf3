//! Session management for WhatsApp conversations
//!
//! Sessions, phone links and pending link codes share one lock. Nothing in
//! here performs I/O, so the lock is only ever held for map operations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::dialogue::DialogueState;

/// How long a link code stays redeemable
pub const DEFAULT_LINK_CODE_TTL_MINUTES: i64 = 10;

/// A single conversation, keyed by normalised phone number
#[derive(Debug, Clone)]
pub struct Session {
    pub phone: String,
    pub user_id: Option<String>,
    pub state: DialogueState,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(phone: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            phone: phone.into(),
            user_id: None,
            state: DialogueState::Idle,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    pub fn is_linked(&self) -> bool {
        self.user_id.is_some()
    }
}

#[derive(Debug, Clone)]
struct LinkCode {
    code: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct StoreInner {
    sessions: HashMap<String, Session>,
    links: HashMap<String, String>,
    link_codes: HashMap<String, LinkCode>,
}

/// In-memory store for sessions and phone-to-user links
#[derive(Debug, Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
    link_code_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Create a new session store
    pub fn new() -> Self {
        Self::with_link_code_ttl(Duration::minutes(DEFAULT_LINK_CODE_TTL_MINUTES))
    }

    pub fn with_link_code_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner::default())),
            link_code_ttl: ttl,
        }
    }

    pub fn link_code_ttl(&self) -> Duration {
        self.link_code_ttl
    }

    /// Get or create the session for a phone number
    pub async fn get_or_create(&self, phone: &str) -> Session {
        {
            let inner = self.inner.read().await;
            if let Some(session) = inner.sessions.get(phone) {
                return session.clone();
            }
        }

        let mut inner = self.inner.write().await;
        inner
            .sessions
            .entry(phone.to_string())
            .or_insert_with(|| {
                debug!(phone, "Creating WhatsApp session");
                Session::new(phone)
            })
            .clone()
    }

    /// Overwrite the stored session
    pub async fn save(&self, session: Session) {
        let mut inner = self.inner.write().await;
        inner.sessions.insert(session.phone.clone(), session);
    }

    /// User linked to a phone, if any
    pub async fn linked_user(&self, phone: &str) -> Option<String> {
        self.inner.read().await.links.get(phone).cloned()
    }

    pub async fn link(&self, phone: &str, user_id: &str) {
        let mut inner = self.inner.write().await;
        inner.links.insert(phone.to_string(), user_id.to_string());
        if let Some(session) = inner.sessions.get_mut(phone) {
            session.user_id = Some(user_id.to_string());
        }
    }

    /// Drop a link. Any save flow in progress is abandoned with it.
    pub async fn unlink(&self, phone: &str) -> bool {
        let mut inner = self.inner.write().await;
        if let Some(session) = inner.sessions.get_mut(phone) {
            session.user_id = None;
            session.state = DialogueState::Idle;
        }
        inner.links.remove(phone).is_some()
    }

    /// Issue a fresh 6-digit link code for a phone, replacing any earlier one.
    ///
    /// Codes that expired without being redeemed are dropped here.
    pub async fn issue_link_code(&self, phone: &str) -> String {
        let now = Utc::now();
        let code = format!("{:06}", uuid::Uuid::new_v4().as_u128() % 1_000_000);
        let entry = LinkCode {
            code: code.clone(),
            expires_at: now + self.link_code_ttl,
        };

        let mut inner = self.inner.write().await;
        inner.link_codes.retain(|_, pending| pending.expires_at > now);
        inner.link_codes.insert(phone.to_string(), entry);
        code
    }

    /// Redeem a link code and, when valid, link the phone to `user_id`.
    ///
    /// Codes are single use. Expired codes are dropped.
    pub async fn redeem_link_code(&self, phone: &str, code: &str, user_id: &str) -> bool {
        let mut inner = self.inner.write().await;

        let Some(pending) = inner.link_codes.get(phone) else {
            return false;
        };

        if pending.expires_at <= Utc::now() {
            inner.link_codes.remove(phone);
            return false;
        }

        if pending.code != code.trim() {
            return false;
        }

        inner.link_codes.remove(phone);
        inner.links.insert(phone.to_string(), user_id.to_string());
        if let Some(session) = inner.sessions.get_mut(phone) {
            session.user_id = Some(user_id.to_string());
        }
        true
    }
}
