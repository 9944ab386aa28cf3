//! famli-whatsapp: WhatsApp ingestion for Famli via the Twilio API
//!
//! Inbound webhook messages drive a small per-number dialogue that turns
//! texts, photos, audio, documents and locations into vault items.

pub mod bot;
pub mod classify;
pub mod command;
pub mod dialogue;
pub mod error;
pub mod phone;
pub mod reply;
pub mod responder;
pub mod session;
pub mod twilio;
pub mod webhook;

pub use bot::{LinkResult, UnlinkResult, WhatsAppBot};
pub use classify::{MessageKind, classify};
pub use command::Command;
pub use dialogue::{ConversationHandler, DialogueState, PendingItem};
pub use error::{Result, WhatsAppError};
pub use responder::{MessageSender, Responder};
pub use session::{Session, SessionStore};
pub use twilio::{IncomingMessage, TwilioClient};
