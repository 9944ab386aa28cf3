//! famli-core: shared building blocks for the Famli gateway
//!
//! Configuration loading, the common error type, and the item model with its
//! SQLite-backed repository.

pub mod config;
pub mod error;
pub mod item;

pub use config::{AuthConfig, Config, RateLimitSettings, ServerConfig, StorageConfig, WhatsAppConfig};
pub use error::{Error, Result};
pub use item::{Category, Item, ItemRepository, ItemStore, ItemType, NewItem, PhoneLink};
