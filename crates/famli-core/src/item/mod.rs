//! Vault items and phone links
//!
//! Items are the records created by the WhatsApp save flow. Storage is SQLite
//! behind the [`ItemRepository`] trait so callers can swap in other backends.

mod store;
mod types;

use async_trait::async_trait;

pub use store::ItemStore;
pub use types::{Category, Item, ItemType, NewItem, PhoneLink};

use crate::Result;

/// Persistence operations the gateway needs
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a new item for `user_id` and return the stored record
    async fn create_item(&self, user_id: &str, item: NewItem) -> Result<Item>;

    /// Most recent items for a user, newest first
    async fn list_items(&self, user_id: &str, limit: usize) -> Result<Vec<Item>>;

    async fn count_items(&self, user_id: &str) -> Result<usize>;

    async fn save_link(&self, link: &PhoneLink) -> Result<()>;

    async fn delete_link(&self, phone: &str) -> Result<()>;

    async fn load_links(&self) -> Result<Vec<PhoneLink>>;
}
