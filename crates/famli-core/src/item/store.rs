//! Item storage implementation using SQLite

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, Row, params};
use tracing::{debug, info};

use crate::item::{Category, Item, ItemRepository, ItemType, NewItem, PhoneLink};
use crate::{Error, Result};

/// SQLite-based storage for items and phone links
pub struct ItemStore {
    conn: Mutex<Connection>,
}

impl ItemStore {
    /// Open (or create) the database at `db_path`
    pub fn new(db_path: &str) -> Result<Self> {
        debug!("Opening item database at: {}", db_path);

        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        info!("ItemStore initialized at {}", db_path);
        Ok(store)
    }

    /// Create an in-memory store (useful for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_tables()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Database("item store lock poisoned".to_string()))
    }

    fn init_tables(&self) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS items (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                item_type TEXT NOT NULL,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                media_url TEXT,
                source TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_items_user_id ON items(user_id)",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS phone_links (
                phone TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                linked_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    fn insert_item(&self, item: &Item) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO items (id, user_id, item_type, title, content, category, media_url, source, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                item.id,
                item.user_id,
                item.item_type.as_str(),
                item.title,
                item.content,
                item.category.as_str(),
                item.media_url,
                item.source,
                format_timestamp(&item.created_at),
            ],
        )?;
        Ok(())
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn item_from_row(row: &Row<'_>) -> rusqlite::Result<Item> {
    let item_type: String = row.get(2)?;
    let category: String = row.get(5)?;
    let created_at: String = row.get(8)?;

    Ok(Item {
        id: row.get(0)?,
        user_id: row.get(1)?,
        item_type: ItemType::from_slug(&item_type).unwrap_or(ItemType::Note),
        title: row.get(3)?,
        content: row.get(4)?,
        category: Category::from_slug(&category).unwrap_or(Category::Other),
        media_url: row.get(6)?,
        source: row.get(7)?,
        created_at: parse_timestamp(&created_at),
    })
}

#[async_trait]
impl ItemRepository for ItemStore {
    async fn create_item(&self, user_id: &str, item: NewItem) -> Result<Item> {
        let item = Item::new(user_id, item);
        self.insert_item(&item)?;
        debug!(item_id = %item.id, user_id, "Saved item");
        Ok(item)
    }

    async fn list_items(&self, user_id: &str, limit: usize) -> Result<Vec<Item>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, user_id, item_type, title, content, category, media_url, source, created_at
             FROM items
             WHERE user_id = ?1
             ORDER BY created_at DESC, rowid DESC
             LIMIT ?2",
        )?;

        let items = stmt
            .query_map(params![user_id, limit as i64], item_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        debug!("Listed {} items for user {}", items.len(), user_id);
        Ok(items)
    }

    async fn count_items(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM items WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    async fn save_link(&self, link: &PhoneLink) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO phone_links (phone, user_id, linked_at)
             VALUES (?1, ?2, ?3)",
            params![link.phone, link.user_id, format_timestamp(&link.linked_at)],
        )?;
        debug!(phone = %link.phone, user_id = %link.user_id, "Saved phone link");
        Ok(())
    }

    async fn delete_link(&self, phone: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM phone_links WHERE phone = ?1", params![phone])?;
        Ok(())
    }

    async fn load_links(&self) -> Result<Vec<PhoneLink>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT phone, user_id, linked_at FROM phone_links")?;

        let links = stmt
            .query_map([], |row| {
                let linked_at: String = row.get(2)?;
                Ok(PhoneLink {
                    phone: row.get(0)?,
                    user_id: row.get(1)?,
                    linked_at: parse_timestamp(&linked_at),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(links)
    }
}
