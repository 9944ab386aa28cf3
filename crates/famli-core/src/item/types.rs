//! Item type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of content an item holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemType {
    Note,
    Image,
    Audio,
    Document,
    Location,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Note => "note",
            ItemType::Image => "image",
            ItemType::Audio => "audio",
            ItemType::Document => "document",
            ItemType::Location => "location",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "note" => Some(ItemType::Note),
            "image" => Some(ItemType::Image),
            "audio" => Some(ItemType::Audio),
            "document" => Some(ItemType::Document),
            "location" => Some(ItemType::Location),
            _ => None,
        }
    }
}

/// Vault category shown in the save menu.
///
/// Variant order is the numbered menu order (1-5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Documents,
    Health,
    Finance,
    Memories,
    Other,
}

impl Category {
    /// All categories in menu order
    pub const ALL: [Category; 5] = [
        Category::Documents,
        Category::Health,
        Category::Finance,
        Category::Memories,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Documents => "documents",
            Category::Health => "health",
            Category::Finance => "finance",
            Category::Memories => "memories",
            Category::Other => "other",
        }
    }

    /// Label shown to users
    pub fn label(&self) -> &'static str {
        match self {
            Category::Documents => "Documentos",
            Category::Health => "Saúde",
            Category::Finance => "Finanças",
            Category::Memories => "Memórias",
            Category::Other => "Outros",
        }
    }

    /// 1-based position in the menu
    pub fn menu_number(&self) -> usize {
        Self::ALL
            .iter()
            .position(|c| c == self)
            .map(|i| i + 1)
            .unwrap_or(Self::ALL.len())
    }

    pub fn from_menu_number(n: usize) -> Option<Self> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_str() == slug)
    }
}

/// Values needed to create an item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub item_type: ItemType,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub media_url: Option<String>,
    /// Where the item came from (e.g. "whatsapp")
    pub source: String,
}

/// A stored vault item
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub media_url: Option<String>,
    pub source: String,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Build a new item for a user with a fresh id
    pub fn new(user_id: impl Into<String>, new_item: NewItem) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            item_type: new_item.item_type,
            title: new_item.title,
            content: new_item.content,
            category: new_item.category,
            media_url: new_item.media_url,
            source: new_item.source,
            created_at: Utc::now(),
        }
    }
}

/// Association between a WhatsApp number and a Famli user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneLink {
    pub phone: String,
    pub user_id: String,
    pub linked_at: DateTime<Utc>,
}
