//! Data types for categories and documents.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A category row from the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub created_at: i64,
}

/// A category together with the number of documents filed under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryWithCount {
    #[serde(flatten)]
    pub category: Category,
    pub document_count: i64,
}

/// A document row from the database, with its category links.
///
/// Binary payloads are never serialized with the row; share export
/// encodes them separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub name: String,
    pub summary: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Utc>>,
    pub is_favorite: bool,
    pub is_received: bool,
    #[serde(skip)]
    pub pdf_data: Option<Vec<u8>>,
    #[serde(skip)]
    pub thumbnail: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    pub date_added: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
    pub category_ids: Vec<i64>,
}

/// Fields for inserting a document.
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub name: String,
    pub summary: BTreeMap<String, String>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub reminder_date: Option<DateTime<Utc>>,
    pub is_favorite: bool,
    pub is_received: bool,
    pub pdf_data: Option<Vec<u8>>,
    pub thumbnail: Option<Vec<u8>>,
    pub content_hash: Option<String>,
    /// Defaults to now.
    pub date_added: Option<DateTime<Utc>>,
    pub category_ids: Vec<i64>,
}

/// Partial update of a document. `None` leaves a field untouched.
///
/// The nested options on dates distinguish "leave as is" (`None`) from
/// "clear" (`Some(None)`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentUpdate {
    pub name: Option<String>,
    pub summary: Option<BTreeMap<String, String>>,
    #[serde(default, with = "double_option")]
    pub expiry_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, with = "double_option")]
    pub reminder_date: Option<Option<DateTime<Utc>>>,
    pub is_favorite: Option<bool>,
    pub category_ids: Option<Vec<i64>>,
}

/// Listing filter for documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilter {
    /// Case-insensitive substring match on the document name.
    #[serde(rename = "q")]
    pub query: Option<String>,
    #[serde(default)]
    pub favorites: bool,
    #[serde(default)]
    pub received: bool,
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_documents: i64,
    pub total_categories: i64,
    pub favorites: i64,
    pub received: i64,
    pub with_reminders: i64,
    pub catalog_version: Option<u32>,
    pub db_path: String,
    pub db_size_mb: f64,
}

mod double_option {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Option::<T>::deserialize(deserializer).map(Some)
    }
}
