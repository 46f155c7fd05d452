//! SQLite-backed store for categories and documents.
//!
//! One connection guarded by a mutex; every public method takes `&self` so
//! the store can be shared behind an `Arc` by the HTTP layer.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::schema::{META_SCHEMA_SQL, SCHEMA_SQL};
use crate::types::*;
use fyle_core::{CategoryCatalog, Error, Result};

const CATALOG_VERSION_KEY: &str = "catalog_version";

/// SQLite store for the document library.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::Database(e.to_string())
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

fn to_millis(ts: Option<DateTime<Utc>>) -> Option<i64> {
    ts.map(|t| t.timestamp_millis())
}

fn from_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::<Utc>::from_timestamp_millis)
}

impl SqliteStore {
    /// Open or create the SQLite store.
    ///
    /// `db_dir` is the directory (e.g., `data/db/`). The file will be `db_dir/fyle.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::Storage(e.to_string()))?;
        let db_path = db_dir.join("fyle.db");

        let conn = Connection::open(&db_path).map_err(db_err)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(db_err)?;

        let store = Self::from_connection(conn, db_path)?;
        info!(
            "SqliteStore initialized: {} documents, {} categories, path={}",
            store.count_documents()?,
            store.count_categories()?,
            store.db_path.display()
        );
        Ok(store)
    }

    /// Open a throwaway in-memory store.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(db_err)?;
        Self::from_connection(conn, PathBuf::from(":memory:"))
    }

    fn from_connection(conn: Connection, db_path: PathBuf) -> Result<Self> {
        let full_schema = format!("{}\n{}", SCHEMA_SQL, META_SCHEMA_SQL);
        conn.execute_batch(&full_schema)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
            db_path,
        })
    }

    // ---------------------------------------------------------------
    // Categories
    // ---------------------------------------------------------------

    /// Insert every catalog entry whose name is not stored yet.
    ///
    /// Returns the number of categories created. Existing categories keep
    /// their icon and color.
    pub fn seed_catalog(&self, catalog: &CategoryCatalog) -> Result<usize> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;
        let now = now_millis();
        let mut created = 0;
        {
            let mut stmt = tx
                .prepare_cached(
                    "INSERT OR IGNORE INTO categories (name, icon, color, created_at) \
                     VALUES (?1, ?2, ?3, ?4)",
                )
                .map_err(db_err)?;
            for spec in catalog.iter() {
                created += stmt
                    .execute(params![spec.name, spec.icon, spec.color, now])
                    .map_err(db_err)?;
            }
        }
        tx.execute(
            "INSERT INTO store_meta (key, value) VALUES (?1, ?2) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![CATALOG_VERSION_KEY, catalog.version.to_string()],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)?;

        if created > 0 {
            info!("Seeded {} categories (catalog v{})", created, catalog.version);
        } else {
            debug!("Category catalog v{} already seeded", catalog.version);
        }
        Ok(created)
    }

    /// Catalog version recorded by the last `seed_catalog` call.
    pub fn seeded_catalog_version(&self) -> Result<Option<u32>> {
        let conn = self.conn.lock();
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = ?1",
                params![CATALOG_VERSION_KEY],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)?;
        Ok(value.and_then(|v| v.parse().ok()))
    }

    /// Create a category. Fails with `DuplicateContent` if the name exists.
    pub fn create_category(&self, name: &str, icon: &str, color: &str) -> Result<Category> {
        let now = now_millis();
        let conn = self.conn.lock();
        let id = conn
            .prepare_cached(
                "INSERT INTO categories (name, icon, color, created_at) VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(db_err)?
            .insert(params![name, icon, color, now])
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    Error::DuplicateContent(format!("category {}", name))
                } else {
                    db_err(e)
                }
            })?;
        Ok(Category {
            id,
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            created_at: now,
        })
    }

    /// Fetch a category by name, creating it with the given chrome if missing.
    pub fn ensure_category(&self, name: &str, icon: &str, color: &str) -> Result<Category> {
        if let Some(existing) = self.find_category_by_name(name)? {
            return Ok(existing);
        }
        self.create_category(name, icon, color)
    }

    /// All categories in creation order.
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT * FROM categories ORDER BY id ASC")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| Ok(Self::row_to_category(row)))
            .map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    /// All categories with their document counts, in creation order.
    pub fn category_counts(&self) -> Result<Vec<CategoryWithCount>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT c.*, COUNT(dc.doc_id) AS document_count FROM categories c \
                 LEFT JOIN document_categories dc ON dc.category_id = c.id \
                 GROUP BY c.id ORDER BY c.id ASC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CategoryWithCount {
                    category: Self::row_to_category(row),
                    document_count: row.get("document_count").unwrap_or(0),
                })
            })
            .map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    pub fn get_category(&self, id: i64) -> Result<Option<Category>> {
        let conn = self.conn.lock();
        let category = conn
            .prepare_cached("SELECT * FROM categories WHERE id = ?1")
            .map_err(db_err)?
            .query_row(params![id], |row| Ok(Self::row_to_category(row)))
            .optional()
            .map_err(db_err);
        category
    }

    pub fn find_category_by_name(&self, name: &str) -> Result<Option<Category>> {
        let conn = self.conn.lock();
        let category = conn
            .prepare_cached("SELECT * FROM categories WHERE name = ?1 LIMIT 1")
            .map_err(db_err)?
            .query_row(params![name], |row| Ok(Self::row_to_category(row)))
            .optional()
            .map_err(db_err);
        category
    }

    pub fn count_categories(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
            .map_err(db_err)
    }

    // ---------------------------------------------------------------
    // Document CRUD
    // ---------------------------------------------------------------

    /// Insert a document and its category links. Returns the new ID.
    pub fn add_document(&self, doc: NewDocument) -> Result<i64> {
        let summary_json = serde_json::to_string(&doc.summary)?;
        let date_added = doc
            .date_added
            .map(|t| t.timestamp_millis())
            .unwrap_or_else(now_millis);

        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;
        let id = tx
            .prepare_cached(
                "INSERT INTO documents (name, summary_json, expiry_date, reminder_date, \
                 is_favorite, is_received, pdf_data, thumbnail, content_hash, date_added) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(db_err)?
            .insert(params![
                doc.name,
                summary_json,
                to_millis(doc.expiry_date),
                to_millis(doc.reminder_date),
                doc.is_favorite,
                doc.is_received,
                doc.pdf_data,
                doc.thumbnail,
                doc.content_hash,
                date_added,
            ])
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint") {
                    Error::DuplicateContent(doc.content_hash.clone().unwrap_or_default())
                } else {
                    db_err(e)
                }
            })?;
        Self::link_categories(&tx, id, &doc.category_ids)?;
        tx.commit().map_err(db_err)?;

        debug!("Added document {} ({:?})", id, doc.name);
        Ok(id)
    }

    /// Get a document by ID.
    pub fn get_document(&self, doc_id: i64) -> Result<Option<Document>> {
        let conn = self.conn.lock();
        let doc = conn
            .prepare_cached("SELECT * FROM documents WHERE id = ?1")
            .map_err(db_err)?
            .query_row(params![doc_id], |row| Ok(Self::row_to_document(row)))
            .optional()
            .map_err(db_err)?;
        match doc {
            Some(mut doc) => {
                doc.category_ids = Self::category_ids_for(&conn, doc.id)?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    /// Find a document by content hash.
    pub fn find_document_by_hash(&self, content_hash: &str) -> Result<Option<Document>> {
        let id: Option<i64> = {
            let conn = self.conn.lock();
            let id = conn
                .prepare_cached("SELECT id FROM documents WHERE content_hash = ?1")
                .map_err(db_err)?
                .query_row(params![content_hash], |row| row.get(0))
                .optional()
                .map_err(db_err)?;
            id
        };
        match id {
            Some(id) => self.get_document(id),
            None => Ok(None),
        }
    }

    /// Apply a partial update. Returns false if the document does not exist.
    pub fn update_document(&self, doc_id: i64, update: &DocumentUpdate) -> Result<bool> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction().map_err(db_err)?;

        let exists: Option<i64> = tx
            .query_row("SELECT id FROM documents WHERE id = ?1", params![doc_id], |row| {
                row.get(0)
            })
            .optional()
            .map_err(db_err)?;
        if exists.is_none() {
            return Ok(false);
        }

        if let Some(name) = &update.name {
            tx.execute("UPDATE documents SET name = ?1 WHERE id = ?2", params![name, doc_id])
                .map_err(db_err)?;
        }
        if let Some(summary) = &update.summary {
            let json = serde_json::to_string(summary)?;
            tx.execute(
                "UPDATE documents SET summary_json = ?1 WHERE id = ?2",
                params![json, doc_id],
            )
            .map_err(db_err)?;
        }
        if let Some(expiry) = update.expiry_date {
            tx.execute(
                "UPDATE documents SET expiry_date = ?1 WHERE id = ?2",
                params![to_millis(expiry), doc_id],
            )
            .map_err(db_err)?;
        }
        if let Some(reminder) = update.reminder_date {
            tx.execute(
                "UPDATE documents SET reminder_date = ?1 WHERE id = ?2",
                params![to_millis(reminder), doc_id],
            )
            .map_err(db_err)?;
        }
        if let Some(favorite) = update.is_favorite {
            tx.execute(
                "UPDATE documents SET is_favorite = ?1 WHERE id = ?2",
                params![favorite, doc_id],
            )
            .map_err(db_err)?;
        }
        if let Some(category_ids) = &update.category_ids {
            tx.execute("DELETE FROM document_categories WHERE doc_id = ?1", params![doc_id])
                .map_err(db_err)?;
            Self::link_categories(&tx, doc_id, category_ids)?;
        }

        tx.execute(
            "UPDATE documents SET updated_at = ?1 WHERE id = ?2",
            params![now_millis(), doc_id],
        )
        .map_err(db_err)?;
        tx.commit().map_err(db_err)?;
        Ok(true)
    }

    /// Set or clear the reminder date.
    pub fn set_reminder(&self, doc_id: i64, reminder: Option<DateTime<Utc>>) -> Result<bool> {
        self.update_document(
            doc_id,
            &DocumentUpdate {
                reminder_date: Some(reminder),
                ..Default::default()
            },
        )
    }

    pub fn set_favorite(&self, doc_id: i64, favorite: bool) -> Result<bool> {
        self.update_document(
            doc_id,
            &DocumentUpdate {
                is_favorite: Some(favorite),
                ..Default::default()
            },
        )
    }

    /// Delete a document and its category links (cascade).
    pub fn delete_document(&self, doc_id: i64) -> Result<bool> {
        let conn = self.conn.lock();
        let count = conn
            .execute("DELETE FROM documents WHERE id = ?1", params![doc_id])
            .map_err(db_err)?;
        Ok(count > 0)
    }

    /// Count total documents.
    pub fn count_documents(&self) -> Result<i64> {
        let conn = self.conn.lock();
        conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))
            .map_err(db_err)
    }

    // ---------------------------------------------------------------
    // Document queries
    // ---------------------------------------------------------------

    /// Documents matching a filter, newest first.
    pub fn list_documents(&self, filter: &DocumentFilter) -> Result<Vec<Document>> {
        let mut sql = String::from("SELECT * FROM documents WHERE 1 = 1");
        if filter.favorites {
            sql.push_str(" AND is_favorite = 1");
        }
        if filter.received {
            sql.push_str(" AND is_received = 1");
        }
        sql.push_str(" ORDER BY date_added DESC, id DESC");

        // SQLite's lower() only folds ASCII, so name matching happens here.
        let needle = filter
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare_cached(&sql).map_err(db_err)?;
        let docs: Vec<Document> = stmt
            .query_map([], |row| Ok(Self::row_to_document(row)))
            .map_err(db_err)?
            .filter_map(|r| r.ok())
            .filter(|doc| {
                needle
                    .as_deref()
                    .map_or(true, |n| doc.name.to_lowercase().contains(n))
            })
            .collect();
        drop(stmt);
        Self::attach_categories(&conn, docs)
    }

    /// Documents filed under a category, newest first.
    pub fn documents_in_category(&self, category_id: i64) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT d.* FROM documents d \
                 JOIN document_categories dc ON dc.doc_id = d.id \
                 WHERE dc.category_id = ?1 ORDER BY d.date_added DESC, d.id DESC",
            )
            .map_err(db_err)?;
        let docs: Vec<Document> = stmt
            .query_map(params![category_id], |row| Ok(Self::row_to_document(row)))
            .map_err(db_err)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);
        Self::attach_categories(&conn, docs)
    }

    /// Documents with a reminder date, soonest first.
    pub fn documents_with_reminders(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT * FROM documents WHERE reminder_date IS NOT NULL \
                 ORDER BY reminder_date ASC, id ASC",
            )
            .map_err(db_err)?;
        let docs: Vec<Document> = stmt
            .query_map([], |row| Ok(Self::row_to_document(row)))
            .map_err(db_err)?
            .filter_map(|r| r.ok())
            .collect();
        drop(stmt);
        Self::attach_categories(&conn, docs)
    }

    /// Documents received from a peer, newest first.
    pub fn received_documents(&self) -> Result<Vec<Document>> {
        self.list_documents(&DocumentFilter {
            received: true,
            ..Default::default()
        })
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    pub fn get_stats(&self) -> Result<StoreStats> {
        let total_documents = self.count_documents()?;
        let total_categories = self.count_categories()?;
        let catalog_version = self.seeded_catalog_version()?;

        let conn = self.conn.lock();
        let count = |sql: &str| -> Result<i64> {
            conn.query_row(sql, [], |row| row.get(0)).map_err(db_err)
        };
        let favorites = count("SELECT COUNT(*) FROM documents WHERE is_favorite = 1")?;
        let received = count("SELECT COUNT(*) FROM documents WHERE is_received = 1")?;
        let with_reminders =
            count("SELECT COUNT(*) FROM documents WHERE reminder_date IS NOT NULL")?;
        drop(conn);

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(StoreStats {
            total_documents,
            total_categories,
            favorites,
            received,
            with_reminders,
            catalog_version,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }

    // ---------------------------------------------------------------
    // Row Mapping Helpers
    // ---------------------------------------------------------------

    /// Link a document to categories. Unknown category IDs are rejected with
    /// `InvalidInput`, leaving the enclosing transaction to roll back.
    fn link_categories(conn: &Connection, doc_id: i64, category_ids: &[i64]) -> Result<()> {
        let mut known = conn
            .prepare_cached("SELECT 1 FROM categories WHERE id = ?1")
            .map_err(db_err)?;
        for category_id in category_ids {
            if !known.exists(params![category_id]).map_err(db_err)? {
                return Err(Error::InvalidInput(format!("unknown category {}", category_id)));
            }
        }

        let mut stmt = conn
            .prepare_cached(
                "INSERT OR IGNORE INTO document_categories (doc_id, category_id) VALUES (?1, ?2)",
            )
            .map_err(db_err)?;
        for category_id in category_ids {
            stmt.execute(params![doc_id, category_id]).map_err(db_err)?;
        }
        Ok(())
    }

    fn category_ids_for(conn: &Connection, doc_id: i64) -> Result<Vec<i64>> {
        let mut stmt = conn
            .prepare_cached(
                "SELECT category_id FROM document_categories WHERE doc_id = ?1 \
                 ORDER BY category_id ASC",
            )
            .map_err(db_err)?;
        let rows = stmt
            .query_map(params![doc_id], |row| row.get(0))
            .map_err(db_err)?;
        Ok(rows.filter_map(|r| r.ok()).collect())
    }

    fn attach_categories(conn: &Connection, mut docs: Vec<Document>) -> Result<Vec<Document>> {
        for doc in &mut docs {
            doc.category_ids = Self::category_ids_for(conn, doc.id)?;
        }
        Ok(docs)
    }

    fn row_to_category(row: &rusqlite::Row<'_>) -> Category {
        Category {
            id: row.get("id").unwrap_or(0),
            name: row.get("name").unwrap_or_default(),
            icon: row.get("icon").unwrap_or_default(),
            color: row.get("color").unwrap_or_default(),
            created_at: row.get("created_at").unwrap_or(0),
        }
    }

    fn row_to_document(row: &rusqlite::Row<'_>) -> Document {
        let summary: BTreeMap<String, String> = row
            .get::<_, Option<String>>("summary_json")
            .ok()
            .flatten()
            .and_then(|s| serde_json::from_str(&s).ok())
            .unwrap_or_default();
        Document {
            id: row.get("id").unwrap_or(0),
            name: row.get("name").unwrap_or_default(),
            summary,
            expiry_date: from_millis(row.get("expiry_date").ok().flatten()),
            reminder_date: from_millis(row.get("reminder_date").ok().flatten()),
            is_favorite: row.get("is_favorite").unwrap_or(false),
            is_received: row.get("is_received").unwrap_or(false),
            pdf_data: row.get("pdf_data").ok().flatten(),
            thumbnail: row.get("thumbnail").ok().flatten(),
            content_hash: row.get("content_hash").ok().flatten(),
            date_added: from_millis(row.get("date_added").ok()).unwrap_or_default(),
            updated_at: row.get("updated_at").ok().flatten(),
            category_ids: Vec::new(),
        }
    }
}
