//! Database schema SQL.

/// Core tables: categories, documents, and the many-to-many link.
///
/// All timestamps are Unix epoch milliseconds (UTC).
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    icon TEXT NOT NULL,
    color TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    summary_json TEXT,
    expiry_date INTEGER,
    reminder_date INTEGER,
    is_favorite INTEGER NOT NULL DEFAULT 0,
    is_received INTEGER NOT NULL DEFAULT 0,
    pdf_data BLOB,
    thumbnail BLOB,
    content_hash TEXT UNIQUE,
    date_added INTEGER NOT NULL,
    updated_at INTEGER
);

CREATE TABLE IF NOT EXISTS document_categories (
    doc_id INTEGER NOT NULL REFERENCES documents(id) ON DELETE CASCADE,
    category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
    PRIMARY KEY (doc_id, category_id)
);

CREATE INDEX IF NOT EXISTS idx_documents_hash ON documents(content_hash);
CREATE INDEX IF NOT EXISTS idx_documents_reminder ON documents(reminder_date);
CREATE INDEX IF NOT EXISTS idx_doc_categories_category ON document_categories(category_id);
"#;

/// Key/value table recording which catalog version was last seeded.
pub const META_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;
