//! Export documents to share payloads and import received payloads.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::types::*;
use fyle_core::catalog::{DEFAULT_COLOR, DEFAULT_ICON};
use fyle_core::{Error, Result};
use fyle_store::{NewDocument, SqliteStore};

/// Moves documents between the store and the share payload format.
pub struct ShareExchange<'a> {
    store: &'a SqliteStore,
}

impl<'a> ShareExchange<'a> {
    pub fn new(store: &'a SqliteStore) -> Self {
        Self { store }
    }

    /// Build the payload for a stored document. `Ok(None)` if it does not exist.
    pub fn export(&self, doc_id: i64) -> Result<Option<SharedDocument>> {
        let Some(doc) = self.store.get_document(doc_id)? else {
            return Ok(None);
        };

        let mut category_names = Vec::with_capacity(doc.category_ids.len());
        for id in &doc.category_ids {
            if let Some(category) = self.store.get_category(*id)? {
                category_names.push(category.name);
            }
        }

        Ok(Some(SharedDocument {
            summary_data: SharedDocument::encode_summary(&doc.summary)?,
            name: doc.name,
            pdf_data: doc.pdf_data.unwrap_or_default(),
            expiry_date: doc.expiry_date,
            reminder_date: doc.reminder_date,
            is_favorite: doc.is_favorite,
            date_added: doc.date_added,
            thumbnail: doc.thumbnail,
            category_names,
        }))
    }

    /// Export a document and write the payload to `exports_dir`.
    pub fn write_export(&self, doc_id: i64, exports_dir: &Path) -> Result<Option<ExportedPayload>> {
        let Some(shared) = self.export(doc_id)? else {
            return Ok(None);
        };
        let bytes = shared.to_bytes()?;
        let transfer_id = uuid::Uuid::new_v4().to_string();
        let path = exports_dir.join(format!("{}.{}", transfer_id, PAYLOAD_EXTENSION));
        std::fs::create_dir_all(exports_dir)?;
        std::fs::write(&path, &bytes)?;

        let payload = ExportedPayload {
            transfer_id,
            path: path.to_string_lossy().to_string(),
            fingerprint: fingerprint(&bytes),
            size: bytes.len(),
        };
        info!(
            "Exported document {} ({} bytes, fingerprint={})",
            doc_id,
            payload.size,
            &payload.fingerprint[..12]
        );
        Ok(Some(payload))
    }

    /// Parse raw payload bytes and import them.
    pub fn import_bytes(&self, bytes: &[u8]) -> Result<ImportOutcome> {
        let shared = SharedDocument::from_slice(bytes)?;
        let mut outcome = self.import(shared)?;
        outcome.fingerprint = fingerprint(bytes);
        Ok(outcome)
    }

    /// Store a received document.
    ///
    /// The document is marked received; categories it names that do not
    /// exist yet are created with the default icon and color. Importing the
    /// same PDF twice fails with `DuplicateContent`.
    pub fn import(&self, shared: SharedDocument) -> Result<ImportOutcome> {
        if shared.name.trim().is_empty() {
            return Err(Error::Share("document name is empty".into()));
        }

        let summary = match (&shared.summary_data, shared.summary()) {
            (Some(_), None) => {
                warn!("Ignoring undecodable summary on received {:?}", shared.name);
                Default::default()
            }
            (_, summary) => summary.unwrap_or_default(),
        };

        let content_hash = (!shared.pdf_data.is_empty()).then(|| fingerprint(&shared.pdf_data));
        if let Some(hash) = &content_hash {
            if self.store.find_document_by_hash(hash)?.is_some() {
                debug!("Received document already stored: {}", hash);
                return Err(Error::DuplicateContent(hash.clone()));
            }
        }

        let mut created_categories = Vec::new();
        let mut category_ids = Vec::with_capacity(shared.category_names.len());
        for name in &shared.category_names {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            let category = match self.store.find_category_by_name(name)? {
                Some(existing) => existing,
                None => {
                    created_categories.push(name.to_string());
                    self.store.create_category(name, DEFAULT_ICON, DEFAULT_COLOR)?
                }
            };
            if !category_ids.contains(&category.id) {
                category_ids.push(category.id);
            }
        }

        let payload_fingerprint = content_hash.clone().unwrap_or_default();

        let doc_id = self.store.add_document(NewDocument {
            name: shared.name,
            summary,
            expiry_date: shared.expiry_date,
            reminder_date: shared.reminder_date,
            is_favorite: shared.is_favorite,
            is_received: true,
            pdf_data: Some(shared.pdf_data),
            thumbnail: shared.thumbnail,
            content_hash,
            date_added: Some(shared.date_added),
            category_ids,
        })?;

        info!(
            "Imported received document {} ({} new categories)",
            doc_id,
            created_categories.len()
        );

        Ok(ImportOutcome {
            doc_id,
            created_categories,
            fingerprint: payload_fingerprint,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use fyle_core::CategoryCatalog;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn setup() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path().join("db")).unwrap();
        store.seed_catalog(&CategoryCatalog::builtin()).unwrap();
        (store, dir)
    }

    fn stored_document(store: &SqliteStore) -> i64 {
        let home = store.find_category_by_name("Home").unwrap().unwrap();
        let mut summary = BTreeMap::new();
        summary.insert("Landlord".to_string(), "J. Smith".to_string());
        store
            .add_document(NewDocument {
                name: "Lease".into(),
                summary,
                expiry_date: Some(Utc.with_ymd_and_hms(2027, 1, 1, 12, 0, 0).unwrap()),
                pdf_data: Some(b"%PDF lease".to_vec()),
                thumbnail: Some(vec![0x89, 0x50]),
                content_hash: Some("local".into()),
                category_ids: vec![home.id],
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn test_export() {
        let (store, _dir) = setup();
        let id = stored_document(&store);
        let shared = ShareExchange::new(&store).export(id).unwrap().unwrap();

        assert_eq!(shared.name, "Lease");
        assert_eq!(shared.pdf_data, b"%PDF lease");
        assert_eq!(shared.category_names, vec!["Home".to_string()]);
        assert_eq!(shared.summary().unwrap()["Landlord"], "J. Smith");
        assert!(ShareExchange::new(&store).export(999).unwrap().is_none());
    }

    #[test]
    fn test_export_then_import_on_peer() {
        let (sender, _a) = setup();
        let id = stored_document(&sender);
        let bytes = ShareExchange::new(&sender)
            .export(id)
            .unwrap()
            .unwrap()
            .to_bytes()
            .unwrap();

        let (receiver, _b) = setup();
        let outcome = ShareExchange::new(&receiver).import_bytes(&bytes).unwrap();
        assert!(outcome.created_categories.is_empty());
        assert_eq!(outcome.fingerprint, fingerprint(&bytes));

        let doc = receiver.get_document(outcome.doc_id).unwrap().unwrap();
        assert!(doc.is_received);
        assert_eq!(doc.name, "Lease");
        assert_eq!(doc.summary["Landlord"], "J. Smith");
        assert_eq!(doc.thumbnail, Some(vec![0x89, 0x50]));
        let home = receiver.find_category_by_name("Home").unwrap().unwrap();
        assert_eq!(doc.category_ids, vec![home.id]);

        let err = ShareExchange::new(&receiver).import_bytes(&bytes).unwrap_err();
        assert!(matches!(err, Error::DuplicateContent(_)));
    }

    #[test]
    fn test_import_creates_missing_categories() {
        let (store, _dir) = setup();
        let shared = SharedDocument {
            name: "Vet record".into(),
            pdf_data: b"%PDF vet".to_vec(),
            summary_data: Some(b"not json".to_vec()),
            expiry_date: None,
            reminder_date: None,
            is_favorite: false,
            date_added: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            thumbnail: None,
            category_names: vec!["Pets".into(), "Medical".into(), "Pets".into(), " ".into()],
        };
        let outcome = ShareExchange::new(&store).import(shared).unwrap();
        assert_eq!(outcome.created_categories, vec!["Pets".to_string()]);

        let pets = store.find_category_by_name("Pets").unwrap().unwrap();
        assert_eq!(pets.icon, "tray.full.fill");
        assert_eq!(pets.color, "gray");

        let doc = store.get_document(outcome.doc_id).unwrap().unwrap();
        assert_eq!(doc.category_ids.len(), 2);
        assert!(doc.summary.is_empty());
    }

    #[test]
    fn test_duplicate_import_creates_no_categories() {
        let (store, _dir) = setup();
        let shared = |categories: Vec<String>| SharedDocument {
            name: "Boat registration".into(),
            pdf_data: b"%PDF boat".to_vec(),
            summary_data: None,
            expiry_date: None,
            reminder_date: None,
            is_favorite: false,
            date_added: Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
            thumbnail: None,
            category_names: categories,
        };
        let exchange = ShareExchange::new(&store);
        exchange.import(shared(vec!["Vehicle".into()])).unwrap();
        let before = store.count_categories().unwrap();

        let err = exchange.import(shared(vec!["Boats".into()])).unwrap_err();
        assert!(matches!(err, Error::DuplicateContent(_)));
        assert_eq!(store.count_categories().unwrap(), before);
        assert!(store.find_category_by_name("Boats").unwrap().is_none());
    }

    #[test]
    fn test_import_rejects_malformed() {
        let (store, _dir) = setup();
        let exchange = ShareExchange::new(&store);
        assert!(matches!(exchange.import_bytes(b"{"), Err(Error::Share(_))));

        let blank = br#"{"name":"  ","pdfData":"","dateAdded":"2026-01-02T03:04:05Z"}"#;
        assert!(matches!(exchange.import_bytes(blank), Err(Error::Share(_))));
    }

    #[test]
    fn test_write_export() {
        let (store, dir) = setup();
        let id = stored_document(&store);
        let exports = dir.path().join("exports");
        let payload = ShareExchange::new(&store)
            .write_export(id, &exports)
            .unwrap()
            .unwrap();

        let written = std::fs::read(&payload.path).unwrap();
        assert_eq!(written.len(), payload.size);
        assert_eq!(fingerprint(&written), payload.fingerprint);
        assert!(payload.path.ends_with(".fyle.json"));
    }
}
