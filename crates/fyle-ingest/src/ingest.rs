//! Document ingestion pipeline: source → text → extract → store.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::extract::{self, ExtractionResult};
use crate::file;
use crate::source::{self, DocumentSource, NoRecognizer, PageRecognizer};
use fyle_core::{CategoryCatalog, Error, ExtractorSettings, Result};
use fyle_store::{NewDocument, SqliteStore};

/// Caller-supplied values that take precedence over extracted ones.
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    pub name: Option<String>,
    pub category_ids: Option<Vec<i64>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_favorite: bool,
    pub pdf_data: Option<Vec<u8>>,
    pub thumbnail: Option<Vec<u8>>,
}

/// Outcome of a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct Ingested {
    pub doc_id: i64,
    pub extraction: ExtractionResult,
}

/// Handles document ingestion: text collection, extraction, and storage.
pub struct Ingester<'a> {
    store: &'a SqliteStore,
    catalog: &'a CategoryCatalog,
    settings: &'a ExtractorSettings,
}

impl<'a> Ingester<'a> {
    pub fn new(
        store: &'a SqliteStore,
        catalog: &'a CategoryCatalog,
        settings: &'a ExtractorSettings,
    ) -> Self {
        Self {
            store,
            catalog,
            settings,
        }
    }

    /// Run the extractor against the categories currently in the store.
    pub fn extract(&self, text: &str, now: DateTime<Utc>) -> Result<ExtractionResult> {
        let persisted = self.store.list_categories()?;
        Ok(extract::extract_all(text, self.catalog, &persisted, now, self.settings))
    }

    /// Collect text from page sources, then ingest it.
    pub fn ingest_source(
        &self,
        source: &DocumentSource,
        recognizer: &dyn PageRecognizer,
        options: IngestOptions,
        now: DateTime<Utc>,
    ) -> Result<Ingested> {
        let text = source::collect_text(source, recognizer);
        self.ingest_text(&text, options, now)
    }

    /// Ingest a text or PDF file. The document is named by its extracted
    /// title; a PDF keeps its bytes.
    pub fn ingest_file(&self, path: &Path, now: DateTime<Utc>) -> Result<Option<Ingested>> {
        let content = match file::read_source(path)? {
            Some(c) if c.source.text_layer.as_deref().is_some_and(|t| !t.trim().is_empty()) => c,
            _ => {
                debug!("No text extracted from {}", path.display());
                return Ok(None);
            }
        };
        let options = IngestOptions {
            pdf_data: content.pdf_data,
            ..Default::default()
        };
        self.ingest_source(&content.source, &NoRecognizer, options, now)
            .map(Some)
    }

    /// Extract fields from `text` and store the document.
    ///
    /// The reminder date is set to the expiry date whenever one is known.
    pub fn ingest_text(
        &self,
        text: &str,
        options: IngestOptions,
        now: DateTime<Utc>,
    ) -> Result<Ingested> {
        let content_hash = match &options.pdf_data {
            Some(bytes) if !bytes.is_empty() => Some(content_hash(bytes)),
            _ if !text.trim().is_empty() => {
                Some(content_hash(extract::normalize(text).as_bytes()))
            }
            _ => None,
        };

        if let Some(hash) = &content_hash {
            if self.store.find_document_by_hash(hash)?.is_some() {
                debug!("Duplicate content, skipping: {}", hash);
                return Err(Error::DuplicateContent(hash.clone()));
            }
        }

        let extraction = self.extract(text, now)?;

        let name = options
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| extraction.title.clone());
        let category_ids = options
            .category_ids
            .unwrap_or_else(|| extraction.categories.iter().map(|c| c.id).collect());
        let expiry_date = options.expiry_date.or(extraction.expiry_date);

        let doc_id = self.store.add_document(NewDocument {
            name,
            summary: extraction.summary.clone(),
            expiry_date,
            reminder_date: expiry_date,
            is_favorite: options.is_favorite,
            is_received: false,
            pdf_data: options.pdf_data,
            thumbnail: options.thumbnail,
            content_hash,
            date_added: Some(now),
            category_ids,
        })?;

        info!(
            "Ingested document {} ({} fields, {} categories, expiry={:?})",
            doc_id,
            extraction.summary.len(),
            extraction.categories.len(),
            expiry_date
        );

        Ok(Ingested { doc_id, extraction })
    }
}

/// Compute SHA-256 content hash.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn setup() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        store.seed_catalog(&CategoryCatalog::builtin()).unwrap();
        (store, dir)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 10, 0, 0).unwrap()
    }

    #[test]
    fn test_ingest_text_stores_extracted_fields() {
        let (store, _dir) = setup();
        let catalog = CategoryCatalog::builtin();
        let settings = ExtractorSettings::default();
        let ingester = Ingester::new(&store, &catalog, &settings);

        let text = "Car Insurance Policy\nPolicy Number: AX-19\nExpiry Date: 12/31/2026";
        let ingested = ingester.ingest_text(text, IngestOptions::default(), now()).unwrap();

        let doc = store.get_document(ingested.doc_id).unwrap().unwrap();
        assert_eq!(doc.name, "Policy");
        assert_eq!(doc.summary["Policy Number"], "AX-19");
        let expiry = Utc.with_ymd_and_hms(2026, 12, 31, 12, 0, 0).unwrap();
        assert_eq!(doc.expiry_date, Some(expiry));
        assert_eq!(doc.reminder_date, Some(expiry));

        // Vehicle and Insurance both score 2; Vehicle is declared first.
        let picked: Vec<&str> = ingested
            .extraction
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(picked, vec!["Vehicle", "Insurance"]);
        let vehicle = store.find_category_by_name("Vehicle").unwrap().unwrap();
        let insurance = store.find_category_by_name("Insurance").unwrap().unwrap();
        assert_eq!(doc.category_ids, vec![vehicle.id, insurance.id]);
    }

    #[test]
    fn test_options_override_extraction() {
        let (store, _dir) = setup();
        let catalog = CategoryCatalog::builtin();
        let settings = ExtractorSettings::default();
        let ingester = Ingester::new(&store, &catalog, &settings);
        let travel = store.find_category_by_name("Travel").unwrap().unwrap();

        let ingested = ingester
            .ingest_text(
                "Receipt\nTotal: 12.00",
                IngestOptions {
                    name: Some("Lunch".into()),
                    category_ids: Some(vec![travel.id]),
                    is_favorite: true,
                    ..Default::default()
                },
                now(),
            )
            .unwrap();

        let doc = store.get_document(ingested.doc_id).unwrap().unwrap();
        assert_eq!(doc.name, "Lunch");
        assert_eq!(doc.category_ids, vec![travel.id]);
        assert!(doc.is_favorite);
        assert!(doc.reminder_date.is_none());
        assert_eq!(ingested.extraction.title, "Receipt");
    }

    #[test]
    fn test_duplicate_detected() {
        let (store, _dir) = setup();
        let catalog = CategoryCatalog::builtin();
        let settings = ExtractorSettings::default();
        let ingester = Ingester::new(&store, &catalog, &settings);

        ingester.ingest_text("Warranty card\r\nSerial: 1", IngestOptions::default(), now()).unwrap();
        // Same text after line-ending normalization.
        let err = ingester
            .ingest_text("Warranty card\nSerial: 1", IngestOptions::default(), now())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateContent(_)));
    }

    #[test]
    fn test_empty_documents_are_not_deduplicated() {
        let (store, _dir) = setup();
        let catalog = CategoryCatalog::builtin();
        let settings = ExtractorSettings::default();
        let ingester = Ingester::new(&store, &catalog, &settings);

        let a = ingester.ingest_text("", IngestOptions::default(), now()).unwrap();
        let b = ingester.ingest_text("  ", IngestOptions::default(), now()).unwrap();
        assert_ne!(a.doc_id, b.doc_id);
        assert_eq!(a.extraction.title, "Document 10 Jan 2026");
    }

    #[test]
    fn test_ingest_file() {
        let (store, dir) = setup();
        let catalog = CategoryCatalog::builtin();
        let settings = ExtractorSettings::default();
        let ingester = Ingester::new(&store, &catalog, &settings);

        let path = dir.path().join("ticket.txt");
        std::fs::write(&path, "Flight booking\nPassenger: A. Lee").unwrap();
        let ingested = ingester.ingest_file(&path, now()).unwrap().unwrap();
        assert_eq!(ingested.extraction.categories[0].name, "Travel");
        let doc = store.get_document(ingested.doc_id).unwrap().unwrap();
        assert_eq!(doc.name, "Flight booking");

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "   ").unwrap();
        assert!(ingester.ingest_file(&empty, now()).unwrap().is_none());

        let scan = dir.path().join("scan.pdf");
        std::fs::write(&scan, b"%PDF-1.4").unwrap();
        assert!(ingester.ingest_file(&scan, now()).unwrap().is_none());
    }

    #[test]
    fn test_ingest_file_named_by_title() {
        let (store, dir) = setup();
        let catalog = CategoryCatalog::builtin();
        let settings = ExtractorSettings::default();
        let ingester = Ingester::new(&store, &catalog, &settings);

        let path = dir.path().join("scan-0042.txt");
        std::fs::write(&path, "Title: Boiler Service\nEngineer: P. Ode").unwrap();
        let ingested = ingester.ingest_file(&path, now()).unwrap().unwrap();
        let doc = store.get_document(ingested.doc_id).unwrap().unwrap();
        assert_eq!(doc.name, "Boiler Service");
        assert!(doc.pdf_data.is_none());
    }

    #[test]
    fn test_ingest_source_uses_recognized_pages() {
        let (store, _dir) = setup();
        let catalog = CategoryCatalog::builtin();
        let settings = ExtractorSettings::default();
        let ingester = Ingester::new(&store, &catalog, &settings);

        struct Utf8Recognizer;
        impl PageRecognizer for Utf8Recognizer {
            fn recognize(&self, page: &source::PageImage) -> Result<String> {
                Ok(String::from_utf8_lossy(&page.bytes).into_owned())
            }
        }

        let source = DocumentSource {
            text_layer: Some("Pet".into()),
            pages: vec![
                source::PageImage {
                    index: 0,
                    bytes: b"Vaccination Record\nPatient: Rex".to_vec(),
                },
                source::PageImage {
                    index: 1,
                    bytes: b"Next Due: June 1, 2026".to_vec(),
                },
            ],
        };
        let ingested = ingester
            .ingest_source(&source, &Utf8Recognizer, IngestOptions::default(), now())
            .unwrap();

        let doc = store.get_document(ingested.doc_id).unwrap().unwrap();
        assert_eq!(doc.summary["Patient"], "Rex");
        let expiry = Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        assert_eq!(doc.expiry_date, Some(expiry));

        // The same collected text is a duplicate.
        let err = ingester
            .ingest_source(&source, &Utf8Recognizer, IngestOptions::default(), now())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateContent(_)));
    }
}
