//! Fyle Ingest: document field extraction, text collection, ingestion.

pub mod extract;
pub mod file;
pub mod ingest;
pub mod source;

pub use extract::{extract_all, normalize, DetectedDate, ExtractionResult};
pub use file::{read_source, FileContent};
pub use ingest::{content_hash, IngestOptions, Ingested, Ingester};
pub use source::{
    collect_text, pdf_text_layer, DocumentSource, NoRecognizer, PageImage, PageRecognizer,
};
