//! Reading document sources from files on disk.

use std::path::Path;

use tracing::warn;

use crate::source::DocumentSource;
use fyle_core::{Error, Result};

/// File types the command line and importer understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// Plain text, typically the output of an external OCR pass.
    PlainText,
    /// A PDF; its embedded text layer is read.
    Pdf,
    Unknown,
}

impl FileType {
    /// Detect file type from extension.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "txt" | "text" | "md" | "ocr" => Self::PlainText,
            "pdf" => Self::Pdf,
            _ => Self::Unknown,
        }
    }
}

/// What a file on disk contributes to ingestion.
#[derive(Debug, Clone)]
pub struct FileContent {
    pub source: DocumentSource,
    /// Original bytes when the file is a PDF, kept with the document.
    pub pdf_data: Option<Vec<u8>>,
}

/// Read a file into a document source.
///
/// Returns `Ok(None)` when the file holds no readable text (binary content
/// or a PDF without a text layer).
pub fn read_source(path: &Path) -> Result<Option<FileContent>> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    match FileType::from_extension(ext) {
        FileType::PlainText => {
            let text = std::fs::read_to_string(path).map_err(Error::Io)?;
            Ok(Some(FileContent {
                source: DocumentSource::from_text(text),
                pdf_data: None,
            }))
        }
        FileType::Pdf => {
            let bytes = std::fs::read(path).map_err(Error::Io)?;
            let source = DocumentSource::from_pdf(&bytes);
            if source.text_layer.is_none() {
                warn!("No text layer available for {}", path.display());
                return Ok(None);
            }
            Ok(Some(FileContent {
                source,
                pdf_data: Some(bytes),
            }))
        }
        FileType::Unknown => match std::fs::read_to_string(path) {
            Ok(content) => {
                let control = content
                    .chars()
                    .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
                    .count();
                if control > content.len() / 10 {
                    Ok(None) // Likely binary
                } else {
                    Ok(Some(FileContent {
                        source: DocumentSource::from_text(content),
                        pdf_data: None,
                    }))
                }
            }
            Err(_) => Ok(None), // Not UTF-8
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_type() {
        assert_eq!(FileType::from_extension("TXT"), FileType::PlainText);
        assert_eq!(FileType::from_extension("pdf"), FileType::Pdf);
        assert_eq!(FileType::from_extension("bin"), FileType::Unknown);
    }

    #[test]
    fn test_read_plain_and_binary() {
        let dir = TempDir::new().unwrap();
        let text = dir.path().join("scan.txt");
        std::fs::write(&text, "Invoice\nTotal: 10").unwrap();
        let content = read_source(&text).unwrap().unwrap();
        assert_eq!(content.source.text_layer.as_deref(), Some("Invoice\nTotal: 10"));
        assert!(content.pdf_data.is_none());

        let binary = dir.path().join("blob.dat");
        std::fs::write(&binary, [0u8, 1, 2, 3, 4, 5, 6, 7]).unwrap();
        assert!(read_source(&binary).unwrap().is_none());

        assert!(read_source(&dir.path().join("missing.txt")).is_err());
    }

    #[test]
    fn test_pdf_without_text_layer() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("lease.pdf");
        std::fs::write(&pdf, b"%PDF-1.4").unwrap();
        // A text file next to the PDF is not consulted.
        std::fs::write(dir.path().join("lease.pdf.txt"), "Lease Agreement").unwrap();
        assert!(read_source(&pdf).unwrap().is_none());

        assert!(read_source(&dir.path().join("missing.pdf")).is_err());
    }
}
