//! Text collection from page sources.
//!
//! A captured document is either a PDF with an embedded text layer, a stack
//! of scanned page images, or both. The text layer is preferred; when it is
//! missing or too thin, the first pages are run through a recognizer.

use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use fyle_core::{Error, Result};

/// Minimum number of non-whitespace characters for a text layer to be used.
pub const MIN_TEXT_LAYER_CHARS: usize = 20;

/// Number of leading pages sent to the recognizer.
pub const MAX_RECOGNIZED_PAGES: usize = 2;

/// One rendered page image.
#[derive(Debug, Clone)]
pub struct PageImage {
    pub index: usize,
    pub bytes: Vec<u8>,
}

/// Everything known about a document before text collection.
#[derive(Debug, Clone, Default)]
pub struct DocumentSource {
    /// Text extracted from an embedded PDF text layer, if any.
    pub text_layer: Option<String>,
    pub pages: Vec<PageImage>,
}

impl DocumentSource {
    /// A source holding already-recognized text.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text_layer: Some(text.into()),
            pages: Vec::new(),
        }
    }

    /// A source backed by PDF bytes. Only the embedded text layer is read;
    /// rendering pages for recognition is left to the capturing client.
    pub fn from_pdf(bytes: &[u8]) -> Self {
        Self {
            text_layer: pdf_text_layer(bytes),
            pages: Vec::new(),
        }
    }
}

/// Read the embedded text layer of a PDF.
///
/// Returns `None` for scans without text and for bytes that do not parse
/// as a PDF. Page breaks become blank lines.
pub fn pdf_text_layer(bytes: &[u8]) -> Option<String> {
    // pdf-extract panics on some malformed files.
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));
    let text = match extracted {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("Failed to read PDF text layer: {}", e);
            return None;
        }
        Err(_) => {
            warn!("PDF parser panicked, treating document as unreadable");
            return None;
        }
    };

    let text = text.replace('\x0C', "\n\n");
    if text.trim().is_empty() {
        debug!("PDF has no text layer ({} bytes)", bytes.len());
        return None;
    }
    Some(text)
}

/// Optical character recognition over one page image.
pub trait PageRecognizer: Sync {
    fn recognize(&self, page: &PageImage) -> Result<String>;
}

/// Recognizer for hosts without an OCR engine: every page fails, so only
/// text layers contribute.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRecognizer;

impl PageRecognizer for NoRecognizer {
    fn recognize(&self, page: &PageImage) -> Result<String> {
        Err(Error::Ingest(format!(
            "no recognizer available for page {}",
            page.index
        )))
    }
}

/// Collect the text for a document.
///
/// Recognition runs one scoped thread per page; results are joined in page
/// order. Pages that fail to recognize contribute nothing. A thin text
/// layer is kept ahead of the recognized text.
pub fn collect_text(source: &DocumentSource, recognizer: &dyn PageRecognizer) -> String {
    let mut thin_layer = None;
    if let Some(layer) = &source.text_layer {
        let visible = layer.chars().filter(|c| !c.is_whitespace()).count();
        if visible >= MIN_TEXT_LAYER_CHARS {
            debug!("Using text layer ({} visible chars)", visible);
            return layer.clone();
        }
        debug!("Text layer too thin ({} visible chars), recognizing pages", visible);
        if visible > 0 {
            thin_layer = Some(layer.trim().to_string());
        }
    }

    let pages: Vec<&PageImage> = source.pages.iter().take(MAX_RECOGNIZED_PAGES).collect();
    let results: Vec<Option<String>> = std::thread::scope(|scope| {
        let handles: Vec<_> = pages
            .iter()
            .map(|page| scope.spawn(move || recognizer.recognize(page)))
            .collect();
        handles
            .into_iter()
            .zip(pages.iter())
            .map(|(handle, page)| match handle.join() {
                Ok(Ok(text)) => Some(text),
                Ok(Err(e)) => {
                    warn!("Recognition failed for page {}: {}", page.index, e);
                    None
                }
                Err(_) => {
                    warn!("Recognizer panicked on page {}", page.index);
                    None
                }
            })
            .collect()
    });

    thin_layer
        .into_iter()
        .chain(results.into_iter().flatten())
        .filter(|t| !t.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Treats page bytes as UTF-8 text; empty pages fail.
    struct Utf8Recognizer {
        calls: AtomicUsize,
    }

    impl Utf8Recognizer {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl PageRecognizer for Utf8Recognizer {
        fn recognize(&self, page: &PageImage) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if page.bytes.is_empty() {
                return Err(Error::Ingest(format!("blank page {}", page.index)));
            }
            Ok(String::from_utf8_lossy(&page.bytes).into_owned())
        }
    }

    fn page(index: usize, text: &str) -> PageImage {
        PageImage {
            index,
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_prefers_text_layer() {
        let recognizer = Utf8Recognizer::new();
        let source = DocumentSource {
            text_layer: Some("Invoice 4471 for consulting services".into()),
            pages: vec![page(0, "scanned")],
        };
        assert_eq!(collect_text(&source, &recognizer), "Invoice 4471 for consulting services");
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_thin_layer_recognizes_first_two_pages_in_order() {
        let recognizer = Utf8Recognizer::new();
        let source = DocumentSource {
            text_layer: Some("  p. 1  ".into()),
            pages: vec![page(0, "first"), page(1, "second"), page(2, "third")],
        };
        assert_eq!(collect_text(&source, &recognizer), "p. 1\nfirst\nsecond");
        assert_eq!(recognizer.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_pages_contribute_nothing() {
        let recognizer = Utf8Recognizer::new();
        let source = DocumentSource {
            text_layer: None,
            pages: vec![page(0, ""), page(1, "Policy No: 9")],
        };
        assert_eq!(collect_text(&source, &recognizer), "Policy No: 9");
    }

    #[test]
    fn test_nothing_to_read() {
        let recognizer = Utf8Recognizer::new();
        assert_eq!(collect_text(&DocumentSource::default(), &recognizer), "");
    }

    #[test]
    fn test_thin_layer_survives_without_pages() {
        let source = DocumentSource::from_text("Exp 03/2027");
        assert_eq!(collect_text(&source, &NoRecognizer), "Exp 03/2027");

        let blank = DocumentSource::from_text(" \n\t ");
        assert_eq!(collect_text(&blank, &NoRecognizer), "");
    }

    #[test]
    fn test_no_recognizer_keeps_thin_layer_only() {
        let source = DocumentSource {
            text_layer: Some("Lease".into()),
            pages: vec![page(0, "Landlord: J. Smith")],
        };
        assert_eq!(collect_text(&source, &NoRecognizer), "Lease");
    }

    #[test]
    fn test_pdf_text_layer_rejects_non_pdf() {
        assert!(pdf_text_layer(b"This is not a PDF").is_none());
        assert!(pdf_text_layer(b"").is_none());

        let source = DocumentSource::from_pdf(b"%PDF-1.4 truncated");
        assert!(source.text_layer.is_none());
        assert!(source.pages.is_empty());
    }
}
