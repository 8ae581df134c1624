//! PDF page source implementation

use crate::ExtractError;
use marginalia_domain::traits::PageSource;
use marginalia_domain::Page;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Below this many non-whitespace characters the extraction is treated as
/// degraded (likely a scanned document); not an error, a logged routing fact.
const DEGRADED_TEXT_THRESHOLD: usize = 100;

/// Slice size, in characters, used when the extractor yields one
/// undifferentiated text blob without page boundaries
const FALLBACK_SLICE_CHARS: usize = 2048;

/// Page source backed by pdf-extract
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfSource;

impl PdfSource {
    /// Create a new PDF page source
    pub fn new() -> Self {
        Self
    }

    fn extract_raw(&self, data: &[u8]) -> Result<String, ExtractError> {
        pdf_extract::extract_text_from_mem(data).map_err(|e| {
            let msg = e.to_string();
            let lowered = msg.to_lowercase();
            if lowered.contains("encrypted") || lowered.contains("password") {
                ExtractError::PasswordProtected
            } else if lowered.contains("invalid")
                || lowered.contains("malformed")
                || lowered.contains("corrupt")
            {
                ExtractError::InvalidPdf(msg)
            } else {
                ExtractError::Extraction(msg)
            }
        })
    }
}

impl PageSource for PdfSource {
    type Error = ExtractError;

    fn pages(&self, path: &Path) -> Result<Vec<Page>, Self::Error> {
        let data = fs::read(path)?;
        let source_id = path.to_string_lossy().into_owned();

        let raw_text = self.extract_raw(&data)?;

        // pdf-extract reports page boundaries as form feeds; the declared
        // page count comes from the document catalog.
        let declared_pages = lopdf::Document::load_mem(&data)
            .map(|doc| doc.get_pages().len())
            .unwrap_or(1);

        let mut pages = if raw_text.contains('\x0C') {
            split_on_form_feeds(&source_id, &raw_text)
        } else {
            // No boundaries available: re-page the blob into fixed-size
            // slices so downstream batching still has page granularity.
            debug!(source = %source_id, "no page boundaries in extracted text, slicing");
            slice_into_pages(&source_id, &raw_text, FALLBACK_SLICE_CHARS)
        };

        while pages.len() < declared_pages {
            pages.push(Page::new(&source_id, pages.len(), ""));
        }

        let visible_chars: usize = pages
            .iter()
            .map(|p| p.text.chars().filter(|c| !c.is_whitespace()).count())
            .sum();
        if visible_chars < DEGRADED_TEXT_THRESHOLD {
            warn!(
                source = %source_id,
                visible_chars,
                "extraction yielded implausibly little text (scanned document?)"
            );
        }

        // Never-empty invariant: a document with no text still produces
        // one page.
        if pages.is_empty() {
            pages.push(Page::new(&source_id, 0, ""));
        }

        debug!(source = %source_id, pages = pages.len(), "extracted pages");
        Ok(pages)
    }
}

fn split_on_form_feeds(source_id: &str, text: &str) -> Vec<Page> {
    text.split('\x0C')
        .enumerate()
        .map(|(i, page_text)| Page::new(source_id, i, page_text))
        .collect()
}

fn slice_into_pages(source_id: &str, text: &str, slice_chars: usize) -> Vec<Page> {
    let mut pages = Vec::new();
    let mut buffer = String::new();
    let mut buffered_chars = 0usize;
    for ch in text.chars() {
        if buffered_chars >= slice_chars {
            pages.push(Page::new(source_id, pages.len(), buffer.as_str()));
            buffer.clear();
            buffered_chars = 0;
        }
        buffer.push(ch);
        buffered_chars += 1;
    }
    if !buffer.is_empty() {
        pages.push(Page::new(source_id, pages.len(), buffer.as_str()));
    }
    pages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_form_feeds() {
        let pages = split_on_form_feeds("doc.pdf", "one\x0Ctwo\x0Cthree");
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text, "one");
        assert_eq!(pages[2].text, "three");
        let numbers: Vec<usize> = pages.iter().map(|p| p.number).collect();
        assert_eq!(numbers, vec![0, 1, 2]);
    }

    #[test]
    fn test_slice_into_pages() {
        let text = "a".repeat(5000);
        let pages = slice_into_pages("doc.pdf", &text, 2048);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text.len(), 2048);
        assert_eq!(pages[2].text.len(), 5000 - 2 * 2048);
    }

    #[test]
    fn test_slice_counts_chars_not_bytes() {
        // Multi-byte text must slice on character boundaries with the
        // same page sizes as single-byte text.
        let text = "\u{6587}".repeat(3000);
        let pages = slice_into_pages("doc.pdf", &text, 2048);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].text.chars().count(), 2048);
        assert_eq!(pages[1].text.chars().count(), 952);
    }

    #[test]
    fn test_slice_empty_text() {
        assert!(slice_into_pages("doc.pdf", "", 2048).is_empty());
    }

    #[test]
    fn test_slice_preserves_order() {
        let text: String = (0..4096).map(|i| if i < 2048 { 'a' } else { 'b' }).collect();
        let pages = slice_into_pages("doc.pdf", &text, 2048);
        assert!(pages[0].text.chars().all(|c| c == 'a'));
        assert!(pages[1].text.chars().all(|c| c == 'b'));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let source = PdfSource::new();
        let result = source.pages(Path::new("/nonexistent/file.pdf"));
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
