//! Page module - one extracted slice of document text

/// A single extracted page of a source document.
///
/// Pages are produced by a [`PageSource`](crate::traits::PageSource) in
/// document order: `number` is unique and strictly increasing within a
/// document, and a source that yields no text at all still produces one
/// page with empty text, never an empty sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Identity of the source document (typically its filename)
    pub source_id: String,

    /// Zero-based position of the page within the document
    pub number: usize,

    /// Extracted text of the page; may be empty
    pub text: String,
}

impl Page {
    /// Create a new page
    pub fn new(source_id: impl Into<String>, number: usize, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            number,
            text: text.into(),
        }
    }

    /// Whether the page carries any non-whitespace text
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
