//! Marginalia PDF Page Source
//!
//! Adapts PDF text extraction to the domain's `PageSource` seam. The
//! pipeline downstream only sees an ordered, never-empty sequence of
//! [`Page`](marginalia_domain::Page) values.
//!
//! Extraction itself is delegated to the pdf-extract crate; this adapter
//! is responsible for page boundaries, the degraded-extraction heuristics
//! and the never-empty invariant.

#![warn(missing_docs)]

mod error;
mod pdf;

pub use error::ExtractError;
pub use pdf::PdfSource;
