//! Marginalia Report Rendering
//!
//! Turns collected insight records into per-(document, case) artifacts.
//! Two renderers implement the domain's `InsightRenderer` trait:
//!
//! - [`HtmlRenderer`]: a standalone styled HTML page
//! - [`MarkdownRenderer`]: the same structure in portable markdown
//!
//! All extracted text crosses the rendering boundary through the
//! [`escape`] module, whose escape/unescape pairs round-trip
//! byte-exactly.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod escape;
pub mod html;
pub mod markdown;

pub use error::ReportError;
pub use escape::{escape_html, escape_markdown, unescape_html, unescape_markdown};
pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;
