//! Markdown report rendering
//!
//! A portable sibling of the HTML artifact with the same section
//! structure, for contexts where a browser is unwelcome.

use crate::error::ReportError;
use crate::escape::escape_markdown;
use marginalia_domain::{InsightRecord, InsightRenderer};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Renders insight records as a markdown document
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl MarkdownRenderer {
    /// Create a markdown renderer
    pub fn new() -> Self {
        Self
    }

    fn document(
        &self,
        records: &[InsightRecord],
        source_id: &str,
        case_text: &str,
        model: &str,
    ) -> String {
        let mut doc = String::new();

        let _ = write!(
            doc,
            "# Cases and Quotes\n\n\
             **Source File:** {}\n\n\
             **Model:** {}\n\n\
             **Case:** {}\n",
            escape_markdown(source_id),
            escape_markdown(model),
            escape_markdown(case_text),
        );

        for (i, record) in records.iter().enumerate() {
            let _ = write!(
                doc,
                "\n## Insight Set {}\n\n\
                 ### General Context\n\n{}\n\n\
                 ### Relevance\n\n{}\n\n\
                 ### Extracted Quotes\n",
                i + 1,
                escape_markdown(&record.general_context),
                escape_markdown(&record.general_relation),
            );

            for quote in &record.quotes {
                let issue = quote.issue_reference.as_deref().unwrap_or("");
                let _ = write!(
                    doc,
                    "\n> {}\n\n\
                     {}\n\n\
                     **Position:** {}\n\n\
                     **Issue Reference:** {}\n\n\
                     **Relevance:** {}\n",
                    escape_markdown(&quote.text),
                    escape_markdown(&quote.context),
                    escape_markdown(&quote.position),
                    escape_markdown(issue),
                    escape_markdown(&quote.relation),
                );
            }
        }

        doc
    }
}

impl InsightRenderer for MarkdownRenderer {
    type Error = ReportError;

    fn render(
        &self,
        records: &[InsightRecord],
        source_id: &str,
        case_text: &str,
        model: &str,
        output_path: &Path,
    ) -> Result<PathBuf, Self::Error> {
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let doc = self.document(records, source_id, case_text, model);
        fs::write(output_path, doc)?;
        info!(path = %output_path.display(), records = records.len(), "wrote markdown report");
        Ok(output_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_domain::Quote;

    fn record() -> InsightRecord {
        InsightRecord {
            general_context: "Study of *distributed* teams".to_string(),
            general_relation: "Bears on alignment".to_string(),
            quotes: vec![Quote {
                text: "Rituals anchor the team.".to_string(),
                context: "Findings".to_string(),
                position: "Page 2".to_string(),
                relation: "Suggests a checkpoint".to_string(),
                issue_reference: None,
            }],
        }
    }

    #[test]
    fn test_render_writes_escaped_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");

        MarkdownRenderer::new()
            .render(&[record()], "doc.pdf", "case", "gpt-4o-mini", &path)
            .unwrap();

        let md = fs::read_to_string(&path).unwrap();
        assert!(md.starts_with("# Cases and Quotes"));
        assert!(md.contains("## Insight Set 1"));
        // Emphasis markers in extracted text arrive escaped.
        assert!(md.contains("\\*distributed\\*"));
        assert!(md.contains("> Rituals anchor the team"));
    }

    #[test]
    fn test_missing_issue_reference_renders_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.md");

        MarkdownRenderer::new()
            .render(&[record()], "doc.pdf", "case", "model", &path)
            .unwrap();

        let md = fs::read_to_string(&path).unwrap();
        assert!(md.contains("**Issue Reference:** \n"));
    }
}
