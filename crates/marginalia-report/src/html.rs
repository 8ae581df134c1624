//! HTML report rendering

use crate::error::ReportError;
use crate::escape::escape_html;
use marginalia_domain::{InsightRecord, InsightRenderer};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const STYLE: &str = r#"
body {
    font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
    line-height: 1.6;
    max-width: 1200px;
    margin: 0 auto;
    padding: 20px;
    background-color: #f5f5f5;
}
.header {
    background-color: #fff;
    padding: 20px;
    border-radius: 8px;
    box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    margin-bottom: 20px;
}
.header h1 {
    color: #2c3e50;
    margin: 0;
    padding-bottom: 10px;
}
.meta-info {
    color: #666;
    font-size: 0.9em;
}
.insight-container {
    background-color: #fff;
    padding: 20px;
    border-radius: 8px;
    box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    margin-bottom: 20px;
}
.context-box {
    background-color: #f8f9fa;
    padding: 15px;
    border-left: 4px solid #4a90e2;
    margin-bottom: 20px;
}
.quote-box {
    background-color: #fff;
    padding: 15px;
    border: 1px solid #e0e0e0;
    border-radius: 4px;
    margin-bottom: 15px;
}
.quote-text {
    font-style: italic;
    color: #2c3e50;
    border-left: 3px solid #4a90e2;
    padding-left: 10px;
    margin: 10px 0;
}
.quote-position {
    color: #666;
    font-size: 0.9em;
    margin-top: 5px;
}
.quote-relation {
    background-color: #f0f7ff;
    padding: 10px;
    border-radius: 4px;
    margin-top: 10px;
}
h2, h3 {
    color: #2c3e50;
}
"#;

/// Renders insight records as a standalone styled HTML page
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    /// Create an HTML renderer
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
        let mut page = String::new();

        // write! on a String cannot fail.
        let _ = write!(
            page,
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>Cases and Quotes</title>\n\
             <style>{STYLE}</style>\n\
             </head>\n\
             <body>\n\
             <div class=\"header\">\n\
             <h1>Cases and Quotes</h1>\n\
             <div class=\"meta-info\">\n\
             <p><strong>Source File:</strong> {}</p>\n\
             <p><strong>Model:</strong> {}</p>\n\
             <p><strong>Case:</strong> {}</p>\n\
             </div>\n\
             </div>\n",
            escape_html(source_id),
            escape_html(model),
            escape_html(case_text),
        );

        for (i, record) in records.iter().enumerate() {
            let _ = write!(
                page,
                "<div class=\"insight-container\">\n\
                 <h2>Insight Set {}</h2>\n\
                 <div class=\"context-box\">\n\
                 <h3>General Context</h3>\n\
                 <p>{}</p>\n\
                 <h3>Relevance</h3>\n\
                 <p>{}</p>\n\
                 </div>\n\
                 <h3>Extracted Quotes</h3>\n",
                i + 1,
                escape_html(&record.general_context),
                escape_html(&record.general_relation),
            );

            for quote in &record.quotes {
                let issue = quote.issue_reference.as_deref().unwrap_or("");
                let _ = write!(
                    page,
                    "<div class=\"quote-box\">\n\
                     <p class=\"quote-text\"><strong>{}</strong></p>\n\
                     <div class=\"quote-context\">{}</div>\n\
                     <div class=\"quote-position\"><strong>Position:</strong> {}</div>\n\
                     <div class=\"quote-issue\"><strong>Issue Reference:</strong> {}</div>\n\
                     <div class=\"quote-relation\"><strong>Relevance:</strong> {}</div>\n\
                     </div>\n",
                    escape_html(&quote.text),
                    escape_html(&quote.context),
                    escape_html(&quote.position),
                    escape_html(issue),
                    escape_html(&quote.relation),
                );
            }

            page.push_str("</div>\n");
        }

        page.push_str("</body>\n</html>\n");
        page
    }
}

impl InsightRenderer for HtmlRenderer {
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
        let page = self.document(records, source_id, case_text, model);
        fs::write(output_path, page)?;
        info!(path = %output_path.display(), records = records.len(), "wrote HTML report");
        Ok(output_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_domain::Quote;

    fn record() -> InsightRecord {
        InsightRecord {
            general_context: "A study of <distributed> teams".to_string(),
            general_relation: "Relevant to \"alignment\"".to_string(),
            quotes: vec![Quote {
                text: "Rituals & routines anchor the team.".to_string(),
                context: "Findings".to_string(),
                position: "Page 2".to_string(),
                relation: "Suggests a checkpoint".to_string(),
                issue_reference: Some("drift".to_string()),
            }],
        }
    }

    #[test]
    fn test_render_writes_escaped_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");

        let written = HtmlRenderer::new()
            .render(&[record()], "doc.pdf", "the <case>", "gpt-4o-mini", &path)
            .unwrap();

        let html = fs::read_to_string(&written).unwrap();
        assert!(html.contains("Insight Set 1"));
        assert!(html.contains("&lt;distributed&gt;"));
        assert!(html.contains("Rituals &amp; routines"));
        assert!(html.contains("the &lt;case&gt;"));
        assert!(!html.contains("<distributed>"));
    }

    #[test]
    fn test_render_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/report.html");

        assert!(HtmlRenderer::new()
            .render(&[record()], "doc.pdf", "case", "model", &path)
            .is_ok());
        assert!(path.exists());
    }

    #[test]
    fn test_render_with_no_records_still_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.html");

        HtmlRenderer::new()
            .render(&[], "doc.pdf", "case", "model", &path)
            .unwrap();

        let html = fs::read_to_string(&path).unwrap();
        assert!(html.contains("doc.pdf"));
        assert!(!html.contains("Insight Set"));
    }
}
