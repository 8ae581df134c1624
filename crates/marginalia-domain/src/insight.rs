//! Insight module - the structured result of one completion call

/// A verbatim excerpt extracted from a source document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Verbatim text of the quote
    pub text: String,

    /// Context of the quote within the document
    pub context: String,

    /// Free-form locator, e.g. "Page 3, Paragraph 2"
    pub position: String,

    /// How the quote relates to the analysis case
    pub relation: String,

    /// Optional reference back into the case text this quote addresses
    pub issue_reference: Option<String>,
}

/// The structured result of one completion call: a contextual summary of
/// the analyzed text plus the quotes extracted from it.
///
/// One batch (or one whole-document request) yields exactly one record per
/// successful call. The ordered record list for a (document, case) pair
/// follows batch order, but batches that failed terminally are dropped, so
/// callers must not assume positional alignment after a failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsightRecord {
    /// General context of the analyzed source text
    pub general_context: String,

    /// How that context bears on the analysis case
    pub general_relation: String,

    /// Extracted quotes, in the order the completion service produced them
    pub quotes: Vec<Quote>,
}

impl InsightRecord {
    /// Whether the record carries neither summary text nor quotes.
    ///
    /// The completion service is allowed to return an empty record when a
    /// batch holds nothing relevant to the case.
    pub fn is_empty(&self) -> bool {
        self.general_context.is_empty() && self.general_relation.is_empty() && self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_record_is_empty() {
        assert!(InsightRecord::default().is_empty());
    }

    #[test]
    fn test_record_with_quotes_is_not_empty() {
        let record = InsightRecord {
            general_context: String::new(),
            general_relation: String::new(),
            quotes: vec![Quote {
                text: "quoted".to_string(),
                context: "ctx".to_string(),
                position: "Page 1".to_string(),
                relation: "rel".to_string(),
                issue_reference: None,
            }],
        };
        assert!(!record.is_empty());
    }
}
