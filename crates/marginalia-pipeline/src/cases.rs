//! Case definitions
//!
//! A case is a named statement of the situation the reader wants the
//! document examined against. Cases come from a user-supplied JSON file
//! when available, with a built-in set as the fallback.

use crate::error::PipelineError;
use tracing::debug;

/// One named case statement
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Short identifier, also used in output filenames
    pub name: String,

    /// The case statement sent as the task block of every prompt
    pub text: String,
}

/// An ordered collection of cases to run against each document
#[derive(Debug, Clone)]
pub struct CaseSet {
    cases: Vec<Case>,
}

impl CaseSet {
    /// The built-in fallback cases, used when no case file is given or
    /// the given one cannot be parsed
    pub fn builtin() -> Self {
        Self {
            cases: vec![
                Case {
                    name: "key_findings".to_string(),
                    text: "What are the key findings of this document, and what \
                           evidence supports each one?"
                        .to_string(),
                },
                Case {
                    name: "practical_guidance".to_string(),
                    text: "What concrete, actionable guidance does this document \
                           offer to a practitioner facing the situation it describes?"
                        .to_string(),
                },
                Case {
                    name: "limitations".to_string(),
                    text: "What limitations, caveats or open questions does this \
                           document acknowledge or imply?"
                        .to_string(),
                },
            ],
        }
    }

    /// Parse a case set from a JSON object mapping names to case text.
    ///
    /// The input is sanitized first: curly quotes become straight quotes
    /// and control characters are stripped, since case files are often
    /// pasted from word processors.
    pub fn from_json(raw: &str) -> Result<Self, PipelineError> {
        let cleaned = sanitize_json(raw);
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&cleaned)
            .map_err(|e| PipelineError::JsonParse(format!("Case file is not a JSON object: {}", e)))?;

        let mut cases = Vec::with_capacity(map.len());
        for (name, value) in map {
            let text = value.as_str().ok_or_else(|| {
                PipelineError::JsonParse(format!("Case '{}' is not a string", name))
            })?;
            cases.push(Case {
                name,
                text: text.to_string(),
            });
        }

        if cases.is_empty() {
            return Err(PipelineError::JsonParse(
                "Case file contains no cases".to_string(),
            ));
        }

        debug!(cases = cases.len(), "loaded case set");
        Ok(Self { cases })
    }

    /// The cases, in definition order
    pub fn cases(&self) -> &[Case] {
        &self.cases
    }

    /// Number of cases in the set
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Iterate over the cases in definition order
    pub fn iter(&self) -> std::slice::Iter<'_, Case> {
        self.cases.iter()
    }
}

/// Normalize quoting and strip characters that break JSON parsing
fn sanitize_json(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '\u{201C}' | '\u{201D}' => Some('"'),
            '\u{2018}' | '\u{2019}' => Some('\''),
            '\n' | '\t' | '\r' => Some(c),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_not_empty() {
        let set = CaseSet::builtin();
        assert!(!set.is_empty());
        for case in set.iter() {
            assert!(!case.name.is_empty());
            assert!(!case.text.is_empty());
        }
    }

    #[test]
    fn test_from_json_preserves_order() {
        let set = CaseSet::from_json(r#"{"zeta": "last first", "alpha": "second"}"#).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.cases()[0].name, "zeta");
        assert_eq!(set.cases()[1].name, "alpha");
    }

    #[test]
    fn test_from_json_with_curly_quotes() {
        // Word processors replace straight quotes on paste.
        let raw = "{\u{201C}contract\u{201D}: \u{201C}What obligations bind each party?\u{201D}}";
        let set = CaseSet::from_json(raw).unwrap();
        assert_eq!(set.cases()[0].name, "contract");
        assert_eq!(set.cases()[0].text, "What obligations bind each party?");
    }

    #[test]
    fn test_from_json_strips_control_characters() {
        let raw = "{\"a\": \"text\u{0001}here\"}";
        let set = CaseSet::from_json(raw).unwrap();
        assert_eq!(set.cases()[0].text, "texthere");
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(CaseSet::from_json(r#"["a", "b"]"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_string_value() {
        assert!(CaseSet::from_json(r#"{"a": 7}"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_empty_object() {
        assert!(CaseSet::from_json("{}").is_err());
    }
}
