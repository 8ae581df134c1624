//! Prompt assembly for insight extraction
//!
//! Turns either a full page sequence or one batch's text, plus the case
//! statement, into an ordered [`Prompt`]. Context payloads are wrapped in
//! explicit textual delimiters (`<PAGE>`, `<CONTEXT>`, `<ISSUE>`) so the
//! completion service can tell structural roles apart purely from the
//! text stream.
//!
//! The instruction template is an immutable value: every assembly starts
//! from a fresh `Prompt` carrying a copy of it, so blocks can never
//! accumulate across calls.

use marginalia_domain::{Page, Prompt};

/// Default extraction instructions sent as the first block of every prompt
pub const DEFAULT_INSTRUCTION: &str = "\
Given parts of a source document, help a person navigate their situation and \
resolve the issue described below. You must extract insights as a structured \
record using the schema provided.
Next to the focal content, you might be given more context to help you extract insights.
Extract insights only from the focal content.
Copy the text of each quote verbatim and give a position locator when the \
document provides one.
If there are no insights, you can leave the fields empty.
";

/// Assembles prompts from an owned instruction template
#[derive(Debug, Clone)]
pub struct PromptAssembler {
    instruction: String,
}

impl PromptAssembler {
    /// Create an assembler with the default instruction template
    pub fn new() -> Self {
        Self {
            instruction: DEFAULT_INSTRUCTION.to_string(),
        }
    }

    /// Create an assembler with a custom instruction template
    pub fn with_instruction(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
        }
    }

    /// Assemble a full-document prompt: one context block per page.
    pub fn full_document(&self, pages: &[Page], case_text: &str) -> Prompt {
        let mut prompt = Prompt::from_instruction(&self.instruction);
        for page in pages {
            prompt.push_context(format!("<PAGE>\n{}</PAGE>\n", page.text));
        }
        prompt.with_task(format!("<ISSUE>\n{}\n", case_text))
    }

    /// Assemble a batched prompt: a single context block for the batch text.
    pub fn batched(&self, batch_text: &str, case_text: &str) -> Prompt {
        let mut prompt = Prompt::from_instruction(&self.instruction);
        prompt.push_context(format!("<CONTEXT>\n{}</CONTEXT>\n", batch_text));
        prompt.with_task(format!("<ISSUE>\n{}\n", case_text))
    }
}

impl Default for PromptAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marginalia_domain::Role;

    fn pages() -> Vec<Page> {
        vec![
            Page::new("doc.pdf", 0, "first page"),
            Page::new("doc.pdf", 1, "second page"),
        ]
    }

    #[test]
    fn test_full_document_shape() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.full_document(&pages(), "the issue");

        assert_eq!(prompt.count_role(Role::Instruction), 1);
        assert_eq!(prompt.count_role(Role::Context), 2);
        assert_eq!(prompt.count_role(Role::Task), 1);
        assert_eq!(prompt.blocks()[0].role, Role::Instruction);
        assert_eq!(prompt.blocks().last().unwrap().role, Role::Task);
    }

    #[test]
    fn test_page_delimiters() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.full_document(&pages(), "the issue");

        assert!(prompt.blocks()[1].content.starts_with("<PAGE>\n"));
        assert!(prompt.blocks()[1].content.contains("first page"));
        assert!(prompt.blocks()[1].content.contains("</PAGE>"));
    }

    #[test]
    fn test_batched_delimiters() {
        let assembler = PromptAssembler::new();
        let prompt = assembler.batched("joined batch text", "the issue");

        assert_eq!(prompt.count_role(Role::Context), 1);
        assert!(prompt.blocks()[1].content.starts_with("<CONTEXT>\n"));
        assert!(prompt.blocks()[1].content.contains("joined batch text"));
        assert!(prompt.task().unwrap().starts_with("<ISSUE>\n"));
        assert!(prompt.task().unwrap().contains("the issue"));
    }

    #[test]
    fn test_template_is_not_contaminated_across_calls() {
        // Repeated assembly must never accumulate blocks in the shared
        // template: every prompt has exactly one instruction and one task.
        let assembler = PromptAssembler::new();
        for _ in 0..5 {
            let prompt = assembler.batched("text", "issue");
            assert_eq!(prompt.count_role(Role::Instruction), 1);
            assert_eq!(prompt.count_role(Role::Task), 1);
            assert_eq!(prompt.blocks().len(), 3);
        }

        let full = assembler.full_document(&pages(), "issue");
        assert_eq!(full.count_role(Role::Instruction), 1);
        assert_eq!(full.blocks().len(), 4);
    }

    #[test]
    fn test_custom_instruction() {
        let assembler = PromptAssembler::with_instruction("be terse");
        let prompt = assembler.batched("text", "issue");
        assert_eq!(prompt.instruction(), "be terse");
    }
}
