//! Prompt module - ordered, role-tagged message blocks
//!
//! A [`Prompt`] is the unit handed to a completion client: one instruction
//! block, any number of context blocks, and one task block, in that order.
//! The construction API keeps the ordering invariant intact no matter how
//! the blocks are added, and there is deliberately no way to share a
//! partially built prompt between calls: assemblers start from a fresh
//! value every time, so blocks can never accumulate across invocations.

use std::fmt;

/// Structural role of a message block within a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Fixed extraction instructions; exactly one per prompt, always first
    Instruction,
    /// Document text the completion service should read
    Context,
    /// The analysis case the service should address; always last
    Task,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Instruction => write!(f, "instruction"),
            Role::Context => write!(f, "context"),
            Role::Task => write!(f, "task"),
        }
    }
}

/// One role-tagged block of prompt text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    /// Structural role of this block
    pub role: Role,

    /// Block text
    pub content: String,
}

/// An ordered sequence of message blocks forming one completion request.
///
/// Invariants, enforced by construction:
/// - exactly one [`Role::Instruction`] block, and it is first;
/// - at most one [`Role::Task`] block, and it is last;
/// - context blocks sit between the two in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    blocks: Vec<MessageBlock>,
}

impl Prompt {
    /// Start a fresh prompt from an instruction.
    ///
    /// The instruction text is copied into the new prompt; callers holding
    /// a shared template are never handed a reference back into it.
    pub fn from_instruction(instruction: impl Into<String>) -> Self {
        Self {
            blocks: vec![MessageBlock {
                role: Role::Instruction,
                content: instruction.into(),
            }],
        }
    }

    /// Append a context block.
    ///
    /// Context always lands before the task block, even when the task was
    /// set first.
    pub fn push_context(&mut self, content: impl Into<String>) {
        let block = MessageBlock {
            role: Role::Context,
            content: content.into(),
        };
        match self.blocks.iter().position(|b| b.role == Role::Task) {
            Some(task_idx) => self.blocks.insert(task_idx, block),
            None => self.blocks.push(block),
        }
    }

    /// Set the task block, replacing any existing one.
    pub fn set_task(&mut self, content: impl Into<String>) {
        self.blocks.retain(|b| b.role != Role::Task);
        self.blocks.push(MessageBlock {
            role: Role::Task,
            content: content.into(),
        });
    }

    /// Builder-style variant of [`set_task`](Self::set_task)
    pub fn with_task(mut self, content: impl Into<String>) -> Self {
        self.set_task(content);
        self
    }

    /// The ordered blocks of this prompt
    pub fn blocks(&self) -> &[MessageBlock] {
        &self.blocks
    }

    /// The instruction text (always present)
    pub fn instruction(&self) -> &str {
        &self.blocks[0].content
    }

    /// The task text, if a task block has been set
    pub fn task(&self) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.role == Role::Task)
            .map(|b| b.content.as_str())
    }

    /// Number of blocks with the given role
    pub fn count_role(&self, role: Role) -> usize {
        self.blocks.iter().filter(|b| b.role == role).count()
    }

    /// Total content length across all blocks, in characters
    pub fn content_chars(&self) -> usize {
        self.blocks.iter().map(|b| b.content.chars().count()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instruction_is_first() {
        let mut prompt = Prompt::from_instruction("do the thing");
        prompt.push_context("some text");
        assert_eq!(prompt.blocks()[0].role, Role::Instruction);
        assert_eq!(prompt.instruction(), "do the thing");
    }

    #[test]
    fn test_task_is_last() {
        let mut prompt = Prompt::from_instruction("i").with_task("t");
        prompt.push_context("c1");
        prompt.push_context("c2");
        let roles: Vec<Role> = prompt.blocks().iter().map(|b| b.role).collect();
        assert_eq!(
            roles,
            vec![Role::Instruction, Role::Context, Role::Context, Role::Task]
        );
        assert_eq!(prompt.task(), Some("t"));
    }

    #[test]
    fn test_set_task_replaces() {
        let prompt = Prompt::from_instruction("i")
            .with_task("first")
            .with_task("second");
        assert_eq!(prompt.count_role(Role::Task), 1);
        assert_eq!(prompt.task(), Some("second"));
    }

    #[test]
    fn test_exactly_one_instruction() {
        let mut prompt = Prompt::from_instruction("i");
        prompt.push_context("c");
        let prompt = prompt.with_task("t");
        assert_eq!(prompt.count_role(Role::Instruction), 1);
    }

    #[test]
    fn test_content_chars() {
        let prompt = Prompt::from_instruction("ab").with_task("cd");
        assert_eq!(prompt.content_chars(), 4);
    }
}
