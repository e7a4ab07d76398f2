//! Grounded prompt construction with a context budget

use crate::error::{Error, Result};
use crate::types::RetrievedChunk;

/// A prompt ready for the generation provider
#[derive(Debug, Clone)]
pub struct BuiltPrompt {
    /// Full prompt text
    pub text: String,
    /// How many retrieved chunks made it into the context
    pub used_chunks: usize,
}

/// Builds grounded prompts from a question and ranked chunks
pub struct PromptBuilder {
    /// Character budget for the context section
    max_context_chars: usize,
}

impl PromptBuilder {
    /// Create a prompt builder with the given context budget
    pub fn new(max_context_chars: usize) -> Self {
        Self { max_context_chars }
    }

    /// Build the prompt: grounding preamble, then the context excerpts in
    /// rank order, then the question.
    ///
    /// Chunks are dropped from the tail once their labeled blocks would
    /// exceed the budget. The top-ranked chunk is always included, even
    /// when it alone is over budget, so the model never answers from an
    /// empty context while matches exist.
    pub fn build(&self, question: &str, chunks: &[RetrievedChunk]) -> Result<BuiltPrompt> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::validation("question must not be empty"));
        }

        let mut blocks: Vec<String> = Vec::new();
        let mut used_chars = 0usize;
        for chunk in chunks {
            let block = format!("[CHUNK {}]\n{}", chunk.rank, chunk.text);
            let block_chars = block.chars().count();
            if !blocks.is_empty() && used_chars + block_chars > self.max_context_chars {
                break;
            }
            used_chars += block_chars;
            blocks.push(block);
        }

        let used_chunks = blocks.len();
        let context = if blocks.is_empty() {
            "(no context provided)".to_string()
        } else {
            blocks.join("\n\n")
        };

        let text = format!(
            r#"You are a helpful research assistant. Use ONLY the provided context excerpts
from research papers to answer the question. If the answer is not clearly
supported by the context, say "I don't know based on the provided papers."

Context:
{context}

Question:
{question}

Answer in a clear, concise paragraph, and avoid guessing if the context is insufficient."#,
            context = context,
            question = question
        );

        Ok(BuiltPrompt { text, used_chunks })
    }
}
