//! Prompt construction and answer generation

pub mod generator;
pub mod prompt;

pub use generator::{Generator, OVERLOAD_MESSAGE};
pub use prompt::{BuiltPrompt, PromptBuilder};
