//! Generation provider trait for producing answers

use async_trait::async_trait;

use crate::error::Result;

/// Trait for LLM answer generation
///
/// Implementations:
/// - `GeminiGenerator`: Gemini generateContent API (gemini-2.5-flash)
///
/// A transient overload must surface as `Error::ModelOverloaded` so the
/// caller can retry it; every other failure is terminal for the request.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate an answer for a fully built prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
