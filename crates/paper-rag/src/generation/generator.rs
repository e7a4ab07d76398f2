//! Answer generation with bounded retry on transient overload

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::GenerationProvider;

/// Answer returned when the model stays overloaded through every retry.
/// Degradation is a successful response, not an error.
pub const OVERLOAD_MESSAGE: &str =
    "The model is temporarily overloaded. Please retry in a moment.";

/// Wraps a generation provider with the overload retry policy
///
/// Only `Error::ModelOverloaded` is retried. Every other failure aborts the
/// request immediately so real errors are never masked by retries.
pub struct Generator {
    provider: Arc<dyn GenerationProvider>,
    max_retries: u32,
    backoff_ms: u64,
}

impl Generator {
    /// Create a generator with the given retry bound and base backoff
    pub fn new(provider: Arc<dyn GenerationProvider>, max_retries: u32, backoff_ms: u64) -> Self {
        Self {
            provider,
            max_retries,
            backoff_ms,
        }
    }

    /// Generate an answer for the prompt, retrying overloads with
    /// exponential backoff and degrading to [`OVERLOAD_MESSAGE`] once the
    /// retry bound is exhausted.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::validation("prompt must not be empty"));
        }

        let mut attempt = 0u32;
        loop {
            match self.provider.generate(prompt).await {
                Ok(answer) => return Ok(answer),
                Err(Error::ModelOverloaded(msg)) => {
                    if attempt >= self.max_retries {
                        tracing::warn!(
                            "Model overloaded after {} attempts, degrading: {}",
                            attempt + 1,
                            msg
                        );
                        return Ok(OVERLOAD_MESSAGE.to_string());
                    }
                    let backoff = Duration::from_millis(self.backoff_ms * 2u64.pow(attempt));
                    tracing::warn!(
                        "Model overloaded (attempt {}/{}), retrying in {:?}",
                        attempt + 1,
                        self.max_retries + 1,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Model identifier of the wrapped provider
    pub fn model(&self) -> &str {
        self.provider.model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    enum Step {
        Overloaded,
        Fails,
        Answers(&'static str),
    }

    struct ScriptedProvider {
        steps: Vec<Step>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerationProvider for ScriptedProvider {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            let i = self.calls.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.get(i).unwrap_or_else(|| self.steps.last().unwrap());
            match step {
                Step::Overloaded => Err(Error::ModelOverloaded("503".to_string())),
                Step::Fails => Err(Error::generation("boom")),
                Step::Answers(text) => Ok(text.to_string()),
            }
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "scripted-model"
        }
    }

    fn generator(provider: Arc<ScriptedProvider>) -> Generator {
        // 1ms base backoff keeps retry tests fast
        Generator::new(provider, 2, 1)
    }

    #[tokio::test]
    async fn test_success_needs_no_retry() {
        let provider = Arc::new(ScriptedProvider::new(vec![Step::Answers("the answer")]));
        let answer = generator(Arc::clone(&provider)).generate("prompt").await.unwrap();
        assert_eq!(answer, "the answer");
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_overload_then_success_retries() {
        let provider = Arc::new(ScriptedProvider::new(vec![
            Step::Overloaded,
            Step::Overloaded,
            Step::Answers("recovered"),
        ]));
        let answer = generator(Arc::clone(&provider)).generate("prompt").await.unwrap();
        assert_eq!(answer, "recovered");
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_persistent_overload_degrades() {
        let provider = Arc::new(ScriptedProvider::new(vec![Step::Overloaded]));
        let answer = generator(Arc::clone(&provider)).generate("prompt").await.unwrap();
        assert_eq!(answer, OVERLOAD_MESSAGE);
        // Initial attempt plus max_retries
        assert_eq!(provider.calls(), 3);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let provider = Arc::new(ScriptedProvider::new(vec![Step::Fails, Step::Answers("x")]));
        let result = generator(Arc::clone(&provider)).generate("prompt").await;
        assert!(matches!(result, Err(Error::Generation(_))));
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_prompt_never_reaches_provider() {
        let provider = Arc::new(ScriptedProvider::new(vec![Step::Answers("x")]));
        let result = generator(Arc::clone(&provider)).generate("   ").await;
        assert!(matches!(result, Err(Error::Validation(_))));
        assert_eq!(provider.calls(), 0);
    }
}
