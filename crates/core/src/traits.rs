use crate::{ExtractedAnswer, GenerationParams, InferenceError, SummaryParams};
use async_trait::async_trait;

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, params: &SummaryParams)
        -> Result<String, InferenceError>;
}

#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    /// Extracts an answer span from `context` with a confidence in `[0, 1]`.
    async fn answer(&self, question: &str, context: &str)
        -> Result<ExtractedAnswer, InferenceError>;
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Continues `prompt`. Backends may echo the prompt ahead of the
    /// continuation.
    async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, InferenceError>;
}
