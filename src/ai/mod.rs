pub mod analysis;
pub mod client;
pub mod http_client;
pub mod json_parser;
pub mod prompts;

pub use analysis::{AnalysisKind, AnalysisReport, SummaryMode};
pub use client::GeminiClient;

use async_trait::async_trait;

use crate::error::AiError;
use crate::notes::Note;

/// Generative text service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, AiError>;
}

/// Markdown summary of a transcript
///
/// Very short transcripts get a fixed reply without calling the service.
pub async fn generate_summary(
    generator: &dyn TextGenerator,
    transcript: &str,
) -> Result<String, AiError> {
    if transcript.trim().chars().count() < prompts::MIN_SUMMARY_CHARS {
        return Ok(prompts::SHORT_TRANSCRIPT_REPLY.to_string());
    }
    generator.generate(&prompts::summary_prompt(transcript)).await
}

/// Send a short prompt and return the start of the reply
pub async fn test_connection(generator: &dyn TextGenerator) -> Result<String, AiError> {
    let reply = generator.generate(prompts::CONNECTION_TEST_PROMPT).await?;
    Ok(reply
        .chars()
        .take(prompts::CONNECTION_TEST_PREVIEW_CHARS)
        .collect())
}

/// Assistant reply to a chat message
pub async fn chat_reply(
    generator: &dyn TextGenerator,
    message: &str,
    context_notes: &[Note],
) -> Result<String, AiError> {
    generator
        .generate(&prompts::chat_prompt(message, context_notes))
        .await
}
