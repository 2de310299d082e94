//! The seam between the state manager and whatever produces summaries.
//! The HTTP client lives in the binary crate; tests use stubs.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The request never produced an HTTP response.
    #[error("summarization request failed: {0}")]
    Transport(String),
    /// The endpoint answered with a non-success status.
    #[error("summarization endpoint returned {status}: {message}")]
    Status { status: u16, message: String },
    /// A success response without usable summary text.
    #[error("summarization response did not contain a summary")]
    MalformedResponse,
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Condense `text` into a short summary. Callers filter blank content
    /// before reaching this point.
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}
