//! HTTP client for the hosted summarization endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use jotter_core::summarize::{SummarizeError, Summarizer};

use crate::config::SummarizeConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpSummarizer {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpSummarizer {
    pub fn new(config: &SummarizeConfig) -> Result<Self, SummarizeError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| SummarizeError::Transport(err.to_string()))?;
        Ok(HttpSummarizer {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            client,
        })
    }
}

#[async_trait]
impl Summarizer for HttpSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let response = self
            .client
            .post(format!("{}/summarize", self.base_url))
            .bearer_auth(&self.token)
            .json(&SummarizeRequest { text })
            .send()
            .await
            .map_err(|err| SummarizeError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizeError::Status {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }

        let body: SummarizeResponse = response
            .json()
            .await
            .map_err(|_| SummarizeError::MalformedResponse)?;
        match body.summary {
            Some(summary) if !summary.is_empty() => Ok(summary),
            _ => Err(SummarizeError::MalformedResponse),
        }
    }
}

/// Failure bodies are either JSON with an `error` field or plain text.
fn error_detail(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "failed to generate summary".to_string()
    } else {
        trimmed.to_string()
    }
}
