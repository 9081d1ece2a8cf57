//! HTTP client for the hosted text-generation endpoint
//!
//! One stateless operation: prompt in, generated text out. Every failure
//! mode is a distinct variant so the UI can tell a missing key from a
//! timeout from a server rejection. The client never retries on its own;
//! a retry is an explicit caller action.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use thiserror::Error;

use super::models::{
    Content, GenerateRequest, GenerateResponse, GenerationConfig, WireGenerationConfig,
};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Request timed out")]
    Timeout,

    #[error("Network error: {0}")]
    Network(reqwest::Error),

    #[error("Service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GenerationError::Timeout
        } else {
            GenerationError::Network(e)
        }
    }
}

/// Client for the hosted generative-text API
pub struct TextGenClient {
    client: Client,
    endpoint: String,
}

impl TextGenClient {
    pub fn new() -> Result<Self, GenerationError> {
        Self::with_endpoint(DEFAULT_ENDPOINT.to_string())
    }

    pub fn with_endpoint(endpoint: String) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        })
    }

    /// Generate text for a prompt.
    ///
    /// The whole call is bounded by the config's timeout (or a default);
    /// hitting the bound surfaces as `Timeout`, distinct from other
    /// failures, so the caller can offer retry or abort.
    pub async fn generate(
        &self,
        prompt: &str,
        config: &GenerationConfig,
    ) -> Result<String, GenerationError> {
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(GenerationError::MissingApiKey)?;

        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        let timeout = Duration::from_secs(config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let url = format!("{}/models/{}:generateContent", self.endpoint, model);

        let body = GenerateRequest {
            contents: vec![Content::user(prompt)],
            generation_config: Some(WireGenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_tokens,
            }),
        };

        let request = self
            .client
            .post(&url)
            .query(&[("key", api_key)])
            .json(&body)
            .send();

        let response = tokio::time::timeout(timeout, request)
            .await
            .map_err(|_| GenerationError::Timeout)??;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            log::warn!("Text generation failed with {}: {}", status, message);
            return Err(GenerationError::Status {
                status: status.as_u16(),
                message: summarize_error(status, &message),
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

        extract_text(parsed)
    }
}

/// Pull the generated text out of a response body.
fn extract_text(response: GenerateResponse) -> Result<String, GenerationError> {
    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.is_empty() {
        return Err(GenerationError::MalformedResponse(
            "response contained no generated text".to_string(),
        ));
    }
    Ok(text)
}

/// Keep error payloads short enough to show in a dialog.
fn summarize_error(status: StatusCode, body: &str) -> String {
    const MAX_LEN: usize = 300;
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string();
    }
    let mut message = trimmed.to_string();
    if message.len() > MAX_LEN {
        let mut cut = MAX_LEN;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
        message.push('…');
    }
    message
}
