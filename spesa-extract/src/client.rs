//! Inference client: the outbound LLM call contract and the Gemini
//! implementation.
//!
//! The client is an explicitly constructed, injectable dependency; nothing
//! here is process-global. One logical operation issues at most one
//! inference call, and the call carries an explicit timeout so a hung
//! upstream surfaces as a failure instead of blocking forever.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("inference API returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("inference response carried no text")]
    EmptyResponse,
}

/// A single prompt-in, text-out completion call.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError>;
}

/// Client for the Generative Language API (`models/{model}:generateContent`).
/// Responses are requested as JSON via `response_mime_type`, so the model's
/// raw text is expected to be a single JSON document.
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
}

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-flash-latest";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
pub(crate) struct GenerateResponse {
    #[serde(default)]
    pub(crate) candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
pub(crate) struct Candidate {
    pub(crate) content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub(crate) struct CandidateContent {
    #[serde(default)]
    pub(crate) parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
pub(crate) struct CandidatePart {
    pub(crate) text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated candidate text, or None when the response carried no
    /// usable text at all.
    pub(crate) fn text(self) -> Option<String> {
        let mut out = String::new();
        for candidate in self.candidates {
            let Some(content) = candidate.content else {
                continue;
            };
            for part in content.parts {
                if let Some(t) = part.text {
                    out.push_str(&t);
                }
            }
        }
        let trimmed = out.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    }
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, InferenceError> {
        Self::with_options(
            api_key,
            DEFAULT_BASE_URL,
            DEFAULT_MODEL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl InferenceClient for GeminiClient {
    async fn complete(&self, prompt: &str) -> Result<String, InferenceError> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
            },
        };

        let resp = self.http.post(&url).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "inference call rejected");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let out: GenerateResponse = resp.json().await?;
        out.text().ok_or(InferenceError::EmptyResponse)
    }
}
