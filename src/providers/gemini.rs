//! Gemini API Client
//!
//! The vision model is a black box: it receives one text prompt plus one
//! image and answers with free text. Nothing here interprets that text.
//!
//! API: POST {base}/models/{model}:generateContent
//! Auth: `x-goog-api-key` header (never logged)
//!
//! No retries. A failed call surfaces to the caller as-is.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::models::config::GeminiConfig;
use crate::models::errors::{AppError, AppResult};
use crate::utils::constants::USER_AGENT;

/// Anything that can turn a prompt plus an image into text
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, prompt: &str, image: &[u8], mime_type: &str) -> AppResult<String>;
}

// ============================================
// Wire types
// ============================================

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text {
        text: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Inline { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// All text parts of the first candidate, joined. None when the model
    /// produced no text at all.
    pub fn text(&self) -> Option<String> {
        let candidate = self.candidates.first()?;
        let text: String = candidate
            .content
            .as_ref()?
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }

    fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.finish_reason.as_deref()
    }
}

// ============================================
// Client
// ============================================

/// Gemini REST client
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> AppResult<Self> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        info!("🤖 Gemini client ready (model: {})", config.model);
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url, self.config.model
        )
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(&self, prompt: &str, image: &[u8], mime_type: &str) -> AppResult<String> {
        let start = Instant::now();
        let encoded = STANDARD.encode(image);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type,
                            data: encoded,
                        },
                    },
                ],
            }],
        };

        debug!(
            "📤 Gemini request: prompt {} chars, image {} bytes ({})",
            prompt.len(),
            image.len(),
            mime_type
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("❌ Gemini API error {}: {}", status, detail);
            return Err(AppError::external_service(format!(
                "Model API error {}: {}",
                status, detail
            )));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            AppError::external_service(format!("Failed to parse model response: {}", e))
        })?;

        let text = parsed.text().ok_or_else(|| {
            AppError::external_service(format!(
                "Model returned no text (finish reason: {})",
                parsed.finish_reason().unwrap_or("unknown")
            ))
        })?;

        info!(
            "📥 Gemini answered {} chars in {}ms",
            text.len(),
            start.elapsed().as_millis()
        );

        Ok(text)
    }
}
