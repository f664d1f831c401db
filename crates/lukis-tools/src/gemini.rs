//! Gemini generative-image API client
//!
//! Thin wrapper over the `generateContent` REST endpoint of the image-capable
//! Gemini models. One outbound request per call: no retry, no caching, and
//! only the transport-default timeout.

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("invalid inline image data: {0}")]
    InlineData(#[from] base64::DecodeError),
}

/// One content part of a `generateContent` request or response.
///
/// Exactly one of the fields is set; the API rejects parts carrying both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn inline_data(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: Arc<String>,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, GeminiError> {
        let client = reqwest::Client::builder()
            .user_agent("Lukis/0.1.0")
            .build()?;

        Ok(Self {
            client,
            api_key: Arc::new(api_key),
            model,
        })
    }

    /// Submit one prompt (optionally with an inline image part) and return
    /// the raw bytes of the generated image, if the model produced one.
    ///
    /// `Ok(None)` means the service answered but its first response part
    /// carried no inline data - the caller decides how to surface that.
    pub async fn generate_content(&self, parts: Vec<Part>) -> Result<Option<Vec<u8>>, GeminiError> {
        let url = format!("{}/models/{}:generateContent", GEMINI_API_BASE, self.model);

        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig {
                response_mime_type: "image/png",
            },
        };

        debug!("Gemini generateContent request (model: {})", self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.as_str())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeminiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let content: GenerateContentResponse = response.json().await?;
        Self::first_inline_data(&content)
    }

    /// The model signals success by putting the image in the first part of
    /// the first candidate; anything else counts as "no image produced".
    fn first_inline_data(
        response: &GenerateContentResponse,
    ) -> Result<Option<Vec<u8>>, GeminiError> {
        let first_part = response
            .candidates
            .as_deref()
            .and_then(|c| c.first())
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first());

        let Some(inline) = first_part.and_then(|p| p.inline_data.as_ref()) else {
            warn!("Gemini response carried no inline image data");
            return Ok(None);
        };

        let bytes = base64::engine::general_purpose::STANDARD.decode(&inline.data)?;
        Ok(Some(bytes))
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}
