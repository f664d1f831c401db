//! Generation seam between the dispatcher and the Gemini client
//!
//! Expected domain failures ("the model produced no image") are a value;
//! transport and programming faults stay errors.

use anyhow::Result;
use async_trait::async_trait;

use lukis_tools::{GeminiClient, Part};

/// Reply shown when the service answers a generate request without an image
pub const DECLINED_GENERATE: &str = "Gagal generate gambar.";
/// Reply shown when the service answers an edit request without an image
pub const DECLINED_EDIT: &str = "Gagal edit gambar.";

/// Outcome of one generation call.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    /// Raw image bytes as returned by the service
    Image(Vec<u8>),
    /// The service answered but produced no image
    Declined(String),
}

/// Source image attached to an edit request.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub mime_type: String,
    /// Base64-encoded image payload
    pub base64_data: String,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation>;
    async fn edit(&self, prompt: &str, image: SourceImage) -> Result<Generation>;
}

/// `ImageGenerator` backed by the Gemini `generateContent` endpoint.
pub struct GeminiGenerator {
    client: GeminiClient,
}

impl GeminiGenerator {
    pub fn new(api_key: &str, model: &str) -> Result<Self> {
        Ok(Self {
            client: GeminiClient::new(api_key.to_string(), model.to_string())?,
        })
    }
}

#[async_trait]
impl ImageGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<Generation> {
        match self.client.generate_content(vec![Part::text(prompt)]).await? {
            Some(bytes) => Ok(Generation::Image(bytes)),
            None => Ok(Generation::Declined(DECLINED_GENERATE.to_string())),
        }
    }

    async fn edit(&self, prompt: &str, image: SourceImage) -> Result<Generation> {
        let parts = vec![
            Part::text(prompt),
            Part::inline_data(image.mime_type, image.base64_data),
        ];

        match self.client.generate_content(parts).await? {
            Some(bytes) => Ok(Generation::Image(bytes)),
            None => Ok(Generation::Declined(DECLINED_EDIT.to_string())),
        }
    }
}
