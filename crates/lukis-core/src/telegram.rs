//! Telegram Bot API types and client
//!
//! Wire types cover only the fields the bot reads. The client wraps the
//! handful of Bot API methods needed for replies and photo downloads, one
//! attempt per call.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::chat::ChatApi;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// One platform update as pushed to the webhook.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub edited_message: Option<Message>,
}

impl Update {
    /// The message this update carries, if any. Edited messages are handled
    /// the same as new ones.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref().or(self.edited_message.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
    pub caption: Option<String>,
    pub photo: Option<Vec<PhotoSize>>,
}

impl Message {
    /// Command and prompt text; photo messages carry it in `caption`.
    pub fn text_or_caption(&self) -> Option<&str> {
        self.text.as_deref().or(self.caption.as_deref())
    }

    /// The largest rendition of an attached photo (Telegram orders the
    /// sizes smallest first).
    pub fn largest_photo(&self) -> Option<&PhotoSize> {
        self.photo.as_ref().and_then(|sizes| sizes.last())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i32,
    pub height: i32,
}

/// File metadata returned by `getFile`.
#[derive(Debug, Clone, Deserialize)]
pub struct File {
    pub file_path: Option<String>,
}

/// Envelope every Bot API method responds with.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    token: Arc<String>,
}

impl TelegramClient {
    pub fn new(token: String) -> Result<Self, TelegramError> {
        let client = reqwest::Client::builder()
            .user_agent("Lukis/0.1.0")
            .build()?;

        Ok(Self {
            client,
            token: Arc::new(token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", TELEGRAM_API_BASE, self.token, method)
    }

    /// Unwrap the Bot API envelope, turning HTTP and `ok: false` failures
    /// into typed errors.
    async fn check<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, TelegramError> {
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: ApiResponse<T> = response.json().await?;
        if !envelope.ok {
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message: envelope
                    .description
                    .unwrap_or_else(|| "unknown API error".to_string()),
            });
        }

        envelope.result.ok_or_else(|| TelegramError::Api {
            status: status.as_u16(),
            message: "response envelope carried no result".to_string(),
        })
    }

    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        debug!("sendMessage to chat {}", chat_id);

        let response = self
            .client
            .post(self.method_url("sendMessage"))
            .json(&serde_json::json!({ "chat_id": chat_id, "text": text }))
            .send()
            .await?;

        Self::check::<serde_json::Value>(response).await?;
        Ok(())
    }

    pub async fn send_photo(
        &self,
        chat_id: i64,
        png: Vec<u8>,
        caption: &str,
    ) -> Result<(), TelegramError> {
        debug!("sendPhoto to chat {} ({} bytes)", chat_id, png.len());

        let photo = reqwest::multipart::Part::bytes(png)
            .file_name("lukis.png")
            .mime_str("image/png")?;
        let form = reqwest::multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("photo", photo);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;

        Self::check::<serde_json::Value>(response).await?;
        Ok(())
    }

    /// Resolve a `file_id` via `getFile` and download the photo bytes.
    pub async fn download_file(&self, file_id: &str) -> Result<Vec<u8>, TelegramError> {
        debug!("getFile for {}", file_id);

        let response = self
            .client
            .post(self.method_url("getFile"))
            .json(&serde_json::json!({ "file_id": file_id }))
            .send()
            .await?;

        let file: File = Self::check(response).await?;
        let file_path = file.file_path.ok_or_else(|| TelegramError::Api {
            status: 200,
            message: format!("no file_path for file_id {}", file_id),
        })?;

        let url = format!("{}/file/bot{}/{}", TELEGRAM_API_BASE, self.token, file_path);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_message(chat_id, text).await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, png: Vec<u8>, caption: &str) -> Result<()> {
        TelegramClient::send_photo(self, chat_id, png, caption).await?;
        Ok(())
    }

    async fn fetch_photo(&self, file_id: &str) -> Result<Vec<u8>> {
        Ok(self.download_file(file_id).await?)
    }
}
