use anyhow::Result;
use async_trait::async_trait;

/// Trait for the messaging-platform side of the bot: sending replies and
/// fetching user photos by reference.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;
    async fn send_photo(&self, chat_id: i64, png: Vec<u8>, caption: &str) -> Result<()>;

    /// Download the raw bytes of a photo the platform referenced by `file_id`
    async fn fetch_photo(&self, file_id: &str) -> Result<Vec<u8>>;
}
