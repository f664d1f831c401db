//! Command dispatch
//!
//! Every inbound update is classified into exactly one `Action` before any
//! handler logic runs, then executed against the platform and generation
//! seams. Failures inside one action become a single error text reply;
//! nothing propagates to the webhook layer, and no update ever produces more
//! than one chat reply.

use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::chat::ChatApi;
use crate::codec;
use crate::config::Config;
use crate::generate::{GeminiGenerator, Generation, ImageGenerator, SourceImage};
use crate::telegram::{TelegramClient, Update};

pub const GREETING: &str =
    "Halo! Kirim /generate <prompt> untuk buat gambar, atau /edit <prompt> + kirim gambar.";
pub const EDIT_INSTRUCTION: &str = "Kirim gambar dulu, lalu /edit <prompt>";
pub const DEFAULT_GENERATE_PROMPT: &str = "Buat gambar kucing lucu";
pub const DEFAULT_EDIT_PROMPT: &str = "Edit gambar ini jadi lebih cerah";
pub const CAPTION_GENERATED: &str = "Gambar dibuat!";
pub const CAPTION_EDITED: &str = "Gambar diedit!";

/// What one update asks the bot to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Start {
        chat_id: i64,
    },
    Generate {
        chat_id: i64,
        prompt: String,
    },
    Edit {
        chat_id: i64,
        prompt: String,
        file_id: String,
    },
    /// `/edit` without an attached photo: instruct, never generate
    EditWithoutPhoto {
        chat_id: i64,
    },
    Ignore,
}

/// Split a message into a leading /command and its arguments, stripping an
/// optional @botname suffix from the command token.
fn parse_command(text: &str) -> Option<(String, Vec<&str>)> {
    let mut tokens = text.split_whitespace();
    let first = tokens.next()?;
    if !first.starts_with('/') {
        return None;
    }

    let command = first.split('@').next().unwrap_or(first).to_lowercase();
    Some((command, tokens.collect()))
}

fn prompt_or_default(args: &[&str], default: &str) -> String {
    if args.is_empty() {
        default.to_string()
    } else {
        args.join(" ")
    }
}

/// Classify one update into exactly one action.
pub fn classify(update: &Update) -> Action {
    let Some(message) = update.message() else {
        return Action::Ignore;
    };

    let chat_id = message.chat.id;
    let photo = message.largest_photo();
    let command = message.text_or_caption().and_then(parse_command);

    match command {
        Some((cmd, _)) if cmd == "/start" => Action::Start { chat_id },
        Some((cmd, args)) if cmd == "/generate" => Action::Generate {
            chat_id,
            prompt: prompt_or_default(&args, DEFAULT_GENERATE_PROMPT),
        },
        Some((cmd, args)) if cmd == "/edit" => match photo {
            Some(photo) => Action::Edit {
                chat_id,
                prompt: prompt_or_default(&args, DEFAULT_EDIT_PROMPT),
                file_id: photo.file_id.clone(),
            },
            None => Action::EditWithoutPhoto { chat_id },
        },
        // A bare photo (or one with an unrecognized caption) is an implicit
        // edit request with the default prompt.
        _ => match photo {
            Some(photo) => Action::Edit {
                chat_id,
                prompt: DEFAULT_EDIT_PROMPT.to_string(),
                file_id: photo.file_id.clone(),
            },
            None => Action::Ignore,
        },
    }
}

/// Routes classified actions to the platform and generation clients.
pub struct Dispatcher {
    chat: Arc<dyn ChatApi>,
    generator: Arc<dyn ImageGenerator>,
}

impl Dispatcher {
    pub fn new(chat: Arc<dyn ChatApi>, generator: Arc<dyn ImageGenerator>) -> Self {
        Self { chat, generator }
    }

    /// Build a dispatcher with the real Telegram and Gemini clients.
    pub fn from_config(config: &Config) -> Result<Self> {
        let chat = TelegramClient::new(config.telegram_token.clone())?;
        let generator = GeminiGenerator::new(&config.gemini_api_key, &config.gemini_model)?;
        Ok(Self::new(Arc::new(chat), Arc::new(generator)))
    }

    /// Handle one update. Never returns an error: every failure is reported
    /// to the user inside the action's own scope.
    pub async fn handle_update(&self, update: &Update) {
        match classify(update) {
            Action::Start { chat_id } => {
                if let Err(e) = self.chat.send_text(chat_id, GREETING).await {
                    warn!("Failed to send greeting to chat {}: {}", chat_id, e);
                }
            }
            Action::Generate { chat_id, prompt } => {
                info!("Generating image for chat {}", chat_id);
                if let Err(e) = self.generate_reply(chat_id, &prompt).await {
                    self.report_error(chat_id, e).await;
                }
            }
            Action::Edit {
                chat_id,
                prompt,
                file_id,
            } => {
                info!("Editing photo {} for chat {}", file_id, chat_id);
                if let Err(e) = self.edit_reply(chat_id, &prompt, &file_id).await {
                    self.report_error(chat_id, e).await;
                }
            }
            Action::EditWithoutPhoto { chat_id } => {
                if let Err(e) = self.chat.send_text(chat_id, EDIT_INSTRUCTION).await {
                    warn!("Failed to send edit instruction to chat {}: {}", chat_id, e);
                }
            }
            Action::Ignore => {}
        }
    }

    async fn generate_reply(&self, chat_id: i64, prompt: &str) -> Result<()> {
        match self.generator.generate(prompt).await? {
            Generation::Image(bytes) => {
                let png = codec::to_reply_format(&bytes)?;
                self.chat.send_photo(chat_id, png, CAPTION_GENERATED).await
            }
            Generation::Declined(reason) => self.chat.send_text(chat_id, &reason).await,
        }
    }

    async fn edit_reply(&self, chat_id: i64, prompt: &str, file_id: &str) -> Result<()> {
        let raw = self.chat.fetch_photo(file_id).await?;
        let image = SourceImage {
            mime_type: "image/jpeg".to_string(),
            base64_data: codec::to_submission_format(&raw)?,
        };

        match self.generator.edit(prompt, image).await? {
            Generation::Image(bytes) => {
                let png = codec::to_reply_format(&bytes)?;
                self.chat.send_photo(chat_id, png, CAPTION_EDITED).await
            }
            Generation::Declined(reason) => self.chat.send_text(chat_id, &reason).await,
        }
    }

    async fn report_error(&self, chat_id: i64, error: anyhow::Error) {
        warn!("Action failed for chat {}: {}", chat_id, error);
        if let Err(e) = self
            .chat
            .send_text(chat_id, &format!("Error: {}", error))
            .await
        {
            warn!("Failed to send error reply to chat {}: {}", chat_id, e);
        }
    }
}
