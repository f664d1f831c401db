use anyhow::{Context, Result};

/// How the webhook endpoint obtains its dispatcher.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lifecycle {
    /// Build one dispatcher at startup and share it across all calls
    Startup,
    /// Build a fresh dispatcher for every webhook call
    PerRequest,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub gemini_api_key: String,
    pub gemini_model: String,

    /// Dispatcher lifecycle strategy for the webhook endpoint
    pub lifecycle: Lifecycle,

    pub http_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            telegram_token: std::env::var("TELEGRAM_TOKEN")
                .context("TELEGRAM_TOKEN must be set")?,
            gemini_api_key: std::env::var("GEMINI_API_KEY")
                .context("GEMINI_API_KEY must be set")?,
            gemini_model: std::env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| "gemini-2.5-flash-image".to_string()),

            lifecycle: match std::env::var("BOT_LIFECYCLE")
                .unwrap_or_else(|_| "startup".to_string())
                .to_lowercase()
                .as_str()
            {
                "per_request" => Lifecycle::PerRequest,
                _ => Lifecycle::Startup,
            },

            http_port: std::env::var("HTTP_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("HTTP_PORT must be a valid port number")?,
        })
    }
}
