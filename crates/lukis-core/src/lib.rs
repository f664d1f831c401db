//! Lukis Core Library
//!
//! Shared types and modules for the Lukis Telegram image bot.

pub mod chat;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod generate;
pub mod telegram;
pub mod webhook;

// Re-export key types for convenience
pub use chat::ChatApi;
pub use config::{Config, Lifecycle};
pub use dispatch::{classify, Action, Dispatcher};
pub use generate::{GeminiGenerator, Generation, ImageGenerator, SourceImage};
pub use webhook::{router, AppState, BotProvider};
