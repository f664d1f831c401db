//! Lukis Tools - external service clients used by the bot
//!
//! - gemini: Gemini generative-image API client

pub mod gemini;

pub use gemini::{GeminiClient, GeminiError, InlineData, Part};
