//! Gemini `generateContent` client used for structured (JSON) generation.

pub mod client;
pub mod types;

pub use client::{DEFAULT_MODEL, GeminiClient, GeminiError, TextGenerator};
