//! Structured field extraction from bid memos.
//!
//! - completion service seam + OpenAI-compatible client (`client`)
//! - fixed prompt and response schema (`prompt`)
//! - extraction + validation (`engine`)

pub mod client;
pub mod engine;
pub mod prompt;

pub use client::{CompletionError, CompletionRequest, CompletionService, OpenAiClient};
pub use engine::{ExtractionFailure, MemoExtractor};
