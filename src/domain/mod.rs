//! Domain types used throughout both pipelines.
//!
//! This module defines:
//!
//! - keyword tagging types (`KeywordVocabulary`, `PredictionResult`, `ConfidenceTier`)
//! - memo extraction types (`ModelVariant`, `Sponsor`, `BidType`, `MemoFields`)
//! - row shapes and stream events (`MemoRow`, `ExtractionRow`, `Progress`)

pub mod types;

pub use types::*;
