//! Keyword tagging for bid titles.
//!
//! - decision rule + fallback (`engine`)
//! - token budget and activation helpers (`encode`)
//! - artifact loading (`artifacts`)
//! - ONNX Runtime classifier (`onnx`, behind the `onnx` feature)

pub mod artifacts;
pub mod encode;
pub mod engine;
#[cfg(feature = "onnx")]
pub mod onnx;

pub use artifacts::{ArtifactPaths, LoadedEngine, load_engine};
pub use engine::{ClassifierError, DEFAULT_THRESHOLD, KeywordEngine, LabelScorer, select_keywords};
