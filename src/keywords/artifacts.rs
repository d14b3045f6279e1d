//! Classifier artifact loading.
//!
//! An artifacts directory holds:
//!
//! - `keywords.json`  — ordered JSON array of label strings
//! - `tokenizer.json` — HuggingFace tokenizer definition
//! - `model.onnx`     — the classifier, emitting one logit per label
//!
//! Vocabulary order must match the classifier's output order. That is not
//! checked here; only the label count is checked per inference.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::domain::KeywordVocabulary;
use crate::error::{AppError, EXIT_MODEL};
use crate::keywords::engine::{KeywordEngine, LabelScorer};

/// Engine type produced from on-disk artifacts.
pub type LoadedEngine = KeywordEngine<Box<dyn LabelScorer>>;

#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    dir: PathBuf,
}

impl ArtifactPaths {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn vocabulary(&self) -> PathBuf {
        self.dir.join("keywords.json")
    }

    pub fn tokenizer(&self) -> PathBuf {
        self.dir.join("tokenizer.json")
    }

    pub fn model(&self) -> PathBuf {
        self.dir.join("model.onnx")
    }
}

/// Read the ordered keyword list.
pub fn load_vocabulary(path: &Path) -> Result<KeywordVocabulary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(EXIT_MODEL, format!("Failed to open keyword list '{}': {e}", path.display())))?;
    let labels: Vec<String> = serde_json::from_reader(file)
        .map_err(|e| AppError::new(EXIT_MODEL, format!("Invalid keyword list '{}': {e}", path.display())))?;
    if labels.is_empty() {
        return Err(AppError::new(
            EXIT_MODEL,
            format!("Keyword list '{}' is empty.", path.display()),
        ));
    }
    Ok(KeywordVocabulary::new(labels))
}

/// Load vocabulary and classifier into a ready engine.
pub fn load_engine(paths: &ArtifactPaths) -> Result<LoadedEngine, AppError> {
    let vocabulary = load_vocabulary(&paths.vocabulary())?;
    let scorer = load_scorer(paths, vocabulary.len())?;
    tracing::info!(
        dir = %paths.dir().display(),
        labels = vocabulary.len(),
        "Keyword classifier loaded"
    );
    Ok(KeywordEngine::new(vocabulary, scorer))
}

#[cfg(feature = "onnx")]
fn load_scorer(paths: &ArtifactPaths, num_labels: usize) -> Result<Box<dyn LabelScorer>, AppError> {
    let classifier = crate::keywords::onnx::OnnxClassifier::load(&paths.model(), &paths.tokenizer(), num_labels)?;
    Ok(Box::new(classifier))
}

#[cfg(not(feature = "onnx"))]
fn load_scorer(_paths: &ArtifactPaths, _num_labels: usize) -> Result<Box<dyn LabelScorer>, AppError> {
    Err(AppError::new(
        EXIT_MODEL,
        "This build has no classifier backend. Rebuild with `--features onnx`.",
    ))
}
