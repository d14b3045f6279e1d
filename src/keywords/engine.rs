//! Multi-label keyword decision with confidence fallback.
//!
//! The classifier itself is a `LabelScorer`: text in, one independent
//! probability per vocabulary label out. `KeywordEngine` turns those
//! probabilities into a `PredictionResult`:
//!
//! - every label with probability strictly above the threshold is selected
//! - if none is, the single highest-probability label is forced in and the
//!   result is marked `fallback_used`
//! - blank input skips the classifier and yields an empty, non-fallback result

use crate::domain::{KeywordVocabulary, PredictionResult};

/// Default decision threshold for label selection.
pub const DEFAULT_THRESHOLD: f32 = 0.4;

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    #[error("Classifier inference failed: {0}")]
    Inference(String),

    #[error("Classifier returned {got} scores for a vocabulary of {expected} labels")]
    LabelCount { expected: usize, got: usize },
}

/// Anything that scores a text against every vocabulary label.
///
/// Scores are probabilities in `[0, 1]`, one per label, in vocabulary order.
/// Implementations must not mutate shared state per call.
pub trait LabelScorer {
    fn scores(&self, text: &str) -> Result<Vec<f32>, ClassifierError>;
}

impl<T: LabelScorer + ?Sized> LabelScorer for Box<T> {
    fn scores(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        (**self).scores(text)
    }
}

/// Loaded classifier plus its label space. Built once, shared read-only.
pub struct KeywordEngine<S> {
    vocabulary: KeywordVocabulary,
    scorer: S,
}

impl<S: LabelScorer> KeywordEngine<S> {
    pub fn new(vocabulary: KeywordVocabulary, scorer: S) -> Self {
        Self { vocabulary, scorer }
    }

    pub fn vocabulary(&self) -> &KeywordVocabulary {
        &self.vocabulary
    }

    /// Tag one title.
    pub fn infer(&self, text: &str, threshold: f32) -> Result<PredictionResult, ClassifierError> {
        if text.trim().is_empty() {
            return Ok(PredictionResult::empty());
        }

        let probs = self.scorer.scores(text)?;
        if probs.len() != self.vocabulary.len() {
            return Err(ClassifierError::LabelCount {
                expected: self.vocabulary.len(),
                got: probs.len(),
            });
        }

        let result = select_keywords(&probs, &self.vocabulary, threshold);
        tracing::debug!(
            keywords = %result.joined(),
            fallback = result.fallback_used,
            max_prob = result.max_probability,
            "Tagged title"
        );
        Ok(result)
    }
}

/// Apply the threshold rule, then the arg-max fallback if nothing was selected.
///
/// `probs[i]` belongs to `vocabulary.get(i)`. NaN scores are never selected.
pub fn select_keywords(probs: &[f32], vocabulary: &KeywordVocabulary, threshold: f32) -> PredictionResult {
    let mut keywords = Vec::new();
    let mut max_probability: Option<f32> = None;

    for (idx, &p) in probs.iter().enumerate() {
        if p > threshold {
            if let Some(label) = vocabulary.get(idx) {
                keywords.push(label.to_string());
                max_probability = Some(max_probability.map_or(p, |m| m.max(p)));
            }
        }
    }

    if let Some(max_probability) = max_probability {
        return PredictionResult {
            keywords,
            fallback_used: false,
            max_probability,
        };
    }

    match arg_max(probs).and_then(|idx| vocabulary.get(idx).map(|label| (label, probs[idx]))) {
        Some((label, p)) => PredictionResult {
            keywords: vec![label.to_string()],
            fallback_used: true,
            max_probability: p,
        },
        None => PredictionResult::empty(),
    }
}

/// Index of the largest finite score. Ties keep the earliest label.
fn arg_max(probs: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &p) in probs.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if p <= b => {}
            _ => best = Some((idx, p)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct StubScorer {
        probs: Vec<f32>,
        calls: Cell<usize>,
    }

    impl StubScorer {
        fn new(probs: &[f32]) -> Self {
            Self {
                probs: probs.to_vec(),
                calls: Cell::new(0),
            }
        }
    }

    impl LabelScorer for StubScorer {
        fn scores(&self, _text: &str) -> Result<Vec<f32>, ClassifierError> {
            self.calls.set(self.calls.get() + 1);
            Ok(self.probs.clone())
        }
    }

    fn vocab(labels: &[&str]) -> KeywordVocabulary {
        KeywordVocabulary::new(labels.iter().map(|s| s.to_string()).collect())
    }

    fn engine(probs: &[f32]) -> KeywordEngine<StubScorer> {
        KeywordEngine::new(vocab(&["furniture", "school", "rfp"]), StubScorer::new(probs))
    }

    #[test]
    fn furniture_title_selects_single_label() {
        let result = engine(&[0.55, 0.30, 0.10])
            .infer("Furniture RFP for school district", DEFAULT_THRESHOLD)
            .unwrap();
        assert_eq!(result.keywords, vec!["furniture"]);
        assert!(!result.fallback_used);
        assert!((result.max_probability - 0.55).abs() < 1e-6);
    }

    #[test]
    fn max_probability_is_over_selected_labels_only() {
        let v = vocab(&["a", "b", "c", "d"]);
        let result = select_keywords(&[0.45, 0.9, 0.2, 0.5], &v, 0.4);
        assert_eq!(result.keywords, vec!["a", "b", "d"]);
        assert!((result.max_probability - 0.9).abs() < 1e-6);

        // With a higher threshold the global max is still selected, others not.
        let result = select_keywords(&[0.45, 0.9, 0.2, 0.5], &v, 0.6);
        assert_eq!(result.keywords, vec!["b"]);
        assert!((result.max_probability - 0.9).abs() < 1e-6);
    }

    #[test]
    fn nothing_above_threshold_falls_back_to_arg_max() {
        let result = engine(&[0.10, 0.35, 0.20]).infer("Janitorial services", 0.4).unwrap();
        assert_eq!(result.keywords, vec!["school"]);
        assert!(result.fallback_used);
        assert!((result.max_probability - 0.35).abs() < 1e-6);
    }

    #[test]
    fn threshold_is_strict() {
        let result = engine(&[0.4, 0.1, 0.1]).infer("Desks", 0.4).unwrap();
        assert!(result.fallback_used);
        assert_eq!(result.keywords, vec!["furniture"]);
    }

    #[test]
    fn blank_text_skips_classifier() {
        let engine = engine(&[0.9, 0.9, 0.9]);
        for text in ["", "   "] {
            let result = engine.infer(text, DEFAULT_THRESHOLD).unwrap();
            assert_eq!(result, PredictionResult::empty());
        }
        assert_eq!(engine.scorer.calls.get(), 0);
    }

    #[test]
    fn score_count_must_match_vocabulary() {
        let err = engine(&[0.5, 0.5]).infer("Chairs", DEFAULT_THRESHOLD).unwrap_err();
        assert!(matches!(err, ClassifierError::LabelCount { expected: 3, got: 2 }));
    }

    #[test]
    fn arg_max_skips_nan_and_keeps_first_tie() {
        assert_eq!(arg_max(&[f32::NAN, 0.2, 0.2]), Some(1));
        assert_eq!(arg_max(&[f32::NAN]), None);
        assert_eq!(arg_max(&[]), None);
    }

    #[test]
    fn empty_scores_yield_empty_result() {
        let result = select_keywords(&[], &vocab(&[]), 0.4);
        assert_eq!(result, PredictionResult::empty());
    }
}
