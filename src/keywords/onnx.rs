//! ONNX Runtime backend for the keyword classifier.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;

use crate::error::{AppError, EXIT_MODEL};
use crate::keywords::encode::{MAX_SEQUENCE_LEN, fit_to_budget, sigmoid};
use crate::keywords::engine::{ClassifierError, LabelScorer};

/// Transformer encoder with a linear multi-label head, exported to ONNX.
///
/// Inputs are `input_ids` and `attention_mask` of shape `[1, 512]`; the single
/// output is `[1, num_labels]` logits. `Session::run` needs `&mut`, hence the
/// mutex; inference itself never changes weights.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    tokenizer: tokenizers::Tokenizer,
    pad_id: u32,
    num_labels: usize,
}

impl OnnxClassifier {
    pub fn load(model_path: &Path, tokenizer_path: &Path, num_labels: usize) -> Result<Self, AppError> {
        for path in [model_path, tokenizer_path] {
            if !path.exists() {
                return Err(AppError::new(
                    EXIT_MODEL,
                    format!("Missing classifier artifact '{}'.", path.display()),
                ));
            }
        }

        let session = Session::builder()
            .map_err(|e: ort::Error| AppError::new(EXIT_MODEL, format!("ONNX runtime init failed: {e}")))?
            .commit_from_file(model_path)
            .map_err(|e: ort::Error| AppError::new(EXIT_MODEL, format!("ONNX load failed: {e}")))?;

        let tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path)
            .map_err(|e| AppError::new(EXIT_MODEL, format!("Tokenizer load failed: {e}")))?;

        // RoBERTa-family tokenizers pad with `<pad>`; fall back to id 0 otherwise.
        let pad_id = tokenizer
            .get_padding()
            .map(|p| p.pad_id)
            .or_else(|| tokenizer.token_to_id("<pad>"))
            .unwrap_or(0);

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            pad_id,
            num_labels,
        })
    }
}

impl LabelScorer for OnnxClassifier {
    fn scores(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ClassifierError::Tokenization(e.to_string()))?;
        let seq = fit_to_budget(encoding.get_ids(), MAX_SEQUENCE_LEN, self.pad_id);

        let ids_array = ndarray::Array2::from_shape_vec((1, MAX_SEQUENCE_LEN), seq.input_ids)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let mask_array = ndarray::Array2::from_shape_vec((1, MAX_SEQUENCE_LEN), seq.attention_mask)
            .map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let ids_tensor =
            TensorRef::from_array_view(&ids_array).map_err(|e| ClassifierError::Inference(e.to_string()))?;
        let mask_tensor =
            TensorRef::from_array_view(&mask_array).map_err(|e| ClassifierError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| ClassifierError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![ids_tensor, mask_tensor])
            .map_err(|e| ClassifierError::Inference(format!("ONNX inference failed: {e}")))?;

        let (shape, logits) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| ClassifierError::Inference(format!("Output extraction: {e}")))?;

        if shape.len() != 2 || shape[1] as usize != self.num_labels {
            return Err(ClassifierError::LabelCount {
                expected: self.num_labels,
                got: shape.last().map(|&d| d as usize).unwrap_or(0),
            });
        }

        Ok(logits.iter().take(self.num_labels).map(|&l| sigmoid(l)).collect())
    }
}
