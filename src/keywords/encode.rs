//! Fixed-budget token sequences and per-label activation.

/// Token budget of the classifier input.
pub const MAX_SEQUENCE_LEN: usize = 512;

/// Model input for one title: ids and attention mask, both exactly `max_len` long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedSequence {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
}

/// Truncate or right-pad `ids` to exactly `max_len` tokens.
///
/// `ids` is expected to already carry the tokenizer's special tokens. When
/// truncating, the final token (the closing special token) is kept in the last
/// slot so the sequence stays well-formed.
pub fn fit_to_budget(ids: &[u32], max_len: usize, pad_id: u32) -> EncodedSequence {
    let mut input_ids: Vec<i64> = Vec::with_capacity(max_len);

    if ids.len() > max_len {
        if max_len > 0 {
            input_ids.extend(ids[..max_len - 1].iter().map(|&id| id as i64));
            input_ids.push(ids[ids.len() - 1] as i64);
        }
    } else {
        input_ids.extend(ids.iter().map(|&id| id as i64));
    }

    let used = input_ids.len();
    let mut attention_mask = vec![1i64; used];
    attention_mask.resize(max_len, 0);
    input_ids.resize(max_len, pad_id as i64);

    EncodedSequence {
        input_ids,
        attention_mask,
    }
}

/// Logistic activation. Each label is scored independently.
pub fn sigmoid(logit: f32) -> f32 {
    1.0 / (1.0 + (-logit).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sequence_is_right_padded() {
        let seq = fit_to_budget(&[0, 10, 11, 2], 8, 1);
        assert_eq!(seq.input_ids, vec![0, 10, 11, 2, 1, 1, 1, 1]);
        assert_eq!(seq.attention_mask, vec![1, 1, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn long_sequence_is_truncated_keeping_closing_token() {
        let ids: Vec<u32> = (0..700).collect();
        let seq = fit_to_budget(&ids, MAX_SEQUENCE_LEN, 1);
        assert_eq!(seq.input_ids.len(), MAX_SEQUENCE_LEN);
        assert_eq!(seq.input_ids[MAX_SEQUENCE_LEN - 2], 510);
        assert_eq!(seq.input_ids[MAX_SEQUENCE_LEN - 1], 699);
        assert!(seq.attention_mask.iter().all(|&m| m == 1));
    }

    #[test]
    fn exact_length_is_untouched() {
        let ids: Vec<u32> = (0..4).collect();
        let seq = fit_to_budget(&ids, 4, 1);
        assert_eq!(seq.input_ids, vec![0, 1, 2, 3]);
        assert_eq!(seq.attention_mask, vec![1, 1, 1, 1]);
    }

    #[test]
    fn sigmoid_is_centered_and_bounded() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }
}
