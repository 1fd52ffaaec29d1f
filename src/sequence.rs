use ndarray::Array2;

use crate::types::FEATURE_DIM;

/// Assemble a fixed-length sequence tensor from per-frame keypoint rows.
///
/// Short inputs are zero-padded at the end, long inputs keep only their
/// first `target_len` rows, and an empty input yields an all-zero array.
/// Rows are assumed to already be [`FEATURE_DIM`] wide; no per-frame
/// validation happens here.
pub fn normalize_sequence(frames: &[Vec<f32>], target_len: usize) -> Array2<f32> {
    let mut sequence = Array2::<f32>::zeros((target_len, FEATURE_DIM));
    for (row, keypoints) in frames.iter().take(target_len).enumerate() {
        for (col, value) in keypoints.iter().take(FEATURE_DIM).enumerate() {
            sequence[[row, col]] = *value;
        }
    }
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant_row(value: f32) -> Vec<f32> {
        vec![value; FEATURE_DIM]
    }

    #[test]
    fn empty_input_yields_all_zeros() {
        let sequence = normalize_sequence(&[], 117);
        assert_eq!(sequence.dim(), (117, FEATURE_DIM));
        assert!(sequence.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn short_input_is_padded_at_the_end() {
        let frames: Vec<Vec<f32>> = (1..=4).map(|i| constant_row(i as f32)).collect();
        let sequence = normalize_sequence(&frames, 10);

        assert_eq!(sequence.dim(), (10, FEATURE_DIM));
        for (row, frame) in frames.iter().enumerate() {
            assert_eq!(sequence.row(row).to_vec(), *frame);
        }
        for row in frames.len()..10 {
            assert!(sequence.row(row).iter().all(|v| *v == 0.0));
        }
    }

    #[test]
    fn long_input_keeps_the_first_rows() {
        let frames: Vec<Vec<f32>> = (0..20).map(|i| constant_row(i as f32)).collect();
        let sequence = normalize_sequence(&frames, 5);

        assert_eq!(sequence.dim(), (5, FEATURE_DIM));
        for row in 0..5 {
            assert_eq!(sequence.row(row).to_vec(), frames[row]);
        }
    }

    #[test]
    fn exact_length_input_is_copied_unchanged() {
        let frames: Vec<Vec<f32>> = (0..3).map(|i| constant_row(i as f32)).collect();
        let sequence = normalize_sequence(&frames, 3);

        for row in 0..3 {
            assert_eq!(sequence.row(row).to_vec(), frames[row]);
        }
    }
}
