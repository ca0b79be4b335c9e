// file: src/embedding/similarity.rs
// description: cosine similarity between embedding vectors

use crate::error::{RelevanceError, Result};

/// Cosine similarity, `1 - cosine_distance(a, b)`, in `[-1, 1]`.
///
/// Accumulates in f64. A zero-norm vector has no direction and scores 0.0.
/// Vectors of different length are an integration error.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(RelevanceError::DimensionMismatch {
            expected: b.len(),
            actual: a.len(),
        });
    }

    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            (dot + x * y, na + x * x, nb + y * y)
        },
    );

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_identical_vectors() {
        let v = [0.3f32, -1.2, 4.0];
        assert!((cosine_similarity(&v, &v).unwrap() - 1.0).abs() < EPS);
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap().abs() < EPS);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn test_known_angle() {
        let similarity = cosine_similarity(&[0.8, 0.6], &[1.0, 0.0]).unwrap();
        assert!((similarity - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_scale_invariant() {
        let a = cosine_similarity(&[1.0, 2.0], &[3.0, 1.0]).unwrap();
        let b = cosine_similarity(&[10.0, 20.0], &[3.0, 1.0]).unwrap();
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn test_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let err = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            RelevanceError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }
}
