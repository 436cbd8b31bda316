use crate::types::Descriptor;

/// Compute cosine similarity between two descriptors.
///
/// Returns a value in [-1, 1]. Higher = more similar. Never fails:
/// descriptors of different lengths, zero-magnitude descriptors, and
/// descriptors carrying NaN or infinite components all score 0.0.
pub fn cosine_similarity(a: &Descriptor, b: &Descriptor) -> f64 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (&x, &y) in a.values.iter().zip(&b.values) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !similarity.is_finite() {
        return 0.0;
    }
    // Rounding can push identical directions to 1.0000000000000002.
    similarity.clamp(-1.0, 1.0)
}

/// Compute Euclidean distance between two descriptors.
///
/// Descriptors of different lengths are infinitely far apart.
pub fn euclidean_distance(a: &Descriptor, b: &Descriptor) -> f64 {
    if a.len() != b.len() {
        return f64::INFINITY;
    }
    a.values
        .iter()
        .zip(&b.values)
        .map(|(&x, &y)| (f64::from(x) - f64::from(y)).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn d(values: &[f32]) -> Descriptor {
        Descriptor::new(values.to_vec())
    }

    fn pair_of_len() -> impl Strategy<Value = (Vec<f32>, Vec<f32>)> {
        (1usize..130).prop_flat_map(|len| {
            (
                prop::collection::vec(-100.0f32..100.0, len),
                prop::collection::vec(-100.0f32..100.0, len),
            )
        })
    }

    #[test]
    fn test_cosine_similarity_identical() {
        assert!((cosine_similarity(&d(&[1.0, 0.0, 0.0]), &d(&[1.0, 0.0, 0.0])) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        assert_eq!(cosine_similarity(&d(&[1.0, 0.0]), &d(&[0.0, 1.0])), 0.0);
    }

    #[test]
    fn test_cosine_similarity_opposite() {
        assert!((cosine_similarity(&d(&[1.0, 0.0]), &d(&[-1.0, 0.0])) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cosine_similarity_is_scale_invariant() {
        let sim = cosine_similarity(&d(&[3.0, 4.0]), &d(&[0.6, 0.8]));
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&d(&[0.0, 0.0]), &d(&[1.0, 0.0])), 0.0);
        assert_eq!(cosine_similarity(&d(&[1.0, 0.0]), &d(&[0.0, 0.0])), 0.0);
    }

    #[test]
    fn test_cosine_similarity_length_mismatch() {
        assert_eq!(cosine_similarity(&d(&[1.0, 0.0]), &d(&[1.0, 0.0, 0.0])), 0.0);
        assert_eq!(cosine_similarity(&d(&[]), &d(&[1.0])), 0.0);
    }

    #[test]
    fn test_cosine_similarity_empty_pair() {
        assert_eq!(cosine_similarity(&d(&[]), &d(&[])), 0.0);
    }

    #[test]
    fn test_cosine_similarity_nan_component() {
        assert_eq!(cosine_similarity(&d(&[f32::NAN, 1.0]), &d(&[1.0, 1.0])), 0.0);
    }

    #[test]
    fn test_euclidean_distance() {
        assert_eq!(euclidean_distance(&d(&[0.0, 0.0]), &d(&[3.0, 4.0])), 5.0);
        assert_eq!(euclidean_distance(&d(&[1.0]), &d(&[1.0, 2.0])), f64::INFINITY);
    }

    proptest! {
        #[test]
        fn prop_self_similarity_is_one(values in prop::collection::vec(-100.0f32..100.0, 1..130)) {
            let v = Descriptor::new(values);
            prop_assume!(!v.is_degenerate());
            prop_assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
        }

        #[test]
        fn prop_similarity_is_symmetric((a, b) in pair_of_len()) {
            let (a, b) = (Descriptor::new(a), Descriptor::new(b));
            prop_assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        }

        #[test]
        fn prop_similarity_in_range((a, b) in pair_of_len()) {
            let sim = cosine_similarity(&Descriptor::new(a), &Descriptor::new(b));
            prop_assert!((-1.0..=1.0).contains(&sim));
        }

        #[test]
        fn prop_mismatched_lengths_score_zero(
            a in prop::collection::vec(-100.0f32..100.0, 1..64),
            extra in 1usize..8,
        ) {
            let mut b = a.clone();
            b.extend(std::iter::repeat(1.0).take(extra));
            prop_assert_eq!(cosine_similarity(&Descriptor::new(a), &Descriptor::new(b)), 0.0);
        }
    }
}
