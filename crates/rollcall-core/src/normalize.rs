//! L2 normalization of face descriptors.
//!
//! Enrollment and query descriptors can come out of inference at different
//! raw scales. Rescaling both to unit length makes cosine similarity the
//! only quantity that matters when comparing them.

use crate::types::Descriptor;

/// Euclidean length of `values`, accumulated in `f64`.
pub fn l2_norm(values: &[f32]) -> f64 {
    values
        .iter()
        .map(|&v| f64::from(v) * f64::from(v))
        .sum::<f64>()
        .sqrt()
}

/// Return a unit-length copy of `descriptor`.
///
/// A zero-magnitude descriptor (failed inference, placeholder output) is
/// returned unchanged rather than divided by zero. It will later score 0.0
/// against everything. The same applies to a descriptor whose magnitude is
/// not finite, since no rescaling of it is meaningful.
pub fn normalize(descriptor: &Descriptor) -> Descriptor {
    let norm = l2_norm(&descriptor.values);
    if norm == 0.0 || !norm.is_finite() {
        return descriptor.clone();
    }

    Descriptor::new(
        descriptor
            .values
            .iter()
            .map(|&v| (f64::from(v) / norm) as f32)
            .collect(),
    )
}

/// Combine several captures of one identity into a single enrollment
/// template.
///
/// Each capture is normalized, then the captures are averaged component-wise
/// and the mean is normalized again. Degenerate captures are skipped, as are
/// captures whose length differs from the first usable one. Returns `None`
/// when nothing usable remains.
pub fn mean_descriptor(captures: &[Descriptor]) -> Option<Descriptor> {
    let mut usable = captures.iter().filter(|d| !d.is_degenerate());
    let first = usable.next()?;
    let dim = first.len();

    let mut sum: Vec<f64> = vec![0.0; dim];
    let mut count = 0usize;
    let mut skipped = 0usize;

    for capture in std::iter::once(first).chain(usable) {
        if capture.len() != dim {
            skipped += 1;
            continue;
        }
        let norm = capture.l2_norm();
        for (acc, &v) in sum.iter_mut().zip(&capture.values) {
            *acc += f64::from(v) / norm;
        }
        count += 1;
    }

    if skipped > 0 {
        tracing::debug!(dim, count, skipped, "template: skipped captures with mismatched length");
    }

    let mean = Descriptor::new(sum.iter().map(|s| (s / count as f64) as f32).collect());
    // Opposing captures can cancel out entirely.
    if mean.is_degenerate() {
        return None;
    }
    Some(normalize(&mean))
}
