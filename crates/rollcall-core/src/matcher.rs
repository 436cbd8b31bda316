//! Identity resolution against an enrollment snapshot.
//!
//! The scan never fails. Empty snapshots, degenerate queries, and records
//! whose descriptor length differs from the query all degrade to "not a
//! candidate" so that one malformed record cannot abort a whole scan.

use serde::Serialize;

use crate::similarity::cosine_similarity;
use crate::types::{Candidate, Descriptor, EnrollmentRecord, MatchResult};

/// Strategy for resolving a query descriptor against enrolled identities.
pub trait Matcher {
    fn find_best_match(
        &self,
        query: &Descriptor,
        enrollment: &[EnrollmentRecord],
        threshold: f64,
    ) -> MatchResult;
}

/// Cosine similarity matcher.
///
/// The first record reaching the highest similarity wins; a later record
/// must score strictly higher to replace it. Enrollment order is therefore
/// part of the result.
#[derive(Debug, Clone, Copy, Default)]
pub struct CosineMatcher;

/// Everything a scan learned about one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// Best record at or above the threshold.
    pub best: Option<Candidate>,
    /// Best record regardless of threshold.
    pub best_overall: Option<Candidate>,
    /// Records actually compared against the query.
    pub compared: usize,
    /// Records left out for length mismatch or a degenerate descriptor.
    pub skipped: usize,
}

impl ScanReport {
    pub fn into_result(self) -> MatchResult {
        self.best.into()
    }
}

impl CosineMatcher {
    /// Compare `query` against every record in `enrollment`.
    pub fn scan(
        &self,
        query: &Descriptor,
        enrollment: &[EnrollmentRecord],
        threshold: f64,
    ) -> ScanReport {
        let mut report = ScanReport::default();
        if enrollment.is_empty() {
            return report;
        }
        if query.is_degenerate() {
            tracing::debug!(dim = query.len(), "scan: degenerate query, nothing to compare");
            return report;
        }

        // Always visit every record, no early exit on a perfect score.
        for (index, record) in enrollment.iter().enumerate() {
            if record.descriptor.len() != query.len() || record.descriptor.is_degenerate() {
                tracing::trace!(
                    index,
                    identity = %record.identity,
                    dim = record.descriptor.len(),
                    expected = query.len(),
                    "scan: record skipped"
                );
                report.skipped += 1;
                continue;
            }
            report.compared += 1;

            let similarity = cosine_similarity(query, &record.descriptor);

            if beats(&report.best_overall, similarity) {
                report.best_overall = Some(candidate(record, similarity, index));
            }
            if similarity >= threshold && beats(&report.best, similarity) {
                report.best = Some(candidate(record, similarity, index));
            }
        }

        tracing::debug!(
            compared = report.compared,
            skipped = report.skipped,
            threshold,
            best = report.best_overall.as_ref().map(|c| c.similarity),
            matched = report.best.is_some(),
            "scan complete"
        );

        report
    }

    /// All records at or above `threshold`, most similar first, at most
    /// `limit` of them.
    ///
    /// Ties keep enrollment order, so the first element is always the one
    /// [`find_best_match`](Matcher::find_best_match) would return.
    pub fn rank(
        &self,
        query: &Descriptor,
        enrollment: &[EnrollmentRecord],
        threshold: f64,
        limit: usize,
    ) -> Vec<Candidate> {
        if enrollment.is_empty() || query.is_degenerate() {
            return Vec::new();
        }

        let mut candidates: Vec<Candidate> = enrollment
            .iter()
            .enumerate()
            .filter(|(_, r)| r.descriptor.len() == query.len() && !r.descriptor.is_degenerate())
            .map(|(i, r)| candidate(r, cosine_similarity(query, &r.descriptor), i))
            .filter(|c| c.similarity >= threshold)
            .collect();

        // Stable sort: equal similarities stay in enrollment order.
        candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        candidates.truncate(limit);
        candidates
    }
}

impl Matcher for CosineMatcher {
    fn find_best_match(
        &self,
        query: &Descriptor,
        enrollment: &[EnrollmentRecord],
        threshold: f64,
    ) -> MatchResult {
        self.scan(query, enrollment, threshold).into_result()
    }
}

fn beats(best: &Option<Candidate>, similarity: f64) -> bool {
    match best {
        None => true,
        Some(b) => similarity > b.similarity,
    }
}

fn candidate(record: &EnrollmentRecord, similarity: f64, index: usize) -> Candidate {
    Candidate {
        identity: record.identity.clone(),
        similarity,
        index,
    }
}

/// Resolve `query` against `enrollment` with the cosine matcher.
///
/// Both sides are expected to be normalized already (see
/// [`normalize`](crate::normalize())). Returns [`MatchResult::NoMatch`] when
/// the snapshot is empty, the query is degenerate, or no record reaches
/// `threshold`.
pub fn find_best_match(
    query: &Descriptor,
    enrollment: &[EnrollmentRecord],
    threshold: f64,
) -> MatchResult {
    CosineMatcher.find_best_match(query, enrollment, threshold)
}

/// Resolve several queries (e.g. every face found in one frame) against the
/// same snapshot. Results come back in query order.
pub fn find_best_matches(
    queries: &[Descriptor],
    enrollment: &[EnrollmentRecord],
    threshold: f64,
) -> Vec<MatchResult> {
    queries
        .iter()
        .map(|q| CosineMatcher.find_best_match(q, enrollment, threshold))
        .collect()
}

/// See [`CosineMatcher::rank`].
pub fn rank(
    query: &Descriptor,
    enrollment: &[EnrollmentRecord],
    threshold: f64,
    limit: usize,
) -> Vec<Candidate> {
    CosineMatcher.rank(query, enrollment, threshold, limit)
}
