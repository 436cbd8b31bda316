//! rollcall-core — Face descriptor normalization and identity matching.
//!
//! Descriptors come from an external inference step. This crate rescales
//! them to unit length and resolves a query against an enrollment snapshot
//! by cosine similarity. Nothing here allocates state across calls.

pub mod matcher;
pub mod normalize;
pub mod similarity;
pub mod types;

pub use matcher::{find_best_match, find_best_matches, rank, CosineMatcher, Matcher, ScanReport};
pub use normalize::{mean_descriptor, normalize};
pub use similarity::{cosine_similarity, euclidean_distance};
pub use types::{Candidate, Descriptor, DescriptorError, EnrollmentRecord, MatchResult};

/// Default cosine similarity a candidate must reach to count as a match.
///
/// Tuned for 128-dimensional face descriptors. Other descriptor models
/// usually need their own value; callers should treat this as a starting
/// point and expose it as configuration.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.6;
