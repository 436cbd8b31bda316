use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::normalize;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DescriptorError {
    #[error("descriptor is empty")]
    Empty,
    #[error("expected {expected}-dim descriptor, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("descriptor component {index} is not finite")]
    NonFinite { index: usize },
}

/// Face descriptor (typically 128-dimensional).
///
/// Stored as `f32` to match what inference runtimes emit. All arithmetic
/// over descriptors accumulates in `f64`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Descriptor {
    pub values: Vec<f32>,
}

impl Descriptor {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values }
    }

    /// Build a descriptor straight from inference output, rejecting
    /// anything that is not `expected` finite components.
    pub fn with_dimension(values: Vec<f32>, expected: usize) -> Result<Self, DescriptorError> {
        if values.is_empty() {
            return Err(DescriptorError::Empty);
        }
        if values.len() != expected {
            return Err(DescriptorError::DimensionMismatch {
                expected,
                actual: values.len(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(DescriptorError::NonFinite { index });
        }
        Ok(Self { values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    /// Euclidean length of the descriptor.
    pub fn l2_norm(&self) -> f64 {
        normalize::l2_norm(&self.values)
    }

    /// True when the descriptor cannot take part in a comparison: empty,
    /// all zeros, or carrying a non-finite magnitude.
    pub fn is_degenerate(&self) -> bool {
        let norm = self.l2_norm();
        self.values.is_empty() || norm == 0.0 || !norm.is_finite()
    }

    /// Unit-length copy of this descriptor. See [`normalize`](crate::normalize()).
    pub fn normalized(&self) -> Descriptor {
        normalize::normalize(self)
    }
}

impl From<Vec<f32>> for Descriptor {
    fn from(values: Vec<f32>) -> Self {
        Self { values }
    }
}

impl AsRef<[f32]> for Descriptor {
    fn as_ref(&self) -> &[f32] {
        &self.values
    }
}

/// An enrolled identity and its descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    /// Opaque identifier, e.g. a student ID.
    pub identity: String,
    pub descriptor: Descriptor,
}

impl EnrollmentRecord {
    pub fn new(identity: impl Into<String>, descriptor: impl Into<Descriptor>) -> Self {
        Self {
            identity: identity.into(),
            descriptor: descriptor.into(),
        }
    }

    /// Copy of this record with its descriptor rescaled to unit length.
    pub fn normalized(&self) -> EnrollmentRecord {
        Self {
            identity: self.identity.clone(),
            descriptor: self.descriptor.normalized(),
        }
    }
}

/// A record that cleared the threshold during a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub identity: String,
    /// Cosine similarity to the query, in [-1, 1].
    pub similarity: f64,
    /// Position of the record in the enrollment snapshot.
    pub index: usize,
}

/// Outcome of resolving one query against an enrollment snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchResult {
    NoMatch,
    /// `score` is always >= the threshold the match was made with.
    Match { identity: String, score: f64 },
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchResult::Match { .. })
    }

    pub fn identity(&self) -> Option<&str> {
        match self {
            MatchResult::Match { identity, .. } => Some(identity),
            MatchResult::NoMatch => None,
        }
    }

    pub fn score(&self) -> Option<f64> {
        match self {
            MatchResult::Match { score, .. } => Some(*score),
            MatchResult::NoMatch => None,
        }
    }
}

impl From<Option<Candidate>> for MatchResult {
    fn from(candidate: Option<Candidate>) -> Self {
        match candidate {
            Some(c) => MatchResult::Match {
                identity: c.identity,
                score: c.similarity,
            },
            None => MatchResult::NoMatch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_dimension_accepts_exact_length() {
        let d = Descriptor::with_dimension(vec![0.5; 128], 128).unwrap();
        assert_eq!(d.len(), 128);
    }

    #[test]
    fn test_with_dimension_rejects_wrong_length() {
        let err = Descriptor::with_dimension(vec![0.5; 3], 128).unwrap_err();
        assert_eq!(
            err,
            DescriptorError::DimensionMismatch {
                expected: 128,
                actual: 3
            }
        );
        assert_eq!(err.to_string(), "expected 128-dim descriptor, got 3");
    }

    #[test]
    fn test_with_dimension_rejects_empty_and_non_finite() {
        assert_eq!(
            Descriptor::with_dimension(vec![], 0).unwrap_err(),
            DescriptorError::Empty
        );
        assert_eq!(
            Descriptor::with_dimension(vec![1.0, f32::NAN, 0.0], 3).unwrap_err(),
            DescriptorError::NonFinite { index: 1 }
        );
    }

    #[test]
    fn test_is_degenerate() {
        assert!(Descriptor::new(vec![]).is_degenerate());
        assert!(Descriptor::new(vec![0.0, 0.0, 0.0]).is_degenerate());
        assert!(Descriptor::new(vec![f32::INFINITY, 1.0]).is_degenerate());
        assert!(!Descriptor::new(vec![0.0, 1e-3]).is_degenerate());
    }

    #[test]
    fn test_descriptor_serializes_as_plain_array() {
        let d = Descriptor::new(vec![0.5, -1.0]);
        assert_eq!(serde_json::to_string(&d).unwrap(), "[0.5,-1.0]");
        let back: Descriptor = serde_json::from_str("[0.5,-1.0]").unwrap();
        assert_eq!(back, d);
    }

    #[test]
    fn test_enrollment_record_json_shape() {
        let rec: EnrollmentRecord =
            serde_json::from_str(r#"{"identity":"S-1042","descriptor":[3.0,4.0]}"#).unwrap();
        assert_eq!(rec.identity, "S-1042");
        assert_eq!(rec.normalized().descriptor.values, vec![0.6, 0.8]);
    }

    #[test]
    fn test_match_result_json_shape() {
        let m = MatchResult::Match {
            identity: "A".into(),
            score: 1.0,
        };
        assert_eq!(
            serde_json::to_string(&m).unwrap(),
            r#"{"result":"match","identity":"A","score":1.0}"#
        );
        assert_eq!(
            serde_json::to_string(&MatchResult::NoMatch).unwrap(),
            r#"{"result":"no_match"}"#
        );
    }

    #[test]
    fn test_match_result_accessors() {
        let m = MatchResult::from(Some(Candidate {
            identity: "X".into(),
            similarity: 0.75,
            index: 2,
        }));
        assert!(m.is_match());
        assert_eq!(m.identity(), Some("X"));
        assert_eq!(m.score(), Some(0.75));

        let none = MatchResult::from(None);
        assert!(!none.is_match());
        assert_eq!(none.identity(), None);
        assert_eq!(none.score(), None);
    }
}
