use facematch_vision::{face, Descriptor, DescriptorError};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Distance at or below which two descriptors are the same face
pub const DEFAULT_THRESHOLD: f32 = 0.6;

#[derive(Debug, Error, PartialEq)]
pub enum MatchError {
    #[error("invalid input: candidate {index}")]
    InvalidInput {
        index: usize,
        #[source]
        source: DescriptorError,
    },
}

/// Verdict for one candidate descriptor
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MatchResult {
    pub index: usize,
    pub distance: f32,
    pub is_match: bool,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_match {
            write!(
                f,
                "Face {}: Match Found (Distance: {:.4})",
                self.index + 1,
                self.distance
            )
        } else {
            write!(f, "Face {}: No Match", self.index + 1)
        }
    }
}

/// Judge every candidate against `reference`, in candidate order.
///
/// All candidates must share the reference's dimension; the first one that
/// does not fails the whole call.
pub fn compare_descriptors(
    reference: &Descriptor,
    candidates: &[Descriptor],
    threshold: f32,
) -> Result<Vec<MatchResult>, MatchError> {
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| {
            let distance = face::euclidean_distance(reference, candidate)
                .map_err(|source| MatchError::InvalidInput { index, source })?;
            Ok(MatchResult {
                index,
                distance,
                is_match: distance <= threshold,
            })
        })
        .collect()
}

/// Compare using the first of `references`; no references means no results.
pub fn compare_first(
    references: &[Descriptor],
    candidates: &[Descriptor],
    threshold: f32,
) -> Result<Vec<MatchResult>, MatchError> {
    match references.first() {
        Some(reference) => compare_descriptors(reference, candidates, threshold),
        None => Ok(vec![]),
    }
}
