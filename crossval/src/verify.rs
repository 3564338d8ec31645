//! Element-wise result comparison
//!
//! [`verify`] certifies that a candidate result matches the reference under
//! the element type's equality rule: exact for integers, within `epsilon`
//! for floats. It stops at the first mismatch and reports it.

use serde::{Deserialize, Serialize};
use std::fmt;
use vecadd_common::Numeric;

pub use vecadd_common::DEFAULT_EPSILON;

/// What kind of disagreement a failed verification found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MismatchKind {
    /// Arrays have different lengths; no element was compared
    Size,
    /// An element differs beyond the allowed tolerance
    Value,
}

impl fmt::Display for MismatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MismatchKind::Size => write!(f, "size"),
            MismatchKind::Value => write!(f, "value"),
        }
    }
}

/// The first disagreement found
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Mismatch<T> {
    Size { reference_len: usize, candidate_len: usize },
    Value { index: usize, reference: T, candidate: T },
}

/// Outcome of [`verify`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult<T> {
    /// True when every element matched
    pub ok: bool,
    /// First disagreement, if any
    pub mismatch: Option<Mismatch<T>>,
    /// Number of indices examined
    pub compared: usize,
    /// Largest absolute difference over the examined indices
    pub max_abs_diff: f64,
}

impl<T: Copy> VerificationResult<T> {
    pub fn kind(&self) -> Option<MismatchKind> {
        self.mismatch.map(|m| match m {
            Mismatch::Size { .. } => MismatchKind::Size,
            Mismatch::Value { .. } => MismatchKind::Value,
        })
    }

    /// Index of the first differing element; `None` on success or size mismatch
    pub fn mismatch_index(&self) -> Option<usize> {
        match self.mismatch {
            Some(Mismatch::Value { index, .. }) => Some(index),
            _ => None,
        }
    }

    /// `(reference, candidate)` at the first differing element
    pub fn values(&self) -> Option<(T, T)> {
        match self.mismatch {
            Some(Mismatch::Value { reference, candidate, .. }) => Some((reference, candidate)),
            _ => None,
        }
    }
}

impl<T: fmt::Display> fmt::Display for VerificationResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.mismatch {
            None => write!(f, "verified {} elements", self.compared),
            Some(Mismatch::Size { reference_len, candidate_len }) => write!(
                f,
                "size mismatch: reference has {} elements, candidate has {}",
                reference_len, candidate_len
            ),
            Some(Mismatch::Value { index, reference, candidate }) => write!(
                f,
                "first mismatch at index {}: expected {}, got {}",
                index, reference, candidate
            ),
        }
    }
}

/// Compare `candidate` against `reference`
///
/// Lengths are checked first. Elements are then scanned in index order and
/// the scan stops at the first mismatch, otherwise every index is examined.
/// `epsilon` is ignored for integer types.
pub fn verify<T: Numeric>(reference: &[T], candidate: &[T], epsilon: f64) -> VerificationResult<T> {
    if reference.len() != candidate.len() {
        return VerificationResult {
            ok: false,
            mismatch: Some(Mismatch::Size {
                reference_len: reference.len(),
                candidate_len: candidate.len(),
            }),
            compared: 0,
            max_abs_diff: 0.0,
        };
    }

    let mut max_abs_diff = 0.0f64;
    for (index, (&r, &c)) in reference.iter().zip(candidate).enumerate() {
        if !T::matches(r, c, epsilon) {
            log::debug!("verification failed at index {}: {} vs {}", index, r, c);
            return VerificationResult {
                ok: false,
                mismatch: Some(Mismatch::Value { index, reference: r, candidate: c }),
                compared: index + 1,
                max_abs_diff: max_abs_diff.max(T::abs_error(r, c)),
            };
        }
        let diff = T::abs_error(r, c);
        if diff > max_abs_diff {
            max_abs_diff = diff;
        }
    }

    VerificationResult { ok: true, mismatch: None, compared: reference.len(), max_abs_diff }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_arrays_verify() {
        let r = verify(&[1, 2, 3], &[1, 2, 3], DEFAULT_EPSILON);
        assert!(r.ok);
        assert_eq!(r.kind(), None);
        assert_eq!(r.mismatch_index(), None);
        assert_eq!(r.compared, 3);
        assert_eq!(r.max_abs_diff, 0.0);
    }

    #[test]
    fn size_mismatch_reports_no_index() {
        let r = verify(&[1.0f32; 5], &[1.0f32; 6], DEFAULT_EPSILON);
        assert!(!r.ok);
        assert_eq!(r.kind(), Some(MismatchKind::Size));
        assert_eq!(r.mismatch_index(), None);
        assert_eq!(r.values(), None);
        assert_eq!(r.compared, 0);
    }

    #[test]
    fn first_mismatch_beyond_epsilon() {
        let reference = [1.0f64, 2.0, 3.0];
        let candidate = [1.0f64, 2.000001, 3.0];

        let r = verify(&reference, &candidate, 1e-6);

        assert!(!r.ok);
        assert_eq!(r.kind(), Some(MismatchKind::Value));
        assert_eq!(r.mismatch_index(), Some(1));
        assert_eq!(r.values(), Some((2.0, 2.000001)));
        assert_eq!(r.compared, 2);
    }

    #[test]
    fn float_within_epsilon_passes() {
        let r = verify(&[1.0f32, 2.0], &[1.0f32, 2.0 + 4.0e-7], 1e-6);
        assert!(r.ok);
        assert!(r.max_abs_diff > 0.0);
        assert!(r.max_abs_diff <= 1e-6);
    }

    #[test]
    fn stops_at_first_of_several_mismatches() {
        let r = verify(&[0, 1, 2, 3], &[0, 9, 2, 9], 0.0);
        assert_eq!(r.mismatch_index(), Some(1));
        assert_eq!(r.values(), Some((1, 9)));
    }

    #[test]
    fn integer_comparison_is_exact() {
        let r = verify(&[100, 200], &[100, 201], 10.0);
        assert_eq!(r.mismatch_index(), Some(1));
    }

    #[test]
    fn nan_handling() {
        assert!(verify(&[f32::NAN], &[f32::NAN], 1e-6).ok);
        assert_eq!(verify(&[1.0f32], &[f32::NAN], 1e-6).mismatch_index(), Some(0));
        assert!(verify(&[f32::INFINITY], &[f32::INFINITY], 1e-6).ok);
    }

    #[test]
    fn empty_arrays_verify() {
        let r = verify::<i32>(&[], &[], DEFAULT_EPSILON);
        assert!(r.ok);
        assert_eq!(r.compared, 0);
    }

    #[test]
    fn display_names_both_values() {
        let r = verify(&[1, 2], &[1, 5], 0.0);
        assert_eq!(r.to_string(), "first mismatch at index 1: expected 2, got 5");
    }
}
