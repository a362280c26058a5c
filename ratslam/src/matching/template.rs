//! Intensity-profile templates and their alignment.
//!
//! A frame is reduced to a 1-D signature by summing each image column and
//! normalizing the profile to unit mass. Two signatures are compared by
//! sliding a fixed-width window over both at once and keeping the
//! alignment with the smallest L1 distance.
//!
//! The scan is deliberately asymmetric: for a left offset `i` into the
//! first signature the matching offset into the second is
//! `j = len(seg2) - window - 2 - i`, so the two windows sweep past each
//! other in opposite directions. Shifts are therefore recovered only when
//! they have the parity this relation allows.

use serde::{Deserialize, Serialize};

use crate::core::{EPSILON, Frame};

/// Normalized column-intensity profile of a frame.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    values: Vec<f64>,
    degenerate: bool,
}

impl Signature {
    /// Build a signature from a frame.
    ///
    /// Frames with no usable mass (all zero, or non-finite pixels) yield
    /// the uniform signature and are flagged as degenerate.
    pub fn from_frame(frame: &Frame) -> Self {
        Self::from_profile(frame.column_sums())
    }

    /// Normalize an arbitrary non-negative profile.
    pub fn from_profile(mut values: Vec<f64>) -> Self {
        let total: f64 = values.iter().sum();

        if values.is_empty() {
            return Self {
                values,
                degenerate: true,
            };
        }

        if !total.is_finite() || total <= EPSILON {
            log::warn!(
                "Degenerate frame signature (total intensity {}), using uniform fallback",
                total
            );
            return Self::uniform(values.len());
        }

        for v in values.iter_mut() {
            *v /= total;
        }

        Self {
            values,
            degenerate: false,
        }
    }

    /// The uniform signature of `len` columns.
    pub fn uniform(len: usize) -> Self {
        let value = if len == 0 { 0.0 } else { 1.0 / len as f64 };
        Self {
            values: vec![value; len],
            degenerate: true,
        }
    }

    /// Normalized column values
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of columns
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check for an empty signature
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// True when the uniform fallback replaced a zero-mass frame
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Sum of all values (1 up to rounding for non-empty signatures)
    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Shorthand for [`Signature::from_frame`].
pub fn signature_of(frame: &Frame) -> Signature {
    Signature::from_frame(frame)
}

/// Best alignment found by [`compare`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TemplateMatch {
    /// Column shift `j - i` of the best alignment
    pub offset: isize,
    /// L1 distance of the best alignment; `+inf` if nothing was comparable
    pub distance: f64,
}

impl TemplateMatch {
    /// Result when no alignment could be scored.
    pub fn no_match() -> Self {
        Self {
            offset: 0,
            distance: f64::INFINITY,
        }
    }
}

/// Find the alignment of two profiles with the smallest windowed L1 distance.
///
/// Left offsets `i` range over `[0, len(seg1) - window)`, each paired with
/// `j = len(seg2) - window - 2 - i`. Alignments whose window would fall
/// outside `seg2` are skipped. NaN distances never win.
pub fn compare(seg1: &[f64], seg2: &[f64], window: usize) -> TemplateMatch {
    if seg1 == seg2 && window <= seg1.len() {
        return TemplateMatch {
            offset: 0,
            distance: 0.0,
        };
    }

    let mut best = TemplateMatch::no_match();
    if window == 0 || window >= seg1.len() {
        return best;
    }

    let len2 = seg2.len() as isize;
    let window_i = window as isize;

    for i in 0..(seg1.len() - window) {
        let j = len2 - window_i - 2 - i as isize;
        if j < 0 || j + window_i > len2 {
            continue;
        }
        let j_usize = j as usize;

        let distance = l1_distance(&seg1[i..i + window], &seg2[j_usize..j_usize + window]);
        if distance < best.distance {
            best = TemplateMatch {
                offset: j - i as isize,
                distance,
            };
        }
    }

    best
}

#[inline]
fn l1_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}
