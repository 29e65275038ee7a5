//! Reduction of consecutive segments of a flat slice.

use crate::error::{LinalgError, Op};
use num_traits::Bounded;

/// Reduction applied to each segment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum SegmentReduction {
    Max,
}

impl SegmentReduction {
    /// Looks up a reduction by name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "max" => Some(SegmentReduction::Max),
            _ => None,
        }
    }
}

/// Reduces the consecutive segments of `data` whose lengths are given by `lengths`.
///
/// Output `i` is the reduction of the `lengths[i]` elements following the previous segment. For
/// [`SegmentReduction::Max`], a segment containing a NaN reduces to NaN, and an empty segment
/// reduces to the lowest value of `T`.
///
/// With `checked`, every length must be positive and the lengths must add up to `data.len()`.
/// Without it, these checks are skipped, but segments still must not run past the end of `data`.
///
/// # Errors
/// Returns [`LinalgError::EmptyInput`] if `data` is empty, and
/// [`LinalgError::InvalidSegmentLengths`] if the lengths are inconsistent with `data`.
pub fn segment_reduce<T: Copy + PartialOrd + Bounded>(
    data: &[T],
    lengths: &[usize],
    reduction: SegmentReduction,
    checked: bool,
) -> Result<Vec<T>, LinalgError> {
    if data.is_empty() {
        return Err(LinalgError::EmptyInput {
            op: Op::SegmentReduce,
        });
    }

    if checked {
        let mut sum = 0usize;
        for &len in lengths {
            if len == 0 {
                return Err(LinalgError::InvalidSegmentLengths);
            }
            sum = sum
                .checked_add(len)
                .ok_or(LinalgError::InvalidSegmentLengths)?;
        }
        if sum != data.len() {
            return Err(LinalgError::InvalidSegmentLengths);
        }
    }

    let mut out = Vec::with_capacity(lengths.len());
    let mut rest = data;
    for &len in lengths {
        if len > rest.len() {
            return Err(LinalgError::InvalidSegmentLengths);
        }
        let (segment, tail) = rest.split_at(len);
        rest = tail;

        out.push(match reduction {
            SegmentReduction::Max => segment_max(segment),
        });
    }
    Ok(out)
}

#[inline]
fn segment_max<T: Copy + PartialOrd + Bounded>(segment: &[T]) -> T {
    let mut acc = T::min_value();
    for &x in segment {
        #[allow(clippy::eq_op)]
        let is_nan = x != x;
        // once `acc` is NaN, `acc < x` is always false
        if is_nan || acc < x {
            acc = x;
        }
    }
    acc
}
