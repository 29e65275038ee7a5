//! Conversion of LAPACK status codes into errors.
//!
//! The kernels only record statuses. These helpers let callers that need all-or-nothing results
//! turn them into a [`LinalgError`].

use crate::error::{LinalgError, Op};

/// Returns an error for the first nonzero entry of `infos`.
///
/// For kernels that stop at the first failure, only the entries up to that failure are
/// meaningful, and this is the one that gets reported.
pub fn batch_check_errors(op: Op, infos: &[i32]) -> Result<(), LinalgError> {
    match infos.iter().position(|&info| info != 0) {
        None => Ok(()),
        Some(batch) => Err(LinalgError::Decomposition {
            op,
            batch,
            info: infos[batch],
        }),
    }
}

/// Returns an error if the status of a single matrix is nonzero.
#[inline]
pub fn single_check_errors(op: Op, info: i32) -> Result<(), LinalgError> {
    batch_check_errors(op, &[info])
}
