//! Batched decomposition kernels.
//!
//! Each kernel is available as:
//! - a generic body, e.g. [`cholesky_inverse::apply_cholesky_inverse`], taking typed views, an
//!   explicit [`Parallelism`](crate::Parallelism) where relevant, and any
//!   [`Lapack`](crate::lapack::Lapack) implementation,
//! - a type-erased entry point taking an explicit backend, e.g. [`cholesky_inverse_with`],
//! - a type-erased entry point using the backend compiled into the crate, e.g.
//!   [`cholesky_inverse`].
//!
//! The type-erased entry points select the element type from their primary operand and return
//! [`LinalgError::DTypeMismatch`](crate::LinalgError::DTypeMismatch) if another operand disagrees.
//!
//! All matrices handed to LAPACK must be column-major, which is asserted.

use crate::{dispatch::DType, error::Op};

pub mod cholesky_inverse;
pub mod eig;
pub mod eigh;
pub mod qr;
pub mod triangular_solve;

pub use cholesky_inverse::{cholesky_inverse, cholesky_inverse_with};
pub use eig::{eig, eig_with, linalg_eig, linalg_eig_with};
pub use eigh::{linalg_eigh, linalg_eigh_with};
pub use qr::{geqrf, geqrf_with, orgqr, orgqr_with};
pub use triangular_solve::{
    triangular_solve, triangular_solve_all, triangular_solve_all_with, triangular_solve_with,
    TriangularSolveParams,
};

/// Whether eigenvectors should be computed alongside the eigenvalues.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComputeVectors {
    No,
    Yes,
}

impl ComputeVectors {
    /// The LAPACK `jobz`/`jobvr` character.
    #[inline]
    pub fn job(self) -> u8 {
        match self {
            ComputeVectors::No => b'N',
            ComputeVectors::Yes => b'V',
        }
    }
}

#[inline]
fn trace_dispatch(op: Op, dtype: DType) {
    log::trace!("{op}: dispatching on {dtype}");
}

#[inline]
fn debug_first_failure(op: Op, first_failure: Option<usize>, infos: &[i32]) {
    if let Some(i) = first_failure {
        log::debug!("{op}: matrix {i} reported status {}", infos[i]);
    }
}
