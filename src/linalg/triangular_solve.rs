//! Triangular solves with multiple right-hand sides.

use super::{debug_first_failure, trace_dispatch};
use crate::{
    assert,
    batch::{BatchMut, BatchRef},
    dispatch::{expect_mut, expect_ref, DynBatchMut, DynBatchRef},
    error::{LinalgError, Op},
    iter::{for_each_matrix, OnError},
    lapack::{default_backend, Lapack, LapackBackend},
    lapack_int,
    scalar::Scalar,
    Side,
};

/// Selects the system solved by the triangular solve kernels: `op(A) X = B`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TriangularSolveParams {
    /// Triangle of `A` that is read.
    pub side: Side,
    /// `op(A) = Aᵀ`.
    pub transpose: bool,
    /// `op(A) = Aᴴ`. Takes precedence over `transpose`.
    pub conjugate_transpose: bool,
    /// The diagonal of `A` is assumed to be all ones, and its stored values are not read.
    pub unitriangular: bool,
}

impl Default for TriangularSolveParams {
    #[inline]
    fn default() -> Self {
        Self {
            side: Side::Lower,
            transpose: false,
            conjugate_transpose: false,
            unitriangular: false,
        }
    }
}

impl TriangularSolveParams {
    /// The LAPACK `trans` character.
    #[inline]
    pub fn trans(&self) -> u8 {
        if self.conjugate_transpose {
            b'C'
        } else if self.transpose {
            b'T'
        } else {
            b'N'
        }
    }

    /// The LAPACK `diag` character.
    #[inline]
    pub fn diag(&self) -> u8 {
        if self.unitriangular {
            b'U'
        } else {
            b'N'
        }
    }
}

#[track_caller]
fn apply_impl<E: Scalar>(
    lapack: &impl Lapack<E>,
    a: BatchRef<'_, E>,
    mut b: BatchMut<'_, E>,
    infos: &mut [i32],
    params: TriangularSolveParams,
    on_error: OnError,
) -> Result<(), LinalgError> {
    let op = Op::TriangularSolve;
    let n = a.nrows();
    let batch_size = a.batch_size();
    assert!(all(
        a.ncols() == n,
        a.is_col_major(),
        b.nrows() == n,
        b.batch_size() == batch_size,
        b.is_col_major(),
        infos.len() >= batch_size
    ));

    let (n_, nrhs_) = (lapack_int(n)?, lapack_int(b.ncols())?);
    let (lda_, ldb_) = (lapack_int(a.lda())?, lapack_int(b.lda())?);
    let (uplo, trans, diag) = (params.side.uplo(), params.trans(), params.diag());

    let first_failure = for_each_matrix(infos, batch_size, on_error, |i, info| unsafe {
        lapack.trtrs(
            uplo,
            trans,
            diag,
            n_,
            nrhs_,
            a.matrix(i),
            lda_,
            b.matrix_mut(i),
            ldb_,
            info,
        )
    });
    debug_first_failure(op, first_failure, infos);
    Ok(())
}

/// Solves `op(A) X = B` for each pair of matrices of `a` and `b`, overwriting `b` with `X`.
///
/// Processing stops at the first singular `A`: its status is written to `infos`, and the entries
/// after it are left untouched.
///
/// # Panics
/// Panics if the shapes are inconsistent, if a matrix is not column-major, or if `infos` is
/// shorter than the batch.
#[track_caller]
pub fn apply_triangular_solve<E: Scalar>(
    lapack: &impl Lapack<E>,
    a: BatchRef<'_, E>,
    b: BatchMut<'_, E>,
    infos: &mut [i32],
    params: TriangularSolveParams,
) -> Result<(), LinalgError> {
    apply_impl(lapack, a, b, infos, params, OnError::Stop)
}

/// Same as [`apply_triangular_solve`], but processes the whole batch regardless of failures, so
/// that every entry of `infos` is written.
#[track_caller]
pub fn apply_triangular_solve_all<E: Scalar>(
    lapack: &impl Lapack<E>,
    a: BatchRef<'_, E>,
    b: BatchMut<'_, E>,
    infos: &mut [i32],
    params: TriangularSolveParams,
) -> Result<(), LinalgError> {
    apply_impl(lapack, a, b, infos, params, OnError::Continue)
}

#[track_caller]
fn dispatch_impl(
    lapack: &impl LapackBackend,
    a: DynBatchRef<'_>,
    b: DynBatchMut<'_>,
    infos: &mut [i32],
    params: TriangularSolveParams,
    on_error: OnError,
) -> Result<(), LinalgError> {
    let op = Op::TriangularSolve;
    let dtype = a.dtype();
    trace_dispatch(op, dtype);

    crate::dispatch_floating_and_complex!(dtype, |E| {
        let a = expect_ref::<E>(op, a)?;
        let b = expect_mut::<E>(op, b)?;
        apply_impl::<E>(lapack, a, b, infos, params, on_error)
    })
}

/// Type-erased [`apply_triangular_solve`], with the given backend.
#[track_caller]
pub fn triangular_solve_with(
    lapack: &impl LapackBackend,
    a: DynBatchRef<'_>,
    b: DynBatchMut<'_>,
    infos: &mut [i32],
    params: TriangularSolveParams,
) -> Result<(), LinalgError> {
    dispatch_impl(lapack, a, b, infos, params, OnError::Stop)
}

/// Type-erased [`apply_triangular_solve`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn triangular_solve(
    a: DynBatchRef<'_>,
    b: DynBatchMut<'_>,
    infos: &mut [i32],
    params: TriangularSolveParams,
) -> Result<(), LinalgError> {
    let lapack = default_backend(Op::TriangularSolve)?;
    triangular_solve_with(&lapack, a, b, infos, params)
}

/// Type-erased [`apply_triangular_solve_all`], with the given backend.
#[track_caller]
pub fn triangular_solve_all_with(
    lapack: &impl LapackBackend,
    a: DynBatchRef<'_>,
    b: DynBatchMut<'_>,
    infos: &mut [i32],
    params: TriangularSolveParams,
) -> Result<(), LinalgError> {
    dispatch_impl(lapack, a, b, infos, params, OnError::Continue)
}

/// Type-erased [`apply_triangular_solve_all`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn triangular_solve_all(
    a: DynBatchRef<'_>,
    b: DynBatchMut<'_>,
    infos: &mut [i32],
    params: TriangularSolveParams,
) -> Result<(), LinalgError> {
    let lapack = default_backend(Op::TriangularSolve)?;
    triangular_solve_all_with(&lapack, a, b, infos, params)
}
