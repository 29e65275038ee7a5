//! Inverse of symmetric/Hermitian positive-definite matrices from their Cholesky factors.

use super::{debug_first_failure, trace_dispatch};
use crate::{
    assert,
    batch::BatchMut,
    dispatch::{expect_mut, DynBatchMut},
    error::{LinalgError, Op},
    get_global_parallelism,
    iter::{for_each_matrix, OnError},
    lapack::{default_backend, Lapack, LapackBackend},
    lapack_int,
    reflect::reflect_conj_tri_in_place,
    scalar::Scalar,
    Parallelism, Side,
};

/// Replaces each Cholesky factor in `matrices` by the inverse of the matrix it factors.
///
/// The factor is read from the `side` triangle of each matrix. On return, each matrix holds the
/// full symmetric/Hermitian inverse. The status of every matrix is written to `infos`: a positive
/// value `k` means the `k`-th diagonal entry of the factor is zero, in which case the matrix holds
/// unspecified values.
///
/// # Panics
/// Panics if the matrices are not square and column-major, or if `infos` is shorter than the
/// batch.
#[track_caller]
pub fn apply_cholesky_inverse<E: Scalar>(
    lapack: &impl Lapack<E>,
    mut matrices: BatchMut<'_, E>,
    infos: &mut [i32],
    side: Side,
    parallelism: Parallelism,
) -> Result<(), LinalgError> {
    assert!(all(
        matrices.nrows() == matrices.ncols(),
        matrices.is_col_major(),
        infos.len() >= matrices.batch_size()
    ));

    let n = matrices.nrows();
    let lda = matrices.lda();
    let (n_, lda_) = (lapack_int(n)?, lapack_int(lda)?);
    let uplo = side.uplo();

    let first_failure = for_each_matrix(
        infos,
        matrices.batch_size(),
        OnError::Continue,
        |i, info| {
            let a = matrices.matrix_mut(i);
            unsafe { lapack.potri(uplo, n_, a, lda_, info) };
            // potri only writes the `side` triangle
            reflect_conj_tri_in_place(a, n, lda, side, parallelism);
        },
    );
    debug_first_failure(Op::CholeskyInverse, first_failure, infos);
    Ok(())
}

/// Type-erased [`apply_cholesky_inverse`], with the given backend and the global parallelism
/// setting.
#[track_caller]
pub fn cholesky_inverse_with(
    lapack: &impl LapackBackend,
    matrices: DynBatchMut<'_>,
    infos: &mut [i32],
    side: Side,
) -> Result<(), LinalgError> {
    let op = Op::CholeskyInverse;
    let dtype = matrices.dtype();
    trace_dispatch(op, dtype);

    crate::dispatch_floating_and_complex!(dtype, |E| {
        let matrices = expect_mut::<E>(op, matrices)?;
        apply_cholesky_inverse::<E>(lapack, matrices, infos, side, get_global_parallelism())
    })
}

/// Type-erased [`apply_cholesky_inverse`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn cholesky_inverse(
    matrices: DynBatchMut<'_>,
    infos: &mut [i32],
    side: Side,
) -> Result<(), LinalgError> {
    let lapack = default_backend(Op::CholeskyInverse)?;
    cholesky_inverse_with(&lapack, matrices, infos, side)
}
