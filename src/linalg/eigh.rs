//! Eigendecomposition of symmetric/Hermitian matrices, by divide and conquer.

use super::{debug_first_failure, trace_dispatch, ComputeVectors};
use crate::{
    assert,
    batch::BatchMut,
    dispatch::{expect_mut, DynBatchMut},
    error::{LinalgError, Op},
    iter::{for_each_matrix, OnError},
    lapack::{default_backend, Lapack, LapackBackend},
    lapack_int,
    scalar::Scalar,
    workspace::{alloc_workspace, Probe, WORKSPACE_QUERY},
    Side,
};
use dyn_stack::{PodStack, StackReq};

/// Computes the eigenvalues, and optionally the eigenvectors, of each matrix in `vectors`.
///
/// Only the `side` triangle of each matrix is read. The eigenvalues are written in ascending order
/// to `values`, which holds one column of `n` real elements per matrix. With
/// [`ComputeVectors::Yes`], the orthonormal eigenvectors overwrite the matrices. Otherwise the
/// matrices are left in an unspecified state.
///
/// The three scratch buffers (element type, real and integer) are sized by a single workspace
/// query on the first matrix. Processing stops at the first matrix that fails to converge: its
/// status is written to `infos`, and the entries after it are left untouched.
///
/// # Panics
/// Panics if the shapes are inconsistent, if a matrix is not column-major, or if `infos` is
/// shorter than the batch.
#[track_caller]
pub fn apply_linalg_eigh<E: Scalar>(
    lapack: &impl Lapack<E>,
    mut values: BatchMut<'_, E::Real>,
    mut vectors: BatchMut<'_, E>,
    infos: &mut [i32],
    side: Side,
    compute_vectors: ComputeVectors,
) -> Result<(), LinalgError> {
    let op = Op::LinalgEigh;
    let n = vectors.nrows();
    let batch_size = vectors.batch_size();

    assert!(all(
        vectors.ncols() == n,
        vectors.is_col_major(),
        values.nrows() == n,
        values.ncols() == 1,
        values.batch_size() == batch_size,
        values.is_col_major(),
        infos.len() >= batch_size
    ));

    if batch_size == 0 {
        return Ok(());
    }

    let lda = vectors.lda();
    let (n_, lda_) = (lapack_int(n)?, lapack_int(lda)?);
    let uplo = side.uplo();
    let jobz = compute_vectors.job();

    let (lwork, lrwork, liwork) = {
        let mut work = Probe::<E>::new();
        let mut rwork = Probe::<E::Real>::new();
        let mut iwork = Probe::<i32>::new();
        let mut info = 0;
        unsafe {
            lapack.syevd(
                jobz,
                uplo,
                n_,
                vectors.matrix_mut(0),
                lda_,
                values.matrix_mut(0),
                work.as_mut_slice(),
                WORKSPACE_QUERY,
                rwork.as_mut_slice(),
                WORKSPACE_QUERY,
                iwork.as_mut_slice(),
                WORKSPACE_QUERY,
                &mut info,
            )
        };
        (
            work.finish(op, 1),
            // the real scratch buffer only exists for complex types
            (!E::IS_REAL).then(|| rwork.finish(op, 1)),
            iwork.finish(op, 1),
        )
    };

    let rwork_len = lrwork.map_or(0, |len| len.len());
    let mut mem = alloc_workspace(StackReq::try_all_of([
        lwork.req::<E>()?,
        StackReq::try_new::<E::Real>(rwork_len)?,
        liwork.req::<i32>()?,
    ])?)?;
    let stack = PodStack::new(&mut mem);
    let (work, stack) = stack.make_raw::<E>(lwork.len());
    let (rwork, stack) = stack.make_raw::<E::Real>(rwork_len);
    let (iwork, _) = stack.make_raw::<i32>(liwork.len());

    let lwork = lwork.lapack_len()?;
    let lrwork = match lrwork {
        Some(len) => len.lapack_len()?,
        None => 0,
    };
    let liwork = liwork.lapack_len()?;

    let first_failure = for_each_matrix(infos, batch_size, OnError::Stop, |i, info| unsafe {
        lapack.syevd(
            jobz,
            uplo,
            n_,
            vectors.matrix_mut(i),
            lda_,
            values.matrix_mut(i),
            work,
            lwork,
            rwork,
            lrwork,
            iwork,
            liwork,
            info,
        )
    });
    debug_first_failure(op, first_failure, infos);
    Ok(())
}

/// Type-erased [`apply_linalg_eigh`], with the given backend.
///
/// The element type is taken from `vectors`. `values` must hold the real type of the same
/// precision.
#[track_caller]
pub fn linalg_eigh_with(
    lapack: &impl LapackBackend,
    values: DynBatchMut<'_>,
    vectors: DynBatchMut<'_>,
    infos: &mut [i32],
    side: Side,
    compute_vectors: ComputeVectors,
) -> Result<(), LinalgError> {
    let op = Op::LinalgEigh;
    let dtype = vectors.dtype();
    trace_dispatch(op, dtype);

    crate::dispatch_floating_and_complex!(dtype, |E| {
        let vectors = expect_mut::<E>(op, vectors)?;
        let values = expect_mut::<<E as Scalar>::Real>(op, values)?;
        apply_linalg_eigh::<E>(lapack, values, vectors, infos, side, compute_vectors)
    })
}

/// Type-erased [`apply_linalg_eigh`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn linalg_eigh(
    values: DynBatchMut<'_>,
    vectors: DynBatchMut<'_>,
    infos: &mut [i32],
    side: Side,
    compute_vectors: ComputeVectors,
) -> Result<(), LinalgError> {
    let lapack = default_backend(Op::LinalgEigh)?;
    linalg_eigh_with(&lapack, values, vectors, infos, side, compute_vectors)
}
