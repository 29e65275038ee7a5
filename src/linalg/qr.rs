//! QR factorization in compressed reflector form, and expansion of the reflectors into an
//! explicit orthogonal/unitary factor.
//!
//! [`apply_geqrf`] overwrites each matrix with `R` on and above the diagonal and the directions of
//! the Householder reflectors below it, and writes the reflector magnitudes to `tau`.
//! [`apply_orgqr`] turns that representation back into the first columns of `Q`.
//!
//! LAPACK only reports malformed arguments for these routines, so a nonzero status is a bug in the
//! caller and causes a panic.

use super::trace_dispatch;
use crate::{
    assert,
    batch::{BatchMut, BatchRef},
    dispatch::{expect_mut, expect_ref, DynBatchMut, DynBatchRef},
    error::{LinalgError, Op},
    lapack::{default_backend, Lapack, LapackBackend},
    lapack_int,
    scalar::Scalar,
    workspace::{alloc_workspace, query_workspace},
};
use dyn_stack::PodStack;

/// Computes the QR factorization of the leading `m×n` block of each matrix in `input`, in place.
///
/// `tau` holds one column of at least `min(m, n)` elements per matrix. The scratch length is
/// queried once and floored to `max(1, n)`, below which some LAPACK implementations reject the
/// call.
///
/// # Panics
/// Panics if the shapes are inconsistent, if `input` is not column-major, or if LAPACK reports an
/// illegal argument.
#[track_caller]
pub fn apply_geqrf<E: Scalar>(
    lapack: &impl Lapack<E>,
    mut input: BatchMut<'_, E>,
    mut tau: BatchMut<'_, E>,
    m: usize,
    n: usize,
) -> Result<(), LinalgError> {
    let op = Op::Geqrf;
    let batch_size = input.batch_size();
    assert!(all(
        m <= input.nrows(),
        n <= input.ncols(),
        input.is_col_major(),
        tau.nrows() >= Ord::min(m, n),
        tau.ncols() == 1,
        tau.batch_size() == batch_size,
        tau.is_col_major()
    ));

    if batch_size == 0 {
        return Ok(());
    }

    let (m_, n_, lda_) = (lapack_int(m)?, lapack_int(n)?, lapack_int(input.lda())?);
    let mut info = 0;

    let lwork = query_workspace::<E>(op, n, |work, lwork| unsafe {
        lapack.geqrf(
            m_,
            n_,
            input.matrix_mut(0),
            lda_,
            tau.matrix_mut(0),
            work,
            lwork,
            &mut info,
        )
    });
    assert!(info == 0);

    let mut mem = alloc_workspace(lwork.req::<E>()?)?;
    let (work, _) = PodStack::new(&mut mem).make_raw::<E>(lwork.len());
    let lwork = lwork.lapack_len()?;

    for i in 0..batch_size {
        unsafe {
            lapack.geqrf(
                m_,
                n_,
                input.matrix_mut(i),
                lda_,
                tau.matrix_mut(i),
                work,
                lwork,
                &mut info,
            )
        };
        assert!(info == 0);
    }
    Ok(())
}

/// Replaces the reflectors stored in each matrix of `matrices` by the first `n_columns` columns of
/// the orthogonal/unitary factor they define.
///
/// The number of reflectors `k` is the length of each column of `tau`. Returns immediately,
/// without calling LAPACK, if `matrices` has no elements.
///
/// # Panics
/// Panics unless `nrows >= n_columns >= k`, if `n_columns` exceeds the number of columns of
/// `matrices`, if the batch sizes differ, if a matrix is not column-major, or if LAPACK reports
/// an illegal argument.
#[track_caller]
pub fn apply_orgqr<E: Scalar>(
    lapack: &impl Lapack<E>,
    mut matrices: BatchMut<'_, E>,
    tau: BatchRef<'_, E>,
    n_columns: usize,
) -> Result<(), LinalgError> {
    let op = Op::Orgqr;
    // the workspace query may report a zero length for empty inputs, which the routine then
    // rejects
    if matrices.numel() == 0 {
        return Ok(());
    }

    let m = matrices.nrows();
    let k = tau.nrows();
    let batch_size = matrices.batch_size();
    assert!(all(m >= n_columns, n_columns >= k));
    assert!(all(
        n_columns <= matrices.ncols(),
        matrices.is_col_major(),
        tau.ncols() == 1,
        tau.batch_size() == batch_size,
        tau.is_col_major()
    ));

    let (m_, n_, k_) = (lapack_int(m)?, lapack_int(n_columns)?, lapack_int(k)?);
    let lda_ = lapack_int(matrices.lda())?;
    let mut info = 0;

    let lwork = query_workspace::<E>(op, 1, |work, lwork| unsafe {
        lapack.orgqr(
            m_,
            n_,
            k_,
            matrices.matrix_mut(0),
            lda_,
            tau.matrix(0),
            work,
            lwork,
            &mut info,
        )
    });
    assert!(info == 0);

    let mut mem = alloc_workspace(lwork.req::<E>()?)?;
    let (work, _) = PodStack::new(&mut mem).make_raw::<E>(lwork.len());
    let lwork = lwork.lapack_len()?;

    for i in 0..batch_size {
        unsafe {
            lapack.orgqr(
                m_,
                n_,
                k_,
                matrices.matrix_mut(i),
                lda_,
                tau.matrix(i),
                work,
                lwork,
                &mut info,
            )
        };
        assert!(info == 0);
    }
    Ok(())
}

/// Type-erased [`apply_geqrf`], with the given backend.
#[track_caller]
pub fn geqrf_with(
    lapack: &impl LapackBackend,
    input: DynBatchMut<'_>,
    tau: DynBatchMut<'_>,
    m: usize,
    n: usize,
) -> Result<(), LinalgError> {
    let op = Op::Geqrf;
    let dtype = input.dtype();
    trace_dispatch(op, dtype);

    crate::dispatch_floating_and_complex!(dtype, |E| {
        let input = expect_mut::<E>(op, input)?;
        let tau = expect_mut::<E>(op, tau)?;
        apply_geqrf::<E>(lapack, input, tau, m, n)
    })
}

/// Type-erased [`apply_geqrf`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn geqrf(
    input: DynBatchMut<'_>,
    tau: DynBatchMut<'_>,
    m: usize,
    n: usize,
) -> Result<(), LinalgError> {
    let lapack = default_backend(Op::Geqrf)?;
    geqrf_with(&lapack, input, tau, m, n)
}

/// Type-erased [`apply_orgqr`], with the given backend.
#[track_caller]
pub fn orgqr_with(
    lapack: &impl LapackBackend,
    matrices: DynBatchMut<'_>,
    tau: DynBatchRef<'_>,
    n_columns: usize,
) -> Result<(), LinalgError> {
    let op = Op::Orgqr;
    let dtype = matrices.dtype();
    trace_dispatch(op, dtype);

    crate::dispatch_floating_and_complex!(dtype, |E| {
        let matrices = expect_mut::<E>(op, matrices)?;
        let tau = expect_ref::<E>(op, tau)?;
        apply_orgqr::<E>(lapack, matrices, tau, n_columns)
    })
}

/// Type-erased [`apply_orgqr`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn orgqr(
    matrices: DynBatchMut<'_>,
    tau: DynBatchRef<'_>,
    n_columns: usize,
) -> Result<(), LinalgError> {
    let lapack = default_backend(Op::Orgqr)?;
    orgqr_with(&lapack, matrices, tau, n_columns)
}
