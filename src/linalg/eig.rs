//! Eigendecomposition of general square matrices.
//!
//! Two entry points with different output layouts:
//! - [`eig`] handles a single matrix and allocates its outputs. For real inputs the eigenvalues
//!   are returned as an `n×2` matrix whose columns hold the real and imaginary parts. A nonzero
//!   LAPACK status is returned as an error.
//! - [`linalg_eig`] handles a batch, writes to caller-provided outputs and records one status per
//!   matrix, processing the whole batch regardless of failures. For real inputs each eigenvalue
//!   vector has length `2n`, real parts first.
//!
//! Left eigenvectors are never computed.

use super::{debug_first_failure, trace_dispatch, ComputeVectors};
use crate::{
    assert,
    batch::{Batch, BatchMut, BatchRef},
    check::single_check_errors,
    dispatch::{expect_mut, DynBatch, DynBatchMut, DynBatchRef},
    error::{LinalgError, Op},
    iter::{for_each_matrix, OnError},
    lapack::{default_backend, Lapack, LapackBackend},
    lapack_int,
    scalar::{RealScalar, Scalar},
    workspace::{alloc_workspace, query_workspace},
};
use dyn_stack::PodStack;
use num_complex::Complex;

/// Number of eigenvalue slots per matrix of dimension `n`: `2n` for real types, `n` for complex
/// ones.
#[inline]
pub fn eigenvalue_len<E: Scalar>(n: usize) -> usize {
    if E::IS_REAL {
        2 * n
    } else {
        n
    }
}

/// Eigenvalues and optional right eigenvectors of the single square matrix in `input`.
///
/// `input` is copied, and left untouched. Returns the eigenvalues, with shape `n×2` (real parts,
/// then imaginary parts) for real types and `n×1` for complex types, and the `n×n` eigenvectors
/// if requested. For real types the eigenvectors are in the packed LAPACK representation, see
/// [`unpack_real_eigenvectors`].
///
/// # Errors
/// Returns [`LinalgError::Decomposition`] if the QR algorithm fails to converge.
///
/// # Panics
/// Panics if `input` does not hold exactly one square matrix.
#[track_caller]
pub fn apply_eig<E: Scalar>(
    lapack: &impl Lapack<E>,
    input: BatchRef<'_, E>,
    compute_vectors: ComputeVectors,
) -> Result<(Batch<E>, Option<Batch<E>>), LinalgError> {
    let op = Op::Eig;
    assert!(all(input.batch_size() == 1, input.nrows() == input.ncols()));

    let n = input.nrows();
    let mut a = input.to_owned();
    let mut values = Batch::<E>::zeros(n, if E::IS_REAL { 2 } else { 1 }, 1);
    let mut vectors = match compute_vectors {
        ComputeVectors::Yes => Some(Batch::<E>::zeros(n, n, 1)),
        ComputeVectors::No => None,
    };

    let mut info = 0;
    if n > 0 {
        let n_ = lapack_int(n)?;
        let ldvr = if vectors.is_some() { n_ } else { 1 };
        let jobvr = compute_vectors.job();

        let rwork_len = if E::IS_REAL { 0 } else { 2 * n };
        let mut rwork_mem = alloc_workspace(dyn_stack::StackReq::try_new::<E::Real>(rwork_len)?)?;
        let (rwork, _) = PodStack::new(&mut rwork_mem).make_raw::<E::Real>(rwork_len);

        let a = a.as_mut_slice();
        let w = values.as_mut_slice();
        let vr: &mut [E] = match &mut vectors {
            Some(vectors) => vectors.as_mut_slice(),
            None => &mut [],
        };

        let lwork = query_workspace::<E>(op, 1, |work, lwork| unsafe {
            lapack.geev(
                b'N', jobvr, n_, a, n_, w, &mut [], 1, vr, ldvr, work, lwork, rwork, &mut info,
            )
        });

        let mut mem = alloc_workspace(lwork.req::<E>()?)?;
        let (work, _) = PodStack::new(&mut mem).make_raw::<E>(lwork.len());
        let lwork = lwork.lapack_len()?;

        unsafe {
            lapack.geev(
                b'N', jobvr, n_, a, n_, w, &mut [], 1, vr, ldvr, work, lwork, rwork, &mut info,
            )
        };
    }

    single_check_errors(op, info)?;
    Ok((values, vectors))
}

/// Eigenvalues and optional right eigenvectors of every matrix in `input`, in place.
///
/// `input` must hold column-major square matrices, and is overwritten. `values` must hold one
/// column of [`eigenvalue_len`] elements per matrix. `vectors`, if provided, receives the
/// `n×n` right eigenvectors of each matrix. The status of every matrix is written to `infos`.
///
/// The workspace is sized once, from the first matrix, and shared by the whole batch.
///
/// # Panics
/// Panics if the shapes are inconsistent, if a matrix is not column-major, or if `infos` is
/// shorter than the batch.
#[track_caller]
pub fn apply_linalg_eig<E: Scalar>(
    lapack: &impl Lapack<E>,
    mut values: BatchMut<'_, E>,
    mut vectors: Option<BatchMut<'_, E>>,
    mut input: BatchMut<'_, E>,
    infos: &mut [i32],
) -> Result<(), LinalgError> {
    let op = Op::LinalgEig;
    let n = input.nrows();
    let batch_size = input.batch_size();

    assert!(all(
        input.ncols() == n,
        input.is_col_major(),
        values.nrows() == eigenvalue_len::<E>(n),
        values.ncols() == 1,
        values.batch_size() == batch_size,
        values.is_col_major(),
        infos.len() >= batch_size
    ));
    if let Some(vectors) = &vectors {
        assert!(all(
            vectors.nrows() == n,
            vectors.ncols() == n,
            vectors.batch_size() == batch_size,
            vectors.is_col_major()
        ));
    }

    if batch_size == 0 {
        return Ok(());
    }

    let lda = input.lda();
    let (n_, lda_) = (lapack_int(n)?, lapack_int(lda)?);
    let (jobvr, ldvr) = match &vectors {
        Some(vectors) => (ComputeVectors::Yes.job(), lapack_int(vectors.lda())?),
        None => (ComputeVectors::No.job(), 1),
    };

    let rwork_len = if E::IS_REAL { 0 } else { 2 * lda };
    let mut rwork_mem = alloc_workspace(dyn_stack::StackReq::try_new::<E::Real>(rwork_len)?)?;
    let (rwork, _) = PodStack::new(&mut rwork_mem).make_raw::<E::Real>(rwork_len);

    let lwork = {
        let a = input.matrix_mut(0);
        let w = values.matrix_mut(0);
        let vr: &mut [E] = match &mut vectors {
            Some(vectors) => vectors.matrix_mut(0),
            None => &mut [],
        };
        let mut info = 0;
        query_workspace::<E>(op, 1, |work, lwork| unsafe {
            lapack.geev(
                b'N', jobvr, n_, a, lda_, w, &mut [], 1, vr, ldvr, work, lwork, rwork, &mut info,
            )
        })
    };

    let mut mem = alloc_workspace(lwork.req::<E>()?)?;
    let (work, _) = PodStack::new(&mut mem).make_raw::<E>(lwork.len());
    let lwork = lwork.lapack_len()?;

    let first_failure = for_each_matrix(infos, batch_size, OnError::Continue, |i, info| {
        let vr: &mut [E] = match &mut vectors {
            Some(vectors) => vectors.matrix_mut(i),
            None => &mut [],
        };
        unsafe {
            lapack.geev(
                b'N',
                jobvr,
                n_,
                input.matrix_mut(i),
                lda_,
                values.matrix_mut(i),
                &mut [],
                1,
                vr,
                ldvr,
                work,
                lwork,
                rwork,
                info,
            )
        };
    });
    debug_first_failure(op, first_failure, infos);
    Ok(())
}

/// Converts eigenvalues stored as `[re_0, .., re_{n-1}, im_0, .., im_{n-1}]` to complex values.
///
/// # Panics
/// Panics if `w` has an odd length.
#[track_caller]
pub fn eigenvalues_to_complex<R: RealScalar>(w: &[R]) -> Vec<Complex<R>> {
    assert!(w.len() % 2 == 0);
    let (re, im) = w.split_at(w.len() / 2);
    re.iter()
        .zip(im)
        .map(|(&re, &im)| Complex::new(re, im))
        .collect()
}

/// Expands the real eigenvectors computed by `?geev` into complex ones.
///
/// For a complex conjugate pair of eigenvalues at indices `j` and `j + 1` (with `wi[j] > 0`),
/// LAPACK stores the real part of the eigenvector in column `j` and its imaginary part in column
/// `j + 1`. Returns the `n×n` complex eigenvectors in column-major order, with leading dimension
/// `n`.
///
/// # Panics
/// Panics if `vr` is too short for `n = wi.len()` columns of stride `ldvr`.
#[track_caller]
pub fn unpack_real_eigenvectors<R: RealScalar>(
    wi: &[R],
    vr: &[R],
    ldvr: usize,
) -> Vec<Complex<R>> {
    let n = wi.len();
    if n == 0 {
        return Vec::new();
    }
    assert!(all(ldvr >= n, vr.len() >= (n - 1) * ldvr + n));

    let mut out = vec![Complex::new(R::zero(), R::zero()); n * n];
    let mut j = 0;
    while j < n {
        if wi[j] == R::zero() || j + 1 == n {
            for i in 0..n {
                out[j * n + i] = Complex::new(vr[j * ldvr + i], R::zero());
            }
            j += 1;
        } else {
            for i in 0..n {
                let re = vr[j * ldvr + i];
                let im = vr[(j + 1) * ldvr + i];
                out[j * n + i] = Complex::new(re, im);
                out[(j + 1) * n + i] = Complex::new(re, -im);
            }
            j += 2;
        }
    }
    out
}

/// Type-erased [`apply_eig`], with the given backend.
#[track_caller]
pub fn eig_with(
    lapack: &impl LapackBackend,
    input: DynBatchRef<'_>,
    compute_vectors: ComputeVectors,
) -> Result<(DynBatch, Option<DynBatch>), LinalgError> {
    let dtype = input.dtype();
    trace_dispatch(Op::Eig, dtype);

    crate::dispatch_floating_and_complex!(dtype, |E| {
        let input = crate::dispatch::expect_ref::<E>(Op::Eig, input)?;

        #[cfg(feature = "perf-warn")]
        if !input.is_contiguous() && crate::__perf_warn!(EIG_WARN) {
            log::warn!(target: "faer_perf", "EIG prefers a contiguous column-major input matrix. Found a matrix with generic strides, which requires a strided copy.");
        }

        let (values, vectors) = apply_eig::<E>(lapack, input, compute_vectors)?;
        Ok((
            <E as Scalar>::upcast_owned(values),
            vectors.map(<E as Scalar>::upcast_owned),
        ))
    })
}

/// Type-erased [`apply_eig`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn eig(
    input: DynBatchRef<'_>,
    compute_vectors: ComputeVectors,
) -> Result<(DynBatch, Option<DynBatch>), LinalgError> {
    let lapack = default_backend(Op::Eig)?;
    eig_with(&lapack, input, compute_vectors)
}

/// Type-erased [`apply_linalg_eig`], with the given backend.
///
/// `input` is copied into a column-major working buffer, and left untouched. Eigenvectors are
/// computed if `vectors` is provided.
#[track_caller]
pub fn linalg_eig_with(
    lapack: &impl LapackBackend,
    input: DynBatchRef<'_>,
    values: DynBatchMut<'_>,
    vectors: Option<DynBatchMut<'_>>,
    infos: &mut [i32],
) -> Result<(), LinalgError> {
    let op = Op::LinalgEig;
    let dtype = input.dtype();
    trace_dispatch(op, dtype);

    crate::dispatch_floating_and_complex!(dtype, |E| {
        let input = crate::dispatch::expect_ref::<E>(op, input)?;
        let values = expect_mut::<E>(op, values)?;
        let vectors = match vectors {
            Some(vectors) => Some(expect_mut::<E>(op, vectors)?),
            None => None,
        };

        #[cfg(feature = "perf-warn")]
        if !input.is_contiguous() && crate::__perf_warn!(LINALG_EIG_WARN) {
            log::warn!(target: "faer_perf", "LINALG_EIG prefers contiguous column-major input matrices. Found matrices with generic strides, which require a strided copy.");
        }

        let mut working = input.to_owned();
        apply_linalg_eig::<E>(lapack, values, vectors, working.as_mut(), infos)
    })
}

/// Type-erased [`apply_linalg_eig`], with the LAPACK backend compiled into the crate.
#[track_caller]
pub fn linalg_eig(
    input: DynBatchRef<'_>,
    values: DynBatchMut<'_>,
    vectors: Option<DynBatchMut<'_>>,
    infos: &mut [i32],
) -> Result<(), LinalgError> {
    let lapack = default_backend(Op::LinalgEig)?;
    linalg_eig_with(&lapack, input, values, vectors, infos)
}
