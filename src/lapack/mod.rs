//! Interface to the LAPACK routines driven by the kernels.
//!
//! [`Lapack<E>`] mirrors the calling convention of the reference LAPACK routines for one element
//! type: column-major matrices, explicit leading dimensions, `i32` dimensions and status codes,
//! and single-character options passed as ASCII bytes. [`LapackBackend`] bundles the four element
//! types.
//!
//! With the `lapack` feature, [`SystemLapack`] forwards to the system LAPACK through the `lapack`
//! crate. Without it, the only backend compiled in is the uninhabited [`NoLapack`], and
//! [`default_backend`] fails with [`LinalgError::LapackUnavailable`].

use crate::{
    error::{LinalgError, Op},
    scalar::Scalar,
};

#[cfg(feature = "lapack")]
mod system;
#[cfg(feature = "lapack")]
#[cfg_attr(docsrs, doc(cfg(feature = "lapack")))]
pub use system::SystemLapack;

/// LAPACK routines for the element type `E`.
///
/// # Safety
/// All the methods are `unsafe` for the same reason as the routines they mirror: the caller must
/// make sure that every buffer is large enough for the dimensions, leading dimensions and
/// scratch lengths it passes. Implementations may assume so.
pub trait Lapack<E: Scalar> {
    /// `?potri`: inverse of a symmetric/Hermitian positive-definite matrix from its Cholesky
    /// factor. Only the `uplo` triangle of `a` is written.
    unsafe fn potri(&self, uplo: u8, n: i32, a: &mut [E], lda: i32, info: &mut i32);

    /// `?geev`: eigenvalues and, optionally, left/right eigenvectors of a general matrix.
    ///
    /// For real `E`, `w` holds `2 * n` elements, the real parts of the eigenvalues followed by
    /// their imaginary parts, and `rwork` is unused. For complex `E`, `w` holds `n` elements and
    /// `rwork` holds `2 * n` real elements.
    unsafe fn geev(
        &self,
        jobvl: u8,
        jobvr: u8,
        n: i32,
        a: &mut [E],
        lda: i32,
        w: &mut [E],
        vl: &mut [E],
        ldvl: i32,
        vr: &mut [E],
        ldvr: i32,
        work: &mut [E],
        lwork: i32,
        rwork: &mut [E::Real],
        info: &mut i32,
    );

    /// `?syevd` / `?heevd`: divide-and-conquer eigendecomposition of a symmetric/Hermitian
    /// matrix. For real `E`, `rwork` and `lrwork` are unused.
    unsafe fn syevd(
        &self,
        jobz: u8,
        uplo: u8,
        n: i32,
        a: &mut [E],
        lda: i32,
        w: &mut [E::Real],
        work: &mut [E],
        lwork: i32,
        rwork: &mut [E::Real],
        lrwork: i32,
        iwork: &mut [i32],
        liwork: i32,
        info: &mut i32,
    );

    /// `?geqrf`: QR factorization, in compressed reflector form.
    unsafe fn geqrf(
        &self,
        m: i32,
        n: i32,
        a: &mut [E],
        lda: i32,
        tau: &mut [E],
        work: &mut [E],
        lwork: i32,
        info: &mut i32,
    );

    /// `?orgqr` / `?ungqr`: explicit `m×n` orthogonal/unitary factor from `k` reflectors.
    unsafe fn orgqr(
        &self,
        m: i32,
        n: i32,
        k: i32,
        a: &mut [E],
        lda: i32,
        tau: &[E],
        work: &mut [E],
        lwork: i32,
        info: &mut i32,
    );

    /// `?trtrs`: solves a triangular system with multiple right-hand sides, in place.
    unsafe fn trtrs(
        &self,
        uplo: u8,
        trans: u8,
        diag: u8,
        n: i32,
        nrhs: i32,
        a: &[E],
        lda: i32,
        b: &mut [E],
        ldb: i32,
        info: &mut i32,
    );
}

/// LAPACK implementation for every supported element type.
pub trait LapackBackend: Lapack<f32> + Lapack<f64> + Lapack<crate::c32> + Lapack<crate::c64> {}

impl<T: ?Sized> LapackBackend for T where
    T: Lapack<f32> + Lapack<f64> + Lapack<crate::c32> + Lapack<crate::c64>
{
}

/// Backend used when the crate is compiled without LAPACK. It cannot be constructed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoLapack {}

impl<E: Scalar> Lapack<E> for NoLapack {
    unsafe fn potri(&self, _: u8, _: i32, _: &mut [E], _: i32, _: &mut i32) {
        match *self {}
    }

    unsafe fn geev(
        &self,
        _: u8,
        _: u8,
        _: i32,
        _: &mut [E],
        _: i32,
        _: &mut [E],
        _: &mut [E],
        _: i32,
        _: &mut [E],
        _: i32,
        _: &mut [E],
        _: i32,
        _: &mut [E::Real],
        _: &mut i32,
    ) {
        match *self {}
    }

    unsafe fn syevd(
        &self,
        _: u8,
        _: u8,
        _: i32,
        _: &mut [E],
        _: i32,
        _: &mut [E::Real],
        _: &mut [E],
        _: i32,
        _: &mut [E::Real],
        _: i32,
        _: &mut [i32],
        _: i32,
        _: &mut i32,
    ) {
        match *self {}
    }

    unsafe fn geqrf(
        &self,
        _: i32,
        _: i32,
        _: &mut [E],
        _: i32,
        _: &mut [E],
        _: &mut [E],
        _: i32,
        _: &mut i32,
    ) {
        match *self {}
    }

    unsafe fn orgqr(
        &self,
        _: i32,
        _: i32,
        _: i32,
        _: &mut [E],
        _: i32,
        _: &[E],
        _: &mut [E],
        _: i32,
        _: &mut i32,
    ) {
        match *self {}
    }

    unsafe fn trtrs(
        &self,
        _: u8,
        _: u8,
        _: u8,
        _: i32,
        _: i32,
        _: &[E],
        _: i32,
        _: &mut [E],
        _: i32,
        _: &mut i32,
    ) {
        match *self {}
    }
}

/// The backend compiled into the crate.
#[cfg(feature = "lapack")]
pub type DefaultLapack = SystemLapack;
/// The backend compiled into the crate.
#[cfg(not(feature = "lapack"))]
pub type DefaultLapack = NoLapack;

/// Returns the backend compiled into the crate, or [`LinalgError::LapackUnavailable`] if there is
/// none.
#[inline]
pub fn default_backend(op: Op) -> Result<DefaultLapack, LinalgError> {
    #[cfg(feature = "lapack")]
    {
        let _ = op;
        Ok(SystemLapack)
    }
    #[cfg(not(feature = "lapack"))]
    {
        Err(LinalgError::LapackUnavailable { op })
    }
}

/// Returns `true` if a LAPACK backend is compiled into the crate.
#[inline]
pub fn is_available() -> bool {
    cfg!(feature = "lapack")
}
