use super::Lapack;
use crate::{c32, c64};

/// The system LAPACK, linked through the `lapack` crate.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemLapack;

macro_rules! impl_common {
    ($ty: ty, $prefix: ident) => {
        paste::paste! {
            #[inline]
            unsafe fn potri(&self, uplo: u8, n: i32, a: &mut [$ty], lda: i32, info: &mut i32) {
                ::lapack::[<$prefix potri>](uplo, n, a, lda, info)
            }

            #[inline]
            unsafe fn geqrf(
                &self,
                m: i32,
                n: i32,
                a: &mut [$ty],
                lda: i32,
                tau: &mut [$ty],
                work: &mut [$ty],
                lwork: i32,
                info: &mut i32,
            ) {
                ::lapack::[<$prefix geqrf>](m, n, a, lda, tau, work, lwork, info)
            }

            #[inline]
            unsafe fn trtrs(
                &self,
                uplo: u8,
                trans: u8,
                diag: u8,
                n: i32,
                nrhs: i32,
                a: &[$ty],
                lda: i32,
                b: &mut [$ty],
                ldb: i32,
                info: &mut i32,
            ) {
                ::lapack::[<$prefix trtrs>](uplo, trans, diag, n, nrhs, a, lda, b, ldb, info)
            }
        }
    };
}

macro_rules! impl_real {
    ($ty: ty, $prefix: ident) => {
        paste::paste! {
            impl Lapack<$ty> for SystemLapack {
                impl_common!($ty, $prefix);

                #[inline]
                unsafe fn geev(
                    &self,
                    jobvl: u8,
                    jobvr: u8,
                    n: i32,
                    a: &mut [$ty],
                    lda: i32,
                    w: &mut [$ty],
                    vl: &mut [$ty],
                    ldvl: i32,
                    vr: &mut [$ty],
                    ldvr: i32,
                    work: &mut [$ty],
                    lwork: i32,
                    _rwork: &mut [$ty],
                    info: &mut i32,
                ) {
                    let (wr, wi) = w.split_at_mut(w.len() / 2);
                    ::lapack::[<$prefix geev>](
                        jobvl, jobvr, n, a, lda, wr, wi, vl, ldvl, vr, ldvr, work, lwork, info,
                    )
                }

                #[inline]
                unsafe fn syevd(
                    &self,
                    jobz: u8,
                    uplo: u8,
                    n: i32,
                    a: &mut [$ty],
                    lda: i32,
                    w: &mut [$ty],
                    work: &mut [$ty],
                    lwork: i32,
                    _rwork: &mut [$ty],
                    _lrwork: i32,
                    iwork: &mut [i32],
                    liwork: i32,
                    info: &mut i32,
                ) {
                    ::lapack::[<$prefix syevd>](
                        jobz, uplo, n, a, lda, w, work, lwork, iwork, liwork, info,
                    )
                }

                #[inline]
                unsafe fn orgqr(
                    &self,
                    m: i32,
                    n: i32,
                    k: i32,
                    a: &mut [$ty],
                    lda: i32,
                    tau: &[$ty],
                    work: &mut [$ty],
                    lwork: i32,
                    info: &mut i32,
                ) {
                    ::lapack::[<$prefix orgqr>](m, n, k, a, lda, tau, work, lwork, info)
                }
            }
        }
    };
}

macro_rules! impl_complex {
    ($ty: ty, $real: ty, $prefix: ident) => {
        paste::paste! {
            impl Lapack<$ty> for SystemLapack {
                impl_common!($ty, $prefix);

                #[inline]
                unsafe fn geev(
                    &self,
                    jobvl: u8,
                    jobvr: u8,
                    n: i32,
                    a: &mut [$ty],
                    lda: i32,
                    w: &mut [$ty],
                    vl: &mut [$ty],
                    ldvl: i32,
                    vr: &mut [$ty],
                    ldvr: i32,
                    work: &mut [$ty],
                    lwork: i32,
                    rwork: &mut [$real],
                    info: &mut i32,
                ) {
                    ::lapack::[<$prefix geev>](
                        jobvl, jobvr, n, a, lda, w, vl, ldvl, vr, ldvr, work, lwork, rwork, info,
                    )
                }

                #[inline]
                unsafe fn syevd(
                    &self,
                    jobz: u8,
                    uplo: u8,
                    n: i32,
                    a: &mut [$ty],
                    lda: i32,
                    w: &mut [$real],
                    work: &mut [$ty],
                    lwork: i32,
                    rwork: &mut [$real],
                    lrwork: i32,
                    iwork: &mut [i32],
                    liwork: i32,
                    info: &mut i32,
                ) {
                    ::lapack::[<$prefix heevd>](
                        jobz, uplo, n, a, lda, w, work, lwork, rwork, lrwork, iwork, liwork, info,
                    )
                }

                #[inline]
                unsafe fn orgqr(
                    &self,
                    m: i32,
                    n: i32,
                    k: i32,
                    a: &mut [$ty],
                    lda: i32,
                    tau: &[$ty],
                    work: &mut [$ty],
                    lwork: i32,
                    info: &mut i32,
                ) {
                    ::lapack::[<$prefix ungqr>](m, n, k, a, lda, tau, work, lwork, info)
                }
            }
        }
    };
}

impl_real!(f32, s);
impl_real!(f64, d);
impl_complex!(c32, f32, c);
impl_complex!(c64, f64, z);
