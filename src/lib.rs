//! `faer-batch` computes dense decompositions over *batches* of matrices stored contiguously in
//! memory, by driving a LAPACK implementation one matrix at a time.
//!
//! The numerics are delegated to LAPACK. What this crate takes care of is the orchestration
//! around it:
//!
//! - column-major layout and strides of every matrix in a batch ([`BatchRef`], [`BatchMut`]),
//! - the two-phase "query the workspace size, then execute" protocol of LAPACK routines, done
//!   once per batch instead of once per matrix ([`workspace`]),
//! - per-matrix status codes, with a continue-on-error or stop-on-first-error policy depending on
//!   the kernel ([`iter`]),
//! - post-processing fix-ups, such as mirroring a triangular result into a full
//!   symmetric/Hermitian matrix ([`reflect`]).
//!
//! # Kernels
//!
//! | kernel | LAPACK routine | policy |
//! |---|---|---|
//! | [`linalg::cholesky_inverse`] | `potri` | continue |
//! | [`linalg::eig`] (single matrix) | `geev` | hard failure |
//! | [`linalg::linalg_eig`] | `geev` | continue |
//! | [`linalg::linalg_eigh`] | `syevd` / `heevd` | stop |
//! | [`linalg::geqrf`] | `geqrf` | asserted |
//! | [`linalg::orgqr`] | `orgqr` / `ungqr` | asserted |
//! | [`linalg::triangular_solve`] | `trtrs` | stop |
//! | [`linalg::triangular_solve_all`] | `trtrs` | continue |
//!
//! Every kernel comes in three flavors:
//! - a generic body, `apply_*::<E>(lapack, ...)`, taking typed views and any [`lapack::Lapack`]
//!   implementation,
//! - a type-erased entry point taking [`DynBatchMut`]/[`DynBatchRef`] operands, which selects the
//!   element type at runtime (`*_with(lapack, ...)`),
//! - the same entry point using the LAPACK backend compiled into the crate.
//!
//! # Linking LAPACK
//! The system backend is compiled with the `lapack` feature. The `openblas`, `netlib`,
//! `intel-mkl` and `accelerate` features additionally link the corresponding provider through
//! `lapack-src`. Without any of them, the entry points that use the compiled-in backend return
//! [`LinalgError::LapackUnavailable`].
//!
//! # Example
//! ```no_run
//! use faer_batch::{linalg, Batch, Side};
//!
//! // two 2x2 Cholesky factors, lower triangular
//! let mut factors = Batch::<f64>::from_fn(2, 2, 2, |b, i, j| {
//!     if i < j {
//!         0.0
//!     } else if i == j {
//!         2.0 + b as f64
//!     } else {
//!         1.0
//!     }
//! });
//! let mut infos = [0i32; 2];
//! linalg::cholesky_inverse(factors.as_mut().into(), &mut infos, Side::Lower)?;
//! faer_batch::check::batch_check_errors(faer_batch::Op::CholeskyInverse, &infos)?;
//! # Ok::<(), faer_batch::LinalgError>(())
//! ```

#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use core::sync::atomic::AtomicUsize;
use equator::{assert, debug_assert};

#[cfg(any(
    feature = "openblas",
    feature = "netlib",
    feature = "intel-mkl",
    feature = "accelerate"
))]
extern crate lapack_src as _;

pub mod batch;
pub mod check;
pub mod dispatch;
pub mod error;
pub mod iter;
pub mod lapack;
pub mod linalg;
pub mod reflect;
pub mod scalar;
pub mod segment_reduce;
pub mod thread;
pub mod workspace;

pub use batch::{Batch, BatchMut, BatchRef};
pub use dispatch::{DType, DynBatch, DynBatchMut, DynBatchRef};
pub use error::{LinalgError, Op};
pub use reborrow;
pub use scalar::{c32, c64, RealScalar, Scalar};

/// Specifies whether the triangular lower or upper part of a matrix should be accessed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Side {
    /// Lower half should be accessed.
    Lower,
    /// Upper half should be accessed.
    Upper,
}

impl Side {
    /// Returns the side selected by an `upper` flag.
    #[inline]
    pub fn from_upper(upper: bool) -> Self {
        if upper {
            Side::Upper
        } else {
            Side::Lower
        }
    }

    /// The LAPACK `uplo` character for this side.
    #[inline]
    pub fn uplo(self) -> u8 {
        match self {
            Side::Lower => b'L',
            Side::Upper => b'U',
        }
    }
}

#[cfg(feature = "perf-warn")]
#[macro_export]
#[doc(hidden)]
macro_rules! __perf_warn {
    ($name: ident) => {{
        #[inline(always)]
        #[allow(non_snake_case)]
        fn $name() -> &'static ::core::sync::atomic::AtomicBool {
            static $name: ::core::sync::atomic::AtomicBool =
                ::core::sync::atomic::AtomicBool::new(false);
            &$name
        }
        ::core::matches!(
            $name().compare_exchange(
                false,
                true,
                ::core::sync::atomic::Ordering::Relaxed,
                ::core::sync::atomic::Ordering::Relaxed,
            ),
            Ok(_)
        )
    }};
}

/// Parallelism strategy used by the post-processing steps of the kernels.
///
/// The LAPACK calls themselves are always issued from the calling thread. Whether the LAPACK
/// provider uses threads internally is up to its own configuration.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Parallelism {
    /// No parallelism.
    ///
    /// The code is executed sequentially on the same thread that calls a function
    /// and passes this argument.
    None,
    /// Rayon parallelism. Only avaialble with the `rayon` feature.
    ///
    /// The code is possibly executed in parallel on the current thread, as well as the currently
    /// active rayon thread pool.
    ///
    /// The contained value represents a hint about the number of threads an implementation should
    /// use, but there is no way to guarantee how many or which threads will be used.
    ///
    /// A value of `0` treated as equivalent to `rayon::current_num_threads()`.
    #[cfg(feature = "rayon")]
    #[cfg_attr(docsrs, doc(cfg(feature = "rayon")))]
    Rayon(usize),
}

/// 0: Disable
/// 1: None
/// n >= 2: Rayon(n - 2)
///
/// default: Rayon(0)
static GLOBAL_PARALLELISM: AtomicUsize = {
    #[cfg(feature = "rayon")]
    {
        AtomicUsize::new(2)
    }
    #[cfg(not(feature = "rayon"))]
    {
        AtomicUsize::new(1)
    }
};

/// Causes functions that access global parallelism settings to panic.
pub fn disable_global_parallelism() {
    GLOBAL_PARALLELISM.store(0, core::sync::atomic::Ordering::Relaxed);
}

/// Sets the global parallelism settings, used by the type-erased entry points.
pub fn set_global_parallelism(parallelism: Parallelism) {
    let value = match parallelism {
        Parallelism::None => 1,
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(n) => n.saturating_add(2),
    };
    GLOBAL_PARALLELISM.store(value, core::sync::atomic::Ordering::Relaxed);
}

/// Gets the global parallelism settings.
///
/// # Panics
/// Panics if global parallelism is disabled.
#[track_caller]
pub fn get_global_parallelism() -> Parallelism {
    let value = GLOBAL_PARALLELISM.load(core::sync::atomic::Ordering::Relaxed);
    match value {
        0 => panic!("Global parallelism is disabled."),
        1 => Parallelism::None,
        #[cfg(feature = "rayon")]
        n => Parallelism::Rayon(n - 2),
        #[cfg(not(feature = "rayon"))]
        _ => unreachable!(),
    }
}

/// Converts a dimension to the integer type used by LAPACK.
#[inline]
pub(crate) fn lapack_int(value: usize) -> Result<i32, LinalgError> {
    i32::try_from(value).map_err(|_| LinalgError::IndexOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    #[test]
    fn side_from_upper() {
        assert!(Side::from_upper(true) == Side::Upper);
        assert!(Side::from_upper(false) == Side::Lower);
        assert!(Side::Upper.uplo() == b'U');
        assert!(Side::Lower.uplo() == b'L');
    }

    #[test]
    fn lapack_int_overflow() {
        assert!(lapack_int(12) == Ok(12));
        assert!(lapack_int(i32::MAX as usize) == Ok(i32::MAX));
        assert!(lapack_int(i32::MAX as usize + 1) == Err(LinalgError::IndexOverflow));
    }
}
