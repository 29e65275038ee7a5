//! Element types supported by the kernels.
//!
//! LAPACK provides every routine in four flavors, prefixed `s`, `d`, `c` and `z`, for [`f32`],
//! [`f64`], [`c32`] and [`c64`] respectively. [`Scalar`] is implemented for exactly these four
//! types.

use crate::{
    batch::{Batch, BatchMut, BatchRef},
    dispatch::{DType, DynBatch, DynBatchMut, DynBatchRef},
    workspace::WorkLen,
};
use core::fmt::Debug;
use core::ops::Neg;
use num_traits::{Float, NumAssign};

/// 32-bit complex floating point type, with the same memory layout as LAPACK's `complex`.
#[allow(non_camel_case_types)]
pub type c32 = num_complex::Complex<f32>;
/// 64-bit complex floating point type, with the same memory layout as LAPACK's
/// `double complex`.
#[allow(non_camel_case_types)]
pub type c64 = num_complex::Complex<f64>;

/// Element type of a matrix batch.
///
/// Every element type can also serve as LAPACK scratch memory, hence the [`WorkLen`] bound.
pub trait Scalar:
    WorkLen + Debug + PartialEq + NumAssign + Neg<Output = Self> + Send + Sync + 'static
{
    /// The real type with the same precision.
    type Real: RealScalar;

    /// Runtime tag of this type.
    const DTYPE: DType;
    /// `true` for [`f32`] and [`f64`].
    const IS_REAL: bool;

    /// Complex conjugate. Identity for real types.
    fn conj(self) -> Self;
    /// Real part.
    fn real(self) -> Self::Real;
    /// Imaginary part. Zero for real types.
    fn imag(self) -> Self::Real;
    /// Embeds a real value.
    fn from_real(value: Self::Real) -> Self;
    /// Absolute value (modulus for complex types).
    fn modulus(self) -> Self::Real;

    /// Returns the typed view if `batch` holds elements of type `Self`.
    fn downcast_ref(batch: DynBatchRef<'_>) -> Option<BatchRef<'_, Self>>;
    /// Returns the typed view if `batch` holds elements of type `Self`.
    fn downcast_mut(batch: DynBatchMut<'_>) -> Option<BatchMut<'_, Self>>;
    /// Returns the typed batch if `batch` holds elements of type `Self`, and gives it back
    /// otherwise.
    fn downcast_owned(batch: DynBatch) -> Result<Batch<Self>, DynBatch>;
    /// Erases the element type of a view.
    fn upcast_ref(batch: BatchRef<'_, Self>) -> DynBatchRef<'_>;
    /// Erases the element type of a view.
    fn upcast_mut(batch: BatchMut<'_, Self>) -> DynBatchMut<'_>;
    /// Erases the element type of an owned batch.
    fn upcast_owned(batch: Batch<Self>) -> DynBatch;
}

/// Real element type.
pub trait RealScalar: Scalar<Real = Self> + Float {
    /// Converts from [`f64`], rounding if needed.
    fn from_f64(value: f64) -> Self;
}

macro_rules! impl_downcast {
    ($dtype: ident) => {
        #[inline]
        fn downcast_ref(batch: DynBatchRef<'_>) -> Option<BatchRef<'_, Self>> {
            match batch {
                DynBatchRef::$dtype(batch) => Some(batch),
                _ => None,
            }
        }
        #[inline]
        fn downcast_mut(batch: DynBatchMut<'_>) -> Option<BatchMut<'_, Self>> {
            match batch {
                DynBatchMut::$dtype(batch) => Some(batch),
                _ => None,
            }
        }
        #[inline]
        fn downcast_owned(batch: DynBatch) -> Result<Batch<Self>, DynBatch> {
            match batch {
                DynBatch::$dtype(batch) => Ok(batch),
                batch => Err(batch),
            }
        }
        #[inline]
        fn upcast_ref(batch: BatchRef<'_, Self>) -> DynBatchRef<'_> {
            DynBatchRef::$dtype(batch)
        }
        #[inline]
        fn upcast_mut(batch: BatchMut<'_, Self>) -> DynBatchMut<'_> {
            DynBatchMut::$dtype(batch)
        }
        #[inline]
        fn upcast_owned(batch: Batch<Self>) -> DynBatch {
            DynBatch::$dtype(batch)
        }
    };
}

macro_rules! impl_real {
    ($ty: ty, $dtype: ident) => {
        impl Scalar for $ty {
            type Real = $ty;

            const DTYPE: DType = DType::$dtype;
            const IS_REAL: bool = true;

            #[inline(always)]
            fn conj(self) -> Self {
                self
            }
            #[inline(always)]
            fn real(self) -> Self::Real {
                self
            }
            #[inline(always)]
            fn imag(self) -> Self::Real {
                0.0
            }
            #[inline(always)]
            fn from_real(value: Self::Real) -> Self {
                value
            }
            #[inline(always)]
            fn modulus(self) -> Self::Real {
                <$ty>::abs(self)
            }

            impl_downcast!($dtype);
        }

        impl RealScalar for $ty {
            #[inline(always)]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }
        }
    };
}

macro_rules! impl_complex {
    ($ty: ty, $real: ty, $dtype: ident) => {
        impl Scalar for $ty {
            type Real = $real;

            const DTYPE: DType = DType::$dtype;
            const IS_REAL: bool = false;

            #[inline(always)]
            fn conj(self) -> Self {
                <$ty>::new(self.re, -self.im)
            }
            #[inline(always)]
            fn real(self) -> Self::Real {
                self.re
            }
            #[inline(always)]
            fn imag(self) -> Self::Real {
                self.im
            }
            #[inline(always)]
            fn from_real(value: Self::Real) -> Self {
                <$ty>::new(value, 0.0)
            }
            #[inline(always)]
            fn modulus(self) -> Self::Real {
                self.norm()
            }

            impl_downcast!($dtype);
        }
    };
}

impl_real!(f32, F32);
impl_real!(f64, F64);
impl_complex!(c32, f32, C32);
impl_complex!(c64, f64, C64);
