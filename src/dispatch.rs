//! Runtime element type selection.
//!
//! The type-erased entry points of [`crate::linalg`] take [`DynBatchRef`]/[`DynBatchMut`]
//! operands, read their [`DType`], and instantiate the generic kernel body for the matching
//! concrete element type with
//! [`dispatch_floating_and_complex!`](crate::dispatch_floating_and_complex).

use crate::{
    batch::{Batch, BatchMut, BatchRef},
    c32, c64,
    error::{LinalgError, Op},
    scalar::Scalar,
};
use reborrow::*;

/// Element type tag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
    C32,
    C64,
}

impl DType {
    /// Short name of the type, as used in LAPACK routine prefixes.
    pub fn name(self) -> &'static str {
        match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::C32 => "c32",
            DType::C64 => "c64",
        }
    }

    /// LAPACK routine prefix.
    pub fn lapack_prefix(self) -> char {
        match self {
            DType::F32 => 's',
            DType::F64 => 'd',
            DType::C32 => 'c',
            DType::C64 => 'z',
        }
    }

    #[inline]
    pub fn is_complex(self) -> bool {
        matches!(self, DType::C32 | DType::C64)
    }

    /// Real type with the same precision.
    #[inline]
    pub fn to_real(self) -> DType {
        match self {
            DType::F32 | DType::C32 => DType::F32,
            DType::F64 | DType::C64 => DType::F64,
        }
    }

    /// Complex type with the same precision.
    #[inline]
    pub fn to_complex(self) -> DType {
        match self {
            DType::F32 | DType::C32 => DType::C32,
            DType::F64 | DType::C64 => DType::C64,
        }
    }

    /// Size of one element in bytes.
    #[inline]
    pub fn size_of(self) -> usize {
        match self {
            DType::F32 => core::mem::size_of::<f32>(),
            DType::F64 => core::mem::size_of::<f64>(),
            DType::C32 => core::mem::size_of::<c32>(),
            DType::C64 => core::mem::size_of::<c64>(),
        }
    }
}

impl core::fmt::Display for DType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Runs `$body` once, with `$E` bound to the concrete element type selected by `$dtype`.
///
/// ```
/// use faer_batch::{dispatch_floating_and_complex, DType, Scalar};
///
/// let size = dispatch_floating_and_complex!(DType::C32, |E| core::mem::size_of::<E>());
/// assert_eq!(size, 8);
/// let real = dispatch_floating_and_complex!(DType::C64, |E| <E as Scalar>::IS_REAL);
/// assert!(!real);
/// ```
#[macro_export]
macro_rules! dispatch_floating_and_complex {
    ($dtype: expr, |$E: ident| $body: expr) => {
        match $dtype {
            $crate::DType::F32 => {
                #[allow(non_camel_case_types, dead_code)]
                type $E = f32;
                $body
            }
            $crate::DType::F64 => {
                #[allow(non_camel_case_types, dead_code)]
                type $E = f64;
                $body
            }
            $crate::DType::C32 => {
                #[allow(non_camel_case_types, dead_code)]
                type $E = $crate::c32;
                $body
            }
            $crate::DType::C64 => {
                #[allow(non_camel_case_types, dead_code)]
                type $E = $crate::c64;
                $body
            }
        }
    };
}

/// Immutable batch view with a runtime element type.
#[derive(Copy, Clone, Debug)]
pub enum DynBatchRef<'a> {
    F32(BatchRef<'a, f32>),
    F64(BatchRef<'a, f64>),
    C32(BatchRef<'a, c32>),
    C64(BatchRef<'a, c64>),
}

/// Mutable batch view with a runtime element type.
#[derive(Debug)]
pub enum DynBatchMut<'a> {
    F32(BatchMut<'a, f32>),
    F64(BatchMut<'a, f64>),
    C32(BatchMut<'a, c32>),
    C64(BatchMut<'a, c64>),
}

/// Owned batch with a runtime element type.
#[derive(Clone, Debug, PartialEq)]
pub enum DynBatch {
    F32(Batch<f32>),
    F64(Batch<f64>),
    C32(Batch<c32>),
    C64(Batch<c64>),
}

macro_rules! match_dyn {
    ($value: expr, $enum: ident, |$inner: ident| $body: expr) => {
        match $value {
            $enum::F32($inner) => $body,
            $enum::F64($inner) => $body,
            $enum::C32($inner) => $body,
            $enum::C64($inner) => $body,
        }
    };
}

macro_rules! impl_dyn_shape {
    ($enum: ident) => {
        /// Element type of the batch.
        #[inline]
        pub fn dtype(&self) -> DType {
            match self {
                $enum::F32(_) => DType::F32,
                $enum::F64(_) => DType::F64,
                $enum::C32(_) => DType::C32,
                $enum::C64(_) => DType::C64,
            }
        }

        /// Number of rows of each matrix.
        #[inline]
        pub fn nrows(&self) -> usize {
            match_dyn!(self, $enum, |batch| batch.nrows())
        }

        /// Number of columns of each matrix.
        #[inline]
        pub fn ncols(&self) -> usize {
            match_dyn!(self, $enum, |batch| batch.ncols())
        }

        /// Number of matrices in the batch.
        #[inline]
        pub fn batch_size(&self) -> usize {
            match_dyn!(self, $enum, |batch| batch.batch_size())
        }
    };
}

impl<'a> DynBatchRef<'a> {
    impl_dyn_shape!(DynBatchRef);

    /// Returns the typed view if the batch holds elements of type `E`.
    #[inline]
    pub fn downcast<E: Scalar>(self) -> Option<BatchRef<'a, E>> {
        E::downcast_ref(self)
    }

    /// Copies the batch into an owned, contiguous, column-major batch.
    pub fn to_owned(&self) -> DynBatch {
        match_dyn!(*self, DynBatchRef, |batch| Scalar::upcast_owned(
            batch.to_owned()
        ))
    }
}

impl<'a> DynBatchMut<'a> {
    impl_dyn_shape!(DynBatchMut);

    /// Returns the typed view if the batch holds elements of type `E`.
    #[inline]
    pub fn downcast<E: Scalar>(self) -> Option<BatchMut<'a, E>> {
        E::downcast_mut(self)
    }
}

impl DynBatch {
    impl_dyn_shape!(DynBatch);

    /// Returns a batch of zero matrices with elements of type `dtype`.
    pub fn zeros(dtype: DType, nrows: usize, ncols: usize, batch_size: usize) -> Self {
        dispatch_floating_and_complex!(dtype, |E| Scalar::upcast_owned(Batch::<E>::zeros(
            nrows, ncols, batch_size
        )))
    }

    /// Immutable view over the batch.
    #[inline]
    pub fn as_ref(&self) -> DynBatchRef<'_> {
        match self {
            DynBatch::F32(batch) => DynBatchRef::F32(batch.as_ref()),
            DynBatch::F64(batch) => DynBatchRef::F64(batch.as_ref()),
            DynBatch::C32(batch) => DynBatchRef::C32(batch.as_ref()),
            DynBatch::C64(batch) => DynBatchRef::C64(batch.as_ref()),
        }
    }

    /// Mutable view over the batch.
    #[inline]
    pub fn as_mut(&mut self) -> DynBatchMut<'_> {
        match self {
            DynBatch::F32(batch) => DynBatchMut::F32(batch.as_mut()),
            DynBatch::F64(batch) => DynBatchMut::F64(batch.as_mut()),
            DynBatch::C32(batch) => DynBatchMut::C32(batch.as_mut()),
            DynBatch::C64(batch) => DynBatchMut::C64(batch.as_mut()),
        }
    }

    /// Returns the typed batch if it holds elements of type `E`, and gives it back otherwise.
    #[inline]
    pub fn downcast<E: Scalar>(self) -> Result<Batch<E>, Self> {
        E::downcast_owned(self)
    }
}

impl<'short> Reborrow<'short> for DynBatchMut<'_> {
    type Target = DynBatchRef<'short>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        match self {
            DynBatchMut::F32(batch) => DynBatchRef::F32(batch.rb()),
            DynBatchMut::F64(batch) => DynBatchRef::F64(batch.rb()),
            DynBatchMut::C32(batch) => DynBatchRef::C32(batch.rb()),
            DynBatchMut::C64(batch) => DynBatchRef::C64(batch.rb()),
        }
    }
}

impl<'short> ReborrowMut<'short> for DynBatchMut<'_> {
    type Target = DynBatchMut<'short>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        match self {
            DynBatchMut::F32(batch) => DynBatchMut::F32(batch.rb_mut()),
            DynBatchMut::F64(batch) => DynBatchMut::F64(batch.rb_mut()),
            DynBatchMut::C32(batch) => DynBatchMut::C32(batch.rb_mut()),
            DynBatchMut::C64(batch) => DynBatchMut::C64(batch.rb_mut()),
        }
    }
}

impl<'a> IntoConst for DynBatchMut<'a> {
    type Target = DynBatchRef<'a>;

    #[inline]
    fn into_const(self) -> Self::Target {
        match self {
            DynBatchMut::F32(batch) => DynBatchRef::F32(batch.into_const()),
            DynBatchMut::F64(batch) => DynBatchRef::F64(batch.into_const()),
            DynBatchMut::C32(batch) => DynBatchRef::C32(batch.into_const()),
            DynBatchMut::C64(batch) => DynBatchRef::C64(batch.into_const()),
        }
    }
}

impl<'a, E: Scalar> From<BatchRef<'a, E>> for DynBatchRef<'a> {
    #[inline]
    fn from(batch: BatchRef<'a, E>) -> Self {
        E::upcast_ref(batch)
    }
}

impl<'a, E: Scalar> From<BatchMut<'a, E>> for DynBatchMut<'a> {
    #[inline]
    fn from(batch: BatchMut<'a, E>) -> Self {
        E::upcast_mut(batch)
    }
}

impl<E: Scalar> From<Batch<E>> for DynBatch {
    #[inline]
    fn from(batch: Batch<E>) -> Self {
        E::upcast_owned(batch)
    }
}

/// Downcasts an operand of `op`, reporting a type mismatch as an error.
#[inline]
pub(crate) fn expect_ref<E: Scalar>(
    op: Op,
    batch: DynBatchRef<'_>,
) -> Result<BatchRef<'_, E>, LinalgError> {
    let found = batch.dtype();
    batch.downcast::<E>().ok_or(LinalgError::DTypeMismatch {
        op,
        expected: E::DTYPE,
        found,
    })
}

/// Downcasts an operand of `op`, reporting a type mismatch as an error.
#[inline]
pub(crate) fn expect_mut<E: Scalar>(
    op: Op,
    batch: DynBatchMut<'_>,
) -> Result<BatchMut<'_, E>, LinalgError> {
    let found = batch.dtype();
    batch.downcast::<E>().ok_or(LinalgError::DTypeMismatch {
        op,
        expected: E::DTYPE,
        found,
    })
}
