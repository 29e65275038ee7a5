//! Views over batches of matrices stored in a single buffer.
//!
//! Element $(i, j)$ of matrix $b$ lives at
//! `b * matrix_stride + i * row_stride + j * col_stride`. LAPACK routines require the
//! column-major special case `row_stride == 1`, `col_stride == lda >= max(1, nrows)`.

use crate::{assert, debug_assert, scalar::Scalar};
use reborrow::*;

/// Leading dimension LAPACK expects for a column-major matrix with `nrows` rows.
#[inline]
pub fn leading_dim(nrows: usize) -> usize {
    Ord::max(1, nrows)
}

/// Number of elements between consecutive matrices of a contiguous batch.
#[inline]
pub fn contiguous_matrix_stride(nrows: usize, ncols: usize) -> usize {
    nrows * ncols
}

/// Number of elements a single strided matrix touches, counted from its first element.
#[inline]
fn span(nrows: usize, ncols: usize, row_stride: usize, col_stride: usize) -> usize {
    if nrows == 0 || ncols == 0 {
        0
    } else {
        (nrows - 1) * row_stride + (ncols - 1) * col_stride + 1
    }
}

/// Minimum buffer length needed to hold a strided batch.
#[inline]
fn required_len(
    nrows: usize,
    ncols: usize,
    row_stride: usize,
    col_stride: usize,
    matrix_stride: usize,
    batch_size: usize,
) -> usize {
    let span = span(nrows, ncols, row_stride, col_stride);
    if batch_size == 0 || span == 0 {
        0
    } else {
        (batch_size - 1) * matrix_stride + span
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Shape {
    nrows: usize,
    ncols: usize,
    row_stride: usize,
    col_stride: usize,
    matrix_stride: usize,
    batch_size: usize,
}

impl Shape {
    #[track_caller]
    fn new(
        len: usize,
        nrows: usize,
        ncols: usize,
        row_stride: usize,
        col_stride: usize,
        matrix_stride: usize,
        batch_size: usize,
    ) -> Self {
        assert!(
            required_len(nrows, ncols, row_stride, col_stride, matrix_stride, batch_size) <= len
        );
        Self {
            nrows,
            ncols,
            row_stride,
            col_stride,
            matrix_stride,
            batch_size,
        }
    }

    #[inline]
    fn is_col_major(&self) -> bool {
        (self.row_stride == 1 || self.nrows <= 1) && self.col_stride >= leading_dim(self.nrows)
    }

    #[inline]
    fn span(&self) -> usize {
        span(self.nrows, self.ncols, self.row_stride, self.col_stride)
    }

    #[inline]
    #[track_caller]
    fn matrix_range(&self, index: usize) -> core::ops::Range<usize> {
        assert!(index < self.batch_size);
        let span = self.span();
        if span == 0 {
            return 0..0;
        }
        let start = index * self.matrix_stride;
        start..start + span
    }

    #[inline]
    #[track_caller]
    fn elem(&self, index: usize, i: usize, j: usize) -> usize {
        assert!(all(index < self.batch_size, i < self.nrows, j < self.ncols));
        index * self.matrix_stride + i * self.row_stride + j * self.col_stride
    }
}

/// Immutable view over a batch of matrices.
pub struct BatchRef<'a, E> {
    data: &'a [E],
    shape: Shape,
}

/// Mutable view over a batch of matrices.
pub struct BatchMut<'a, E> {
    data: &'a mut [E],
    shape: Shape,
}

/// Owned batch of matrices, stored contiguously in column-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Batch<E> {
    data: Vec<E>,
    nrows: usize,
    ncols: usize,
    batch_size: usize,
}

impl<E> Clone for BatchRef<'_, E> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for BatchRef<'_, E> {}

impl<E: core::fmt::Debug> core::fmt::Debug for BatchRef<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BatchRef")
            .field("shape", &self.shape)
            .field("data", &self.data)
            .finish()
    }
}

impl<E: core::fmt::Debug> core::fmt::Debug for BatchMut<'_, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        self.rb().fmt(f)
    }
}

impl<'short, E> Reborrow<'short> for BatchRef<'_, E> {
    type Target = BatchRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        *self
    }
}

impl<'short, E> ReborrowMut<'short> for BatchRef<'_, E> {
    type Target = BatchRef<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        *self
    }
}

impl<E> IntoConst for BatchRef<'_, E> {
    type Target = Self;

    #[inline]
    fn into_const(self) -> Self::Target {
        self
    }
}

impl<'short, E> Reborrow<'short> for BatchMut<'_, E> {
    type Target = BatchRef<'short, E>;

    #[inline]
    fn rb(&'short self) -> Self::Target {
        BatchRef {
            data: &*self.data,
            shape: self.shape,
        }
    }
}

impl<'short, E> ReborrowMut<'short> for BatchMut<'_, E> {
    type Target = BatchMut<'short, E>;

    #[inline]
    fn rb_mut(&'short mut self) -> Self::Target {
        BatchMut {
            data: &mut *self.data,
            shape: self.shape,
        }
    }
}

impl<'a, E> IntoConst for BatchMut<'a, E> {
    type Target = BatchRef<'a, E>;

    #[inline]
    fn into_const(self) -> Self::Target {
        BatchRef {
            data: self.data,
            shape: self.shape,
        }
    }
}

macro_rules! impl_shape_accessors {
    () => {
        /// Number of rows of each matrix.
        #[inline]
        pub fn nrows(&self) -> usize {
            self.shape.nrows
        }

        /// Number of columns of each matrix.
        #[inline]
        pub fn ncols(&self) -> usize {
            self.shape.ncols
        }

        /// Number of matrices in the batch.
        #[inline]
        pub fn batch_size(&self) -> usize {
            self.shape.batch_size
        }

        /// Offset between two consecutive rows of a matrix.
        #[inline]
        pub fn row_stride(&self) -> usize {
            self.shape.row_stride
        }

        /// Offset between two consecutive columns of a matrix.
        #[inline]
        pub fn col_stride(&self) -> usize {
            self.shape.col_stride
        }

        /// Offset between two consecutive matrices of the batch.
        #[inline]
        pub fn matrix_stride(&self) -> usize {
            self.shape.matrix_stride
        }

        /// Offset of the first element of the matrix at `index`.
        #[inline]
        pub fn matrix_offset(&self, index: usize) -> usize {
            index * self.shape.matrix_stride
        }

        /// Returns `true` if the matrices are stored in the column-major layout LAPACK expects.
        #[inline]
        pub fn is_col_major(&self) -> bool {
            self.shape.is_col_major()
        }

        /// Leading dimension of the column-major matrices.
        #[inline]
        #[track_caller]
        pub fn lda(&self) -> usize {
            debug_assert!(self.shape.is_col_major());
            self.shape.col_stride
        }

        /// Total number of matrix elements in the batch, `batch_size * nrows * ncols`.
        #[inline]
        pub fn numel(&self) -> usize {
            self.shape.batch_size * self.shape.nrows * self.shape.ncols
        }
    };
}

impl<'a, E: Scalar> BatchRef<'a, E> {
    /// Creates a view over a contiguous batch of column-major matrices.
    ///
    /// # Panics
    /// Panics if `data.len() != batch_size * nrows * ncols`.
    #[track_caller]
    pub fn from_column_major_slice(
        data: &'a [E],
        nrows: usize,
        ncols: usize,
        batch_size: usize,
    ) -> Self {
        assert!(data.len() == batch_size * nrows * ncols);
        Self::from_slice_with_strides(
            data,
            nrows,
            ncols,
            1,
            leading_dim(nrows),
            contiguous_matrix_stride(nrows, ncols),
            batch_size,
        )
    }

    /// Creates a view over a contiguous batch of row-major matrices.
    ///
    /// # Panics
    /// Panics if `data.len() != batch_size * nrows * ncols`.
    #[track_caller]
    pub fn from_row_major_slice(
        data: &'a [E],
        nrows: usize,
        ncols: usize,
        batch_size: usize,
    ) -> Self {
        assert!(data.len() == batch_size * nrows * ncols);
        Self::from_slice_with_strides(
            data,
            nrows,
            ncols,
            leading_dim(ncols),
            1,
            contiguous_matrix_stride(nrows, ncols),
            batch_size,
        )
    }

    /// Creates a view over a batch with arbitrary strides.
    ///
    /// # Panics
    /// Panics if the batch described by the strides does not fit in `data`.
    #[track_caller]
    pub fn from_slice_with_strides(
        data: &'a [E],
        nrows: usize,
        ncols: usize,
        row_stride: usize,
        col_stride: usize,
        matrix_stride: usize,
        batch_size: usize,
    ) -> Self {
        let shape = Shape::new(
            data.len(),
            nrows,
            ncols,
            row_stride,
            col_stride,
            matrix_stride,
            batch_size,
        );
        Self { data, shape }
    }

    impl_shape_accessors!();

    /// Elements of the matrix at `index`, from its first element to its last one.
    #[inline]
    #[track_caller]
    pub fn matrix(self, index: usize) -> &'a [E] {
        let range = self.shape.matrix_range(index);
        &self.data[range]
    }

    /// Reads element `(i, j)` of the matrix at `index`.
    #[inline]
    #[track_caller]
    pub fn read(&self, index: usize, i: usize, j: usize) -> E {
        self.data[self.shape.elem(index, i, j)]
    }

    /// Underlying buffer.
    #[inline]
    pub fn as_slice(self) -> &'a [E] {
        self.data
    }

    /// Returns `true` if the matrices are column-major with `lda == nrows`, and stored back to
    /// back.
    #[inline]
    pub fn is_contiguous(&self) -> bool {
        let (m, n) = (self.nrows(), self.ncols());
        let packed_matrices =
            self.batch_size() == 1 || self.matrix_stride() == contiguous_matrix_stride(m, n);
        self.numel() == 0
            || (self.is_col_major() && self.col_stride() == leading_dim(m) && packed_matrices)
    }

    /// Copies the batch into an owned, contiguous, column-major batch.
    ///
    /// A contiguous batch is copied in one block, other layouts element by element.
    pub fn to_owned(&self) -> Batch<E> {
        let this = *self;
        let (m, n, batch_size) = (this.nrows(), this.ncols(), this.batch_size());
        if this.is_contiguous() {
            Batch::from_vec(this.data[..this.numel()].to_vec(), m, n, batch_size)
        } else {
            Batch::from_fn(m, n, batch_size, |b, i, j| this.read(b, i, j))
        }
    }
}

impl<'a, E: Scalar> BatchMut<'a, E> {
    /// Creates a view over a contiguous batch of column-major matrices.
    ///
    /// # Panics
    /// Panics if `data.len() != batch_size * nrows * ncols`.
    #[track_caller]
    pub fn from_column_major_slice_mut(
        data: &'a mut [E],
        nrows: usize,
        ncols: usize,
        batch_size: usize,
    ) -> Self {
        assert!(data.len() == batch_size * nrows * ncols);
        Self::from_slice_with_strides_mut(
            data,
            nrows,
            ncols,
            1,
            leading_dim(nrows),
            contiguous_matrix_stride(nrows, ncols),
            batch_size,
        )
    }

    /// Creates a mutable view over a batch with arbitrary strides.
    ///
    /// Matrices of the batch must not overlap, i.e. `matrix_stride` must be at least the number
    /// of elements spanned by a single matrix.
    ///
    /// # Panics
    /// Panics if the batch described by the strides does not fit in `data`, or if consecutive
    /// matrices overlap.
    #[track_caller]
    pub fn from_slice_with_strides_mut(
        data: &'a mut [E],
        nrows: usize,
        ncols: usize,
        row_stride: usize,
        col_stride: usize,
        matrix_stride: usize,
        batch_size: usize,
    ) -> Self {
        let shape = Shape::new(
            data.len(),
            nrows,
            ncols,
            row_stride,
            col_stride,
            matrix_stride,
            batch_size,
        );
        assert!(any(batch_size <= 1, matrix_stride >= shape.span()));
        Self { data, shape }
    }

    impl_shape_accessors!();

    /// Elements of the matrix at `index`, from its first element to its last one.
    #[inline]
    #[track_caller]
    pub fn matrix_mut(&mut self, index: usize) -> &mut [E] {
        let range = self.shape.matrix_range(index);
        &mut self.data[range]
    }

    /// Reads element `(i, j)` of the matrix at `index`.
    #[inline]
    #[track_caller]
    pub fn read(&self, index: usize, i: usize, j: usize) -> E {
        self.data[self.shape.elem(index, i, j)]
    }

    /// Writes `value` to element `(i, j)` of the matrix at `index`.
    #[inline]
    #[track_caller]
    pub fn write(&mut self, index: usize, i: usize, j: usize, value: E) {
        let idx = self.shape.elem(index, i, j);
        self.data[idx] = value;
    }

    /// Copies the contents of `src` into `self`.
    ///
    /// # Panics
    /// Panics if the shapes differ.
    #[track_caller]
    pub fn copy_from(&mut self, src: BatchRef<'_, E>) {
        assert!(all(
            self.nrows() == src.nrows(),
            self.ncols() == src.ncols(),
            self.batch_size() == src.batch_size()
        ));
        for b in 0..self.batch_size() {
            for j in 0..self.ncols() {
                for i in 0..self.nrows() {
                    self.write(b, i, j, src.read(b, i, j));
                }
            }
        }
    }
}

impl<E: Scalar> Batch<E> {
    /// Returns a batch of zero matrices.
    pub fn zeros(nrows: usize, ncols: usize, batch_size: usize) -> Self {
        Self {
            data: vec![E::zero(); batch_size * nrows * ncols],
            nrows,
            ncols,
            batch_size,
        }
    }

    /// Returns a batch whose element `(i, j)` of matrix `b` is `f(b, i, j)`.
    pub fn from_fn(
        nrows: usize,
        ncols: usize,
        batch_size: usize,
        mut f: impl FnMut(usize, usize, usize) -> E,
    ) -> Self {
        let mut data = Vec::with_capacity(batch_size * nrows * ncols);
        for b in 0..batch_size {
            for j in 0..ncols {
                for i in 0..nrows {
                    data.push(f(b, i, j));
                }
            }
        }
        Self {
            data,
            nrows,
            ncols,
            batch_size,
        }
    }

    /// Wraps a contiguous column-major buffer.
    ///
    /// # Panics
    /// Panics if `data.len() != batch_size * nrows * ncols`.
    #[track_caller]
    pub fn from_vec(data: Vec<E>, nrows: usize, ncols: usize, batch_size: usize) -> Self {
        assert!(data.len() == batch_size * nrows * ncols);
        Self {
            data,
            nrows,
            ncols,
            batch_size,
        }
    }

    /// Number of rows of each matrix.
    #[inline]
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns of each matrix.
    #[inline]
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// Number of matrices in the batch.
    #[inline]
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Immutable view over the batch.
    #[inline]
    pub fn as_ref(&self) -> BatchRef<'_, E> {
        BatchRef::from_column_major_slice(&self.data, self.nrows, self.ncols, self.batch_size)
    }

    /// Mutable view over the batch.
    #[inline]
    pub fn as_mut(&mut self) -> BatchMut<'_, E> {
        BatchMut::from_column_major_slice_mut(
            &mut self.data,
            self.nrows,
            self.ncols,
            self.batch_size,
        )
    }

    /// Reads element `(i, j)` of the matrix at `index`.
    #[inline]
    #[track_caller]
    pub fn read(&self, index: usize, i: usize, j: usize) -> E {
        self.as_ref().read(index, i, j)
    }

    /// Writes `value` to element `(i, j)` of the matrix at `index`.
    #[inline]
    #[track_caller]
    pub fn write(&mut self, index: usize, i: usize, j: usize, value: E) {
        self.as_mut().write(index, i, j, value)
    }

    /// Underlying column-major buffer.
    #[inline]
    pub fn as_slice(&self) -> &[E] {
        &self.data
    }

    /// Underlying column-major buffer.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [E] {
        &mut self.data
    }

    /// Consumes the batch and returns its buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<E> {
        self.data
    }
}
