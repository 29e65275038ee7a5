use crate::dispatch::DType;
use core::fmt;

/// Kernel that produced an error.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    CholeskyInverse,
    Eig,
    LinalgEig,
    LinalgEigh,
    Geqrf,
    Orgqr,
    TriangularSolve,
    SegmentReduce,
}

impl Op {
    /// Stable name of the kernel.
    pub fn name(self) -> &'static str {
        match self {
            Op::CholeskyInverse => "cholesky_inverse",
            Op::Eig => "eig",
            Op::LinalgEig => "linalg_eig",
            Op::LinalgEigh => "linalg_eigh",
            Op::Geqrf => "geqrf",
            Op::Orgqr => "orgqr",
            Op::TriangularSolve => "triangular_solve",
            Op::SegmentReduce => "segment_reduce",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Errors that can be returned by the kernels and their helpers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum LinalgError {
    /// The crate was compiled without a LAPACK backend.
    LapackUnavailable { op: Op },
    /// Operands of a type-erased entry point have different element types.
    DTypeMismatch {
        op: Op,
        expected: DType,
        found: DType,
    },
    /// A dimension does not fit in the LAPACK integer type.
    IndexOverflow,
    /// Scratch memory could not be allocated.
    OutOfMemory,
    /// The scratch memory size computation overflowed.
    SizeOverflow,
    /// LAPACK reported a nonzero status for the matrix at index `batch`.
    Decomposition { op: Op, batch: usize, info: i32 },
    /// Segment lengths are inconsistent with the reduced data.
    InvalidSegmentLengths,
    /// The input of `op` holds no elements.
    EmptyInput { op: Op },
}

impl fmt::Display for LinalgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            LinalgError::LapackUnavailable { op } => write!(
                f,
                "{op}: compiled without LAPACK support, enable the `lapack` feature",
            ),
            LinalgError::DTypeMismatch {
                op,
                expected,
                found,
            } => write!(
                f,
                "{op}: expected elements of type {}, found {}",
                expected.name(),
                found.name(),
            ),
            LinalgError::IndexOverflow => {
                f.write_str("dimension does not fit in a 32-bit LAPACK integer")
            }
            LinalgError::OutOfMemory => f.write_str("failed to allocate scratch memory"),
            LinalgError::SizeOverflow => f.write_str("scratch memory size overflow"),
            LinalgError::Decomposition { op, batch, info } => {
                let batch = BatchIndex(batch);
                if info < 0 {
                    return write!(
                        f,
                        "{op}{batch}: argument {} had an illegal value",
                        -(info as i64),
                    );
                }
                match op {
                    Op::CholeskyInverse => write!(
                        f,
                        "{op}{batch}: the factorization could not be completed because the \
                         input is not positive-definite (the leading minor of order {info} is \
                         not positive-definite)",
                    ),
                    Op::Eig | Op::LinalgEig => write!(
                        f,
                        "{op}{batch}: the QR algorithm failed to converge, only the eigenvalues \
                         after index {info} were computed",
                    ),
                    Op::LinalgEigh => write!(
                        f,
                        "{op}{batch}: the algorithm failed to converge; {info} off-diagonal \
                         elements of an intermediate tridiagonal form did not converge to zero",
                    ),
                    Op::TriangularSolve => write!(
                        f,
                        "{op}{batch}: the diagonal element {info} is zero, the triangular \
                         factor is singular",
                    ),
                    _ => write!(f, "{op}{batch}: failed with status {info}"),
                }
            }
            LinalgError::InvalidSegmentLengths => {
                f.write_str("segment lengths must be positive and sum to the data length")
            }
            LinalgError::EmptyInput { op } => write!(f, "{op}: expected a non-empty input"),
        }
    }
}

struct BatchIndex(usize);

impl fmt::Display for BatchIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, " (batch {})", self.0)
    }
}

impl std::error::Error for LinalgError {}

impl From<dyn_stack::SizeOverflow> for LinalgError {
    #[inline]
    fn from(_: dyn_stack::SizeOverflow) -> Self {
        LinalgError::SizeOverflow
    }
}
