//! Mirrors one triangular half of a square matrix into the other.

use crate::{
    assert,
    scalar::Scalar,
    thread::{for_each_range, Ptr},
    Parallelism, Side,
};

/// Matrices with at least this many rows are reflected in parallel.
pub const REFLECT_PARALLEL_THRESHOLD: usize = 256;

/// Overwrites the triangle opposite to `side` of the `n×n` column-major matrix stored in `matrix`
/// with the conjugate transpose of the triangle selected by `side`.
///
/// After the call, `a[i, j] == conj(a[j, i])` for every `i != j`. The diagonal is left untouched.
///
/// # Panics
/// Panics if `stride < n` or if `matrix` is too short to hold the matrix.
#[track_caller]
pub fn reflect_conj_tri_in_place<E: Scalar>(
    matrix: &mut [E],
    n: usize,
    stride: usize,
    side: Side,
    parallelism: Parallelism,
) {
    if n == 0 {
        return;
    }
    assert!(all(stride >= n, (n - 1) * stride + n <= matrix.len()));

    // column `i` only receives writes at rows that lie in the invalid triangle, and only reads
    // from row `i` in the valid one, so distinct columns can be processed concurrently.
    let rows = move |i: usize| match side {
        Side::Upper => i + 1..n,
        Side::Lower => 0..i,
    };

    let parallelism = if n < REFLECT_PARALLEL_THRESHOLD {
        Parallelism::None
    } else {
        parallelism
    };

    if parallelism == Parallelism::None {
        for i in 0..n {
            for j in rows(i) {
                matrix[i * stride + j] = matrix[j * stride + i].conj();
            }
        }
        return;
    }

    let ptr = Ptr(matrix.as_mut_ptr());
    for_each_range(
        n,
        move |range| {
            let ptr = ptr.get();
            for i in range {
                for j in rows(i) {
                    // SAFETY: both offsets are in bounds by the assertion above, and the target
                    // element of one column is never the source element of another.
                    unsafe { *ptr.add(i * stride + j) = (*ptr.add(j * stride + i)).conj() };
                }
            }
        },
        parallelism,
    );
}
