//! Parallel loop primitives used by the post-processing steps.

use crate::Parallelism;
use core::ops::Range;

/// Executes the tasks by passing the values in `0..n_tasks` to `op`, possibly in parallel.
#[inline]
pub fn for_each_raw(n_tasks: usize, op: impl Send + Sync + Fn(usize), parallelism: Parallelism) {
    fn implementation(
        n_tasks: usize,
        op: &(dyn Send + Sync + Fn(usize)),
        parallelism: Parallelism,
    ) {
        if n_tasks == 0 {
            return;
        }
        if n_tasks == 1 {
            op(0);
            return;
        }

        match parallelism {
            Parallelism::None => (0..n_tasks).for_each(op),
            #[cfg(feature = "rayon")]
            Parallelism::Rayon(_) => {
                let n_threads = parallelism_degree(parallelism);

                use rayon::prelude::*;
                let min_len = n_tasks / n_threads;
                (0..n_tasks)
                    .into_par_iter()
                    .with_min_len(min_len)
                    .for_each(op);
            }
        }
    }
    implementation(n_tasks, &op, parallelism);
}

/// Splits `0..n` into one contiguous range per thread and passes each range to `op`, possibly in
/// parallel. The ranges are disjoint and cover `0..n`.
#[inline]
pub fn for_each_range(n: usize, op: impl Send + Sync + Fn(Range<usize>), parallelism: Parallelism) {
    let chunk_count = Ord::min(parallelism_degree(parallelism), n);
    for_each_raw(
        chunk_count,
        |idx| {
            let (start, len) = par_split_indices(n, idx, chunk_count);
            op(start..start + len)
        },
        parallelism,
    );
}

/// Unsafe [`Send`] and [`Sync`] pointer type.
pub struct Ptr<T>(pub *mut T);
unsafe impl<T> Send for Ptr<T> {}
unsafe impl<T> Sync for Ptr<T> {}
impl<T> Copy for Ptr<T> {}
impl<T> Clone for Ptr<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Ptr<T> {
    /// Returns the wrapped pointer.
    #[inline]
    pub fn get(self) -> *mut T {
        self.0
    }
}

/// The amount of threads that should ideally execute an operation with the given parallelism.
#[inline]
pub fn parallelism_degree(parallelism: Parallelism) -> usize {
    match parallelism {
        Parallelism::None => 1,
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(0) => rayon::current_num_threads(),
        #[cfg(feature = "rayon")]
        Parallelism::Rayon(n_threads) => n_threads,
    }
}

/// Returns the start and length of a subsegment of `0..n`, split between `chunk_count` consumers,
/// for the consumer at index `idx`.
///
/// For the same `n` and `chunk_count`, different values of `idx` between in `0..chunk_count` will
/// represent distinct subsegments.
#[inline]
pub fn par_split_indices(n: usize, idx: usize, chunk_count: usize) -> (usize, usize) {
    let chunk_size = n / chunk_count;
    let rem = n % chunk_count;

    let idx_to_start = move |idx| {
        if idx < rem {
            idx * (chunk_size + 1)
        } else {
            rem + idx * chunk_size
        }
    };

    let start = idx_to_start(idx);
    let end = idx_to_start(idx + 1);
    (start, end - start)
}
