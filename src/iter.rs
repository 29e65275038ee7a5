//! Per-matrix iteration over a batch, collecting LAPACK status codes.

use crate::assert;

/// What to do with the rest of the batch after a matrix reports a nonzero status.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OnError {
    /// Process every matrix. Every status entry is written.
    Continue,
    /// Return right after the first failure. Status entries past the failing index are left
    /// untouched.
    Stop,
}

/// Calls `f(i, &mut infos[i])` for each matrix index `i` of the batch, in order.
///
/// `f` is expected to write the status of matrix `i` to its second argument. Returns the index of
/// the first matrix whose status is nonzero, if any.
///
/// # Panics
/// Panics if `infos.len() < batch_size`.
#[track_caller]
pub fn for_each_matrix(
    infos: &mut [i32],
    batch_size: usize,
    on_error: OnError,
    mut f: impl FnMut(usize, &mut i32),
) -> Option<usize> {
    assert!(infos.len() >= batch_size);

    let mut first_failure = None;
    for (i, info) in infos[..batch_size].iter_mut().enumerate() {
        f(i, info);
        if *info != 0 && first_failure.is_none() {
            first_failure = Some(i);
            if on_error == OnError::Stop {
                break;
            }
        }
    }
    first_failure
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert;

    const UNSET: i32 = i32::MIN;

    fn run(on_error: OnError) -> (Vec<i32>, Vec<usize>, Option<usize>) {
        let mut infos = vec![UNSET; 5];
        let mut visited = Vec::new();
        let first = for_each_matrix(&mut infos, 5, on_error, |i, info| {
            visited.push(i);
            *info = if i == 1 || i == 3 { i as i32 } else { 0 };
        });
        (infos, visited, first)
    }

    #[test]
    fn continue_writes_every_status() {
        let (infos, visited, first) = run(OnError::Continue);
        assert!(infos == [0, 1, 0, 3, 0]);
        assert!(visited == [0, 1, 2, 3, 4]);
        assert!(first == Some(1));
    }

    #[test]
    fn stop_leaves_suffix_untouched() {
        let (infos, visited, first) = run(OnError::Stop);
        assert!(infos == [0, 1, UNSET, UNSET, UNSET]);
        assert!(visited == [0, 1]);
        assert!(first == Some(1));
    }

    #[test]
    fn success_and_empty_batch() {
        let mut infos = [7; 3];
        let first = for_each_matrix(&mut infos, 3, OnError::Stop, |_, info| *info = 0);
        assert!(first.is_none());
        assert!(infos == [0; 3]);

        let mut calls = 0;
        let first = for_each_matrix(&mut [], 0, OnError::Stop, |_, _| calls += 1);
        assert!(all(first.is_none(), calls == 0));
    }

    #[test]
    #[should_panic]
    fn short_status_vector() {
        for_each_matrix(&mut [0; 2], 3, OnError::Continue, |_, _| {});
    }
}
