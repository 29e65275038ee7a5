//! Two-phase scratch sizing for LAPACK routines.
//!
//! LAPACK routines that need scratch memory first get called with a length of
//! [`WORKSPACE_QUERY`]. Instead of doing any work, they write the optimal length to the first
//! element of each scratch buffer. The kernels issue this query once per batch, on the first
//! matrix, since the optimal length depends only on the dimensions. They then allocate the
//! buffers once and reuse them for every matrix of the batch.
//!
//! ```
//! use dyn_stack::{PodStack, StackReq};
//! use faer_batch::{workspace, Op};
//!
//! // phase 1: query
//! let lwork = workspace::query_workspace::<f64>(Op::Geqrf, 4, |work, lwork| {
//!     assert_eq!(lwork, workspace::WORKSPACE_QUERY);
//!     work[0] = 0.0; // some implementations report zero
//! });
//! assert_eq!(lwork.len(), 4);
//!
//! // phase 2: allocate once, run per matrix
//! let mut mem = workspace::alloc_workspace(StackReq::try_all_of([lwork.req::<f64>()?])?)?;
//! let stack = PodStack::new(&mut mem);
//! let (work, _) = stack.make_raw::<f64>(lwork.len());
//! assert_eq!(work.len(), 4);
//! # Ok::<(), faer_batch::LinalgError>(())
//! ```

use crate::{c32, c64, error::LinalgError, error::Op, lapack_int};
use dyn_stack::{GlobalPodBuffer, SizeOverflow, StackReq};

/// Scratch length that selects the query mode of a LAPACK routine.
pub const WORKSPACE_QUERY: i32 = -1;

/// Scratch element type whose first element holds the optimal length after a query.
pub trait WorkLen: bytemuck::Pod {
    /// Length encoded in `self`. Negative and NaN values map to zero.
    fn work_len(self) -> usize;
}

impl WorkLen for f32 {
    #[inline]
    fn work_len(self) -> usize {
        self as usize
    }
}
impl WorkLen for f64 {
    #[inline]
    fn work_len(self) -> usize {
        self as usize
    }
}
impl WorkLen for c32 {
    #[inline]
    fn work_len(self) -> usize {
        self.re as usize
    }
}
impl WorkLen for c64 {
    #[inline]
    fn work_len(self) -> usize {
        self.re as usize
    }
}
impl WorkLen for i32 {
    #[inline]
    fn work_len(self) -> usize {
        Ord::max(self, 0) as usize
    }
}

/// Length of a scratch buffer, as decided by a workspace query.
///
/// Always at least one, since LAPACK rejects a zero length in execute mode.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceLen(usize);

impl WorkspaceLen {
    /// Clamps a reported length to at least `max(1, floor)`.
    #[inline]
    pub fn from_reported(reported: usize, floor: usize) -> Self {
        Self(Ord::max(Ord::max(reported, floor), 1))
    }

    /// Number of elements.
    #[inline]
    pub fn len(self) -> usize {
        self.0
    }

    /// Number of elements, as a LAPACK integer.
    #[inline]
    pub fn lapack_len(self) -> Result<i32, LinalgError> {
        lapack_int(self.0)
    }

    /// Memory requirement of a buffer of this length with elements of type `W`.
    #[inline]
    pub fn req<W: bytemuck::Pod>(self) -> Result<StackReq, SizeOverflow> {
        StackReq::try_new::<W>(self.0)
    }
}

/// One-element buffer receiving the optimal length of a workspace query.
///
/// Used directly when a single query reports the lengths of several buffers at once.
#[derive(Copy, Clone, Debug)]
pub struct Probe<W>([W; 1]);

impl<W: WorkLen> Default for Probe<W> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<W: WorkLen> Probe<W> {
    #[inline]
    pub fn new() -> Self {
        Self([W::zeroed()])
    }

    /// The buffer to hand to LAPACK in place of the scratch buffer.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [W] {
        &mut self.0
    }

    /// Reads the reported length and clamps it to at least `max(1, floor)`.
    #[inline]
    pub fn finish(self, op: Op, floor: usize) -> WorkspaceLen {
        let reported = self.0[0].work_len();
        let len = WorkspaceLen::from_reported(reported, floor);
        log::debug!(
            "{op}: workspace of {} `{}` elements (reported {reported})",
            len.len(),
            core::any::type_name::<W>(),
        );
        len
    }
}

/// Runs `query` once in query mode and returns the scratch length it reports, clamped to at
/// least `max(1, floor)`.
///
/// `query` receives a one-element probe buffer and [`WORKSPACE_QUERY`] as its length.
pub fn query_workspace<W: WorkLen>(
    op: Op,
    floor: usize,
    query: impl FnOnce(&mut [W], i32),
) -> WorkspaceLen {
    let mut probe = Probe::<W>::new();
    query(probe.as_mut_slice(), WORKSPACE_QUERY);
    probe.finish(op, floor)
}

/// Allocates memory for the scratch buffers described by `req`.
#[inline]
pub fn alloc_workspace(req: StackReq) -> Result<GlobalPodBuffer, LinalgError> {
    GlobalPodBuffer::try_new(req).map_err(|_| LinalgError::OutOfMemory)
}
