#![allow(dead_code)]

use faer_batch::{lapack::Lapack, DType, RealScalar, Scalar};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

/// One call into [`MockLapack`].
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub routine: &'static str,
    pub dtype: DType,
    pub query: bool,
    pub args: Vec<(&'static str, i64)>,
}

impl Call {
    pub fn arg(&self, name: &str) -> i64 {
        self.args
            .iter()
            .find(|(arg, _)| *arg == name)
            .map(|&(_, value)| value)
            .unwrap_or_else(|| panic!("{} has no argument {name}", self.routine))
    }
}

/// Recording LAPACK backend.
///
/// Workspace queries report the configured lengths. `potri` and `trtrs` compute their reference
/// results, the other routines produce results that are only correct for triangular (`geev`) or
/// diagonal (`syevd`) inputs. A status can be scripted for each execute-mode call, in which case
/// a nonzero status skips the computation.
pub struct MockLapack {
    pub calls: RefCell<Vec<Call>>,
    pub infos: RefCell<VecDeque<i32>>,
    pub lwork: Cell<f64>,
    pub lrwork: Cell<f64>,
    pub liwork: Cell<i32>,
}

impl Default for MockLapack {
    fn default() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            infos: RefCell::new(VecDeque::new()),
            lwork: Cell::new(8.0),
            lrwork: Cell::new(5.0),
            liwork: Cell::new(3),
        }
    }
}

impl MockLapack {
    pub fn with_infos(infos: impl IntoIterator<Item = i32>) -> Self {
        let this = Self::default();
        this.infos.borrow_mut().extend(infos);
        this
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn queries(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.query).collect()
    }

    pub fn executions(&self) -> Vec<Call> {
        self.calls().into_iter().filter(|c| !c.query).collect()
    }

    fn record<E: Scalar>(&self, routine: &'static str, query: bool, args: &[(&'static str, i64)]) {
        self.calls.borrow_mut().push(Call {
            routine,
            dtype: E::DTYPE,
            query,
            args: args.to_vec(),
        });
    }

    fn scripted_info(&self) -> i32 {
        self.infos.borrow_mut().pop_front().unwrap_or(0)
    }

    fn reported<E: Scalar>(&self, len: f64) -> E {
        E::from_real(E::Real::from_f64(len))
    }
}

fn zero<E: Scalar>() -> E {
    E::zero()
}

fn one<E: Scalar>() -> E {
    E::one()
}

/// Reads the `n×n` triangular matrix stored in the `uplo` triangle of `a`.
fn triangle<E: Scalar>(uplo: u8, n: usize, a: &[E], lda: usize, unit: bool) -> Vec<E> {
    let mut t = vec![zero::<E>(); n * n];
    for j in 0..n {
        for i in 0..n {
            let inside = if uplo == b'U' { i <= j } else { i >= j };
            if inside {
                t[j * n + i] = if unit && i == j {
                    one()
                } else {
                    a[j * lda + i]
                };
            }
        }
    }
    t
}

/// Inverse of a dense `n×n` matrix by Gauss-Jordan elimination with partial pivoting.
pub fn invert<E: Scalar>(n: usize, a: &[E]) -> Vec<E> {
    let mut a = a.to_vec();
    let mut inv = vec![zero::<E>(); n * n];
    for i in 0..n {
        inv[i * n + i] = one();
    }
    for k in 0..n {
        let p = (k..n)
            .max_by(|&x, &y| {
                a[k * n + x]
                    .modulus()
                    .partial_cmp(&a[k * n + y].modulus())
                    .unwrap()
            })
            .unwrap();
        for j in 0..n {
            a.swap(j * n + k, j * n + p);
            inv.swap(j * n + k, j * n + p);
        }
        let pivot = a[k * n + k];
        for j in 0..n {
            a[j * n + k] /= pivot;
            inv[j * n + k] /= pivot;
        }
        for i in 0..n {
            if i != k {
                let factor = a[k * n + i];
                for j in 0..n {
                    let akj = a[j * n + k];
                    let ikj = inv[j * n + k];
                    a[j * n + i] -= factor * akj;
                    inv[j * n + i] -= factor * ikj;
                }
            }
        }
    }
    inv
}

/// Product of two dense column-major matrices, `m×k` times `k×n`.
pub fn matmul<E: Scalar>(m: usize, k: usize, n: usize, a: &[E], b: &[E]) -> Vec<E> {
    let mut c = vec![zero::<E>(); m * n];
    for j in 0..n {
        for p in 0..k {
            for i in 0..m {
                c[j * m + i] += a[p * m + i] * b[j * k + p];
            }
        }
    }
    c
}

/// Conjugate transpose of a dense column-major `m×n` matrix.
pub fn adjoint<E: Scalar>(m: usize, n: usize, a: &[E]) -> Vec<E> {
    let mut t = vec![zero::<E>(); m * n];
    for j in 0..n {
        for i in 0..m {
            t[i * n + j] = a[j * m + i].conj();
        }
    }
    t
}

impl<E: Scalar> Lapack<E> for MockLapack {
    unsafe fn potri(&self, uplo: u8, n: i32, a: &mut [E], lda: i32, info: &mut i32) {
        self.record::<E>(
            "potri",
            false,
            &[("uplo", uplo as i64), ("n", n as i64), ("lda", lda as i64)],
        );
        *info = self.scripted_info();
        if *info != 0 {
            return;
        }

        let (n, lda) = (n as usize, lda as usize);
        let t = triangle(uplo, n, a, lda, false);
        if let Some(k) = (0..n).find(|&k| t[k * n + k] == zero()) {
            *info = k as i32 + 1;
            return;
        }
        // A = L Lᴴ or Uᴴ U
        let full = if uplo == b'L' {
            matmul(n, n, n, &t, &adjoint(n, n, &t))
        } else {
            matmul(n, n, n, &adjoint(n, n, &t), &t)
        };
        let inv = invert(n, &full);
        for j in 0..n {
            for i in 0..n {
                let inside = if uplo == b'U' { i <= j } else { i >= j };
                if i == j {
                    // the diagonal of a Hermitian matrix is real, as `?lauum` writes it
                    a[j * lda + i] = E::from_real(inv[j * n + i].real());
                } else if inside {
                    a[j * lda + i] = inv[j * n + i];
                }
            }
        }
    }

    unsafe fn geev(
        &self,
        jobvl: u8,
        jobvr: u8,
        n: i32,
        a: &mut [E],
        lda: i32,
        w: &mut [E],
        vl: &mut [E],
        ldvl: i32,
        vr: &mut [E],
        ldvr: i32,
        work: &mut [E],
        lwork: i32,
        rwork: &mut [E::Real],
        info: &mut i32,
    ) {
        let query = lwork == -1;
        self.record::<E>(
            "geev",
            query,
            &[
                ("jobvl", jobvl as i64),
                ("jobvr", jobvr as i64),
                ("n", n as i64),
                ("lda", lda as i64),
                ("ldvl", ldvl as i64),
                ("ldvr", ldvr as i64),
                ("lwork", lwork as i64),
                ("w_len", w.len() as i64),
                ("vl_len", vl.len() as i64),
                ("vr_len", vr.len() as i64),
                ("work_len", work.len() as i64),
                ("rwork_len", rwork.len() as i64),
            ],
        );
        if query {
            work[0] = self.reported(self.lwork.get());
            *info = 0;
            return;
        }
        assert!(work.len() >= lwork as usize);
        *info = self.scripted_info();
        if *info != 0 {
            return;
        }

        // eigenvalues of a triangular matrix
        let (n, lda) = (n as usize, lda as usize);
        for j in 0..n {
            w[j] = a[j * lda + j];
            if E::IS_REAL {
                w[n + j] = zero();
            }
        }
        if jobvr == b'V' {
            let ldvr = ldvr as usize;
            for j in 0..n {
                for i in 0..n {
                    vr[j * ldvr + i] = if i == j { one() } else { zero() };
                }
            }
        }
    }

    unsafe fn syevd(
        &self,
        jobz: u8,
        uplo: u8,
        n: i32,
        a: &mut [E],
        lda: i32,
        w: &mut [E::Real],
        work: &mut [E],
        lwork: i32,
        rwork: &mut [E::Real],
        lrwork: i32,
        iwork: &mut [i32],
        liwork: i32,
        info: &mut i32,
    ) {
        let query = lwork == -1;
        self.record::<E>(
            "syevd",
            query,
            &[
                ("jobz", jobz as i64),
                ("uplo", uplo as i64),
                ("n", n as i64),
                ("lda", lda as i64),
                ("lwork", lwork as i64),
                ("lrwork", lrwork as i64),
                ("liwork", liwork as i64),
                ("w_len", w.len() as i64),
                ("work_len", work.len() as i64),
                ("rwork_len", rwork.len() as i64),
                ("iwork_len", iwork.len() as i64),
            ],
        );
        if query {
            assert!(lrwork == -1 && liwork == -1);
            work[0] = self.reported(self.lwork.get());
            rwork[0] = E::Real::from_f64(self.lrwork.get());
            iwork[0] = self.liwork.get();
            *info = 0;
            return;
        }
        assert!(work.len() >= lwork as usize);
        assert!(rwork.len() >= lrwork as usize);
        assert!(iwork.len() >= liwork as usize);
        *info = self.scripted_info();
        if *info != 0 {
            return;
        }

        // eigenvalues of a diagonal matrix
        let (n, lda) = (n as usize, lda as usize);
        for j in 0..n {
            w[j] = a[j * lda + j].real();
        }
        if jobz == b'V' {
            for j in 0..n {
                for i in 0..n {
                    a[j * lda + i] = if i == j { one() } else { zero() };
                }
            }
        }
    }

    unsafe fn geqrf(
        &self,
        m: i32,
        n: i32,
        a: &mut [E],
        lda: i32,
        tau: &mut [E],
        work: &mut [E],
        lwork: i32,
        info: &mut i32,
    ) {
        let query = lwork == -1;
        self.record::<E>(
            "geqrf",
            query,
            &[
                ("m", m as i64),
                ("n", n as i64),
                ("lda", lda as i64),
                ("lwork", lwork as i64),
                ("a_len", a.len() as i64),
                ("tau_len", tau.len() as i64),
                ("work_len", work.len() as i64),
            ],
        );
        if query {
            work[0] = self.reported(self.lwork.get());
            *info = 0;
            return;
        }
        assert!(work.len() >= lwork as usize);
        *info = self.scripted_info();
        if *info != 0 {
            return;
        }

        // tags each reflector with the matching diagonal entry
        let lda = lda as usize;
        for (j, tau) in tau.iter_mut().enumerate().take(Ord::min(m, n) as usize) {
            *tau = a[j * lda + j];
        }
    }

    unsafe fn orgqr(
        &self,
        m: i32,
        n: i32,
        k: i32,
        a: &mut [E],
        lda: i32,
        tau: &[E],
        work: &mut [E],
        lwork: i32,
        info: &mut i32,
    ) {
        let query = lwork == -1;
        self.record::<E>(
            "orgqr",
            query,
            &[
                ("m", m as i64),
                ("n", n as i64),
                ("k", k as i64),
                ("lda", lda as i64),
                ("lwork", lwork as i64),
                ("tau_len", tau.len() as i64),
                ("work_len", work.len() as i64),
            ],
        );
        if query {
            work[0] = self.reported(self.lwork.get());
            *info = 0;
            return;
        }
        assert!(work.len() >= lwork as usize);
        *info = self.scripted_info();
        if *info != 0 {
            return;
        }

        let (m, n, lda) = (m as usize, n as usize, lda as usize);
        for j in 0..n {
            for i in 0..m {
                a[j * lda + i] = if i == j { one() } else { zero() };
            }
        }
    }

    unsafe fn trtrs(
        &self,
        uplo: u8,
        trans: u8,
        diag: u8,
        n: i32,
        nrhs: i32,
        a: &[E],
        lda: i32,
        b: &mut [E],
        ldb: i32,
        info: &mut i32,
    ) {
        self.record::<E>(
            "trtrs",
            false,
            &[
                ("uplo", uplo as i64),
                ("trans", trans as i64),
                ("diag", diag as i64),
                ("n", n as i64),
                ("nrhs", nrhs as i64),
                ("lda", lda as i64),
                ("ldb", ldb as i64),
            ],
        );
        *info = self.scripted_info();
        if *info != 0 {
            return;
        }

        let (n, nrhs, ldb) = (n as usize, nrhs as usize, ldb as usize);
        let unit = diag == b'U';
        if !unit {
            if let Some(k) = (0..n).find(|&k| a[k * lda as usize + k] == zero()) {
                *info = k as i32 + 1;
                return;
            }
        }

        let t = triangle(uplo, n, a, lda as usize, unit);
        let op = match trans {
            b'N' => t,
            b'T' => {
                let mut tt = vec![zero::<E>(); n * n];
                for j in 0..n {
                    for i in 0..n {
                        tt[i * n + j] = t[j * n + i];
                    }
                }
                tt
            }
            _ => adjoint(n, n, &t),
        };
        let inv = invert(n, &op);
        for c in 0..nrhs {
            let col: Vec<E> = (0..n).map(|i| b[c * ldb + i]).collect();
            let x = matmul(n, n, 1, &inv, &col);
            for i in 0..n {
                b[c * ldb + i] = x[i];
            }
        }
    }
}

/// Asserts that two scalars agree within `tol`.
#[track_caller]
pub fn assert_close<E: Scalar>(a: E, b: E, tol: f64) {
    let diff = (a - b).modulus();
    assert!(
        diff <= E::Real::from_f64(tol),
        "{a:?} and {b:?} differ by {diff:?}"
    );
}
