//! Fixed-subspace preconditioned complex GMRES.
//!
//! Unlike a restarted production GMRES, this solver performs exactly `msub`
//! Arnoldi steps per call with no tolerance check: the shift-invert Lanczos
//! recurrence budgets a fixed cost per basis vector, and the subsequent full
//! reorthogonalization absorbs the residual error. The only early exit is a
//! happy breakdown, where the Krylov subspace becomes invariant and the
//! solution is already exact in the achieved basis.

use dlm_core::{ComplexOperator, ComplexPreconditioner, ComplexVector, Error, RealVector, Result};
use nalgebra::DMatrix;
use num_complex::Complex64 as C64;
use num_traits::Zero;

/// Hard floor below which a pivot is a breakdown rather than a small number.
const BREAKDOWN_EPS: f64 = 1e-30;

/// Relative threshold for detecting an invariant subspace during
/// orthogonalization.
const HAPPY_BREAKDOWN_RTOL: f64 = 1e-12;

/// Fixed-subspace right-preconditioned GMRES over [`ComplexVector`].
///
/// All per-solve state (Hessenberg matrix, residual array, Givens rotations,
/// Krylov and preconditioned bases) is owned by the solver and reset on each
/// call; one instance serves one analysis at a time.
pub struct Gmres<V> {
    msub: usize,
    /// Upper Hessenberg matrix, (msub+1) x msub.
    h: DMatrix<C64>,
    /// Rotated residual norms, length msub+1.
    res: Vec<C64>,
    /// Givens rotation coefficients.
    qsin: Vec<C64>,
    qcos: Vec<C64>,
    /// Orthonormal Krylov vectors, length msub+1.
    w: Vec<ComplexVector<V>>,
    /// Preconditioned vectors, length msub.
    z: Vec<ComplexVector<V>>,
    /// Number of valid basis vectors in `w` after the last solve.
    basis_size: usize,
}

impl<V: RealVector> Gmres<V> {
    /// Allocate a solver with a fixed subspace size, drawing workspace
    /// vectors from `factory`.
    pub fn new(msub: usize, mut factory: impl FnMut() -> V) -> Self {
        assert!(msub >= 1, "subspace size must be at least 1");
        let mut pair = || ComplexVector::pair(factory(), factory());
        let w = (0..msub + 1).map(|_| pair()).collect();
        let z = (0..msub).map(|_| pair()).collect();
        Self {
            msub,
            h: DMatrix::zeros(msub + 1, msub),
            res: vec![C64::zero(); msub + 1],
            qsin: vec![C64::zero(); msub],
            qcos: vec![C64::zero(); msub],
            w,
            z,
            basis_size: 0,
        }
    }

    /// The fixed subspace size.
    pub fn subspace_size(&self) -> usize {
        self.msub
    }

    /// Solve `op(x) = b` approximately, writing the result into `x`.
    ///
    /// Runs `msub` preconditioned Arnoldi steps (fewer on a happy breakdown)
    /// and returns the number of steps performed. A zero pivot in the
    /// orthogonalization or the Givens rotation is a [`Error::Breakdown`].
    pub fn solve(
        &mut self,
        op: &dyn ComplexOperator<V>,
        pc: &dyn ComplexPreconditioner<V>,
        b: &ComplexVector<V>,
        x: &mut ComplexVector<V>,
    ) -> Result<usize> {
        self.h.fill(C64::zero());
        self.res.fill(C64::zero());
        self.basis_size = 0;

        // W[0] = b / ||b||; res[0] = ||b||.
        self.w[0].copy_from(b);
        let bnorm = self.w[0].norm();
        if bnorm < BREAKDOWN_EPS {
            x.zero();
            return Ok(0);
        }
        self.res[0] = C64::new(bnorm, 0.0);
        self.w[0].scale(1.0 / bnorm);
        self.basis_size = 1;

        let mut niters = self.msub;
        for i in 0..self.msub {
            // Z[i] = M^(-1) W[i]; W[i+1] = A Z[i].
            let (lo, hi) = self.w.split_at_mut(i + 1);
            let wi = &mut hi[0];
            pc.apply(&lo[i], &mut self.z[i]);
            op.mult(&self.z[i], wi);

            // Modified Gram-Schmidt against all previous basis vectors.
            let mut col_norm_sq = 0.0;
            for j in 0..=i {
                let hji = lo[j].dot(wi);
                self.h[(j, i)] = hji;
                col_norm_sq += hji.norm_sqr();
                wi.axpy(-hji, &lo[j]);
            }

            let wnorm = wi.norm();
            let happy = wnorm <= HAPPY_BREAKDOWN_RTOL * col_norm_sq.sqrt().max(BREAKDOWN_EPS);
            if happy {
                self.h[(i + 1, i)] = C64::zero();
            } else {
                if wnorm < BREAKDOWN_EPS {
                    return Err(Error::Breakdown {
                        step: i,
                        reason: "zero orthogonalization norm",
                    });
                }
                self.h[(i + 1, i)] = C64::new(wnorm, 0.0);
                wi.scale(1.0 / wnorm);
                self.basis_size = i + 2;
            }

            // Apply the previously computed Givens rotations to the new
            // Hessenberg column.
            for j in 0..i {
                let h1 = self.h[(j, i)];
                let h2 = self.h[(j + 1, i)];
                self.h[(j, i)] = self.qcos[j].conj() * h1 + self.qsin[j].conj() * h2;
                self.h[(j + 1, i)] = -self.qsin[j] * h1 + self.qcos[j] * h2;
            }

            // New rotation from the trailing pair. H[i+1,i] is a real norm by
            // construction, so the complex-safe scale reduces to
            // sqrt(|h1|^2 + h2^2) with real h2.
            let h1 = self.h[(i, i)];
            let h2 = self.h[(i + 1, i)].re;
            let sq = (h1.norm_sqr() + h2 * h2).sqrt();
            if sq < BREAKDOWN_EPS {
                return Err(Error::Breakdown {
                    step: i,
                    reason: "zero Givens rotation scale",
                });
            }
            self.qcos[i] = h1 / sq;
            self.qsin[i] = C64::new(h2 / sq, 0.0);

            self.h[(i, i)] = C64::new(sq, 0.0);
            self.h[(i + 1, i)] = C64::zero();

            // Rotate the residual pair; res[i+1] starts at zero.
            let r1 = self.res[i];
            self.res[i] = self.qcos[i].conj() * r1;
            self.res[i + 1] = -self.qsin[i] * r1;

            if happy {
                niters = i + 1;
                break;
            }
        }

        // Back-substitute H y = res in place.
        for i in (0..niters).rev() {
            for j in (i + 1)..niters {
                let rj = self.res[j];
                self.res[i] -= self.h[(i, j)] * rj;
            }
            if self.h[(i, i)].norm() < BREAKDOWN_EPS {
                return Err(Error::Breakdown {
                    step: i,
                    reason: "zero pivot in back substitution",
                });
            }
            self.res[i] /= self.h[(i, i)];
        }

        // x = sum res[i] * Z[i].
        x.zero();
        for i in 0..niters {
            x.axpy(self.res[i], &self.z[i]);
        }

        Ok(niters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dlm_core::vector::DenseVector;
    use dlm_core::{IdentityPreconditioner, PartwiseOperator, RealOperator};

    struct RealDiagOp {
        diag: Vec<f64>,
    }

    impl RealOperator<DenseVector> for RealDiagOp {
        fn mult(&self, x: &DenseVector, y: &mut DenseVector) {
            for (i, (xi, di)) in x.as_slice().iter().zip(self.diag.iter()).enumerate() {
                y.as_mut_slice()[i] = xi * di;
            }
        }
    }

    /// Complex diagonal operator acting on split real/imaginary storage.
    struct ComplexDiagOp {
        diag: Vec<C64>,
    }

    impl ComplexOperator<DenseVector> for ComplexDiagOp {
        fn mult(&self, x: &ComplexVector<DenseVector>, y: &mut ComplexVector<DenseVector>) {
            let xr = x.real().as_slice().to_vec();
            let xc: Vec<f64> = match x.imag() {
                Some(im) => im.as_slice().to_vec(),
                None => vec![0.0; xr.len()],
            };
            for (i, d) in self.diag.iter().enumerate() {
                y.real_mut().as_mut_slice()[i] = d.re * xr[i] - d.im * xc[i];
                y.imag_mut().expect("pair workspace").as_mut_slice()[i] =
                    d.im * xr[i] + d.re * xc[i];
            }
        }
    }

    fn pair(n: usize) -> ComplexVector<DenseVector> {
        ComplexVector::pair(DenseVector::new(n), DenseVector::new(n))
    }

    #[test]
    fn gmres_real_diagonal_exact() {
        // diag(1..5), b = ones, m = 5: x_i = 1/i to machine precision.
        let op = RealDiagOp {
            diag: vec![1.0, 2.0, 3.0, 4.0, 5.0],
        };
        let complex_op = PartwiseOperator::new(&op);
        let pc = IdentityPreconditioner;

        let b = ComplexVector::real_only(DenseVector::from_values(vec![1.0; 5]));
        let mut x = pair(5);

        let mut gmres = Gmres::new(5, || DenseVector::new(5));
        let iters = gmres.solve(&complex_op, &pc, &b, &mut x).unwrap();
        assert_eq!(iters, 5);

        for i in 0..5 {
            let expected = 1.0 / (i as f64 + 1.0);
            assert!((x.real().as_slice()[i] - expected).abs() < 1e-10);
            assert!(x.imag().unwrap().as_slice()[i].abs() < 1e-10);
        }
    }

    #[test]
    fn gmres_complex_diagonal() {
        let n = 6;
        let diag: Vec<C64> = (1..=n)
            .map(|i| C64::new(i as f64, 0.5 * i as f64))
            .collect();
        let op = ComplexDiagOp { diag: diag.clone() };
        let pc = IdentityPreconditioner;

        // b = d * (1 + i), so x = 1 + i.
        let b = ComplexVector::pair(
            DenseVector::from_values(diag.iter().map(|d| d.re - d.im).collect()),
            DenseVector::from_values(diag.iter().map(|d| d.re + d.im).collect()),
        );
        let mut x = pair(n);

        let mut gmres = Gmres::new(n, || DenseVector::new(n));
        gmres.solve(&op, &pc, &b, &mut x).unwrap();

        for i in 0..n {
            assert!((x.real().as_slice()[i] - 1.0).abs() < 1e-10);
            assert!((x.imag().unwrap().as_slice()[i] - 1.0).abs() < 1e-10);
        }
    }

    #[test]
    fn krylov_basis_is_orthonormal() {
        let n = 8;
        let diag: Vec<C64> = (1..=n)
            .map(|i| C64::new(i as f64, 0.3 * (i as f64).sin()))
            .collect();
        let op = ComplexDiagOp { diag };
        let pc = IdentityPreconditioner;

        let b = ComplexVector::pair(
            DenseVector::from_values((0..n).map(|i| 1.0 + i as f64).collect()),
            DenseVector::from_values((0..n).map(|i| 0.5 - 0.1 * i as f64).collect()),
        );
        let mut x = pair(n);

        let mut gmres = Gmres::new(6, || DenseVector::new(n));
        gmres.solve(&op, &pc, &b, &mut x).unwrap();

        let rank = gmres.basis_size;
        assert!(rank >= 2);
        for i in 0..rank {
            for j in 0..rank {
                let d = gmres.w[i].dot(&gmres.w[j]);
                let expected = if i == j { 1.0 } else { 0.0 };
                assert!(
                    (d - C64::new(expected, 0.0)).norm() < 1e-10,
                    "basis not orthonormal at ({i},{j}): {d}"
                );
            }
        }
    }

    #[test]
    fn happy_breakdown_on_identity_operator() {
        let op = RealDiagOp {
            diag: vec![1.0; 4],
        };
        let complex_op = PartwiseOperator::new(&op);
        let pc = IdentityPreconditioner;

        let b = ComplexVector::real_only(DenseVector::from_values(vec![1.0, 2.0, 3.0, 4.0]));
        let mut x = pair(4);

        let mut gmres = Gmres::new(4, || DenseVector::new(4));
        let iters = gmres.solve(&complex_op, &pc, &b, &mut x).unwrap();

        // A z = z: the subspace is invariant after one step.
        assert_eq!(iters, 1);
        for i in 0..4 {
            assert!((x.real().as_slice()[i] - b.real().as_slice()[i]).abs() < 1e-12);
        }
    }

    #[test]
    fn zero_rhs_returns_zero_solution() {
        let op = RealDiagOp {
            diag: vec![2.0, 3.0],
        };
        let complex_op = PartwiseOperator::new(&op);
        let pc = IdentityPreconditioner;

        let b = ComplexVector::real_only(DenseVector::new(2));
        let mut x = pair(2);
        x.real_mut().as_mut_slice()[0] = 7.0;

        let mut gmres = Gmres::new(2, || DenseVector::new(2));
        let iters = gmres.solve(&complex_op, &pc, &b, &mut x).unwrap();
        assert_eq!(iters, 0);
        assert_eq!(x.real().as_slice(), &[0.0, 0.0]);
    }
}
