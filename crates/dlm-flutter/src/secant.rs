//! Two-point complex secant iteration on the flutter determinant.

use dlm_core::{Error, Result};
use num_complex::Complex64 as C64;

/// A converged root of the determinant iteration.
#[derive(Debug, Clone, Copy)]
pub struct SecantResult {
    /// Converged eigenvalue estimate.
    pub root: C64,
    /// Determinant value at the root.
    pub det: C64,
    /// Number of determinant checks performed.
    pub iterations: usize,
}

/// Find a root of `f` by the complex secant method from two distinct seeds.
///
/// Convergence is relative to the determinant magnitude at the first seed:
/// `|f(p)| <= tol * |f(p1)|`. A vanishing secant denominator is a
/// [`Error::Breakdown`]; exhausting `max_iters` updates is
/// [`Error::NonConvergence`].
pub fn secant_search<F>(
    mut f: F,
    mut p1: C64,
    mut p2: C64,
    tol: f64,
    max_iters: usize,
) -> Result<SecantResult>
where
    F: FnMut(C64) -> Result<C64>,
{
    let mut det1 = f(p1)?;
    let mut det2 = f(p2)?;
    let det0_norm = det1.norm();

    let mut iterations = 0;
    loop {
        iterations += 1;
        if det2.norm() <= tol * det0_norm {
            log::debug!("secant converged: p = {p2}, |det| = {:.3e}", det2.norm());
            return Ok(SecantResult {
                root: p2,
                det: det2,
                iterations,
            });
        }
        if iterations > max_iters {
            return Err(Error::NonConvergence {
                iterations: max_iters,
            });
        }
        if det1 == det2 {
            return Err(Error::Breakdown {
                step: iterations,
                reason: "secant denominator vanished",
            });
        }

        let pnew = (p2 * det1 - p1 * det2) / (det1 - det2);
        p1 = p2;
        det1 = det2;
        p2 = pnew;
        det2 = f(p2)?;
        log::trace!(
            "secant iter {iterations}: p = {:.6} + {:.6}i, |det| = {:.3e}",
            p2.re,
            p2.im,
            det2.norm()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_determinant_converges_in_two_iterations() {
        let p0 = C64::new(-0.3, 2.5);
        let result = secant_search(
            |p| Ok(p - p0),
            C64::new(1.0, 1.0),
            C64::new(-2.0, 0.5),
            1e-12,
            50,
        )
        .unwrap();

        assert_eq!(result.iterations, 2);
        assert!((result.root - p0).norm() < 1e-12);
    }

    #[test]
    fn quadratic_determinant_finds_nearest_root() {
        // det(p) = (p - i)(p + i); seed near +i.
        let f = |p: C64| Ok(p * p + C64::new(1.0, 0.0));
        let result = secant_search(f, C64::new(0.1, 0.9), C64::new(0.1, 1.1), 1e-12, 50).unwrap();
        assert!((result.root - C64::new(0.0, 1.0)).norm() < 1e-8);
    }

    #[test]
    fn identical_determinants_break_down() {
        let err = secant_search(
            |_| Ok(C64::new(1.0, 0.0)),
            C64::new(0.0, 0.0),
            C64::new(1.0, 0.0),
            1e-12,
            50,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Breakdown { .. }));
    }

    #[test]
    fn iteration_cap_is_non_convergence() {
        // Oscillating determinant that never shrinks.
        let mut flip = 1.0;
        let err = secant_search(
            |_| {
                flip = -flip;
                Ok(C64::new(flip, 1.0))
            },
            C64::new(0.0, 0.0),
            C64::new(1.0, 0.0),
            1e-12,
            5,
        )
        .unwrap_err();
        assert!(matches!(err, Error::NonConvergence { iterations: 5 }));
    }
}
