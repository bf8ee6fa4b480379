//! Complex vectors over the real-vector capability.
//!
//! A complex vector is a real/imaginary pair of real vectors. Many vectors in
//! a flutter analysis are purely real (the Lanczos basis, shift-invert
//! right-hand sides), so the imaginary part may be absent entirely:
//! [`ComplexVector::Real`] is a distinct valid state, and no operation ever
//! materializes a zero imaginary vector to stand in for it.

use crate::vector::RealVector;
use num_complex::Complex64 as C64;

/// A complex vector stored as separate real and imaginary components.
#[derive(Debug, Clone)]
pub enum ComplexVector<V> {
    /// A vector with an exactly-zero imaginary part.
    Real(V),
    /// A full real/imaginary pair.
    Pair { re: V, im: V },
}

impl<V: RealVector> ComplexVector<V> {
    /// Create a real-only vector.
    pub fn real_only(re: V) -> Self {
        ComplexVector::Real(re)
    }

    /// Create a full real/imaginary pair.
    pub fn pair(re: V, im: V) -> Self {
        assert_eq!(re.dim(), im.dim(), "dimension mismatch");
        ComplexVector::Pair { re, im }
    }

    /// Number of (complex) entries.
    pub fn dim(&self) -> usize {
        self.real().dim()
    }

    /// The real component.
    pub fn real(&self) -> &V {
        match self {
            ComplexVector::Real(re) => re,
            ComplexVector::Pair { re, .. } => re,
        }
    }

    /// The real component, mutably.
    pub fn real_mut(&mut self) -> &mut V {
        match self {
            ComplexVector::Real(re) => re,
            ComplexVector::Pair { re, .. } => re,
        }
    }

    /// The imaginary component, if present.
    pub fn imag(&self) -> Option<&V> {
        match self {
            ComplexVector::Real(_) => None,
            ComplexVector::Pair { im, .. } => Some(im),
        }
    }

    /// The imaginary component, mutably, if present.
    pub fn imag_mut(&mut self) -> Option<&mut V> {
        match self {
            ComplexVector::Real(_) => None,
            ComplexVector::Pair { im, .. } => Some(im),
        }
    }

    /// Copy the values of `other` into `self`.
    ///
    /// If `other` has no imaginary part, the imaginary slot of `self` (when
    /// present) is zeroed. If `self` has no imaginary slot, the imaginary
    /// part of `other` is dropped.
    pub fn copy_from(&mut self, other: &Self) {
        match self {
            ComplexVector::Real(re) => re.copy_values(other.real()),
            ComplexVector::Pair { re, im } => {
                re.copy_values(other.real());
                match other.imag() {
                    Some(oi) => im.copy_values(oi),
                    None => im.zero_entries(),
                }
            }
        }
    }

    /// Hermitian inner product `self^H * other`.
    ///
    /// With `x = xr + i*xc` and `y = yr + i*yc`:
    ///
    /// ```text
    /// x^H * y = (xr'*yr + xc'*yc) + i*(xr'*yc - xc'*yr)
    /// ```
    ///
    /// Terms involving an absent imaginary component are skipped rather than
    /// evaluated against a materialized zero vector.
    pub fn dot(&self, other: &Self) -> C64 {
        let rr = self.real().dot(other.real());
        match (self.imag(), other.imag()) {
            (None, None) => C64::new(rr, 0.0),
            (None, Some(yc)) => C64::new(rr, self.real().dot(yc)),
            (Some(xc), None) => C64::new(rr, -xc.dot(other.real())),
            (Some(xc), Some(yc)) => {
                C64::new(rr + xc.dot(yc), self.real().dot(yc) - xc.dot(other.real()))
            }
        }
    }

    /// `self <- self + alpha * other` with a complex scalar, expanded
    /// component-wise:
    ///
    /// ```text
    /// xr += Re(alpha)*yr - Im(alpha)*yc
    /// xc += Im(alpha)*yr + Re(alpha)*yc
    /// ```
    ///
    /// A real-only `self` cannot absorb an imaginary contribution; callers
    /// updating real-only storage must use a real `alpha` and a real-only
    /// `other` (the solvers allocate full pairs for their workspaces).
    pub fn axpy(&mut self, alpha: C64, other: &Self) {
        match self {
            ComplexVector::Real(re) => {
                assert!(
                    alpha.im == 0.0 && other.imag().is_none(),
                    "axpy target has no imaginary slot for the imaginary contribution"
                );
                re.axpy(alpha.re, other.real());
            }
            ComplexVector::Pair { re, im } => {
                re.axpy(alpha.re, other.real());
                if alpha.im != 0.0 {
                    im.axpy(alpha.im, other.real());
                }
                if let Some(oc) = other.imag() {
                    im.axpy(alpha.re, oc);
                    if alpha.im != 0.0 {
                        re.axpy(-alpha.im, oc);
                    }
                }
            }
        }
    }

    /// Multiply both components by a real scalar.
    ///
    /// Complex scaling is intentionally unsupported: it cannot be expressed
    /// in-place on a real-only vector. Callers needing a complex scale use
    /// [`ComplexVector::axpy`] against a zeroed vector instead.
    pub fn scale(&mut self, alpha: f64) {
        self.real_mut().scale(alpha);
        if let Some(im) = self.imag_mut() {
            im.scale(alpha);
        }
    }

    /// Set both components to zero.
    pub fn zero(&mut self) {
        self.real_mut().zero_entries();
        if let Some(im) = self.imag_mut() {
            im.zero_entries();
        }
    }

    /// The 2-norm, `sqrt(Re(self^H * self))`.
    ///
    /// The imaginary part of the self inner product vanishes identically.
    pub fn norm(&self) -> f64 {
        self.dot(self).re.sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::DenseVector;

    fn pair(re: Vec<f64>, im: Vec<f64>) -> ComplexVector<DenseVector> {
        ComplexVector::pair(DenseVector::from_values(re), DenseVector::from_values(im))
    }

    fn real_only(re: Vec<f64>) -> ComplexVector<DenseVector> {
        ComplexVector::real_only(DenseVector::from_values(re))
    }

    #[test]
    fn hermitian_dot_full_pair() {
        // x = [1, i], y = [1, -i]: x^H*y = 1 + conj(i)*(-i) = 1 - 1 = 0.
        let x = pair(vec![1.0, 0.0], vec![0.0, 1.0]);
        let y = pair(vec![1.0, 0.0], vec![0.0, -1.0]);

        let d = x.dot(&y);
        assert!((d - C64::new(0.0, 0.0)).norm() < 1e-15);

        // x = [1, i], y = [2, 3]: x^H*y = 2 + conj(i)*3 = 2 - 3i.
        let y = pair(vec![2.0, 3.0], vec![0.0, 0.0]);
        let d = x.dot(&y);
        assert!((d - C64::new(2.0, -3.0)).norm() < 1e-15);
    }

    #[test]
    fn hermitian_dot_absent_imaginary() {
        let x = real_only(vec![1.0, 2.0]);
        let y = pair(vec![3.0, 4.0], vec![5.0, 6.0]);

        // xr'*yr + i*(xr'*yc)
        let d = x.dot(&y);
        assert!((d - C64::new(11.0, 17.0)).norm() < 1e-15);

        // Conjugation on self: -i*(xc'*yr)
        let d = y.dot(&x);
        assert!((d - C64::new(11.0, -17.0)).norm() < 1e-15);

        let z = real_only(vec![1.0, 1.0]);
        let d = x.dot(&z);
        assert!((d - C64::new(3.0, 0.0)).norm() < 1e-15);
    }

    #[test]
    fn axpy_complex_alpha() {
        let mut x = pair(vec![1.0, 0.0], vec![0.0, 0.0]);
        let y = pair(vec![1.0, 2.0], vec![3.0, 4.0]);

        // x += (2 + i)*y
        x.axpy(C64::new(2.0, 1.0), &y);

        // Entry 0: 1 + (2+i)*(1+3i) = 1 + (2-3) + i*(6+1) = 0 + 7i
        // Entry 1: (2+i)*(2+4i) = (4-4) + i*(8+2) = 0 + 10i
        assert!((x.real().as_slice()[0] - 0.0).abs() < 1e-15);
        assert!((x.imag().unwrap().as_slice()[0] - 7.0).abs() < 1e-15);
        assert!((x.real().as_slice()[1] - 0.0).abs() < 1e-15);
        assert!((x.imag().unwrap().as_slice()[1] - 10.0).abs() < 1e-15);
    }

    #[test]
    #[should_panic(expected = "no imaginary slot")]
    fn axpy_real_target_rejects_imaginary_alpha() {
        let mut x = real_only(vec![1.0, 2.0]);
        let y = real_only(vec![3.0, 4.0]);
        x.axpy(C64::new(0.0, 1.0), &y);
    }

    #[test]
    #[should_panic(expected = "no imaginary slot")]
    fn axpy_real_target_rejects_complex_operand() {
        let mut x = real_only(vec![1.0, 2.0]);
        let y = pair(vec![3.0, 4.0], vec![5.0, 6.0]);
        x.axpy(C64::new(1.0, 0.0), &y);
    }

    #[test]
    fn axpy_round_trip() {
        let x0 = pair(vec![1.5, -2.5, 0.25], vec![0.5, 3.0, -1.0]);
        let mut x = x0.clone();
        let w = pair(vec![0.1, 0.2, 0.3], vec![-0.4, 0.5, -0.6]);

        let alpha = C64::new(0.7, -1.3);
        x.axpy(alpha, &w);
        x.axpy(-alpha, &w);

        for i in 0..3 {
            assert!((x.real().as_slice()[i] - x0.real().as_slice()[i]).abs() < 1e-12);
            assert!(
                (x.imag().unwrap().as_slice()[i] - x0.imag().unwrap().as_slice()[i]).abs() < 1e-12
            );
        }
    }

    #[test]
    fn copy_from_zeroes_missing_imaginary() {
        let mut x = pair(vec![0.0, 0.0], vec![9.0, 9.0]);
        let y = real_only(vec![1.0, 2.0]);

        x.copy_from(&y);
        assert_eq!(x.real().as_slice(), &[1.0, 2.0]);
        assert_eq!(x.imag().unwrap().as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn norm_matches_components() {
        let x = pair(vec![3.0, 0.0], vec![0.0, 4.0]);
        assert!((x.norm() - 5.0).abs() < 1e-15);

        let y = real_only(vec![3.0, 4.0]);
        assert!((y.norm() - 5.0).abs() < 1e-15);
    }

    #[test]
    fn scale_is_real_only() {
        let mut x = pair(vec![2.0, 4.0], vec![-2.0, 6.0]);
        x.scale(0.5);
        assert_eq!(x.real().as_slice(), &[1.0, 2.0]);
        assert_eq!(x.imag().unwrap().as_slice(), &[-1.0, 3.0]);
    }
}
