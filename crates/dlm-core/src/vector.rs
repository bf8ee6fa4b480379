//! The real-vector capability underlying the complex vector layer.
//!
//! Production analyses hand the solvers vectors owned by an external
//! finite-element library (distributed across a process group); the solver
//! stack only ever touches them through the [`RealVector`] trait. The
//! [`DenseVector`] implementation backs tests and small standalone analyses.

use rand::Rng;

/// Abstract real-valued vector operations.
///
/// Implementations are responsible for dimension checking; the complex
/// vector layer built on top deliberately does not duplicate the check.
pub trait RealVector {
    /// Number of entries.
    fn dim(&self) -> usize;

    /// Copy the values of `other` into `self`.
    fn copy_values(&mut self, other: &Self);

    /// `self <- self + alpha * other` with a real scalar.
    fn axpy(&mut self, alpha: f64, other: &Self);

    /// Multiply all entries by a real scalar.
    fn scale(&mut self, alpha: f64);

    /// Inner product with `other`.
    fn dot(&self, other: &Self) -> f64;

    /// Set all entries to zero.
    fn zero_entries(&mut self);

    /// Fill with uniform random values in `[lo, hi)`.
    fn set_rand(&mut self, lo: f64, hi: f64);

    /// Enforce essential boundary conditions by zeroing constrained entries.
    fn apply_bcs(&mut self);
}

/// A dense in-memory vector with an optional list of constrained DOFs.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseVector {
    values: Vec<f64>,
    fixed_dofs: Vec<usize>,
}

impl DenseVector {
    /// Create a zero vector of length `n`.
    pub fn new(n: usize) -> Self {
        Self {
            values: vec![0.0; n],
            fixed_dofs: Vec::new(),
        }
    }

    /// Create a vector from existing values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            fixed_dofs: Vec::new(),
        }
    }

    /// Attach a list of constrained DOFs zeroed by [`RealVector::apply_bcs`].
    pub fn with_fixed_dofs(mut self, fixed_dofs: Vec<usize>) -> Self {
        self.fixed_dofs = fixed_dofs;
        self
    }

    /// View the entries as a slice.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// View the entries as a mutable slice.
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.values
    }
}

impl RealVector for DenseVector {
    fn dim(&self) -> usize {
        self.values.len()
    }

    fn copy_values(&mut self, other: &Self) {
        assert_eq!(self.values.len(), other.values.len(), "dimension mismatch");
        self.values.copy_from_slice(&other.values);
    }

    fn axpy(&mut self, alpha: f64, other: &Self) {
        assert_eq!(self.values.len(), other.values.len(), "dimension mismatch");
        for (vi, oi) in self.values.iter_mut().zip(other.values.iter()) {
            *vi += alpha * oi;
        }
    }

    fn scale(&mut self, alpha: f64) {
        for vi in self.values.iter_mut() {
            *vi *= alpha;
        }
    }

    fn dot(&self, other: &Self) -> f64 {
        assert_eq!(self.values.len(), other.values.len(), "dimension mismatch");
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| a * b)
            .sum()
    }

    fn zero_entries(&mut self) {
        self.values.fill(0.0);
    }

    fn set_rand(&mut self, lo: f64, hi: f64) {
        let mut rng = rand::thread_rng();
        for vi in self.values.iter_mut() {
            *vi = rng.gen_range(lo..hi);
        }
    }

    fn apply_bcs(&mut self) {
        for &dof in &self.fixed_dofs {
            self.values[dof] = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_axpy_and_dot() {
        let mut v = DenseVector::from_values(vec![1.0, 2.0, 3.0]);
        let w = DenseVector::from_values(vec![1.0, 1.0, 1.0]);

        v.axpy(2.0, &w);
        assert_eq!(v.as_slice(), &[3.0, 4.0, 5.0]);
        assert!((v.dot(&w) - 12.0).abs() < 1e-15);
    }

    #[test]
    fn dense_scale_and_zero() {
        let mut v = DenseVector::from_values(vec![2.0, -4.0]);
        v.scale(0.5);
        assert_eq!(v.as_slice(), &[1.0, -2.0]);

        v.zero_entries();
        assert_eq!(v.as_slice(), &[0.0, 0.0]);
    }

    #[test]
    fn dense_apply_bcs_zeroes_fixed_dofs() {
        let mut v =
            DenseVector::from_values(vec![1.0, 2.0, 3.0, 4.0]).with_fixed_dofs(vec![0, 2]);
        v.apply_bcs();
        assert_eq!(v.as_slice(), &[0.0, 2.0, 0.0, 4.0]);
    }

    #[test]
    fn dense_set_rand_in_range() {
        let mut v = DenseVector::new(100);
        v.set_rand(-1.0, 1.0);
        assert!(v.as_slice().iter().all(|&x| (-1.0..1.0).contains(&x)));
        // A 100-entry random vector is nonzero with overwhelming probability.
        assert!(v.dot(&v) > 0.0);
    }
}
