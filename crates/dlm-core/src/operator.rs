//! Operator and preconditioner capabilities for the Krylov solvers.
//!
//! Production matrices (assembled stiffness/mass, factored shifted systems)
//! live behind these traits in the structural collaborator; the solvers only
//! ever call `mult` and `apply`. The partwise adapters lift a real operator
//! to the complex traits, which is how the shift-invert step reuses the
//! complex GMRES with real-only data.

use crate::complex::ComplexVector;
use crate::vector::RealVector;

/// A real linear operator `y = A * x`.
pub trait RealOperator<V: RealVector> {
    /// Matrix-vector product.
    fn mult(&self, x: &V, y: &mut V);
}

/// A real preconditioner `y = M^(-1) * x`.
pub trait RealPreconditioner<V: RealVector> {
    /// Apply the preconditioner.
    fn apply(&self, x: &V, y: &mut V);
}

/// A complex linear operator over [`ComplexVector`].
pub trait ComplexOperator<V: RealVector> {
    /// Matrix-vector product `y = A * x`.
    fn mult(&self, x: &ComplexVector<V>, y: &mut ComplexVector<V>);
}

/// A complex preconditioner over [`ComplexVector`].
pub trait ComplexPreconditioner<V: RealVector> {
    /// Apply the preconditioner: `y = M^(-1) * x`.
    fn apply(&self, x: &ComplexVector<V>, y: &mut ComplexVector<V>);
}

/// Lifts a [`RealOperator`] to [`ComplexOperator`] by acting on the real and
/// imaginary components independently.
pub struct PartwiseOperator<'a, V: RealVector, O: RealOperator<V> + ?Sized> {
    inner: &'a O,
    _marker: std::marker::PhantomData<V>,
}

impl<'a, V: RealVector, O: RealOperator<V> + ?Sized> PartwiseOperator<'a, V, O> {
    /// Wrap a real operator.
    pub fn new(inner: &'a O) -> Self {
        Self {
            inner,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<V: RealVector, O: RealOperator<V> + ?Sized> ComplexOperator<V>
    for PartwiseOperator<'_, V, O>
{
    fn mult(&self, x: &ComplexVector<V>, y: &mut ComplexVector<V>) {
        self.inner.mult(x.real(), y.real_mut());
        match (x.imag(), y.imag_mut()) {
            (Some(xi), Some(yi)) => self.inner.mult(xi, yi),
            (None, Some(yi)) => yi.zero_entries(),
            // A real-only output slot cannot hold an imaginary product; the
            // solver workspaces are always full pairs.
            (Some(_), None) => debug_assert!(false, "output has no imaginary slot"),
            (None, None) => {}
        }
    }
}

/// Lifts a [`RealPreconditioner`] to [`ComplexPreconditioner`] partwise.
pub struct PartwisePreconditioner<'a, V: RealVector, P: RealPreconditioner<V> + ?Sized> {
    inner: &'a P,
    _marker: std::marker::PhantomData<V>,
}

impl<'a, V: RealVector, P: RealPreconditioner<V> + ?Sized> PartwisePreconditioner<'a, V, P> {
    /// Wrap a real preconditioner.
    pub fn new(inner: &'a P) -> Self {
        Self {
            inner,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<V: RealVector, P: RealPreconditioner<V> + ?Sized> ComplexPreconditioner<V>
    for PartwisePreconditioner<'_, V, P>
{
    fn apply(&self, x: &ComplexVector<V>, y: &mut ComplexVector<V>) {
        self.inner.apply(x.real(), y.real_mut());
        match (x.imag(), y.imag_mut()) {
            (Some(xi), Some(yi)) => self.inner.apply(xi, yi),
            (None, Some(yi)) => yi.zero_entries(),
            (Some(_), None) => debug_assert!(false, "output has no imaginary slot"),
            (None, None) => {}
        }
    }
}

/// Identity preconditioner (no-op).
///
/// Useful as a baseline or when no preconditioning is desired.
pub struct IdentityPreconditioner;

impl<V: RealVector> RealPreconditioner<V> for IdentityPreconditioner {
    fn apply(&self, x: &V, y: &mut V) {
        y.copy_values(x);
    }
}

impl<V: RealVector> ComplexPreconditioner<V> for IdentityPreconditioner {
    fn apply(&self, x: &ComplexVector<V>, y: &mut ComplexVector<V>) {
        y.copy_from(x);
    }
}
