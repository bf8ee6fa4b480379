//! Aerodynamic and load-transfer collaborator interfaces.
//!
//! The flutter core never assembles aerodynamic operators itself. A
//! doublet-lattice (or other panel-method) implementation sits behind
//! [`AeroModel`], and the structural-to-surface displacement mapping behind
//! [`ModeTransfer`]. Both are called one blocking operation at a time.

use dlm_core::Result;
use nalgebra::DMatrix;
use num_complex::Complex64 as C64;

/// Aerodynamic capability required by the flutter determinant.
pub trait AeroModel {
    /// Number of aerodynamic panels (rows of the influence operator).
    fn num_panels(&self) -> usize;

    /// Number of surface displacement components, three per surface node.
    fn num_surface_dofs(&self) -> usize;

    /// Assemble the aerodynamic influence operator at the given flow
    /// condition and aerodynamic circular frequency.
    ///
    /// The operator maps unknown panel pressure coefficients to induced
    /// normal wash. The caller solves against its transpose; that convention
    /// comes from the reciprocal form of the influence kernel.
    fn influence(&mut self, u: f64, omega: f64, mach: f64) -> Result<DMatrix<C64>>;

    /// Normal wash induced by a surface displacement field: the velocity
    /// component `-dh/dt` per panel and the slope component `-dh/dx` per
    /// panel.
    fn mode_wash(&self, surface_disp: &[f64]) -> (Vec<f64>, Vec<f64>);

    /// Recover nodal forces from a panel pressure-coefficient distribution
    /// at dynamic pressure `qinf`. Returns one complex force component per
    /// surface displacement DOF.
    fn pressure_forces(&self, qinf: f64, cp: &[C64]) -> Vec<C64>;
}

/// Structural-to-aerodynamic displacement transfer.
pub trait ModeTransfer<V> {
    /// Map a structural vector onto the aerodynamic surface, returning one
    /// value per surface displacement DOF.
    fn surface_displacements(&self, vec: &V) -> Vec<f64>;
}
