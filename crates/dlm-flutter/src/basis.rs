//! The reduced basis augmented with aerodynamic boundary-condition data.

use dlm_core::{Error, RealVector, Result};
use dlm_solver::ReducedBasis;
use nalgebra::DMatrix;

use crate::aero::{AeroModel, ModeTransfer};

/// A reduced structural basis prepared for flutter analysis.
///
/// Extends [`ReducedBasis`] with the per-mode surface data the determinant
/// needs at every evaluation: the surface displacement shapes and the
/// velocity and slope components of the modal normal wash. All of it is
/// computed once, when the basis is built, and reused across every point of
/// a velocity sweep.
#[derive(Debug)]
pub struct FlutterBasis<V> {
    /// Basis vectors in structural space.
    pub qm: Vec<V>,
    /// Reduced stiffness matrix.
    pub kr: DMatrix<f64>,
    /// Natural frequencies of the converged modes, ascending.
    pub omega: Vec<f64>,
    /// Surface displacement shapes, one column per basis vector.
    pub modes: DMatrix<f64>,
    /// Velocity wash `-dh/dt` per panel, one column per basis vector.
    pub vwash: DMatrix<f64>,
    /// Slope wash `-dh/dx` per panel, one column per basis vector.
    pub dwash: DMatrix<f64>,
}

impl<V: RealVector> FlutterBasis<V> {
    /// Transfer every basis vector to the aerodynamic surface and compute
    /// its normal wash.
    pub fn new<A, T>(reduced: ReducedBasis<V>, transfer: &T, aero: &A) -> Result<Self>
    where
        A: AeroModel + ?Sized,
        T: ModeTransfer<V> + ?Sized,
    {
        let nvecs = reduced.qm.len();
        let ndof = aero.num_surface_dofs();
        let npanels = aero.num_panels();

        let mut modes = DMatrix::zeros(ndof, nvecs);
        let mut vwash = DMatrix::zeros(npanels, nvecs);
        let mut dwash = DMatrix::zeros(npanels, nvecs);

        for (k, q) in reduced.qm.iter().enumerate() {
            let disp = transfer.surface_displacements(q);
            if disp.len() != ndof {
                return Err(Error::DimensionMismatch {
                    expected: ndof,
                    actual: disp.len(),
                });
            }
            let (vk, dk) = aero.mode_wash(&disp);
            if vk.len() != npanels || dk.len() != npanels {
                return Err(Error::DimensionMismatch {
                    expected: npanels,
                    actual: vk.len().min(dk.len()),
                });
            }
            modes.column_mut(k).copy_from_slice(&disp);
            vwash.column_mut(k).copy_from_slice(&vk);
            dwash.column_mut(k).copy_from_slice(&dk);
        }

        Ok(Self {
            qm: reduced.qm,
            kr: reduced.kr,
            omega: reduced.omega,
            modes,
            vwash,
            dwash,
        })
    }

    /// Number of basis vectors.
    pub fn num_vectors(&self) -> usize {
        self.qm.len()
    }
}
