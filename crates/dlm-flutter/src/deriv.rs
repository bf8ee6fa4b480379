//! Frozen-eigenvalue design sensitivities at a converged flutter root.
//!
//! First-order eigenvalue perturbation: at a root p the flutter matrix has a
//! near-zero eigenvalue, and the gradient of p with respect to a design
//! variable follows from the left and right eigenvectors of that eigenvalue,
//! the structural design derivatives, and a finite-difference estimate of
//! dF/dp. The aerodynamic operator is held frozen, so only the structural
//! terms carry design dependence.

use dlm_core::{Error, RealVector, Result};
use dlm_solver::{MatrixKind, StructuralModel};
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64 as C64;

use crate::aero::AeroModel;
use crate::basis::FlutterBasis;
use crate::matrix::flutter_matrix;
use crate::mode::FlutterConfig;

/// Step for the finite-difference estimate of dF/dp.
const FD_STEP: C64 = C64::new(0.0, 1e-6);

const EIG_TOL: f64 = 1e-10;
const EIG_MAX_ITERS: usize = 200;

/// Frozen design gradient of a flutter eigenvalue.
pub struct FrozenDeriv {
    /// Gradient of p with respect to each design variable.
    pub deriv: Vec<C64>,
    /// Smallest-magnitude eigenvalue of F(p); near zero at a converged root.
    pub eigenvalue: C64,
    /// Deviation of the biorthogonal eigenvector pair from mass
    /// orthonormality, `v^H M u - 1`.
    pub ortho_error: C64,
}

/// Smallest-magnitude eigenpair of a dense complex matrix by inverse
/// iteration with a Rayleigh-quotient eigenvalue estimate.
fn smallest_eigenpair(a: &DMatrix<C64>) -> Result<(C64, DVector<C64>)> {
    let n = a.nrows();
    let lu = a.clone().lu();

    let mut x = DVector::from_element(n, C64::new(1.0, 0.0));
    x = x.unscale(x.norm());

    for _ in 0..EIG_MAX_ITERS {
        let y = lu.solve(&x).ok_or(Error::SingularSystem)?;
        let ynorm = y.norm();
        if ynorm < 1e-300 {
            return Err(Error::SingularSystem);
        }
        x = y.unscale(ynorm);

        let ax = a * &x;
        let eig = x.dotc(&ax);
        let residual = (&ax - &x * eig).norm();
        if residual <= EIG_TOL * ax.norm().max(1e-300) {
            return Ok((eig, x));
        }
    }
    Err(Error::NonConvergence {
        iterations: EIG_MAX_ITERS,
    })
}

/// Gradient of the flutter eigenvalue `p` with respect to the model's
/// design variables, holding the aerodynamic operator frozen.
pub fn frozen_deriv<A, S>(
    aero: &mut A,
    model: &S,
    basis: &FlutterBasis<S::Vector>,
    config: &FlutterConfig,
    u: f64,
    p: C64,
) -> Result<FrozenDeriv>
where
    A: AeroModel + ?Sized,
    S: StructuralModel,
{
    let qinf = config.dynamic_pressure(u);
    let fr = flutter_matrix(aero, basis, u, p, qinf, config.mach)?;
    let m = basis.num_vectors();

    // Left and right eigenvectors of the near-zero eigenvalue. The left
    // vector is an eigenvector of the adjoint.
    let (eigenvalue, zr) = smallest_eigenpair(&fr)?;
    let (_, zl) = smallest_eigenpair(&fr.adjoint())?;

    // Rescale to a biorthonormal pair. A vanishing product means the
    // eigenvalue is defective and the first-order perturbation is invalid.
    let s = zl.dotc(&zr);
    if s.norm() < 1e-12 {
        return Err(Error::SingularSystem);
    }
    let zr = zr / s;

    // Lift the reduced eigenvectors to structural space, split into real
    // and imaginary parts for the real-valued sensitivity products.
    let mut vr = model.create_vector();
    let mut vc = model.create_vector();
    let mut ur = model.create_vector();
    let mut uc = model.create_vector();
    for i in 0..m {
        vr.axpy(zl[i].re, &basis.qm[i]);
        vc.axpy(zl[i].im, &basis.qm[i]);
        ur.axpy(zr[i].re, &basis.qm[i]);
        uc.axpy(zr[i].im, &basis.qm[i]);
    }

    // v^H M u over the M-orthonormal basis should be one.
    let mut temp = model.create_vector();
    model.mass_mult(&ur, &mut temp);
    let mut vhmu = C64::new(vr.dot(&temp), -vc.dot(&temp));
    model.mass_mult(&uc, &mut temp);
    vhmu += C64::new(vc.dot(&temp), vr.dot(&temp));
    let ortho_error = vhmu - 1.0;
    log::debug!("eigenvector orthogonality error: {ortho_error}");

    // Structural design derivatives for every real/imaginary combination.
    let mrr = model.eval_mat_dv_sens_inner_product(MatrixKind::Mass, 1.0, &vr, &ur);
    let mcr = model.eval_mat_dv_sens_inner_product(MatrixKind::Mass, 1.0, &vc, &ur);
    let mrc = model.eval_mat_dv_sens_inner_product(MatrixKind::Mass, 1.0, &vr, &uc);
    let mcc = model.eval_mat_dv_sens_inner_product(MatrixKind::Mass, 1.0, &vc, &uc);

    let krr = model.eval_mat_dv_sens_inner_product(MatrixKind::Stiffness, 1.0, &vr, &ur);
    let kcr = model.eval_mat_dv_sens_inner_product(MatrixKind::Stiffness, 1.0, &vc, &ur);
    let krc = model.eval_mat_dv_sens_inner_product(MatrixKind::Stiffness, 1.0, &vr, &uc);
    let kcc = model.eval_mat_dv_sens_inner_product(MatrixKind::Stiffness, 1.0, &vc, &uc);

    // Finite-difference dF/dp and the eigenvector inner product.
    let fr2 = flutter_matrix(aero, basis, u, p + FD_STEP, qinf, config.mach)?;
    let dfdp = (fr2 - fr) / FD_STEP;
    let fact = zl.dotc(&(&dfdp * &zr));
    if fact.norm() < 1e-300 {
        return Err(Error::SingularSystem);
    }

    // d p / d x_j = v^H (p^2 dM/dx_j + dK/dx_j) u / (zl^H dF/dp zr).
    let num_dvs = model.num_design_vars();
    let mut deriv = Vec::with_capacity(num_dvs);
    for j in 0..num_dvs {
        let dm = C64::new(mrr[j] + mcc[j], mrc[j] - mcr[j]);
        let dk = C64::new(krr[j] + kcc[j], krc[j] - kcr[j]);
        deriv.push((p * p * dm + dk) / fact);
    }

    Ok(FrozenDeriv {
        deriv,
        eigenvalue,
        ortho_error,
    })
}
