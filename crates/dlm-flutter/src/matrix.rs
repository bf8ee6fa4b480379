//! Flutter matrix and determinant assembly.

use dlm_core::{Error, RealVector, Result};
use nalgebra::DMatrix;
use num_complex::Complex64 as C64;

use crate::aero::AeroModel;
use crate::basis::FlutterBasis;

/// Assemble the reduced flutter matrix
///
/// `F(p) = p^2*I + Kr - qinf * modes^T * D(p)^-1 * (p*vwash/U + dwash)`
///
/// at the flow condition `(U, Mach)` with dynamic pressure `qinf`. The
/// influence operator is evaluated at the aerodynamic frequency `Im(p)` and
/// solved in its transposed form, per the reciprocal convention of the
/// kernel.
pub fn flutter_matrix<V, A>(
    aero: &mut A,
    basis: &FlutterBasis<V>,
    u: f64,
    p: C64,
    qinf: f64,
    mach: f64,
) -> Result<DMatrix<C64>>
where
    V: RealVector,
    A: AeroModel + ?Sized,
{
    if u <= 0.0 {
        return Err(Error::InvalidInput(format!("non-positive velocity {u}")));
    }
    let nvecs = basis.num_vectors();
    let npanels = basis.vwash.nrows();

    // Reduced structural contribution.
    let mut f = basis.kr.map(|k| C64::new(k, 0.0));
    let p2 = p * p;
    for i in 0..nvecs {
        f[(i, i)] += p2;
    }

    let d = aero.influence(u, p.im, mach)?;
    if d.nrows() != npanels || d.ncols() != npanels {
        return Err(Error::DimensionMismatch {
            expected: npanels,
            actual: d.nrows(),
        });
    }

    // Combined modal boundary condition: -1/U*(dh/dt + U*dh/dx).
    let wash = DMatrix::from_fn(npanels, nvecs, |i, j| {
        p * basis.vwash[(i, j)] / u + basis.dwash[(i, j)]
    });

    // Unknown pressure distribution per basis vector.
    let cp = d
        .transpose()
        .lu()
        .solve(&wash)
        .ok_or(Error::SingularSystem)?;

    // Modal forces from the pressure distribution.
    for i in 0..nvecs {
        let cp_i: Vec<C64> = cp.column(i).iter().copied().collect();
        let forces = aero.pressure_forces(qinf, &cp_i);
        if forces.len() != basis.modes.nrows() {
            return Err(Error::DimensionMismatch {
                expected: basis.modes.nrows(),
                actual: forces.len(),
            });
        }
        for j in 0..nvecs {
            let mut fij = C64::new(0.0, 0.0);
            for (k, fk) in forces.iter().enumerate() {
                fij += *fk * basis.modes[(k, j)];
            }
            f[(j, i)] += fij;
        }
    }

    Ok(f)
}

/// The raw flutter determinant `det F(p)`.
///
/// Root iterations compare raw determinant magnitudes; use
/// [`scaled_flutter_det`] only when reporting.
pub fn flutter_det<V, A>(
    aero: &mut A,
    basis: &FlutterBasis<V>,
    u: f64,
    p: C64,
    qinf: f64,
    mach: f64,
) -> Result<C64>
where
    V: RealVector,
    A: AeroModel + ?Sized,
{
    let f = flutter_matrix(aero, basis, u, p, qinf, mach)?;
    Ok(f.lu().determinant())
}

/// Determinant scaled by `omega^(2*nvecs)` for display. The scaling keeps
/// reported magnitudes near unity; it is not used inside the root search.
pub fn scaled_flutter_det(det: C64, omega: f64, nvecs: usize) -> C64 {
    det / omega.powi(2 * nvecs as i32)
}
