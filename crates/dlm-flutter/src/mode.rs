//! Single-point flutter root search.

use dlm_core::{Error, RealVector, Result};
use num_complex::Complex64 as C64;

use crate::aero::AeroModel;
use crate::basis::FlutterBasis;
use crate::matrix::flutter_det;
use crate::secant::{SecantResult, secant_search};

/// Flow condition and iteration controls for the root search.
#[derive(Debug, Clone)]
pub struct FlutterConfig {
    /// Air density.
    pub rho: f64,
    /// Mach number.
    pub mach: f64,
    /// Relative determinant tolerance.
    pub tol: f64,
    /// Iteration cap for the secant search.
    pub max_iters: usize,
}

impl Default for FlutterConfig {
    fn default() -> Self {
        Self {
            rho: 1.225,
            mach: 0.0,
            tol: 1e-12,
            max_iters: 50,
        }
    }
}

impl FlutterConfig {
    /// Dynamic pressure at velocity `u`.
    pub fn dynamic_pressure(&self, u: f64) -> f64 {
        0.5 * self.rho * u * u
    }
}

/// Find the aeroelastic eigenvalue of mode `kmode` at velocity `u`.
///
/// With no initial estimate the search seeds from the mode's natural
/// frequency with a damped real part; otherwise it perturbs `pinit` by a
/// small imaginary offset to form the second seed.
pub fn flutter_mode<V, A>(
    aero: &mut A,
    basis: &FlutterBasis<V>,
    config: &FlutterConfig,
    u: f64,
    kmode: usize,
    pinit: Option<C64>,
) -> Result<SecantResult>
where
    V: RealVector,
    A: AeroModel + ?Sized,
{
    if kmode >= basis.omega.len() {
        return Err(Error::InvalidInput(format!(
            "mode {kmode} out of range for a basis with {} modes",
            basis.omega.len()
        )));
    }

    let (p1, p2) = match pinit {
        None => {
            let omega = basis.omega[kmode];
            (C64::new(-1.0, omega), C64::new(-1.0, omega + 1e-3))
        }
        Some(p) => (p, p + C64::new(0.0, 1e-3)),
    };

    let qinf = config.dynamic_pressure(u);
    let result = secant_search(
        |p| flutter_det(aero, basis, u, p, qinf, config.mach),
        p1,
        p2,
        config.tol,
        config.max_iters,
    )?;

    log::debug!(
        "mode {kmode} at U = {u:.3}: p = {:.6} + {:.6}i in {} iterations",
        result.root.re,
        result.root.im,
        result.iterations
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{exact_plate_root, plate_basis};

    #[test]
    fn converges_to_the_damped_plate_roots() {
        let (_model, basis, mut aero) = plate_basis(&[1.0, 4.0]);
        let config = FlutterConfig {
            rho: 0.1,
            ..Default::default()
        };
        let u = 10.0;
        let qinf = config.dynamic_pressure(u);

        for kmode in 0..2 {
            let result = flutter_mode(&mut aero, &basis, &config, u, kmode, None).unwrap();
            let exact = exact_plate_root(basis.omega[kmode], qinf, u);
            assert!(
                (result.root - exact).norm() < 1e-6,
                "mode {kmode}: got {}, expected {exact}",
                result.root
            );
        }
    }

    #[test]
    fn initial_estimate_seeds_the_search() {
        let (_model, basis, mut aero) = plate_basis(&[1.0, 4.0]);
        let config = FlutterConfig {
            rho: 0.1,
            ..Default::default()
        };
        let u = 10.0;
        let exact = exact_plate_root(basis.omega[1], config.dynamic_pressure(u), u);

        let result = flutter_mode(
            &mut aero,
            &basis,
            &config,
            u,
            1,
            Some(exact + C64::new(0.01, 0.01)),
        )
        .unwrap();
        assert!((result.root - exact).norm() < 1e-6);
    }

    #[test]
    fn mode_out_of_range_is_invalid() {
        let (_model, basis, mut aero) = plate_basis(&[1.0]);
        let config = FlutterConfig::default();
        let err = flutter_mode(&mut aero, &basis, &config, 10.0, 5, None).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
