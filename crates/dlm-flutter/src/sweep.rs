//! Velocity sweeps over the flutter determinant.
//!
//! Each (mode, velocity) point runs an independent secant search, seeded by
//! polynomial extrapolation of the most recently converged roots for that
//! mode. A point that fails to converge is recorded as missing and the sweep
//! moves on; downstream seeding skips the gap.

use dlm_core::{Error, RealVector, Result};
use num_complex::Complex64 as C64;

use crate::aero::AeroModel;
use crate::basis::FlutterBasis;
use crate::matrix::flutter_det;
use crate::mode::FlutterConfig;
use crate::secant::secant_search;

/// Offset applied to the extrapolated seed to form the second secant point.
const SEED_OFFSET: C64 = C64::new(1e-3, 1e-3);

/// Roots of a velocity sweep, indexed `[mode][velocity]`.
///
/// `None` marks a point whose root search did not converge.
pub struct VelocitySweepResult {
    pub velocities: Vec<f64>,
    pub roots: Vec<Vec<Option<C64>>>,
}

/// The flutter onset point of one mode: where `Re(p)` crosses zero.
#[derive(Debug, Clone, Copy)]
pub struct FlutterOnset {
    /// Onset velocity, linearly interpolated between the bracketing samples.
    pub velocity: f64,
    /// Circular frequency at onset, interpolated like the velocity.
    pub frequency: f64,
    /// Index of the first sample with non-negative damping.
    pub index: usize,
}

impl VelocitySweepResult {
    /// Number of swept modes.
    pub fn num_modes(&self) -> usize {
        self.roots.len()
    }

    /// Locate the flutter onset for one mode: the first consecutive pair of
    /// converged roots whose damping `Re(p)` changes from negative to
    /// non-negative.
    pub fn flutter_onset(&self, mode: usize) -> Option<FlutterOnset> {
        let roots = self.roots.get(mode)?;
        for i in 1..roots.len() {
            let (Some(a), Some(b)) = (roots[i - 1], roots[i]) else {
                continue;
            };
            if a.re < 0.0 && b.re >= 0.0 {
                // Linear interpolation of the zero crossing in Re(p).
                let t = -a.re / (b.re - a.re);
                let velocity =
                    self.velocities[i - 1] + t * (self.velocities[i] - self.velocities[i - 1]);
                let frequency = a.im + t * (b.im - a.im);
                return Some(FlutterOnset {
                    velocity,
                    frequency,
                    index: i,
                });
            }
        }
        None
    }
}

/// Seed the secant pair from the converged history of one mode.
///
/// No history: start at the natural frequency with light damping. One
/// point: restart from it. Two points: linear extrapolation. Three or more:
/// cubic extrapolation.
fn extrapolate_seed(history: &[C64], omega: f64) -> C64 {
    match history {
        [] => C64::new(-0.1, omega),
        [a] => *a,
        [a, b] => 2.0 * *b - *a,
        [.., a, b, c] => 3.0 * *c - 3.0 * *b + *a,
    }
}

/// Sweep the flutter determinant over increasing velocities for the lowest
/// `num_modes` modes.
///
/// Velocities must be positive and strictly increasing. Non-convergent
/// points are logged and recorded as `None`; the sweep never aborts on them.
pub fn velocity_sweep<V, A>(
    aero: &mut A,
    basis: &FlutterBasis<V>,
    config: &FlutterConfig,
    velocities: &[f64],
    num_modes: usize,
) -> Result<VelocitySweepResult>
where
    V: RealVector,
    A: AeroModel + ?Sized,
{
    if velocities.is_empty() {
        return Err(Error::InvalidInput("empty velocity list".into()));
    }
    if !velocities.windows(2).all(|w| w[0] < w[1]) || velocities[0] <= 0.0 {
        return Err(Error::InvalidInput(
            "velocities must be positive and strictly increasing".into(),
        ));
    }
    if num_modes > basis.omega.len() {
        return Err(Error::InvalidInput(format!(
            "requested {num_modes} modes from a basis with {}",
            basis.omega.len()
        )));
    }

    let mut roots = vec![vec![None; velocities.len()]; num_modes];

    for kmode in 0..num_modes {
        let mut history: Vec<C64> = Vec::new();

        for (i, &u) in velocities.iter().enumerate() {
            let qinf = config.dynamic_pressure(u);
            let p1 = extrapolate_seed(&history, basis.omega[kmode]);
            let p2 = p1 + SEED_OFFSET;

            let result = secant_search(
                |p| flutter_det(aero, basis, u, p, qinf, config.mach),
                p1,
                p2,
                config.tol,
                config.max_iters,
            );

            match result {
                Ok(r) => {
                    log::debug!(
                        "mode {kmode}, U = {u:.3}: p = {:.6} + {:.6}i",
                        r.root.re,
                        r.root.im
                    );
                    roots[kmode][i] = Some(r.root);
                    history.push(r.root);
                }
                Err(err) => {
                    log::warn!("mode {kmode}, U = {u:.3}: root search failed ({err}); skipping");
                }
            }
        }
    }

    Ok(VelocitySweepResult {
        velocities: velocities.to_vec(),
        roots,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{exact_plate_root, plate_basis};

    #[test]
    fn sweep_tracks_the_damped_roots() {
        let (_model, basis, mut aero) = plate_basis(&[1.0, 4.0]);
        let config = FlutterConfig {
            rho: 0.1,
            ..Default::default()
        };
        let velocities = [5.0, 10.0, 15.0, 20.0];

        let result = velocity_sweep(&mut aero, &basis, &config, &velocities, 2).unwrap();
        assert_eq!(result.num_modes(), 2);

        for kmode in 0..2 {
            for (i, &u) in velocities.iter().enumerate() {
                let root = result.roots[kmode][i].expect("converged point");
                let exact = exact_plate_root(basis.omega[kmode], config.dynamic_pressure(u), u);
                assert!(
                    (root - exact).norm() < 1e-6,
                    "mode {kmode}, U = {u}: got {root}, expected {exact}"
                );
            }
            // All roots are damped, so no onset exists.
            assert!(result.flutter_onset(kmode).is_none());
        }
    }

    #[test]
    fn failed_point_does_not_abort_the_sweep() {
        let (_model, basis, mut aero) = plate_basis(&[1.0]);
        aero.fail_at_velocity = Some(10.0);
        let config = FlutterConfig {
            rho: 0.1,
            ..Default::default()
        };

        let result = velocity_sweep(&mut aero, &basis, &config, &[5.0, 10.0, 15.0], 1).unwrap();
        assert!(result.roots[0][0].is_some());
        assert!(result.roots[0][1].is_none());
        assert!(result.roots[0][2].is_some());
    }

    #[test]
    fn rejects_bad_velocity_lists() {
        let (_model, basis, mut aero) = plate_basis(&[1.0]);
        let config = FlutterConfig::default();

        assert!(matches!(
            velocity_sweep(&mut aero, &basis, &config, &[], 1),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            velocity_sweep(&mut aero, &basis, &config, &[10.0, 5.0], 1),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            velocity_sweep(&mut aero, &basis, &config, &[5.0, 10.0], 3),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn seed_extrapolation_ladder() {
        let omega = 3.0;
        assert_eq!(extrapolate_seed(&[], omega), C64::new(-0.1, 3.0));

        let a = C64::new(-0.2, 3.1);
        assert_eq!(extrapolate_seed(&[a], omega), a);

        let b = C64::new(-0.1, 3.2);
        assert_eq!(extrapolate_seed(&[a, b], omega), 2.0 * b - a);

        let c = C64::new(0.0, 3.3);
        assert_eq!(
            extrapolate_seed(&[a, b, c], omega),
            3.0 * c - 3.0 * b + a
        );
        // Older history beyond three points is ignored.
        let d = C64::new(0.1, 3.4);
        assert_eq!(
            extrapolate_seed(&[a, b, c, d], omega),
            3.0 * d - 3.0 * c + b
        );
    }

    #[test]
    fn onset_interpolates_the_sign_change() {
        let result = VelocitySweepResult {
            velocities: vec![10.0, 20.0, 30.0, 40.0],
            roots: vec![vec![
                Some(C64::new(-0.4, 5.0)),
                Some(C64::new(-0.1, 5.2)),
                Some(C64::new(0.1, 5.4)),
                Some(C64::new(0.3, 5.5)),
            ]],
        };

        let onset = result.flutter_onset(0).unwrap();
        assert_eq!(onset.index, 2);
        assert!((onset.velocity - 25.0).abs() < 1e-12);
        assert!((onset.frequency - 5.3).abs() < 1e-12);
    }

    #[test]
    fn onset_skips_missing_points() {
        let result = VelocitySweepResult {
            velocities: vec![10.0, 20.0, 30.0],
            roots: vec![vec![
                Some(C64::new(-0.4, 5.0)),
                None,
                Some(C64::new(0.2, 5.4)),
            ]],
        };
        // No consecutive converged pair brackets the crossing.
        assert!(result.flutter_onset(0).is_none());
    }

    #[test]
    fn stable_mode_has_no_onset() {
        let result = VelocitySweepResult {
            velocities: vec![10.0, 20.0],
            roots: vec![vec![Some(C64::new(-0.4, 5.0)), Some(C64::new(-0.3, 5.1))]],
        };
        assert!(result.flutter_onset(0).is_none());
    }
}
