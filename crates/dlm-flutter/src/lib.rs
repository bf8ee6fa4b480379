//! Flutter determinant analysis over a reduced structural basis.
//!
//! Given a reduced basis from `dlm-solver` and external aerodynamic and
//! load-transfer collaborators, this crate assembles the reduced flutter
//! matrix
//!
//! `F(p) = p^2*I + Kr - qinf * modes^T * D(p)^-1 * (p*vwash/U + dwash)`
//!
//! and finds its complex roots p, whose real part is the modal damping rate
//! and imaginary part the modal frequency. The top-level entry points:
//!
//! - [`flutter_mode`] - secant root search at one flow condition
//! - [`velocity_sweep`] - sweep over increasing velocities with
//!   extrapolated seeding and per-point failure isolation
//! - [`frozen_deriv`] - first-order design sensitivities of a converged
//!   root with the aerodynamic operator held frozen

pub mod aero;
pub mod basis;
pub mod deriv;
pub mod matrix;
pub mod mode;
pub mod report;
pub mod secant;
pub mod sweep;

pub use aero::{AeroModel, ModeTransfer};
pub use basis::FlutterBasis;
pub use deriv::{FrozenDeriv, frozen_deriv};
pub use matrix::{flutter_det, flutter_matrix, scaled_flutter_det};
pub use mode::{FlutterConfig, flutter_mode};
pub use report::write_report;
pub use secant::{SecantResult, secant_search};
pub use sweep::{FlutterOnset, VelocitySweepResult, velocity_sweep};
