//! Core vector and operator capabilities for aeroelastic flutter analysis.
//!
//! This crate provides:
//! - [`RealVector`] - the abstract real-vector capability the rest of the
//!   pipeline is built on (a finite-element library supplies the production
//!   implementation; [`DenseVector`] is the in-memory reference)
//! - [`ComplexVector`] - a complex vector represented as a real/imaginary
//!   pair, where an absent imaginary part is a first-class state
//! - Operator and preconditioner traits for the Krylov solvers
//! - The shared error taxonomy for the solver stack

pub mod complex;
pub mod error;
pub mod operator;
pub mod vector;

pub use complex::ComplexVector;
pub use error::{Error, Result};
pub use operator::{
    ComplexOperator, ComplexPreconditioner, IdentityPreconditioner, PartwiseOperator,
    PartwisePreconditioner, RealOperator, RealPreconditioner,
};
pub use vector::{DenseVector, RealVector};
