//! Krylov solvers for aeroelastic flutter analysis.
//!
//! This crate provides the two coupled numerical kernels underneath the
//! flutter determinant machinery:
//!
//! - [`Gmres`] - a fixed-subspace, right-preconditioned complex GMRES over
//!   [`dlm_core::ComplexVector`], used standalone and inside the eigensolver's
//!   shift-invert step
//! - [`build_subspace`] - a restarted shift-invert Lanczos with full
//!   M-orthogonal reorthogonalization that produces the [`ReducedBasis`]
//!   (reduced stiffness, modal basis, natural frequencies) consumed by the
//!   flutter root finder
//!
//! The structural collaborator (assembled matrices, factorization, boundary
//! conditions, design sensitivities) is abstracted behind
//! [`StructuralModel`]; [`DenseStructuralModel`] is the in-memory reference
//! implementation used in tests and small standalone analyses.

pub mod gmres;
pub mod lanczos;
pub mod structure;

pub use gmres::Gmres;
pub use lanczos::{BasisKind, ReducedBasis, SubspaceOptions, build_subspace};
pub use structure::{
    DenseStructuralModel, MatrixKind, ShiftedOperator, ShiftedPreconditioner, StructuralModel,
};
