//! The structural collaborator interface.
//!
//! A production analysis binds this to a distributed finite-element library:
//! matrix assembly, the factorization of the shifted operator, and the design
//! sensitivities all happen on the other side of this trait, one blocking
//! call at a time. [`DenseStructuralModel`] implements the same capability
//! set over dense in-memory matrices.

use dlm_core::vector::DenseVector;
use dlm_core::{RealOperator, RealPreconditioner, RealVector, Result};
use nalgebra::{DMatrix, DVector};

/// Which assembled structural matrix an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixKind {
    Stiffness,
    Mass,
}

/// Capabilities the eigensolver and the sensitivity analysis require from
/// the structural model.
pub trait StructuralModel {
    /// The vector type owned by this model.
    type Vector: RealVector;

    /// Number of structural degrees of freedom.
    fn num_dof(&self) -> usize;

    /// Allocate a zeroed vector compatible with this model.
    fn create_vector(&self) -> Self::Vector;

    /// Matrix-vector product with the assembled stiffness or mass matrix.
    fn mult(&self, kind: MatrixKind, x: &Self::Vector, y: &mut Self::Vector);

    /// Form `K - sigma*M` and factor the preconditioner for it.
    fn factor_shifted(&mut self, sigma: f64) -> Result<()>;

    /// Matrix-vector product with the shifted operator `K - sigma*M`.
    ///
    /// Only valid after [`StructuralModel::factor_shifted`].
    fn shifted_mult(&self, x: &Self::Vector, y: &mut Self::Vector);

    /// Apply the preconditioner for the shifted operator.
    ///
    /// Only valid after [`StructuralModel::factor_shifted`].
    fn apply_shifted_pc(&self, x: &Self::Vector, y: &mut Self::Vector);

    /// Number of design variables carried by the model.
    fn num_design_vars(&self) -> usize;

    /// Inner products `scale * left^T * dA/dx_j * right` over all design
    /// variables, where `A` is the selected matrix.
    fn eval_mat_dv_sens_inner_product(
        &self,
        kind: MatrixKind,
        scale: f64,
        left: &Self::Vector,
        right: &Self::Vector,
    ) -> Vec<f64>;

    /// Mass matrix-vector product.
    fn mass_mult(&self, x: &Self::Vector, y: &mut Self::Vector) {
        self.mult(MatrixKind::Mass, x, y);
    }

    /// Stiffness matrix-vector product.
    fn stiffness_mult(&self, x: &Self::Vector, y: &mut Self::Vector) {
        self.mult(MatrixKind::Stiffness, x, y);
    }
}

/// Adapter exposing a model's shifted operator as a [`RealOperator`].
pub struct ShiftedOperator<'a, S: StructuralModel>(pub &'a S);

impl<S: StructuralModel> RealOperator<S::Vector> for ShiftedOperator<'_, S> {
    fn mult(&self, x: &S::Vector, y: &mut S::Vector) {
        self.0.shifted_mult(x, y);
    }
}

/// Adapter exposing a model's shifted preconditioner as a
/// [`RealPreconditioner`].
pub struct ShiftedPreconditioner<'a, S: StructuralModel>(pub &'a S);

impl<S: StructuralModel> RealPreconditioner<S::Vector> for ShiftedPreconditioner<'_, S> {
    fn apply(&self, x: &S::Vector, y: &mut S::Vector) {
        self.0.apply_shifted_pc(x, y);
    }
}

/// Dense reference implementation of the structural collaborator.
///
/// Holds explicit stiffness and mass matrices, enforces essential boundary
/// conditions by identity rows/columns, and preconditions the shifted
/// operator with its Jacobi (diagonal) inverse. Optional per-design-variable
/// derivative matrices back the sensitivity inner products.
pub struct DenseStructuralModel {
    stiffness: DMatrix<f64>,
    mass: DMatrix<f64>,
    fixed_dofs: Vec<usize>,
    shifted: Option<DMatrix<f64>>,
    pc_inv_diag: Vec<f64>,
    dstiffness: Vec<DMatrix<f64>>,
    dmass: Vec<DMatrix<f64>>,
}

impl DenseStructuralModel {
    /// Create a model from explicit stiffness and mass matrices.
    pub fn new(stiffness: DMatrix<f64>, mass: DMatrix<f64>) -> Self {
        assert_eq!(stiffness.nrows(), stiffness.ncols(), "dimension mismatch");
        assert_eq!(stiffness.nrows(), mass.nrows(), "dimension mismatch");
        assert_eq!(mass.nrows(), mass.ncols(), "dimension mismatch");
        Self {
            stiffness,
            mass,
            fixed_dofs: Vec::new(),
            shifted: None,
            pc_inv_diag: Vec::new(),
            dstiffness: Vec::new(),
            dmass: Vec::new(),
        }
    }

    /// Constrain a set of DOFs to zero.
    pub fn with_fixed_dofs(mut self, fixed_dofs: Vec<usize>) -> Self {
        self.fixed_dofs = fixed_dofs;
        self
    }

    /// Attach design-variable derivative matrices for the sensitivity
    /// inner products. Both lists must have the same length.
    pub fn with_design_derivatives(
        mut self,
        dstiffness: Vec<DMatrix<f64>>,
        dmass: Vec<DMatrix<f64>>,
    ) -> Self {
        assert_eq!(dstiffness.len(), dmass.len(), "dimension mismatch");
        self.dstiffness = dstiffness;
        self.dmass = dmass;
        self
    }

    fn dense_mult(mat: &DMatrix<f64>, x: &DenseVector, y: &mut DenseVector) {
        let xv = DVector::from_column_slice(x.as_slice());
        let yv = mat * xv;
        y.as_mut_slice().copy_from_slice(yv.as_slice());
    }
}

impl StructuralModel for DenseStructuralModel {
    type Vector = DenseVector;

    fn num_dof(&self) -> usize {
        self.stiffness.nrows()
    }

    fn create_vector(&self) -> DenseVector {
        DenseVector::new(self.num_dof()).with_fixed_dofs(self.fixed_dofs.clone())
    }

    fn mult(&self, kind: MatrixKind, x: &DenseVector, y: &mut DenseVector) {
        let mat = match kind {
            MatrixKind::Stiffness => &self.stiffness,
            MatrixKind::Mass => &self.mass,
        };
        Self::dense_mult(mat, x, y);
    }

    fn factor_shifted(&mut self, sigma: f64) -> Result<()> {
        let mut shifted = &self.stiffness - sigma * &self.mass;

        // Constrained DOFs become identity rows/columns.
        for &d in &self.fixed_dofs {
            let n = shifted.nrows();
            for j in 0..n {
                shifted[(d, j)] = 0.0;
                shifted[(j, d)] = 0.0;
            }
            shifted[(d, d)] = 1.0;
        }

        // Jacobi preconditioner; near-zero diagonal entries are left
        // unscaled.
        self.pc_inv_diag = (0..shifted.nrows())
            .map(|i| {
                let d = shifted[(i, i)];
                if d.abs() < 1e-30 { 1.0 } else { 1.0 / d }
            })
            .collect();

        self.shifted = Some(shifted);
        Ok(())
    }

    fn shifted_mult(&self, x: &DenseVector, y: &mut DenseVector) {
        let shifted = self
            .shifted
            .as_ref()
            .expect("factor_shifted must be called first");
        Self::dense_mult(shifted, x, y);
    }

    fn apply_shifted_pc(&self, x: &DenseVector, y: &mut DenseVector) {
        assert_eq!(x.dim(), self.pc_inv_diag.len(), "dimension mismatch");
        for (i, (&xi, &inv_di)) in x
            .as_slice()
            .iter()
            .zip(self.pc_inv_diag.iter())
            .enumerate()
        {
            y.as_mut_slice()[i] = xi * inv_di;
        }
    }

    fn num_design_vars(&self) -> usize {
        self.dstiffness.len()
    }

    fn eval_mat_dv_sens_inner_product(
        &self,
        kind: MatrixKind,
        scale: f64,
        left: &DenseVector,
        right: &DenseVector,
    ) -> Vec<f64> {
        let mats = match kind {
            MatrixKind::Stiffness => &self.dstiffness,
            MatrixKind::Mass => &self.dmass,
        };
        let rv = DVector::from_column_slice(right.as_slice());
        let lv = DVector::from_column_slice(left.as_slice());
        mats.iter().map(|da| scale * lv.dot(&(da * &rv))).collect()
    }
}
