//! Restarted shift-invert Lanczos for the generalized eigenproblem (K, M).
//!
//! The builder approximates the lowest natural frequencies of the structure
//! by running an M-orthogonal Lanczos recurrence on the spectrally shifted
//! operator `(K - sigma*M)^(-1) M`. Full reorthogonalization makes the
//! recurrence equivalent to Arnoldi, but only the tridiagonal coefficients
//! are retained for the Ritz problem. When the requested modes fail the
//! residual bound, the shift is re-centered on the best frequency estimate
//! and the recurrence restarts from the combined Ritz vectors.

use dlm_core::{ComplexVector, Error, PartwiseOperator, PartwisePreconditioner, RealVector, Result};
use nalgebra::{DMatrix, DVector, SymmetricEigen};

use crate::gmres::Gmres;
use crate::structure::{ShiftedOperator, ShiftedPreconditioner, StructuralModel};

/// Which basis the builder returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisKind {
    /// The raw M-orthonormal Lanczos vectors, with a dense Galerkin-projected
    /// reduced stiffness.
    Lanczos,
    /// The Ritz eigenvector basis, with a diagonal reduced stiffness.
    Eigenvector,
}

/// Configuration for [`build_subspace`].
#[derive(Debug, Clone)]
pub struct SubspaceOptions {
    /// Size of the Lanczos subspace (number of vector slots).
    pub subspace_size: usize,
    /// Number of modes that must converge.
    pub num_modes: usize,
    /// Initial estimate of the squared frequency shift.
    pub sigma: f64,
    /// Residual tolerance on the requested modes.
    pub tol: f64,
    /// Maximum number of restart iterations.
    pub max_restarts: usize,
    /// Basis returned to the flutter solver.
    pub basis: BasisKind,
    /// Subspace size of the inner GMRES solves.
    pub gmres_subspace: usize,
}

impl Default for SubspaceOptions {
    fn default() -> Self {
        Self {
            subspace_size: 10,
            num_modes: 4,
            sigma: 0.0,
            tol: 1e-12,
            max_restarts: 5,
            basis: BasisKind::Eigenvector,
            gmres_subspace: 10,
        }
    }
}

/// The reduced structural model produced by the Lanczos builder.
///
/// Built once per analysis and read-only for the lifetime of a velocity
/// sweep.
pub struct ReducedBasis<V> {
    /// Basis vectors: either the Lanczos vectors or the Ritz eigenvectors.
    pub qm: Vec<V>,
    /// Reduced stiffness matrix over `qm`.
    pub kr: DMatrix<f64>,
    /// Natural frequencies of the converged modes, ascending.
    pub omega: Vec<f64>,
    /// Tridiagonal diagonal coefficients from the final Lanczos pass.
    pub alpha: Vec<f64>,
    /// Tridiagonal sub-diagonal coefficients; the last entry is the
    /// residual coefficient used in the convergence bound.
    pub beta: Vec<f64>,
    /// Whether all requested modes met the residual tolerance.
    pub converged: bool,
    /// Number of restart iterations performed.
    pub restarts: usize,
}

impl<V> ReducedBasis<V> {
    /// Number of basis vectors.
    pub fn num_vectors(&self) -> usize {
        self.qm.len()
    }
}

/// Outcome of one Lanczos pass.
struct LanczosPass {
    alpha: Vec<f64>,
    beta: Vec<f64>,
    /// Completed recurrence steps (tridiagonal dimension).
    steps: usize,
    /// Valid M-orthonormal vectors in the arena.
    valid_vectors: usize,
}

/// Build the reduced flutter basis for a structural model.
///
/// Non-convergence within the restart cap is reported through the
/// `converged` flag (and a warning log) while the best available basis is
/// still returned; callers decide whether to proceed.
pub fn build_subspace<S: StructuralModel>(
    model: &mut S,
    opts: &SubspaceOptions,
) -> Result<ReducedBasis<S::Vector>> {
    let m = opts.subspace_size;
    let r = opts.num_modes;
    if m < 2 {
        return Err(Error::InvalidInput(
            "subspace size must be at least 2".into(),
        ));
    }
    if r == 0 || r > m - 1 {
        return Err(Error::InvalidInput(format!(
            "requested {r} modes from a subspace of size {m}"
        )));
    }
    if opts.max_restarts == 0 {
        return Err(Error::InvalidInput(
            "at least one restart iteration is required".into(),
        ));
    }

    // Fixed-capacity arena of subspace vectors, owned by the builder.
    let mut vm: Vec<S::Vector> = (0..m).map(|_| model.create_vector()).collect();
    let mut temp = model.create_vector();
    let mut gmres = Gmres::new(opts.gmres_subspace, || model.create_vector());

    vm[0].set_rand(-1.0, 1.0);

    let mut sigma = opts.sigma;
    let mut converged = false;
    let mut restarts = 0;
    let mut pass = None;
    let mut ritz: Option<(Vec<f64>, Vec<usize>, DMatrix<f64>)> = None;

    for iter in 0..opts.max_restarts {
        restarts = iter + 1;
        let p = lanczos_pass(model, &mut vm, &mut temp, &mut gmres, sigma)?;
        let s = p.steps;
        if s < r {
            return Err(Error::Breakdown {
                step: s,
                reason: "invariant subspace smaller than the requested mode count",
            });
        }

        // Ritz problem on the symmetric tridiagonal (alpha, beta).
        let mut t = DMatrix::zeros(s, s);
        for j in 0..s {
            t[(j, j)] = p.alpha[j];
            if j + 1 < s {
                t[(j + 1, j)] = p.beta[j];
                t[(j, j + 1)] = p.beta[j];
            }
        }
        let eig = SymmetricEigen::new(t);

        // Shift-invert mapping: theta = 1/(lambda - sigma), omega = sqrt(lambda).
        let omega: Vec<f64> = eig
            .eigenvalues
            .iter()
            .map(|&theta| {
                let lambda = 1.0 / theta + sigma;
                if theta.abs() > 0.0 && lambda > 0.0 {
                    lambda.sqrt()
                } else {
                    f64::INFINITY
                }
            })
            .collect();

        let mut order: Vec<usize> = (0..s).collect();
        order.sort_by(|&a, &b| omega[a].total_cmp(&omega[b]));

        // Residual bound on the r lowest modes.
        let b_last = p.beta[s - 1];
        let all_converged = order[..r]
            .iter()
            .all(|&k| (b_last * eig.eigenvectors[(s - 1, k)]).abs() <= opts.tol);

        log::debug!(
            "Lanczos restart {iter}: sigma = {sigma:.6e}, omega[0] = {:.6e}, converged = {all_converged}",
            omega[order[0]]
        );

        if all_converged {
            converged = true;
            ritz = Some((omega, order, eig.eigenvectors));
            pass = Some(p);
            break;
        }

        ritz = Some((omega.clone(), order.clone(), eig.eigenvectors.clone()));
        pass = Some(p);

        if iter + 1 == opts.max_restarts {
            break;
        }

        // Re-center the shift on the best current frequency estimate and
        // restart from the combined Ritz vectors of the requested modes.
        sigma = 0.95 * omega[order[0]] * omega[order[0]];

        let mut weights = vec![0.0; s];
        for &k in &order[..r] {
            for (j, w) in weights.iter_mut().enumerate() {
                *w += eig.eigenvectors[(j, k)];
            }
        }
        temp.zero_entries();
        for (j, &w) in weights.iter().enumerate() {
            temp.axpy(w, &vm[j]);
        }
        vm[0].copy_values(&temp);
        vm[0].apply_bcs();
    }

    let pass = pass.expect("at least one Lanczos pass");
    let (omega, order, eigvecs) = ritz.expect("at least one Ritz solve");
    let s = pass.steps;

    if !converged {
        log::warn!(
            "Lanczos subspace did not converge after {restarts} restarts; returning the best available basis"
        );
    }

    let omega_out: Vec<f64> = order[..r].iter().map(|&k| omega[k]).collect();
    log::info!("natural frequencies: {omega_out:?}");

    let (qm, kr) = match opts.basis {
        BasisKind::Eigenvector => {
            // Rotate the Lanczos vectors into the Ritz eigenvector basis,
            // renormalized so the basis stays M-orthonormal.
            let mut qm = Vec::with_capacity(r);
            for &k in &order[..r] {
                let col = eigvecs.column(k);
                let nrm = col.norm();
                let mut q = model.create_vector();
                for j in 0..s {
                    q.axpy(col[j] / nrm, &vm[j]);
                }
                qm.push(q);
            }
            let kr = DMatrix::from_diagonal(&DVector::from_iterator(
                r,
                omega_out.iter().map(|w| w * w),
            ));
            (qm, kr)
        }
        BasisKind::Lanczos => {
            // Keep the raw Lanczos vectors; the reduced stiffness is the
            // dense Galerkin projection, recomputed through operator
            // applications rather than reused from the tridiagonal.
            let n = pass.valid_vectors;
            vm.truncate(n);
            let mut kr = DMatrix::zeros(n, n);
            for i in 0..n {
                model.stiffness_mult(&vm[i], &mut temp);
                for j in 0..=i {
                    let kij = vm[j].dot(&temp);
                    kr[(i, j)] = kij;
                    kr[(j, i)] = kij;
                }
            }
            (vm, kr)
        }
    };

    Ok(ReducedBasis {
        qm,
        kr,
        omega: omega_out,
        alpha: pass.alpha,
        beta: pass.beta,
        converged,
        restarts,
    })
}

/// One M-orthogonal Lanczos pass with full reorthogonalization.
fn lanczos_pass<S: StructuralModel>(
    model: &mut S,
    vm: &mut [S::Vector],
    temp: &mut S::Vector,
    gmres: &mut Gmres<S::Vector>,
    sigma: f64,
) -> Result<LanczosPass> {
    let m = vm.len();
    let mut alpha = vec![0.0; m - 1];
    let mut beta = vec![0.0; m - 1];

    // Factor K - sigma*M once per pass.
    model.factor_shifted(sigma)?;

    // The seed must satisfy the boundary conditions and have unit M-norm.
    vm[0].apply_bcs();
    model.mass_mult(&vm[0], temp);
    let b0 = vm[0].dot(temp).sqrt();
    if b0 < 1e-30 {
        return Err(Error::Breakdown {
            step: 0,
            reason: "seed vector has zero mass norm",
        });
    }
    vm[0].scale(1.0 / b0);

    let mut rhs = ComplexVector::real_only(model.create_vector());
    let mut sol = ComplexVector::pair(model.create_vector(), model.create_vector());

    let mut steps = 0;
    let mut valid_vectors = 1;
    for i in 0..m - 1 {
        // V[i+1] = (K - sigma*M)^(-1) * M * V[i] via the Krylov solver.
        model.mass_mult(&vm[i], rhs.real_mut());
        {
            let op = ShiftedOperator(&*model);
            let pc = ShiftedPreconditioner(&*model);
            gmres.solve(
                &PartwiseOperator::new(&op),
                &PartwisePreconditioner::new(&pc),
                &rhs,
                &mut sol,
            )?;
        }

        let (head, tail) = vm.split_at_mut(i + 1);
        let vnext = &mut tail[0];
        vnext.copy_values(sol.real());
        vnext.apply_bcs();

        // M-norm before orthogonalization, for the breakdown test.
        model.mass_mult(vnext, temp);
        let raw_norm = vnext.dot(temp).sqrt();

        // Full modified Gram-Schmidt under the M-inner-product.
        for j in (0..=i).rev() {
            model.mass_mult(vnext, temp);
            let h = head[j].dot(temp);
            vnext.axpy(-h, &head[j]);
            if j == i {
                alpha[i] = h;
            }
        }

        model.mass_mult(vnext, temp);
        beta[i] = vnext.dot(temp).sqrt();
        steps = i + 1;

        // An invariant subspace: the residual coefficient is exactly the
        // convergence bound, so stop rather than normalize noise.
        if beta[i] <= 1e-12 * raw_norm.max(1e-30) {
            beta[i] = 0.0;
            break;
        }
        vnext.scale(1.0 / beta[i]);
        valid_vectors = i + 2;
    }

    alpha.truncate(steps);
    beta.truncate(steps);
    Ok(LanczosPass {
        alpha,
        beta,
        steps,
        valid_vectors,
    })
}
