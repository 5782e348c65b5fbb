//! Newton-type driver for `F(x) = 0` over a fixed sparse Jacobian skeleton.
//!
//! The caller establishes the Jacobian's sparsity pattern once, records the
//! flat non-zero indices, and the fill callback refreshes values through
//! [`SparseMatrix::set_at_index`] — O(1) per entry instead of a coordinate
//! search on every iteration. Both the state vector and the Jacobian are
//! exclusively borrowed for the duration of the call and mutated in place.

use faer::prelude::SpSolver;
use faer::{FaerMat, Mat};
use pwf_math::SparseMatrix;
use tracing::debug;

use crate::error::KinsolError;
use crate::params::KinsolParameters;
use crate::status::{KinsolResult, KinsolStatus};

/// Nonlinear solver configured with [`KinsolParameters`].
#[derive(Debug, Clone, Default)]
pub struct Kinsol {
    params: KinsolParameters,
}

impl Kinsol {
    /// Create a solver with default parameters.
    pub fn new() -> Self {
        Self {
            params: KinsolParameters::default(),
        }
    }

    /// Create a solver with explicit parameters.
    pub fn with_params(params: KinsolParameters) -> Self {
        Self { params }
    }

    /// Current parameters.
    pub fn params(&self) -> &KinsolParameters {
        &self.params
    }

    /// Solve `F(x) = 0` starting from the initial guess in `x`.
    ///
    /// `residual` evaluates `F` at the given state into the provided
    /// buffer; `fill_jacobian` repopulates the sparse Jacobian's values at
    /// the current state. On return, `x` holds the final iterate for every
    /// terminal status — converged or best-effort.
    ///
    /// Numerical outcomes come back as the [`KinsolStatus`] inside the
    /// result; only malformed inputs produce an `Err`, and only before the
    /// iteration starts.
    pub fn solve<F, J>(
        &self,
        x: &mut [f64],
        jacobian: &mut SparseMatrix,
        mut residual: F,
        mut fill_jacobian: J,
    ) -> Result<KinsolResult, KinsolError>
    where
        F: FnMut(&[f64], &mut [f64]),
        J: FnMut(&[f64], &mut SparseMatrix),
    {
        let n = x.len();
        if jacobian.rows() != n || jacobian.cols() != n {
            return Err(KinsolError::DimensionMismatch {
                rows: jacobian.rows(),
                cols: jacobian.cols(),
                n,
            });
        }
        self.params.validate()?;

        let fnormtol = self.params.effective_fnormtol();
        let scsteptol = self.params.effective_scsteptol();
        let msbset = self.params.msbset.max(1);
        let msbsetsub = self.params.msbsetsub.max(1);

        let mut f = vec![0.0; n];
        residual(x, &mut f);
        let mut fnorm = inf_norm(&f);
        if fnorm <= fnormtol {
            return Ok(KinsolResult {
                status: KinsolStatus::InitialGuessOk,
                iterations: 0,
            });
        }

        // Force a fill on the first iteration.
        let mut since_refresh = msbset;

        for iteration in 1..=self.params.max_iters {
            if since_refresh >= msbset {
                fill_jacobian(x, jacobian);
                since_refresh = 0;
            }
            since_refresh += 1;

            let step = match newton_step(jacobian, &f) {
                Some(step) => step,
                None => {
                    debug!(iteration, "linear solve failed on singular Jacobian");
                    return Ok(KinsolResult {
                        status: KinsolStatus::LsolveFail,
                        iterations: iteration,
                    });
                }
            };

            for (xi, di) in x.iter_mut().zip(&step) {
                *xi += di;
            }

            residual(x, &mut f);
            let new_fnorm = inf_norm(&f);
            debug!(iteration, fnorm = new_fnorm, "newton iteration");

            if new_fnorm <= fnormtol {
                return Ok(KinsolResult {
                    status: KinsolStatus::Success,
                    iterations: iteration,
                });
            }
            if inf_norm(&step) < scsteptol {
                return Ok(KinsolResult {
                    status: KinsolStatus::StepLtStptol,
                    iterations: iteration,
                });
            }

            // A held Jacobian that no longer reduces the residual is stale;
            // force a refresh once msbsetsub iterations have elapsed.
            if new_fnorm >= fnorm && since_refresh >= msbsetsub {
                since_refresh = msbset;
            }
            fnorm = new_fnorm;
        }

        Ok(KinsolResult {
            status: KinsolStatus::MaxIterReached,
            iterations: self.params.max_iters,
        })
    }
}

/// Solve `J·Δx = −F` with faer's LU decomposition.
///
/// Returns `None` when the solution carries non-finite values, which is
/// how a singular Jacobian surfaces from the factorization.
fn newton_step(jacobian: &SparseMatrix, f: &[f64]) -> Option<Vec<f64>> {
    let n = f.len();

    let mut mat = Mat::zeros(n, n);
    for (row, col, value) in jacobian.entries() {
        mat.write(row, col, value);
    }

    let mut rhs = Mat::zeros(n, 1);
    for (i, &fi) in f.iter().enumerate() {
        rhs.write(i, 0, -fi);
    }

    let lu = mat.partial_piv_lu();
    let solution = lu.solve(&rhs);

    let step: Vec<f64> = (0..n).map(|i| solution.read(i, 0)).collect();
    if step.iter().any(|v| !v.is_finite()) {
        return None;
    }
    Some(step)
}

fn inf_norm(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()))
}
