//! # Levenberg-Marquardt Least Squares
//!
//! Minimizes `0.5 * ||r(p)||²` for a residual vector `r` with an analytic
//! Jacobian. Each step solves the damped problem
//!
//! min ||J·δ + r||² + λ·||D·δ||²
//!
//! as an augmented least-squares system through SVD rather than the normal
//! equations, because polynomial-in-power models have columns spanning many
//! orders of magnitude. `D` holds the Jacobian column norms (Marquardt
//! scaling), so damping and the step test are scale invariant.

use nalgebra::{DMatrix, DVector};
use thiserror::Error;
use tracing::{debug, trace};

/// Singular values below this (on the column-scaled system) are dropped
const SVD_EPS: f64 = 1e-13;
const MAX_LAMBDA: f64 = 1e16;
const MIN_LAMBDA: f64 = 1e-20;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum FitError {
    #[error("Least squares did not converge after {iterations} iterations (cost={cost})")]
    NoConvergence { iterations: usize, cost: f64 },

    #[error("Least squares produced a non-finite {0}")]
    NonFinite(&'static str),

    #[error("Dimension mismatch: {observations} observations for {params} parameters")]
    Underdetermined { observations: usize, params: usize },

    #[error("Linear solve failed: {0}")]
    Solve(&'static str),
}

/// A least-squares problem with analytic derivatives
pub trait LeastSquaresProblem {
    fn num_params(&self) -> usize;
    fn num_observations(&self) -> usize;
    /// Model minus observation, one entry per observation
    fn residuals(&self, params: &DVector<f64>) -> DVector<f64>;
    /// ∂residual_i / ∂param_j
    fn jacobian(&self, params: &DVector<f64>) -> DMatrix<f64>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitSolution {
    pub params: DVector<f64>,
    /// 0.5 * sum of squared residuals
    pub cost: f64,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevenbergMarquardt {
    pub max_iterations: usize,
    /// Relative cost reduction below which an accepted step ends the fit
    pub ftol: f64,
    /// Relative scaled step size below which the fit ends
    pub xtol: f64,
    pub initial_lambda: f64,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1e-12,
            xtol: 1e-12,
            initial_lambda: 1e-3,
        }
    }
}

impl LevenbergMarquardt {
    pub fn minimize<P: LeastSquaresProblem>(
        &self,
        problem: &P,
        initial: DVector<f64>,
    ) -> Result<FitSolution, FitError> {
        let n = problem.num_params();
        let m = problem.num_observations();
        if m < n || n == 0 {
            return Err(FitError::Underdetermined {
                observations: m,
                params: n,
            });
        }

        let mut params = initial;
        let mut residuals = problem.residuals(&params);
        let mut cost = half_norm_squared(&residuals);
        if !cost.is_finite() {
            return Err(FitError::NonFinite("initial cost"));
        }
        let mut lambda = self.initial_lambda;

        for iteration in 1..=self.max_iterations {
            let jacobian = problem.jacobian(&params);
            let scale = column_scale(&jacobian);

            loop {
                let step = damped_step(&jacobian, &residuals, &scale, lambda)?;
                let scaled_step = step.component_mul(&scale).norm();
                let scaled_params = params.component_mul(&scale).norm();
                let small_step = scaled_step <= self.xtol * (scaled_params + self.xtol);

                let candidate = &params + &step;
                let candidate_residuals = problem.residuals(&candidate);
                let candidate_cost = half_norm_squared(&candidate_residuals);

                if candidate_cost.is_finite() && candidate_cost < cost {
                    let reduction = (cost - candidate_cost) / cost.max(f64::MIN_POSITIVE);
                    params = candidate;
                    residuals = candidate_residuals;
                    cost = candidate_cost;
                    lambda = (lambda / 10.0).max(MIN_LAMBDA);
                    trace!(iteration, cost, lambda, "accepted step");

                    if reduction <= self.ftol || small_step || cost == 0.0 {
                        debug!(iteration, cost, "least squares converged");
                        return Ok(FitSolution {
                            params,
                            cost,
                            iterations: iteration,
                        });
                    }
                    break;
                }

                if small_step {
                    // Damping has shrunk the step to nothing: at a minimum
                    debug!(iteration, cost, "least squares converged (no improving step)");
                    return Ok(FitSolution {
                        params,
                        cost,
                        iterations: iteration,
                    });
                }

                lambda *= 10.0;
                if lambda > MAX_LAMBDA {
                    return Err(FitError::NoConvergence {
                        iterations: iteration,
                        cost,
                    });
                }
            }
        }

        Err(FitError::NoConvergence {
            iterations: self.max_iterations,
            cost,
        })
    }
}

fn half_norm_squared(v: &DVector<f64>) -> f64 {
    0.5 * v.norm_squared()
}

fn column_scale(jacobian: &DMatrix<f64>) -> DVector<f64> {
    DVector::from_iterator(
        jacobian.ncols(),
        jacobian.column_iter().map(|col| {
            let norm = col.norm();
            if norm > 0.0 {
                norm
            } else {
                1.0
            }
        }),
    )
}

/// Solve `[J·D⁻¹; √λ·I] · (D·δ) = [-r; 0]` and return δ
fn damped_step(
    jacobian: &DMatrix<f64>,
    residuals: &DVector<f64>,
    scale: &DVector<f64>,
    lambda: f64,
) -> Result<DVector<f64>, FitError> {
    let m = jacobian.nrows();
    let n = jacobian.ncols();
    let damping = lambda.sqrt();

    let augmented = DMatrix::from_fn(m + n, n, |i, j| {
        if i < m {
            jacobian[(i, j)] / scale[j]
        } else if i - m == j {
            damping
        } else {
            0.0
        }
    });
    let rhs = DVector::from_fn(m + n, |i, _| if i < m { -residuals[i] } else { 0.0 });

    let scaled_step = augmented
        .svd(true, true)
        .solve(&rhs, SVD_EPS)
        .map_err(FitError::Solve)?;
    let step = scaled_step.component_div(scale);
    if step.iter().all(|v| v.is_finite()) {
        Ok(step)
    } else {
        Err(FitError::NonFinite("step"))
    }
}
