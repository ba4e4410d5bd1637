//! Iterative solvers for linear systems and nonlinear least squares.
//!
//! # Linear systems
//!
//! - [`solve_cg`]: conjugate gradient, for symmetric positive-definite `A`
//! - [`solve_bicgstab`]: biconjugate gradient stabilized, for general `A`
//!
//! Both run against any [`LinearOperator`](crate::LinearOperator) and update
//! a caller-owned solution vector in place, starting from its current value.
//!
//! # Nonlinear least squares
//!
//! - [`levenberg_marquardt`]: damped normal equations with gain-ratio control
//! - [`dog_leg`]: Powell's dog-leg trust region
//!
//! Both consume a [`SparseProblem`] and solve their inner linear systems with
//! BiCGStab.
//!
//! # Monitoring and cancellation
//!
//! Every solver has a `*_with_monitor` variant taking `FnMut(usize, T) -> bool`.
//! The linear solvers call it once per iteration with `‖r‖² / N`; the
//! nonlinear solvers call it with the current cost `‖e‖²` at the start of each
//! outer iteration and again after every rejected step. Returning `false`
//! stops the solve with [`Termination::Cancelled`].
//!
//! Non-convergence is never an error: check [`Termination`] in the returned
//! report. Only shape problems produce `Err`.

mod bicgstab;
mod cg;
mod dog_leg;
mod levenberg_marquardt;
mod problem;


pub use bicgstab::{solve_bicgstab, solve_bicgstab_with_monitor, BiCgStabSettings};
pub use cg::{solve_cg, solve_cg_with_monitor, CgSettings};
pub use dog_leg::{dog_leg, dog_leg_with_monitor, DogLegSettings};
pub use levenberg_marquardt::{levenberg_marquardt, levenberg_marquardt_with_monitor, LmSettings};
pub use problem::SparseProblem;

use alloc::vec::Vec;

use tracing::warn;

use crate::error::{NumError, NumResult, Shape};
use crate::traits::{FloatScalar, LinearOperator};
use crate::{SparseMatrix, Vector};

/// Why a solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Residual dropped below the tolerance.
    Converged,
    /// Gradient infinity-norm dropped below the tolerance.
    GradientTolerance,
    /// Step size (or trust radius) collapsed relative to the parameters.
    StepTolerance,
    /// Iteration cap reached.
    MaxIterations,
    /// The monitor callback returned `false`.
    Cancelled,
}

/// Outcome of a linear solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearReport<T> {
    /// Iterations performed.
    pub iterations: usize,
    /// Final `‖b - Ax‖² / N`.
    pub residual: T,
    /// Stop reason.
    pub termination: Termination,
}

impl<T: FloatScalar> LinearReport<T> {
    pub(crate) fn from_wide(iterations: usize, residual: f64, termination: Termination) -> Self {
        Self {
            iterations,
            residual: T::from_wide(residual),
            termination,
        }
    }
}

/// One trial step of a nonlinear solver, accepted or not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord<T> {
    /// Outer iteration the step belongs to.
    pub iteration: usize,
    /// Cost `‖e‖²` at the trial point.
    pub cost: T,
    /// `‖δ‖`.
    pub step_norm: T,
    /// Trust radius (Dog-Leg) or damping `μ` (Levenberg-Marquardt) in
    /// effect when the step was computed.
    pub radius: T,
    /// Whether the parameters moved.
    pub accepted: bool,
    /// Actual over predicted cost reduction.
    pub gain_ratio: T,
}

/// Outcome of a nonlinear least-squares solve.
#[derive(Debug, Clone, PartialEq)]
pub struct NonlinearReport<T> {
    /// Outer iterations performed.
    pub iterations: usize,
    /// Final cost `‖e‖²`.
    pub cost: T,
    /// Final `‖Jᵀe‖∞`.
    pub gradient_inf_norm: T,
    /// Stop reason.
    pub termination: Termination,
    /// Every trial step in order.
    pub history: Vec<StepRecord<T>>,
}

/// A problem linearised at the current parameters.
pub(crate) struct Linearization<T> {
    /// Model Jacobian `J`.
    pub(crate) j: SparseMatrix<T>,
    /// `JᵀJ`.
    pub(crate) a: SparseMatrix<T>,
    /// `Jᵀe`.
    pub(crate) g: Vector<T>,
    /// `‖e‖²`.
    pub(crate) cost: T,
}

impl<T: FloatScalar> Linearization<T> {
    pub(crate) fn at<P: SparseProblem<T>>(
        problem: &mut P,
        p: &Vector<T>,
        e: Vector<T>,
        op: &'static str,
    ) -> NumResult<Self> {
        let j = problem.differentiate(p);
        check_jacobian(op, &j, &e, p)?;
        Ok(Self {
            g: j.transpose_mul_vec(&e)?,
            a: j.gram(),
            cost: e.length_sqr(),
            j,
        })
    }
}

/// Keep `|d|` at or above `floor`, preserving the sign. Zero maps to
/// `+floor`.
pub(crate) fn clamp_denominator(d: f64, floor: f64, what: &str) -> f64 {
    if d.abs() >= floor {
        return d;
    }
    warn!("{what} = {d:.4e} clamped to magnitude floor {floor:.1e}");
    if d < 0.0 {
        -floor
    } else {
        floor
    }
}

/// `A` square with `b` and `x` matching its dimension.
pub(crate) fn check_system<T, A: LinearOperator<T>>(
    op: &'static str,
    a: &A,
    b: &Vector<T>,
    x: &Vector<T>,
) -> NumResult<()> {
    let shape = Shape::Matrix(a.nrows(), a.ncols());
    if a.nrows() != a.ncols() {
        return Err(NumError::DimensionMismatch {
            op,
            lhs: shape,
            rhs: Shape::Matrix(a.ncols(), a.nrows()),
        });
    }
    for len in [b.len(), x.len()] {
        if len != a.nrows() {
            return Err(NumError::DimensionMismatch {
                op,
                lhs: shape,
                rhs: Shape::Vector(len),
            });
        }
    }
    Ok(())
}

/// Jacobian rows must match the residual, columns the parameters.
fn check_jacobian<T>(
    op: &'static str,
    j: &SparseMatrix<T>,
    residual: &Vector<T>,
    params: &Vector<T>,
) -> NumResult<()> {
    if j.nrows() != residual.len() {
        return Err(NumError::DimensionMismatch {
            op,
            lhs: j.shape(),
            rhs: Shape::Vector(residual.len()),
        });
    }
    if j.ncols() != params.len() {
        return Err(NumError::DimensionMismatch {
            op,
            lhs: j.shape(),
            rhs: Shape::Vector(params.len()),
        });
    }
    Ok(())
}
